/// Turning accumulated rotary encoder positions into relative steps.
use crate::{
    config::{ENCODER_BACKWARD_VALUE, ENCODER_COUNT, ENCODER_FORWARD_VALUE},
    keymap::EncoderId,
};

/// Raw quadrature sampling for one encoder. `tick` must be called often enough to catch every
/// transition; `position` is the detent count since boot.
pub trait QuadratureSource {
    fn tick(&mut self);
    fn position(&self) -> i32;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "target_release", derive(defmt::Format))]
pub enum EncoderDirection {
    Forward,
    Backward,
}

impl EncoderDirection {
    pub fn from_delta(delta: i32) -> Option<EncoderDirection> {
        match delta {
            0 => None,
            d if d > 0 => Some(EncoderDirection::Forward),
            _ => Some(EncoderDirection::Backward),
        }
    }

    /// Relative CC value. Only the direction is sent, never the size of the step.
    pub fn cc_value(self) -> u8 {
        match self {
            EncoderDirection::Forward => ENCODER_FORWARD_VALUE,
            EncoderDirection::Backward => ENCODER_BACKWARD_VALUE,
        }
    }
}

#[derive(Debug, Default)]
pub struct EncoderDecoder {
    last_positions: [i32; ENCODER_COUNT],
}

impl EncoderDecoder {
    /// Sample `source` and return how far it moved since the previous call for this encoder.
    pub fn step<Q: QuadratureSource>(&mut self, id: EncoderId, source: &mut Q) -> i32 {
        source.tick();
        let position = source.position();
        let last_position = &mut self.last_positions[id.index()];
        let delta = position.wrapping_sub(*last_position);
        *last_position = position;
        delta
    }

    #[cfg(test)]
    pub fn last_position(&self, id: EncoderId) -> i32 {
        self.last_positions[id.index()]
    }
}
