use core::fmt::Debug;
use defmt::{error, trace};
use minimidi_core::{config::ENCODER_COUNT, encoder::QuadratureSource};
use rotary_encoder_hal::{Direction, Rotary};
use rp_pico::hal::gpio::DynPin;

pub type EncoderArray = [PositionalEncoder; ENCODER_COUNT];

/// A rotary encoder that keeps a running count of detents since boot.
pub struct PositionalEncoder {
    encoder: Rotary<DynPin, DynPin>,
    position: i32,
}

impl PositionalEncoder {
    pub fn new(mut pin_a: DynPin, mut pin_b: DynPin) -> PositionalEncoder {
        pin_a.into_pull_up_input();
        pin_b.into_pull_up_input();
        PositionalEncoder {
            encoder: Rotary::new(pin_a, pin_b),
            position: 0,
        }
    }
}

impl QuadratureSource for PositionalEncoder {
    /// Check the encoder pins for a transition. This should be called frequently, e.g.
    /// every 1ms, or steps will be missed.
    fn tick(&mut self) {
        match self.encoder.update() {
            Ok(Direction::Clockwise) => {
                trace!("[PositionalEncoder::tick] Direction::Clockwise");
                self.position = self.position.wrapping_add(1);
            }
            Ok(Direction::CounterClockwise) => {
                trace!("[PositionalEncoder::tick] Direction::CounterClockwise");
                self.position = self.position.wrapping_sub(1);
            }
            Ok(Direction::None) => {}
            Err(_error) => {
                error!("[PositionalEncoder::tick] could not update encoder");
            }
        }
    }

    fn position(&self) -> i32 {
        self.position
    }
}

impl Debug for PositionalEncoder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "encoder position={}", self.position)
    }
}
