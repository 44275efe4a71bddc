/// One scan cycle of the controller: matrix, then both encoders, every resulting event mapped
/// and handed on in order.
use midi_types::MidiMessage;

use crate::{
    config::{ControllerConfig, ENCODER_COUNT},
    display::{DisplayRegion, DisplaySummary},
    encoder::{EncoderDecoder, QuadratureSource},
    keymap::{EncoderId, KeyMap},
    mapper::{EventMapper, MappingWarning, Outcome},
    matrix::{KeyEdge, MatrixIo, MatrixScanner},
};

/// Receives everything a cycle produces. Sends are fire-and-forget.
pub trait CycleSink {
    fn send(&mut self, message: MidiMessage);
    fn redraw(&mut self, region: DisplayRegion);
    fn warn(&mut self, _warning: MappingWarning) {}
}

#[derive(Debug)]
pub struct Controller {
    keymap: KeyMap,
    scanner: MatrixScanner,
    decoder: EncoderDecoder,
    mapper: EventMapper,
}

impl Default for Controller {
    fn default() -> Controller {
        Controller::new(ControllerConfig::default())
    }
}

impl Controller {
    pub fn new(config: ControllerConfig) -> Controller {
        Controller {
            keymap: *config.keymap(),
            scanner: MatrixScanner::default(),
            decoder: EncoderDecoder::default(),
            mapper: EventMapper::new(&config),
        }
    }

    pub fn mapper(&self) -> &EventMapper {
        &self.mapper
    }

    pub fn display(&self) -> &DisplaySummary {
        self.mapper.display()
    }

    pub fn run_cycle<M, Q, S>(&mut self, io: &mut M, encoders: &mut [Q; ENCODER_COUNT], sink: &mut S)
    where
        M: MatrixIo,
        Q: QuadratureSource,
        S: CycleSink,
    {
        for key_edge in self.scanner.scan(io) {
            let outcome = self.handle_key_edge(key_edge);
            dispatch(outcome, sink);
        }
        for (id, source) in EncoderId::ALL.into_iter().zip(encoders.iter_mut()) {
            let outcome = self.handle_encoder(id, source);
            dispatch(outcome, sink);
        }
    }

    pub fn handle_key_edge(&mut self, key_edge: KeyEdge) -> Outcome {
        let action = self.keymap.classify(key_edge.coordinate);
        self.mapper.map_key(action, key_edge.edge)
    }

    pub fn handle_encoder<Q: QuadratureSource>(&mut self, id: EncoderId, source: &mut Q) -> Outcome {
        let delta = self.decoder.step(id, source);
        self.mapper.map_encoder_step(id, delta)
    }
}

fn dispatch<S: CycleSink>(outcome: Outcome, sink: &mut S) {
    if let Some(warning) = outcome.warning {
        sink.warn(warning);
    }
    if let Some(message) = outcome.message {
        sink.send(message);
    }
    if let Some(region) = outcome.redraw {
        sink.redraw(region);
    }
}
