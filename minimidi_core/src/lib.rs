#![cfg_attr(not(test), no_std)]

//! Input-to-MIDI translation core of the MiniMIDI controller. Turns key matrix samples and
//! rotary encoder positions into MIDI messages plus display redraw intents. Nothing in here
//! touches hardware; the firmware supplies the collaborators through small traits.

pub mod config;
pub mod controller;
pub mod display;
pub mod encoder;
pub mod keymap;
pub mod mapper;
pub mod matrix;
pub mod midi;

pub use config::ControllerConfig;
pub use controller::{Controller, CycleSink};
pub use display::{DirtyRegions, DisplayRegion, DisplaySummary};
pub use encoder::{EncoderDecoder, EncoderDirection, QuadratureSource};
pub use keymap::{EncoderId, KeyAction, KeyCoordinate, KeyMap, OctaveDirection};
pub use mapper::{EventMapper, MappingWarning, Outcome};
pub use matrix::{Edge, KeyEdge, MatrixIo, MatrixScanner};
