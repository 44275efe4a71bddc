/// Hardware geometry, protocol constants and per-build controller configuration.
use midi_types::Channel;

use crate::keymap::KeyMap;

pub const ROW_COUNT: usize = 6;
pub const COLUMN_COUNT: usize = 7;
pub const KEY_COUNT: usize = ROW_COUNT * COLUMN_COUNT;

pub const ENCODER_COUNT: usize = 2;

pub const MIDI_MIN_CHANNEL: u8 = 1;
pub const MIDI_MAX_CHANNEL: u8 = 16;
pub const DEFAULT_MIDI_CHANNEL: u8 = 1;

pub const MIDI_MAX_DATA: u8 = 127;

pub const OCTAVE_SHIFT_MIN: i8 = -2;
pub const OCTAVE_SHIFT_MAX: i8 = 2;
pub const SEMITONES_PER_OCTAVE: i16 = 12;

/// Lowest controller number a matrix key can carry. Everything below is reserved for the
/// encoders.
pub const DAW_CC_BASE: u8 = 30;

pub const ENCODER_SWITCH_CC: [u8; ENCODER_COUNT] = [20, 21];
pub const ENCODER_ROTATION_CC: [u8; ENCODER_COUNT] = [22, 23];

pub const NOTE_ON_VELOCITY: u8 = 127;
pub const NOTE_OFF_VELOCITY: u8 = 0;

pub const CC_ON_VALUE: u8 = 127;
pub const CC_OFF_VALUE: u8 = 0;

// relative encoder convention used by most DAWs: 1 = one step up, 127 = one step down
pub const ENCODER_FORWARD_VALUE: u8 = 1;
pub const ENCODER_BACKWARD_VALUE: u8 = 127;

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    ChannelOutOfRange(u8),
}

/// Settings fixed for the lifetime of the process. Nothing is persisted; every boot starts
/// from the values compiled into the firmware.
#[derive(Clone, Copy, Debug)]
pub struct ControllerConfig {
    channel: u8,
    keymap: KeyMap,
}

impl Default for ControllerConfig {
    fn default() -> ControllerConfig {
        ControllerConfig {
            channel: DEFAULT_MIDI_CHANNEL,
            keymap: KeyMap::minimidi(),
        }
    }
}

impl ControllerConfig {
    /// `channel` is human-numbered, 1 to 16.
    pub fn new(channel: u8, keymap: KeyMap) -> Result<ControllerConfig, ConfigError> {
        if !(MIDI_MIN_CHANNEL..=MIDI_MAX_CHANNEL).contains(&channel) {
            return Err(ConfigError::ChannelOutOfRange(channel));
        }
        Ok(ControllerConfig { channel, keymap })
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Channel as it goes out on the wire, 0 to 15.
    pub fn wire_channel(&self) -> Channel {
        (self.channel - MIDI_MIN_CHANNEL).into()
    }

    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }
}
