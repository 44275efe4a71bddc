/// Static mapping of key matrix positions to musical or control actions.
use core::fmt::{Display, Formatter, Result as FmtResult};

use crate::config::{COLUMN_COUNT, DAW_CC_BASE, MIDI_MAX_DATA, ROW_COUNT};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "target_release", derive(defmt::Format))]
pub enum EncoderId {
    First,
    Second,
}

impl EncoderId {
    pub const ALL: [EncoderId; 2] = [EncoderId::First, EncoderId::Second];

    pub fn index(self) -> usize {
        match self {
            EncoderId::First => 0,
            EncoderId::Second => 1,
        }
    }
}

impl Display for EncoderId {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.index() + 1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "target_release", derive(defmt::Format))]
pub enum OctaveDirection {
    Up,
    Down,
}

/// What a key does. Replaces a signed-integer code table,
/// where one sentinel value could silently mean two different things.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "target_release", derive(defmt::Format))]
pub enum KeyAction {
    /// MIDI note number before octave shift.
    Note(u8),
    /// Controller number, sent as 127 on press and 0 on release.
    ControlChange(u8),
    EncoderSwitch(EncoderId),
    OctaveShift(OctaveDirection),
    #[default]
    Unassigned,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "target_release", derive(defmt::Format))]
pub struct KeyCoordinate {
    pub row: u8,
    pub column: u8,
}

impl KeyCoordinate {
    pub fn new(row: u8, column: u8) -> KeyCoordinate {
        KeyCoordinate { row, column }
    }
}

#[derive(Debug, PartialEq)]
pub enum KeyMapError {
    OutOfGrid(KeyCoordinate),
    NoteOutOfRange(u8),
    ControllerOutOfRange(u8),
}

type Layout = [[KeyAction; COLUMN_COUNT]; ROW_COUNT];

/// Factory layout: two chromatic octaves of keys (naturals on rows 1 and 3, sharps on rows 0
/// and 2), then two rows of DAW trigger pads with the octave keys and encoder push switches.
#[rustfmt::skip]
const MINIMIDI_LAYOUT: Layout = {
    use KeyAction::{ControlChange as Cc, EncoderSwitch, Note, OctaveShift, Unassigned as X};
    [
        [Note(49), Note(51), X,        Note(54), Note(56), Note(58), X       ],
        [Note(48), Note(50), Note(52), Note(53), Note(55), Note(57), Note(59)],
        [Note(61), Note(63), X,        Note(66), Note(68), Note(70), X       ],
        [Note(60), Note(62), Note(64), Note(65), Note(67), Note(69), Note(71)],
        [Cc(30),   Cc(31),   Cc(32),   Cc(33),   OctaveShift(OctaveDirection::Up),   X, EncoderSwitch(EncoderId::First) ],
        [Cc(35),   Cc(36),   Cc(37),   Cc(38),   OctaveShift(OctaveDirection::Down), X, EncoderSwitch(EncoderId::Second)],
    ]
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyMap {
    layout: Layout,
}

impl Default for KeyMap {
    fn default() -> KeyMap {
        KeyMap::minimidi()
    }
}

impl KeyMap {
    pub fn minimidi() -> KeyMap {
        KeyMap {
            layout: MINIMIDI_LAYOUT,
        }
    }

    /// A map with every key unassigned, for building custom layouts with `with_action`.
    pub fn empty() -> KeyMap {
        KeyMap {
            layout: [[KeyAction::Unassigned; COLUMN_COUNT]; ROW_COUNT],
        }
    }

    /// Return a copy of this map with `coordinate` bound to `action`.
    pub fn with_action(
        mut self,
        coordinate: KeyCoordinate,
        action: KeyAction,
    ) -> Result<KeyMap, KeyMapError> {
        match action {
            KeyAction::Note(note) if note > MIDI_MAX_DATA => {
                return Err(KeyMapError::NoteOutOfRange(note))
            }
            KeyAction::ControlChange(number)
                if !(DAW_CC_BASE..=MIDI_MAX_DATA).contains(&number) =>
            {
                return Err(KeyMapError::ControllerOutOfRange(number))
            }
            _ => {}
        }
        let cell = self
            .layout
            .get_mut(coordinate.row as usize)
            .and_then(|row| row.get_mut(coordinate.column as usize))
            .ok_or(KeyMapError::OutOfGrid(coordinate))?;
        *cell = action;
        Ok(self)
    }

    /// Total over any coordinate: positions outside the grid are `Unassigned`.
    pub fn classify(&self, coordinate: KeyCoordinate) -> KeyAction {
        self.layout
            .get(coordinate.row as usize)
            .and_then(|row| row.get(coordinate.column as usize))
            .copied()
            .unwrap_or_default()
    }
}
