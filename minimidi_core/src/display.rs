/// What the screen should show, and which parts of it need redrawing.
use core::fmt::Write;
use heapless::String;

pub type NoteText = String<8>;
pub type CcText = String<20>;

const NO_VALUE: &str = "---";

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Name a MIDI pitch in scientific notation with middle C (60) as C4.
pub fn note_name(pitch: u8) -> NoteText {
    let mut name = NoteText::new();
    let octave = (pitch / 12) as i8 - 1;
    // "G#-1" is the longest name, 4 chars
    write!(name, "{}{}", NOTE_NAMES[(pitch % 12) as usize], octave).unwrap();
    name
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "target_release", derive(defmt::Format))]
pub enum DisplayRegion {
    /// Last note name and the count of held notes.
    Note,
    /// Last controller number and value.
    ControlChange,
    /// MIDI channel and octave shift.
    Status,
}

/// Set of regions waiting to be redrawn.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DirtyRegions {
    note: bool,
    control_change: bool,
    status: bool,
}

impl DirtyRegions {
    pub fn all() -> DirtyRegions {
        DirtyRegions {
            note: true,
            control_change: true,
            status: true,
        }
    }

    pub fn mark(&mut self, region: DisplayRegion) {
        match region {
            DisplayRegion::Note => self.note = true,
            DisplayRegion::ControlChange => self.control_change = true,
            DisplayRegion::Status => self.status = true,
        }
    }

    pub fn contains(&self, region: DisplayRegion) -> bool {
        match region {
            DisplayRegion::Note => self.note,
            DisplayRegion::ControlChange => self.control_change,
            DisplayRegion::Status => self.status,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.note || self.control_change || self.status)
    }

    /// Hand over the pending regions and start again with a clean set.
    pub fn take(&mut self) -> DirtyRegions {
        core::mem::take(self)
    }

    pub fn iter(&self) -> impl Iterator<Item = DisplayRegion> + '_ {
        [
            DisplayRegion::Note,
            DisplayRegion::ControlChange,
            DisplayRegion::Status,
        ]
        .into_iter()
        .filter(|&region| self.contains(region))
    }
}

/// Most recent state shown on screen. Always the latest event, never a history.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplaySummary {
    last_note: NoteText,
    last_cc: CcText,
    octave: i8,
    channel: u8,
    active_notes: u16,
}

impl DisplaySummary {
    pub fn new(channel: u8) -> DisplaySummary {
        DisplaySummary {
            last_note: NO_VALUE.into(),
            last_cc: NO_VALUE.into(),
            octave: 0,
            channel,
            active_notes: 0,
        }
    }

    pub fn last_note(&self) -> &str {
        self.last_note.as_str()
    }

    pub fn last_cc(&self) -> &str {
        self.last_cc.as_str()
    }

    pub fn octave(&self) -> i8 {
        self.octave
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn active_notes(&self) -> u16 {
        self.active_notes
    }

    pub fn set_note(&mut self, pitch: u8) -> DisplayRegion {
        self.last_note = note_name(pitch);
        DisplayRegion::Note
    }

    pub fn set_active_notes(&mut self, count: u16) -> DisplayRegion {
        self.active_notes = count;
        DisplayRegion::Note
    }

    pub fn set_cc(&mut self, number: u8, value: u8) -> DisplayRegion {
        self.last_cc.clear();
        // "127 | Val: 127" is 14 chars
        write!(self.last_cc, "{} | Val: {}", number, value).unwrap();
        DisplayRegion::ControlChange
    }

    pub fn set_octave(&mut self, octave: i8) -> DisplayRegion {
        self.octave = octave;
        DisplayRegion::Status
    }
}
