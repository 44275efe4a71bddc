/// Resolving key edges and encoder steps into MIDI messages, octave changes and display
/// updates. All carried state (octave shift, held note count, display summary) lives on the
/// `EventMapper` value; each event is handled on its own.
use midi_types::{Channel, MidiMessage};

use crate::{
    config::{
        ControllerConfig, CC_OFF_VALUE, CC_ON_VALUE, ENCODER_ROTATION_CC, ENCODER_SWITCH_CC,
        MIDI_MAX_DATA, NOTE_OFF_VELOCITY, NOTE_ON_VELOCITY, OCTAVE_SHIFT_MAX, OCTAVE_SHIFT_MIN,
        SEMITONES_PER_OCTAVE,
    },
    display::{DisplayRegion, DisplaySummary},
    encoder::EncoderDirection,
    keymap::{EncoderId, KeyAction, OctaveDirection},
    matrix::Edge,
    midi,
};

/// Something was dropped instead of being sent. Reported for diagnostics only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "target_release", derive(defmt::Format))]
pub enum MappingWarning {
    /// `note + 12 * octave_shift` fell outside 0..=127, so no note message was sent.
    PitchOutOfRange { note: u8, octave_shift: i8 },
}

/// Result of handling one event: at most one MIDI message and at most one redraw.
#[derive(Debug, Default, PartialEq)]
pub struct Outcome {
    pub message: Option<MidiMessage>,
    pub redraw: Option<DisplayRegion>,
    pub warning: Option<MappingWarning>,
}

impl Outcome {
    pub fn none() -> Outcome {
        Outcome::default()
    }

    fn redraw(region: DisplayRegion) -> Outcome {
        Outcome {
            redraw: Some(region),
            ..Default::default()
        }
    }

    fn send(message: MidiMessage, region: DisplayRegion) -> Outcome {
        Outcome {
            message: Some(message),
            redraw: Some(region),
            warning: None,
        }
    }

    fn warn(warning: MappingWarning, region: DisplayRegion) -> Outcome {
        Outcome {
            message: None,
            redraw: Some(region),
            warning: Some(warning),
        }
    }
}

#[derive(Debug)]
pub struct EventMapper {
    channel: Channel,
    octave_shift: i8,
    active_notes: u16,
    display: DisplaySummary,
}

impl EventMapper {
    pub fn new(config: &ControllerConfig) -> EventMapper {
        EventMapper {
            channel: config.wire_channel(),
            octave_shift: 0,
            active_notes: 0,
            display: DisplaySummary::new(config.channel()),
        }
    }

    pub fn octave_shift(&self) -> i8 {
        self.octave_shift
    }

    pub fn active_note_count(&self) -> u16 {
        self.active_notes
    }

    pub fn display(&self) -> &DisplaySummary {
        &self.display
    }

    /// Pitch actually sent for `note` at the current octave shift.
    pub fn shifted_pitch(&self, note: u8) -> Result<u8, MappingWarning> {
        let pitch = note as i16 + SEMITONES_PER_OCTAVE * self.octave_shift as i16;
        match u8::try_from(pitch) {
            Ok(pitch) if pitch <= MIDI_MAX_DATA => Ok(pitch),
            _ => Err(MappingWarning::PitchOutOfRange {
                note,
                octave_shift: self.octave_shift,
            }),
        }
    }

    pub fn map_key(&mut self, action: KeyAction, edge: Edge) -> Outcome {
        match edge {
            Edge::Pressed => self.press(action),
            Edge::Released => self.release(action),
        }
    }

    fn press(&mut self, action: KeyAction) -> Outcome {
        match action {
            KeyAction::Note(note) => {
                self.active_notes = self.active_notes.saturating_add(1);
                self.display.set_active_notes(self.active_notes);
                match self.shifted_pitch(note) {
                    Ok(pitch) => {
                        let region = self.display.set_note(pitch);
                        Outcome::send(midi::note_on(self.channel, pitch, NOTE_ON_VELOCITY), region)
                    }
                    Err(warning) => Outcome::warn(warning, DisplayRegion::Note),
                }
            }
            KeyAction::ControlChange(number) => self.control_change(number, CC_ON_VALUE),
            KeyAction::EncoderSwitch(id) => {
                self.control_change(ENCODER_SWITCH_CC[id.index()], CC_ON_VALUE)
            }
            KeyAction::OctaveShift(direction) => {
                self.octave_shift = match direction {
                    OctaveDirection::Up => (self.octave_shift + 1).min(OCTAVE_SHIFT_MAX),
                    OctaveDirection::Down => (self.octave_shift - 1).max(OCTAVE_SHIFT_MIN),
                };
                // the status line is refreshed even when the shift is already at its bound
                Outcome::redraw(self.display.set_octave(self.octave_shift))
            }
            KeyAction::Unassigned => Outcome::none(),
        }
    }

    // Notes are released at the shift in effect now, not the one they were pressed at.
    fn release(&mut self, action: KeyAction) -> Outcome {
        match action {
            KeyAction::Note(note) => {
                self.active_notes = self.active_notes.saturating_sub(1);
                let region = self.display.set_active_notes(self.active_notes);
                match self.shifted_pitch(note) {
                    Ok(pitch) => Outcome::send(
                        midi::note_off(self.channel, pitch, NOTE_OFF_VELOCITY),
                        region,
                    ),
                    Err(warning) => Outcome::warn(warning, region),
                }
            }
            KeyAction::ControlChange(number) => self.control_change(number, CC_OFF_VALUE),
            KeyAction::EncoderSwitch(id) => {
                self.control_change(ENCODER_SWITCH_CC[id.index()], CC_OFF_VALUE)
            }
            KeyAction::OctaveShift(_) | KeyAction::Unassigned => Outcome::none(),
        }
    }

    /// Relative CC for an encoder that moved by `delta` detents. No movement, no message.
    pub fn map_encoder_step(&mut self, id: EncoderId, delta: i32) -> Outcome {
        match EncoderDirection::from_delta(delta) {
            Some(direction) => {
                self.control_change(ENCODER_ROTATION_CC[id.index()], direction.cc_value())
            }
            None => Outcome::none(),
        }
    }

    fn control_change(&mut self, number: u8, value: u8) -> Outcome {
        let region = self.display.set_cc(number, value);
        Outcome::send(midi::control_change(self.channel, number, value), region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::DEFAULT_MIDI_CHANNEL, keymap::KeyMap};

    fn mapper() -> EventMapper {
        EventMapper::new(&ControllerConfig::default())
    }

    fn note_on(pitch: u8) -> Option<MidiMessage> {
        Some(MidiMessage::NoteOn(0.into(), pitch.into(), 127.into()))
    }

    fn note_off(pitch: u8) -> Option<MidiMessage> {
        Some(MidiMessage::NoteOff(0.into(), pitch.into(), 0.into()))
    }

    fn cc(number: u8, value: u8) -> Option<MidiMessage> {
        Some(MidiMessage::ControlChange(0.into(), number.into(), value.into()))
    }

    #[test]
    fn note_press_and_release_at_no_shift() {
        let mut mapper = mapper();
        let outcome = mapper.map_key(KeyAction::Note(60), Edge::Pressed);
        assert_eq!(note_on(60), outcome.message);
        assert_eq!(Some(DisplayRegion::Note), outcome.redraw);
        assert_eq!(1, mapper.active_note_count());
        assert_eq!("C4", mapper.display().last_note());

        let outcome = mapper.map_key(KeyAction::Note(60), Edge::Released);
        assert_eq!(note_off(60), outcome.message);
        assert_eq!(Some(DisplayRegion::Note), outcome.redraw);
        assert_eq!(0, mapper.active_note_count());
        // release only refreshes the count
        assert_eq!("C4", mapper.display().last_note());
    }

    #[test]
    fn note_pitch_follows_octave_shift() {
        let mut mapper = mapper();
        mapper.map_key(KeyAction::OctaveShift(OctaveDirection::Up), Edge::Pressed);
        let outcome = mapper.map_key(KeyAction::Note(60), Edge::Pressed);
        assert_eq!(note_on(72), outcome.message);
        assert_eq!("C5", mapper.display().last_note());

        mapper.map_key(KeyAction::OctaveShift(OctaveDirection::Down), Edge::Pressed);
        mapper.map_key(KeyAction::OctaveShift(OctaveDirection::Down), Edge::Pressed);
        let outcome = mapper.map_key(KeyAction::Note(49), Edge::Pressed);
        assert_eq!(note_on(37), outcome.message);
    }

    #[test]
    fn release_uses_the_octave_shift_in_effect_at_release_time() {
        let mut mapper = mapper();
        let outcome = mapper.map_key(KeyAction::Note(60), Edge::Pressed);
        assert_eq!(note_on(60), outcome.message);
        mapper.map_key(KeyAction::OctaveShift(OctaveDirection::Up), Edge::Pressed);
        let outcome = mapper.map_key(KeyAction::Note(60), Edge::Released);
        assert_eq!(note_off(72), outcome.message);
        assert_eq!(0, mapper.active_note_count());
    }

    #[test]
    fn octave_shift_should_clamp_at_bounds_and_still_refresh_status() {
        let mut mapper = mapper();
        for _ in 0..5 {
            mapper.map_key(KeyAction::OctaveShift(OctaveDirection::Up), Edge::Pressed);
        }
        assert_eq!(2, mapper.octave_shift());

        let outcome = mapper.map_key(KeyAction::OctaveShift(OctaveDirection::Up), Edge::Pressed);
        assert_eq!(2, mapper.octave_shift());
        assert_eq!(None, outcome.message);
        assert_eq!(Some(DisplayRegion::Status), outcome.redraw);
        assert_eq!(2, mapper.display().octave());

        for _ in 0..9 {
            mapper.map_key(KeyAction::OctaveShift(OctaveDirection::Down), Edge::Pressed);
            assert!((-2..=2).contains(&mapper.octave_shift()));
        }
        assert_eq!(-2, mapper.octave_shift());
    }

    #[test]
    fn octave_and_unassigned_keys_do_nothing_on_release() {
        let mut mapper = mapper();
        assert_eq!(
            Outcome::none(),
            mapper.map_key(KeyAction::OctaveShift(OctaveDirection::Up), Edge::Released)
        );
        assert_eq!(0, mapper.octave_shift());
        assert_eq!(Outcome::none(), mapper.map_key(KeyAction::Unassigned, Edge::Pressed));
        assert_eq!(Outcome::none(), mapper.map_key(KeyAction::Unassigned, Edge::Released));
    }

    #[test]
    fn cc_key_sends_127_on_press_and_0_on_release() {
        let mut mapper = mapper();
        let outcome = mapper.map_key(KeyAction::ControlChange(31), Edge::Pressed);
        assert_eq!(cc(31, 127), outcome.message);
        assert_eq!(Some(DisplayRegion::ControlChange), outcome.redraw);
        assert_eq!("31 | Val: 127", mapper.display().last_cc());

        let outcome = mapper.map_key(KeyAction::ControlChange(31), Edge::Released);
        assert_eq!(cc(31, 0), outcome.message);
        assert_eq!("31 | Val: 0", mapper.display().last_cc());
    }

    #[test]
    fn encoder_switches_send_fixed_controllers() {
        let mut mapper = mapper();
        let outcome = mapper.map_key(KeyAction::EncoderSwitch(EncoderId::First), Edge::Pressed);
        assert_eq!(cc(20, 127), outcome.message);
        let outcome = mapper.map_key(KeyAction::EncoderSwitch(EncoderId::Second), Edge::Pressed);
        assert_eq!(cc(21, 127), outcome.message);
        let outcome = mapper.map_key(KeyAction::EncoderSwitch(EncoderId::Second), Edge::Released);
        assert_eq!(cc(21, 0), outcome.message);
        assert_eq!("21 | Val: 0", mapper.display().last_cc());
    }

    #[test]
    fn encoder_steps_send_relative_values() {
        let mut mapper = mapper();
        assert_eq!(cc(22, 1), mapper.map_encoder_step(EncoderId::First, 1).message);
        assert_eq!(cc(22, 127), mapper.map_encoder_step(EncoderId::First, -1).message);
        assert_eq!(cc(23, 1), mapper.map_encoder_step(EncoderId::Second, 5).message);
        assert_eq!("23 | Val: 1", mapper.display().last_cc());
        assert_eq!(Outcome::none(), mapper.map_encoder_step(EncoderId::Second, 0));
    }

    #[test]
    fn spurious_releases_never_take_the_note_count_below_zero() {
        let mut mapper = mapper();
        mapper.map_key(KeyAction::Note(60), Edge::Released);
        mapper.map_key(KeyAction::Note(60), Edge::Released);
        assert_eq!(0, mapper.active_note_count());
        mapper.map_key(KeyAction::Note(60), Edge::Pressed);
        mapper.map_key(KeyAction::Note(62), Edge::Pressed);
        mapper.map_key(KeyAction::Note(60), Edge::Released);
        assert_eq!(1, mapper.active_note_count());
        assert_eq!(1, mapper.display().active_notes());
    }

    #[test]
    fn press_release_pairs_are_count_neutral() {
        let keymap = KeyMap::minimidi();
        let mut mapper = mapper();
        mapper.map_key(KeyAction::Note(48), Edge::Pressed);
        let before = mapper.active_note_count();
        for row in 0..4 {
            for column in 0..7 {
                let action = keymap.classify(crate::keymap::KeyCoordinate::new(row, column));
                mapper.map_key(action, Edge::Pressed);
                mapper.map_key(action, Edge::Released);
                assert_eq!(before, mapper.active_note_count());
            }
        }
    }

    #[test]
    fn out_of_range_pitch_is_suppressed_but_still_counted() {
        let config = ControllerConfig::new(
            DEFAULT_MIDI_CHANNEL,
            KeyMap::empty()
                .with_action(
                    crate::keymap::KeyCoordinate::new(0, 0),
                    KeyAction::Note(120),
                )
                .unwrap(),
        )
        .unwrap();
        let mut mapper = EventMapper::new(&config);
        mapper.map_key(KeyAction::OctaveShift(OctaveDirection::Up), Edge::Pressed);

        let outcome = mapper.map_key(KeyAction::Note(120), Edge::Pressed);
        assert_eq!(None, outcome.message);
        assert_eq!(
            Some(MappingWarning::PitchOutOfRange {
                note: 120,
                octave_shift: 1
            }),
            outcome.warning
        );
        assert_eq!(1, mapper.active_note_count());
        assert_eq!("---", mapper.display().last_note());

        let outcome = mapper.map_key(KeyAction::Note(120), Edge::Released);
        assert_eq!(None, outcome.message);
        assert!(outcome.warning.is_some());
        assert_eq!(0, mapper.active_note_count());
    }

    #[test]
    fn shifted_pitch_rejects_negative_pitches() {
        let mut mapper = mapper();
        mapper.map_key(KeyAction::OctaveShift(OctaveDirection::Down), Edge::Pressed);
        assert_eq!(Ok(0), mapper.shifted_pitch(12));
        assert!(mapper.shifted_pitch(11).is_err());
    }

    #[test]
    fn messages_go_out_on_the_configured_channel() {
        let config = ControllerConfig::new(10, KeyMap::minimidi()).unwrap();
        let mut mapper = EventMapper::new(&config);
        let outcome = mapper.map_key(KeyAction::Note(60), Edge::Pressed);
        assert_eq!(
            Some(MidiMessage::NoteOn(9.into(), 60.into(), 127.into())),
            outcome.message
        );
        assert_eq!(10, mapper.display().channel());
    }
}
