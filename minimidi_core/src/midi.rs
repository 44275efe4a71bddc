/// Building channel messages and encoding them for the wire.
use midi_types::{Channel, MidiMessage};
use usbd_midi::data::{
    byte::u4::U4,
    usb_midi::{cable_number::CableNumber, code_index_number::CodeIndexNumber},
};

const NOTE_OFF_STATUS: u8 = 0x80;
const NOTE_ON_STATUS: u8 = 0x90;
const CONTROL_CHANGE_STATUS: u8 = 0xB0;

pub fn note_on(channel: Channel, pitch: u8, velocity: u8) -> MidiMessage {
    MidiMessage::NoteOn(channel, pitch.into(), velocity.into())
}

pub fn note_off(channel: Channel, pitch: u8, velocity: u8) -> MidiMessage {
    MidiMessage::NoteOff(channel, pitch.into(), velocity.into())
}

pub fn control_change(channel: Channel, number: u8, value: u8) -> MidiMessage {
    MidiMessage::ControlChange(channel, number.into(), value.into())
}

/// MIDI 1.0 bytes for the message types this controller sends. Anything else is `None`.
pub fn to_bytes(message: &MidiMessage) -> Option<[u8; 3]> {
    let (status, channel, data1, data2): (u8, u8, u8, u8) = match *message {
        MidiMessage::NoteOff(channel, note, velocity) => {
            (NOTE_OFF_STATUS, channel.into(), note.into(), velocity.into())
        }
        MidiMessage::NoteOn(channel, note, velocity) => {
            (NOTE_ON_STATUS, channel.into(), note.into(), velocity.into())
        }
        MidiMessage::ControlChange(channel, control, value) => {
            (CONTROL_CHANGE_STATUS, channel.into(), control.into(), value.into())
        }
        _ => return None,
    };
    Some([status | (channel & 0x0F), data1 & 0x7F, data2 & 0x7F])
}

/// USB-MIDI event packet: cable number and code index in the first byte, then the MIDI bytes.
pub fn to_usb_event_packet(cable: CableNumber, message: &MidiMessage) -> Option<[u8; 4]> {
    let code_index = match message {
        MidiMessage::NoteOff(..) => CodeIndexNumber::NOTE_OFF,
        MidiMessage::NoteOn(..) => CodeIndexNumber::NOTE_ON,
        MidiMessage::ControlChange(..) => CodeIndexNumber::CONTROL_CHANGE,
        _ => return None,
    };
    let [status, data1, data2] = to_bytes(message)?;
    // U4::combine shifts by 8 on a u8, which drops the cable nibble
    let header = (u8::from(U4::from(cable)) << 4) | u8::from(U4::from(code_index));
    Some([header, status, data1, data2])
}
