use defmt::{debug, trace};
use midi_types::MidiMessage;
use minimidi_core::midi;
use usb_device::{class_prelude::*, Result as UsbResult};
use usbd_midi::data::{usb::constants::*, usb_midi::cable_number::CableNumber};

pub type UsbMidi = MidiStreamingClass<'static, rp_pico::hal::usb::UsbBus>;

// class-specific length of one embedded MIDI OUT jack descriptor
const MIDI_OUT_JACK_LENGTH: u8 = 0x09;

#[derive(Debug, defmt::Format)]
pub enum TransportError {
    Unsupported,
    Usb,
}

/// Device-to-host USB-MIDI interface with one embedded OUT jack on cable 0. Takes prebuilt
/// event packets, so any channel voice message can be sent, Control Change included.
pub struct MidiStreamingClass<'a, B: UsbBus> {
    audio_control: InterfaceNumber,
    midi_streaming: InterfaceNumber,
    bulk_in: EndpointIn<'a, B>,
}

impl<B: UsbBus> MidiStreamingClass<'_, B> {
    pub fn new(alloc: &UsbBusAllocator<B>) -> MidiStreamingClass<'_, B> {
        MidiStreamingClass {
            audio_control: alloc.interface(),
            midi_streaming: alloc.interface(),
            bulk_in: alloc.bulk(64),
        }
    }

    pub fn send_packet(&mut self, packet: &[u8; 4]) -> UsbResult<usize> {
        self.bulk_in.write(packet)
    }
}

impl<B: UsbBus> UsbClass<B> for MidiStreamingClass<'_, B> {
    fn get_configuration_descriptors(&self, writer: &mut DescriptorWriter) -> UsbResult<()> {
        writer.interface(
            self.audio_control,
            USB_AUDIO_CLASS,
            USB_AUDIOCONTROL_SUBCLASS,
            0,
        )?;
        writer.write(
            CS_INTERFACE,
            &[
                HEADER_SUBTYPE,
                0x00,
                0x01, // revision 1.0
                0x09,
                0x00, // total class-specific length
                0x01, // one streaming interface
                0x01, // which is interface 1
            ],
        )?;

        writer.interface(
            self.midi_streaming,
            USB_AUDIO_CLASS,
            USB_MIDISTREAMING_SUBCLASS,
            0,
        )?;
        writer.write(
            CS_INTERFACE,
            &[
                MS_HEADER_SUBTYPE,
                0x00,
                0x01, // revision 1.0
                0x07 + MIDI_OUT_JACK_LENGTH,
                0x00,
            ],
        )?;
        writer.write(
            CS_INTERFACE,
            &[
                MIDI_OUT_JACK_SUBTYPE,
                EMBEDDED,
                0x01, // jack id
                0x01, // one input pin
                0x01, // source id
                0x01, // source pin
                0x00,
            ],
        )?;

        writer.endpoint(&self.bulk_in)?;
        writer.write(CS_ENDPOINT, &[MS_GENERAL, 0x01, 0x01])?;
        Ok(())
    }
}

/// Write one message to the host. Fire-and-forget: nothing is retried.
pub fn write(usb_midi: &mut UsbMidi, message: &MidiMessage) -> Result<(), TransportError> {
    let packet = midi::to_usb_event_packet(CableNumber::Cable0, message)
        .ok_or(TransportError::Unsupported)?;
    usb_midi
        .send_packet(&packet)
        .map_err(|_| TransportError::Usb)?;
    Ok(())
}

pub fn log_message(message: &MidiMessage) {
    match message {
        MidiMessage::NoteOn(midi_channel, note, velocity) => {
            let midi_channel: u8 = (*midi_channel).into();
            let note: u8 = (*note).into();
            let velocity: u8 = (*velocity).into();
            debug!(
                "[midi_send] note on midi_channel={} note={} velocity={}",
                midi_channel, note, velocity
            );
        }
        MidiMessage::NoteOff(midi_channel, note, _velocity) => {
            let midi_channel: u8 = (*midi_channel).into();
            let note: u8 = (*note).into();
            debug!(
                "[midi_send] note off midi_channel={} note={}",
                midi_channel, note
            );
        }
        MidiMessage::ControlChange(midi_channel, control, value) => {
            let midi_channel: u8 = (*midi_channel).into();
            let control: u8 = (*control).into();
            let value: u8 = (*value).into();
            debug!(
                "[midi_send] control change midi_channel={} control={} value={}",
                midi_channel, control, value
            );
        }
        _ => trace!("[midi_send] UNKNOWN"),
    }
}
