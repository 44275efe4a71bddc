/// Rendering the controller state to the OLED. The screen is a title bar and three text
/// regions (note, CC, status), each cleared and redrawn on its own.
use core::fmt::Write;
use display_interface::DisplayError;
use embedded_graphics::{
    mono_font::{
        ascii::{FONT_6X10, FONT_6X9},
        MonoTextStyle,
    },
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Line, PrimitiveStyle, Rectangle},
    text::{Alignment, Baseline, Text, TextStyle, TextStyleBuilder},
};
use heapless::String;
use minimidi_core::{DirtyRegions, DisplayRegion, DisplaySummary};

use crate::peripherals::Display;

type DisplayResult = Result<(), DisplayError>;

type Line24 = String<24>;

const DISPLAY_WIDTH: i32 = 128;
const DISPLAY_CENTER: i32 = DISPLAY_WIDTH / 2;

const TEXT_MARGIN_LEFT: i32 = 2;
const REGION_HEIGHT: u32 = 12;

const SEPARATOR_Y_POS: [i32; 3] = [12, 29, 46];

const NOTE_Y_POS: i32 = 15;
const CC_Y_POS: i32 = 32;
const STATUS_Y_POS: i32 = 49;
const STATUS_OCTAVE_X_POS: i32 = 76;

/// A copy of the display summary plus the regions that changed since the last render. Built
/// while the controller is locked, rendered after the lock is released.
pub struct RenderView {
    pub summary: DisplaySummary,
    pub regions: DirtyRegions,
}

impl RenderView {
    pub fn render(&self, display: &mut Display) -> DisplayResult {
        for region in self.regions.iter() {
            match region {
                DisplayRegion::Note => draw_note_area(display, &self.summary)?,
                DisplayRegion::ControlChange => draw_cc_area(display, &self.summary)?,
                DisplayRegion::Status => draw_status_area(display, &self.summary)?,
            }
        }
        display.flush()?;
        Ok(())
    }
}

/// Title and region separators. Drawn once at boot, regions are filled in by `RenderView`.
pub fn render_splash_screen_view(display: &mut Display) -> DisplayResult {
    display.clear();
    Text::with_text_style(
        "MiniMIDI",
        Point::new(DISPLAY_CENTER, 0),
        big_character_style(),
        centered(),
    )
    .draw(display)?;
    for y in SEPARATOR_Y_POS {
        Line::new(Point::new(0, y), Point::new(DISPLAY_WIDTH - 1, y))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(display)?;
    }
    display.flush()?;
    Ok(())
}

fn draw_note_area(display: &mut Display, summary: &DisplaySummary) -> DisplayResult {
    clear_region(display, NOTE_Y_POS)?;
    let mut note_str: Line24 = String::new();
    write!(note_str, "Note: {}", summary.last_note()).unwrap();
    draw_text(display, note_str.as_str(), TEXT_MARGIN_LEFT, NOTE_Y_POS)?;
    let mut count_str: Line24 = String::new();
    write!(count_str, "({})", summary.active_notes()).unwrap();
    Text::with_text_style(
        count_str.as_str(),
        Point::new(DISPLAY_WIDTH - TEXT_MARGIN_LEFT, NOTE_Y_POS),
        default_character_style(),
        right_align(),
    )
    .draw(display)?;
    Ok(())
}

fn draw_cc_area(display: &mut Display, summary: &DisplaySummary) -> DisplayResult {
    clear_region(display, CC_Y_POS)?;
    let mut cc_str: Line24 = String::new();
    write!(cc_str, "CC: {}", summary.last_cc()).unwrap();
    draw_text(display, cc_str.as_str(), TEXT_MARGIN_LEFT, CC_Y_POS)
}

fn draw_status_area(display: &mut Display, summary: &DisplaySummary) -> DisplayResult {
    clear_region(display, STATUS_Y_POS)?;
    let mut channel_str: Line24 = String::new();
    write!(channel_str, "Ch:{}", summary.channel()).unwrap();
    draw_text(display, channel_str.as_str(), TEXT_MARGIN_LEFT, STATUS_Y_POS)?;
    let mut octave_str: Line24 = String::new();
    write!(octave_str, "Oct:{}", summary.octave()).unwrap();
    draw_text(display, octave_str.as_str(), STATUS_OCTAVE_X_POS, STATUS_Y_POS)
}

fn clear_region(display: &mut Display, y: i32) -> DisplayResult {
    Rectangle::new(
        Point::new(0, y),
        Size::new(DISPLAY_WIDTH as u32, REGION_HEIGHT),
    )
    .into_styled(background_style())
    .draw(display)
}

fn draw_text(display: &mut Display, text: &str, x: i32, y: i32) -> DisplayResult {
    Text::with_baseline(text, Point::new(x, y), default_character_style(), Baseline::Top)
        .draw(display)?;
    Ok(())
}

fn default_character_style<'a>() -> MonoTextStyle<'a, BinaryColor> {
    MonoTextStyle::new(&FONT_6X9, BinaryColor::On)
}

fn big_character_style<'a>() -> MonoTextStyle<'a, BinaryColor> {
    MonoTextStyle::new(&FONT_6X10, BinaryColor::On)
}

fn background_style() -> PrimitiveStyle<BinaryColor> {
    PrimitiveStyle::with_fill(BinaryColor::Off)
}

fn centered() -> TextStyle {
    TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Top)
        .build()
}

fn right_align() -> TextStyle {
    TextStyleBuilder::new()
        .alignment(Alignment::Right)
        .baseline(Baseline::Top)
        .build()
}
