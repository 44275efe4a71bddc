/// Key matrix wiring. Rows are driven low one at a time, columns are read through pull-ups, so
/// a closed switch reads low on its column while its row is selected.
use defmt::error;
use embedded_hal::digital::v2::{InputPin, OutputPin};
use minimidi_core::{
    config::{COLUMN_COUNT, ROW_COUNT},
    matrix::MatrixIo,
};
use rp_pico::hal::gpio::DynPin;

// time for the column lines to settle after a row is pulled low
const ROW_SETTLE_CYCLES: u32 = 100;

pub struct KeyMatrix {
    rows: [DynPin; ROW_COUNT],
    columns: [DynPin; COLUMN_COUNT],
}

impl KeyMatrix {
    pub fn new(mut rows: [DynPin; ROW_COUNT], mut columns: [DynPin; COLUMN_COUNT]) -> KeyMatrix {
        for row in rows.iter_mut() {
            row.into_push_pull_output();
            if row.set_high().is_err() {
                error!("[KeyMatrix::new] could not idle row pin high");
            }
        }
        for column in columns.iter_mut() {
            column.into_pull_up_input();
        }
        KeyMatrix { rows, columns }
    }
}

impl MatrixIo for KeyMatrix {
    fn select_row(&mut self, row: usize) {
        if self.rows[row].set_low().is_err() {
            error!("[KeyMatrix::select_row] could not drive row {} low", row);
        }
        cortex_m::asm::delay(ROW_SETTLE_CYCLES);
    }

    fn release_row(&mut self, row: usize) {
        if self.rows[row].set_high().is_err() {
            error!("[KeyMatrix::release_row] could not drive row {} high", row);
        }
    }

    fn is_column_active(&mut self, column: usize) -> bool {
        // a pin that can't be read counts as released
        self.columns[column].is_low().unwrap_or(false)
    }
}
