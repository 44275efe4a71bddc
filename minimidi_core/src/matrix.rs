/// Key matrix scanning and press/release edge detection.
use heapless::Vec;

use crate::{
    config::{COLUMN_COUNT, KEY_COUNT, ROW_COUNT},
    keymap::KeyCoordinate,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "target_release", derive(defmt::Format))]
pub enum Edge {
    Pressed,
    Released,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "target_release", derive(defmt::Format))]
pub struct KeyEdge {
    pub coordinate: KeyCoordinate,
    pub edge: Edge,
}

/// Electrical access to the switch matrix. Implementations hide the pin polarity: a column
/// is "active" when the switch at the selected row is closed.
pub trait MatrixIo {
    fn select_row(&mut self, row: usize);
    fn release_row(&mut self, row: usize);
    fn is_column_active(&mut self, column: usize) -> bool;
}

pub type KeyEdges = Vec<KeyEdge, KEY_COUNT>;

type KeyStates = [[bool; COLUMN_COUNT]; ROW_COUNT];

/// Remembers the previous scan so each call to `scan` reports only what changed. There is no
/// debounce beyond the cycle-to-cycle comparison, so contact bounce can show up as extra
/// edge pairs.
#[derive(Debug)]
pub struct MatrixScanner {
    previous: KeyStates,
}

impl Default for MatrixScanner {
    fn default() -> MatrixScanner {
        MatrixScanner {
            previous: [[false; COLUMN_COUNT]; ROW_COUNT],
        }
    }
}

impl MatrixScanner {
    /// Sample every key once. Edges come back row-major, columns ascending.
    pub fn scan<M: MatrixIo>(&mut self, io: &mut M) -> KeyEdges {
        let mut edges = KeyEdges::new();
        for (row, previous_row) in self.previous.iter_mut().enumerate() {
            io.select_row(row);
            for (column, previous) in previous_row.iter_mut().enumerate() {
                let current = io.is_column_active(column);
                if current != *previous {
                    let edge = KeyEdge {
                        coordinate: KeyCoordinate::new(row as u8, column as u8),
                        edge: if current { Edge::Pressed } else { Edge::Released },
                    };
                    edges
                        .push(edge)
                        .expect("edges.push(...) should succeed, one edge per key at most");
                }
                *previous = current;
            }
            io.release_row(row);
        }
        edges
    }

    #[cfg(test)]
    pub fn is_pressed(&self, coordinate: KeyCoordinate) -> bool {
        self.previous
            .get(coordinate.row as usize)
            .and_then(|row| row.get(coordinate.column as usize))
            .copied()
            .unwrap_or(false)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Matrix with switches held in memory. Columns read as released unless a row is selected.
    #[derive(Default)]
    pub(crate) struct FakeMatrix {
        pub closed: [[bool; COLUMN_COUNT]; ROW_COUNT],
        pub selected_row: Option<usize>,
        pub selections: usize,
    }

    impl FakeMatrix {
        pub fn set(&mut self, row: usize, column: usize, closed: bool) {
            self.closed[row][column] = closed;
        }
    }

    impl MatrixIo for FakeMatrix {
        fn select_row(&mut self, row: usize) {
            assert!(self.selected_row.is_none(), "only one row may be selected");
            self.selected_row = Some(row);
            self.selections += 1;
        }

        fn release_row(&mut self, row: usize) {
            assert_eq!(Some(row), self.selected_row);
            self.selected_row = None;
        }

        fn is_column_active(&mut self, column: usize) -> bool {
            match self.selected_row {
                Some(row) => self.closed[row][column],
                None => false,
            }
        }
    }

    fn edge(row: u8, column: u8, edge: Edge) -> KeyEdge {
        KeyEdge {
            coordinate: KeyCoordinate::new(row, column),
            edge,
        }
    }

    #[test]
    fn scan_with_nothing_pressed_should_emit_no_edges() {
        let mut scanner = MatrixScanner::default();
        let mut matrix = FakeMatrix::default();
        assert!(scanner.scan(&mut matrix).is_empty());
        assert_eq!(ROW_COUNT, matrix.selections);
        assert!(matrix.selected_row.is_none());
    }

    #[test]
    fn scan_should_emit_pressed_once_then_released_once() {
        let mut scanner = MatrixScanner::default();
        let mut matrix = FakeMatrix::default();
        matrix.set(3, 0, true);
        assert_eq!(&[edge(3, 0, Edge::Pressed)], scanner.scan(&mut matrix).as_slice());
        assert!(scanner.is_pressed(KeyCoordinate::new(3, 0)));

        // held key produces nothing further
        assert!(scanner.scan(&mut matrix).is_empty());

        matrix.set(3, 0, false);
        assert_eq!(&[edge(3, 0, Edge::Released)], scanner.scan(&mut matrix).as_slice());
        assert!(!scanner.is_pressed(KeyCoordinate::new(3, 0)));
    }

    #[test]
    fn simultaneous_edges_are_ordered_row_major_columns_ascending() {
        let mut scanner = MatrixScanner::default();
        let mut matrix = FakeMatrix::default();
        matrix.set(5, 6, true);
        matrix.set(0, 4, true);
        matrix.set(2, 1, true);
        matrix.set(0, 1, true);
        assert_eq!(
            &[
                edge(0, 1, Edge::Pressed),
                edge(0, 4, Edge::Pressed),
                edge(2, 1, Edge::Pressed),
                edge(5, 6, Edge::Pressed),
            ],
            scanner.scan(&mut matrix).as_slice()
        );

        matrix.set(0, 4, false);
        matrix.set(1, 1, true);
        assert_eq!(
            &[edge(0, 4, Edge::Released), edge(1, 1, Edge::Pressed)],
            scanner.scan(&mut matrix).as_slice()
        );
    }

    #[test]
    fn every_key_changing_at_once_fits_in_one_scan() {
        let mut scanner = MatrixScanner::default();
        let mut matrix = FakeMatrix::default();
        matrix.closed = [[true; COLUMN_COUNT]; ROW_COUNT];
        let edges = scanner.scan(&mut matrix);
        assert_eq!(KEY_COUNT, edges.len());
        assert!(edges.iter().all(|e| e.edge == Edge::Pressed));
    }

    #[test]
    fn is_pressed_outside_the_grid_is_false() {
        let scanner = MatrixScanner::default();
        assert!(!scanner.is_pressed(KeyCoordinate::new(9, 9)));
    }
}
