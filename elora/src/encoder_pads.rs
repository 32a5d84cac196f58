//! Encoder pads
//!
//! The encoders are hooked in to the same shift registers as the switch matrix, so their
//! pads are read from the first two matrix rows:
//!
//! ```text
//! Pin     A   B   C   D   E   F   G   H
//! Left:
//!       { __, __, __, __, __, __, A1, B1 },
//!       { A3, B3, A2, B2, __, __, __, __ }
//! Right:
//!       { A1, B1, __, __, __, __, __, __ },
//!       { __, __, __, __, A2, B2, A3, B3 }
//! ```
//!
//! The halves are mirror images, so each has its own table.

use elora_types::{BoardHalf, MatrixSnapshot, PHYSICAL_PADS, PadSet};

/// Matrix cell wired to an encoder pad
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PadCell {
    pub row: u8,
    pub col: u8,
}

const fn cell(row: u8, col: u8) -> PadCell {
    PadCell { row, col }
}

const LEFT_PADS: [PadCell; PHYSICAL_PADS] = [cell(0, 6), cell(0, 7), cell(1, 2), cell(1, 3), cell(1, 0), cell(1, 1)];

const RIGHT_PADS: [PadCell; PHYSICAL_PADS] = [cell(0, 0), cell(0, 1), cell(1, 4), cell(1, 5), cell(1, 6), cell(1, 7)];

/// Pad table of one board half, resolved once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PadMap {
    Left(&'static [PadCell; PHYSICAL_PADS]),
    Right(&'static [PadCell; PHYSICAL_PADS]),
}

impl PadMap {
    pub const fn for_half(half: BoardHalf) -> Self {
        match half {
            BoardHalf::Left => PadMap::Left(&LEFT_PADS),
            BoardHalf::Right => PadMap::Right(&RIGHT_PADS),
        }
    }

    pub const fn half(&self) -> BoardHalf {
        match self {
            PadMap::Left(_) => BoardHalf::Left,
            PadMap::Right(_) => BoardHalf::Right,
        }
    }

    /// Matrix cell of each physical pad slot.
    pub const fn cells(&self) -> &'static [PadCell; PHYSICAL_PADS] {
        match self {
            PadMap::Left(cells) | PadMap::Right(cells) => cells,
        }
    }

    /// Whether `(row, col)` carries an encoder pad rather than a key.
    pub fn is_pad_cell(&self, row: u8, col: u8) -> bool {
        self.cells().contains(&cell(row, col))
    }

    /// Project the matrix onto the pad slots. The companion slots are always cleared.
    pub fn read(&self, matrix: &MatrixSnapshot) -> PadSet {
        let mut pads = PadSet::new();
        for (slot, c) in self.cells().iter().enumerate() {
            pads.set(slot, matrix.is_on(c.row as usize, c.col as usize));
        }
        pads
    }
}
