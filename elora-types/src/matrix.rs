use postcard::experimental::max_size::MaxSize;
use serde::{Deserialize, Serialize};

use crate::{CHAIN_LEN, ROW_BITS};

/// Decoded logical state of the switch matrix.
///
/// One row per shift-register stage, one bit per column. Bit `c` of row `r` set means the
/// switch or pad at `(r, c)` is electrically asserted. Bits are always active-high, whatever
/// the polarity of the wiring that produced them.
#[derive(Serialize, Deserialize, MaxSize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MatrixSnapshot {
    rows: [u8; CHAIN_LEN],
}

/// A single cell whose state differs between two snapshots.
#[derive(Serialize, Deserialize, MaxSize, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CellChange {
    pub row: u8,
    pub col: u8,
    pub pressed: bool,
}

impl MatrixSnapshot {
    /// An all-released snapshot.
    pub const fn new() -> Self {
        Self { rows: [0; CHAIN_LEN] }
    }

    pub const fn from_rows(rows: [u8; CHAIN_LEN]) -> Self {
        Self { rows }
    }

    pub const fn rows(&self) -> &[u8; CHAIN_LEN] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [u8; CHAIN_LEN] {
        &mut self.rows
    }

    /// Row `row` as a bit vector, or `None` past the end of the chain.
    pub fn row(&self, row: usize) -> Option<u8> {
        self.rows.get(row).copied()
    }

    /// Whether the cell at `(row, col)` is asserted. Out-of-range cells read as released.
    pub fn is_on(&self, row: usize, col: usize) -> bool {
        col < ROW_BITS && self.rows.get(row).is_some_and(|bits| bits & (1 << col) != 0)
    }

    /// Set or clear one cell, ignoring out-of-range positions.
    pub fn set(&mut self, row: usize, col: usize, pressed: bool) {
        if col >= ROW_BITS {
            return;
        }
        if let Some(bits) = self.rows.get_mut(row) {
            if pressed {
                *bits |= 1 << col;
            } else {
                *bits &= !(1 << col);
            }
        }
    }

    /// True if no cell is asserted.
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|bits| *bits == 0)
    }

    /// Every cell that differs from `previous`, row-major with ascending columns.
    /// `pressed` is the state in `self`.
    pub fn changes_from<'a>(&'a self, previous: &'a MatrixSnapshot) -> impl Iterator<Item = CellChange> + 'a {
        self.rows
            .iter()
            .zip(previous.rows.iter())
            .enumerate()
            .flat_map(|(row, (&now, &before))| {
                let diff = now ^ before;
                (0..ROW_BITS as u8)
                    .filter(move |col| diff & (1 << col) != 0)
                    .map(move |col| CellChange {
                        row: row as u8,
                        col,
                        pressed: now & (1 << col) != 0,
                    })
            })
    }
}
