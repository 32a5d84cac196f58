use postcard::experimental::max_size::MaxSize;
use serde::{Deserialize, Serialize};

use crate::{PAD_SLOTS, PHYSICAL_PADS};

/// Boolean state of every encoder pad slot.
///
/// Slots `0..PHYSICAL_PADS` are the onboard encoders, two consecutive slots per encoder
/// (A then B). The remaining slots belong to a companion module, which is the only thing
/// allowed to set them.
#[derive(Serialize, Deserialize, MaxSize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PadSet {
    pads: [bool; PAD_SLOTS],
}

impl PadSet {
    pub const fn new() -> Self {
        Self { pads: [false; PAD_SLOTS] }
    }

    pub const fn from_pads(pads: [bool; PAD_SLOTS]) -> Self {
        Self { pads }
    }

    pub const fn pads(&self) -> &[bool; PAD_SLOTS] {
        &self.pads
    }

    pub fn get(&self, slot: usize) -> bool {
        self.pads.get(slot).copied().unwrap_or(false)
    }

    pub fn set(&mut self, slot: usize, on: bool) {
        if let Some(pad) = self.pads.get_mut(slot) {
            *pad = on;
        }
    }

    /// The (A, B) pad pair of encoder `index`.
    pub fn pair(&self, index: usize) -> (bool, bool) {
        (self.get(index * 2), self.get(index * 2 + 1))
    }

    /// Clear the companion-owned slots.
    pub fn clear_reserved(&mut self) {
        for pad in self.pads[PHYSICAL_PADS..].iter_mut() {
            *pad = false;
        }
    }
}
