use elora_types::PadSet;
use elora_types::matrix::CellChange;
use postcard::experimental::max_size::MaxSize;
use serde::{Deserialize, Serialize};

/// Raw, undebounced change of one key switch.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, MaxSize, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyEvent {
    pub row: u8,
    pub col: u8,
    pub pressed: bool,
}

impl From<CellChange> for KeyEvent {
    fn from(change: CellChange) -> Self {
        Self {
            row: change.row,
            col: change.col,
            pressed: change.pressed,
        }
    }
}

/// Event produced by the matrix scanner
#[derive(Serialize, Deserialize, Clone, Copy, Debug, MaxSize, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// A key switch changed
    Key(KeyEvent),
    /// The encoder pad set changed, carries the new pad set
    Pads(PadSet),
}
