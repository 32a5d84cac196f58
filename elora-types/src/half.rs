use postcard::experimental::max_size::MaxSize;
use serde::{Deserialize, Serialize};
use strum::FromRepr;

/// Which physical half of the split keyboard this firmware runs on.
///
/// The halves are wired as mirror images, so everything that maps matrix bits to
/// physical features is selected by this value. It's resolved once at boot and
/// never changes afterwards.
#[repr(u8)]
#[derive(Serialize, Deserialize, MaxSize, FromRepr, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BoardHalf {
    Left = 0,
    Right = 1,
}

impl BoardHalf {
    /// Resolve the half from a level read at boot, e.g. a handedness strap.
    pub const fn from_is_left(is_left: bool) -> Self {
        if is_left { BoardHalf::Left } else { BoardHalf::Right }
    }

    pub const fn is_left(self) -> bool {
        matches!(self, BoardHalf::Left)
    }

    /// The other half.
    pub const fn opposite(self) -> Self {
        match self {
            BoardHalf::Left => BoardHalf::Right,
            BoardHalf::Right => BoardHalf::Left,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_repr_matches_discriminant() {
        assert_eq!(BoardHalf::from_repr(0), Some(BoardHalf::Left));
        assert_eq!(BoardHalf::from_repr(1), Some(BoardHalf::Right));
        assert_eq!(BoardHalf::from_repr(2), None);
    }

    #[test]
    fn opposite_is_involution() {
        for half in [BoardHalf::Left, BoardHalf::Right] {
            assert_ne!(half, half.opposite());
            assert_eq!(half, half.opposite().opposite());
        }
        assert!(BoardHalf::from_is_left(true).is_left());
        assert!(!BoardHalf::from_is_left(false).is_left());
    }
}
