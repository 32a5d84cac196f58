//! Encoder direction from pad pairs
//!
//! The encoders aren't read from their own pins but from pad pairs in the matrix, so this
//! tracks the quadrature state of each pair across [`PadSet`] updates. The phase handling is
//! adapted from: <https://github.com/leshow/rotary-encoder-hal/blob/master/src/lib.rs>
use elora_types::{PAD_SLOTS, PadSet};
use postcard::experimental::max_size::MaxSize;
use serde::{Deserialize, Serialize};

/// Encoders in a pad set, two pads each
pub const ENCODER_COUNT: usize = PAD_SLOTS / 2;

/// The encoder direction is either `Clockwise`, `CounterClockwise`, or `None`
#[derive(Serialize, Deserialize, Clone, Copy, Debug, MaxSize, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// A clockwise turn
    Clockwise,
    /// A counterclockwise turn
    CounterClockwise,
    /// No change
    None,
}

/// Allows customizing which Quadrature Phases should be considered movements
/// and in which direction or ignored.
pub trait Phase {
    /// Given the current state `s`, return the direction.
    fn direction(&mut self, s: u8) -> Direction;
}

/// Default implementation of `Phase`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultPhase;

/// The useful values of `s` are:
/// - 0b0001 | 0b0111 | 0b1000 | 0b1110
/// - 0b0010 | 0b0100 | 0b1011 | 0b1101
impl Phase for DefaultPhase {
    fn direction(&mut self, s: u8) -> Direction {
        match s {
            0b0001 | 0b0111 | 0b1000 | 0b1110 => Direction::Clockwise,
            0b0010 | 0b0100 | 0b1011 | 0b1101 => Direction::CounterClockwise,
            _ => Direction::None,
        }
    }
}

/// Phase implementation for E8H7 encoder
#[derive(Clone, Copy, Debug, Default)]
pub struct E8H7Phase;

impl Phase for E8H7Phase {
    fn direction(&mut self, s: u8) -> Direction {
        match s {
            0b0010 | 0b1101 => Direction::Clockwise,
            0b0001 | 0b1110 => Direction::CounterClockwise,
            _ => Direction::None,
        }
    }
}

/// Phase implementation based on configurable resolution
#[derive(Clone, Copy, Debug)]
pub struct ResolutionPhase {
    resolution: u8,
    lut: [i8; 16],
    pulses: i8,
}

impl ResolutionPhase {
    pub fn new(resolution: u8, reverse: bool) -> Self {
        // Each entry corresponds to a state transition and provides +1, -1, or 0 pulse
        let mut lut = [0, -1, 1, 0, 1, 0, 0, -1, -1, 0, 0, 1, 0, 1, -1, 0];
        if reverse {
            lut = lut.map(|x| -x);
        }
        Self {
            resolution: resolution.max(1),
            lut,
            pulses: 0,
        }
    }
}

impl Phase for ResolutionPhase {
    fn direction(&mut self, s: u8) -> Direction {
        // Only proceed if there was a state change
        if (s & 0xC) >> 2 != (s & 0x3) {
            self.pulses += self.lut[s as usize & 0xF];
            if self.pulses >= self.resolution as i8 {
                self.pulses %= self.resolution as i8;
                return Direction::CounterClockwise;
            } else if self.pulses <= -(self.resolution as i8) {
                self.pulses %= self.resolution as i8;
                return Direction::Clockwise;
            }
        }

        Direction::None
    }
}

/// Quadrature state of one pad pair
#[derive(Clone, Copy, Debug)]
pub struct PadEncoder<P> {
    state: u8,
    phase: P,
}

impl<P: Phase> PadEncoder<P> {
    pub fn new(phase: P) -> Self {
        Self { state: 0, phase }
    }

    /// Take the pad levels as the starting position without reporting a turn.
    pub fn seed(&mut self, a: bool, b: bool) {
        self.state = (a as u8) | ((b as u8) << 1);
    }

    /// Evaluate the next state of the encoder from its asserted pads.
    pub fn update(&mut self, a: bool, b: bool) -> Direction {
        // use mask to get previous state value
        let mut s = self.state & 0b11;
        // move in the new state
        if a {
            s |= 0b0100;
        }
        if b {
            s |= 0b1000;
        }
        self.state = s >> 2;
        self.phase.direction(s)
    }
}

/// One [`PadEncoder`] per encoder in a pad set, including the companion's.
pub struct PadEncoders<P> {
    encoders: [PadEncoder<P>; ENCODER_COUNT],
}

impl PadEncoders<DefaultPhase> {
    pub fn with_default_phase() -> Self {
        Self::new([DefaultPhase; ENCODER_COUNT])
    }
}

impl PadEncoders<ResolutionPhase> {
    /// Encoders reporting one turn every `resolution` quadrature steps.
    pub fn with_resolution(resolution: u8, reverse: bool) -> Self {
        Self::new([ResolutionPhase::new(resolution, reverse); ENCODER_COUNT])
    }
}

impl<P: Phase> PadEncoders<P> {
    pub fn new(phases: [P; ENCODER_COUNT]) -> Self {
        Self {
            encoders: phases.map(PadEncoder::new),
        }
    }

    /// Seed every encoder, typically from `Acquisition::init_pads`.
    pub fn seed(&mut self, pads: &PadSet) {
        for (index, encoder) in self.encoders.iter_mut().enumerate() {
            let (a, b) = pads.pair(index);
            encoder.seed(a, b);
        }
    }

    /// Direction of every encoder for a new pad set.
    pub fn update(&mut self, pads: &PadSet) -> [Direction; ENCODER_COUNT] {
        let mut directions = [Direction::None; ENCODER_COUNT];
        for (index, (encoder, direction)) in self.encoders.iter_mut().zip(directions.iter_mut()).enumerate() {
            let (a, b) = pads.pair(index);
            *direction = encoder.update(a, b);
        }
        directions
    }
}
