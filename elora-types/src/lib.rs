//! # Elora Types
//!
//! This crate provides the plain data types shared by the matrix acquisition layer
//! and anything that consumes its output.
//!
//! ## Modules
//!
//! - [`half`] - Board half identity, resolved once at boot
//! - [`matrix`] - Decoded switch matrix snapshot
//! - [`pad`] - Encoder pad set derived from the matrix
//!
//! The transport constants below are a build-time contract with the PCB: the chain
//! length and stage width must match the fitted shift registers.

#![no_std]

pub mod half;
pub mod matrix;
pub mod pad;

pub use half::BoardHalf;
pub use matrix::MatrixSnapshot;
pub use pad::PadSet;

/// Number of chained shift-register stages, one matrix row per stage.
pub const CHAIN_LEN: usize = 5;
/// Bits per shift-register stage, one matrix column per bit.
pub const ROW_BITS: usize = 8;
/// Encoder pad slots, including the two reserved for a companion module.
pub const PAD_SLOTS: usize = 8;
/// Pads wired to the onboard encoders.
pub const PHYSICAL_PADS: usize = 6;

// The encoder pads live in the first two stages.
const _: () = assert!(CHAIN_LEN >= 2);
const _: () = assert!(PHYSICAL_PADS < PAD_SLOTS);
