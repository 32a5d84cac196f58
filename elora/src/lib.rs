//! # Elora matrix acquisition
//!
//! Reads the physical input state of one half of the Elora split keyboard on every scan
//! tick: a chain of shift registers is read over SPI, decoded into a [`MatrixSnapshot`],
//! compared against the previous tick, and projected onto the encoder pads with the wiring
//! table of the current [`BoardHalf`].
//!
//! Start with [`boot::BootGate`], then build an [`acquisition::Acquisition`] and either
//! call [`acquisition::Acquisition::scan`] from your own scan loop or wrap it in a
//! [`matrix::ShiftRegisterMatrix`] to get a stream of raw events.
//!
//! ## Feature flags
#![doc = document_features::document_features!()]
#![cfg_attr(not(test), no_std)]
#![allow(async_fn_in_trait)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod acquisition;
pub mod boot;
pub mod chain;
pub mod channel;
pub mod companion;
pub mod config;
pub mod encoder_pads;
pub mod event;
pub mod input_device;
pub mod link;
pub mod matrix;

pub use elora_types::{self as types, BoardHalf, MatrixSnapshot, PadSet};
pub use embassy_futures;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

pub type RawMutex = CriticalSectionRawMutex;

/// Capacity of [`channel::EVENT_CHANNEL`]
pub const EVENT_CHANNEL_SIZE: usize = 16;
