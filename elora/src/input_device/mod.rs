//! Input device module
//!
//! This module defines the `InputDevice` trait. An input device turns hardware state into
//! [`Event`]s; [`crate::channel::forward_events`] pumps them into a channel for consumers.
//!
//! The [`crate::matrix::ShiftRegisterMatrix`] is an input device: it turns every scan tick
//! into raw key and encoder pad events.
use crate::event::Event;

pub mod pad_encoder;

/// The trait for input devices.
///
/// # Example
/// ```rust
/// struct MyInputDevice;
///
/// impl InputDevice for MyInputDevice {
///     async fn read_event(&mut self) -> Event {
///         // Input device implementation
///     }
/// }
/// ```
pub trait InputDevice {
    /// Read the raw input event
    async fn read_event(&mut self) -> Event;
}
