//! Early boot
//!
//! The board supports plug-in controller modules which take over all functionality from the
//! onboard MCU, e.g. to make the keyboard wireless. When one is fitted the acquisition layer
//! must never start: the sense line has an external pull-up and is shorted to ground by the
//! module, and on a low level the MCU parks itself in a low-power wait for good.

use embedded_hal::digital::InputPin;

/// What to do after sampling the companion sense line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootDecision {
    /// No controller module, start normally
    Run,
    /// A controller module owns the board
    Standby,
}

/// One low-power wait, returning when the core is woken.
pub trait Dormant {
    fn dormant(&mut self);
}

/// Sleep until the next interrupt.
#[derive(Clone, Copy, Debug, Default)]
pub struct WaitForInterrupt;

impl Dormant for WaitForInterrupt {
    fn dormant(&mut self) {
        #[cfg(all(target_arch = "arm", target_os = "none"))]
        cortex_m::asm::wfi();
        #[cfg(not(all(target_arch = "arm", target_os = "none")))]
        core::hint::spin_loop();
    }
}

/// The boot gate, sampled once before any bus activity.
pub struct BootGate<P: InputPin> {
    sense: P,
}

impl<P: InputPin> BootGate<P> {
    pub fn new(sense: P) -> Self {
        Self { sense }
    }

    /// Sample the sense line. A read error counts as no module fitted.
    pub fn decide(&mut self) -> BootDecision {
        match self.sense.is_low() {
            Ok(true) => BootDecision::Standby,
            Ok(false) => BootDecision::Run,
            Err(_) => {
                warn!("Failed to read the controller module sense line, assuming none");
                BootDecision::Run
            }
        }
    }

    /// Cede the board to the controller module for good.
    pub fn hand_over<D: Dormant>(self, dormant: &mut D) -> ! {
        info!("Controller module present, entering standby");
        loop {
            dormant.dormant();
        }
    }

    /// Run `init` if no controller module is fitted, otherwise never return.
    pub fn start<D: Dormant, T>(mut self, dormant: &mut D, init: impl FnOnce() -> T) -> T {
        match self.decide() {
            BootDecision::Run => init(),
            BootDecision::Standby => self.hand_over(dormant),
        }
    }

    /// Consumes the gate, returning the sense pin.
    pub fn into_inner(self) -> P {
        self.sense
    }
}
