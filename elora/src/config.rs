use embassy_time::Duration;

/// Tunable configuration of the acquisition layer.
///
/// The chain geometry is not here: it's fixed by the PCB, see the constants in `elora_types`.
/// Bus parameters belong to the SPI device, see [`crate::link::SharedSpiDevice::new`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AcquisitionConfig {
    /// Period of the scan tick
    pub scan_interval: Duration,
    /// Consecutive failed transactions after which a warning is logged.
    /// Zero disables the warning.
    pub failure_warn_threshold: u16,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            scan_interval: Duration::from_millis(1),
            failure_warn_threshold: 100,
        }
    }
}
