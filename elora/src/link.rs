//! Serial link to the shift-register chain
//!
//! The matrix is hooked up to a chain of 74xx165 shift registers. The chip select line goes
//! through a NOT gate whose output drives both the latch pin of the registers and the enable
//! pin of a tri-state buffer between the chain and MISO. Asserting select therefore re-latches
//! every parallel input, so each transaction yields a fresh, self-consistent sample.
//!
//! The bus is shared with the companion module connector, which has its own select line.
//! Every logical user gets its own [`SharedSpiDevice`] over one [`SharedSpiBus`]; the
//! mutex is held only for the duration of a single transaction.

use elora_types::CHAIN_LEN;
use embassy_embedded_hal::SetConfig;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Timer, with_timeout};
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{Error, ErrorKind, ErrorType, MODE_0, Mode, Operation};
use embedded_hal_async::spi::{SpiBus, SpiDevice};

use crate::RawMutex;

/// Fastest clock divisor supported by the bus, giving `Fclk / 2`.
pub const MIN_DIVISOR: u16 = 2;
/// Slowest clock divisor supported by the bus.
pub const MAX_DIVISOR: u16 = 128;

/// Bit order on the wire
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    MsbFirst,
    LsbFirst,
}

/// Bus parameters of one device on the shared bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// Clock polarity and phase
    pub mode: Mode,
    pub bit_order: BitOrder,
    /// Peripheral clock divisor, clamped to `MIN_DIVISOR..=MAX_DIVISOR`
    pub divisor: u16,
    /// Upper bound on waiting for the shared bus. A started transaction always runs to the end.
    pub timeout: Duration,
}

impl LinkConfig {
    /// Matrix chain parameters.
    ///
    /// 1. Mode 0: the registers shift on the rising clock edge and the clock idles low.
    /// 2. MSB first: each register outputs H first, and H as MSB results in a neat A-H
    ///    column order.
    /// 3. Divisor 2, the fastest possible.
    pub const MATRIX: Self = Self {
        mode: MODE_0,
        bit_order: BitOrder::MsbFirst,
        divisor: MIN_DIVISOR,
        timeout: Duration::from_millis(2),
    };

    pub const fn with_divisor(self, divisor: u16) -> Self {
        Self { divisor, ..self }
    }

    pub const fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    /// The divisor actually used on the bus.
    pub fn effective_divisor(&self) -> u16 {
        self.divisor.clamp(MIN_DIVISOR, MAX_DIVISOR)
    }

    /// Bus clock for the given peripheral clock.
    pub fn frequency(&self, peripheral_clock_hz: u32) -> u32 {
        peripheral_clock_hz / self.effective_divisor() as u32
    }

    /// Convert into the RP2040 SPI peripheral config.
    ///
    /// The RP2040 SPI block always shifts MSB first.
    #[cfg(feature = "rp2040")]
    pub fn to_rp_config(&self) -> embassy_rp::spi::Config {
        use embedded_hal::spi::{Phase, Polarity};

        if self.bit_order == BitOrder::LsbFirst {
            warn!("RP2040 SPI can't shift LSB first, using MSB first");
        }
        let mut config = embassy_rp::spi::Config::default();
        config.frequency = self.frequency(embassy_rp::clocks::clk_peri_freq());
        config.polarity = match self.mode.polarity {
            Polarity::IdleLow => embassy_rp::spi::Polarity::IdleLow,
            Polarity::IdleHigh => embassy_rp::spi::Polarity::IdleHigh,
        };
        config.phase = match self.mode.phase {
            Phase::CaptureOnFirstTransition => embassy_rp::spi::Phase::CaptureOnFirstTransition,
            Phase::CaptureOnSecondTransition => embassy_rp::spi::Phase::CaptureOnSecondTransition,
        };
        config
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::MATRIX
    }
}

/// Peripheral bus configs which can be derived from a [`LinkConfig`]
pub trait FromLinkConfig {
    fn from_link_config(config: &LinkConfig) -> Self;
}

#[cfg(feature = "rp2040")]
impl FromLinkConfig for embassy_rp::spi::Config {
    fn from_link_config(config: &LinkConfig) -> Self {
        config.to_rp_config()
    }
}

/// Link error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// The shared bus wasn't released within `LinkConfig::timeout`
    Timeout,
    /// The SPI device reported an error
    Bus(ErrorKind),
}

impl From<ErrorKind> for LinkError {
    fn from(kind: ErrorKind) -> Self {
        LinkError::Bus(kind)
    }
}

impl<BUS: Error, CS: core::fmt::Debug> From<SharedSpiError<BUS, CS>> for LinkError {
    fn from(error: SharedSpiError<BUS, CS>) -> Self {
        match error {
            SharedSpiError::Timeout => LinkError::Timeout,
            other => LinkError::Bus(other.kind()),
        }
    }
}

/// A physical SPI bus shared between several chip selects.
pub type SharedSpiBus<BUS> = Mutex<RawMutex, BUS>;

/// Error of a [`SharedSpiDevice`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharedSpiError<BUS, CS> {
    /// Another device held the bus for too long, nothing was sent
    Timeout,
    /// Applying the bus config failed
    Config,
    Spi(BUS),
    Cs(CS),
}

impl<BUS: Error, CS: core::fmt::Debug> Error for SharedSpiError<BUS, CS> {
    fn kind(&self) -> ErrorKind {
        match self {
            SharedSpiError::Spi(e) => e.kind(),
            _ => ErrorKind::Other,
        }
    }
}

/// One chip select on a [`SharedSpiBus`], applying its own bus config for each transaction.
///
/// Only the wait for the bus is bounded. Once select is asserted the transaction runs to the
/// end and select is always released before the bus is handed on.
pub struct SharedSpiDevice<'a, BUS: SetConfig, CS> {
    bus: &'a SharedSpiBus<BUS>,
    cs: CS,
    config: BUS::Config,
    lock_timeout: Duration,
}

impl<'a, BUS: SetConfig, CS: OutputPin> SharedSpiDevice<'a, BUS, CS>
where
    BUS::Config: FromLinkConfig,
{
    pub fn new(bus: &'a SharedSpiBus<BUS>, cs: CS, config: &LinkConfig) -> Self {
        debug!(
            "Shared SPI device: {:?}, divisor {}",
            config.bit_order,
            config.effective_divisor()
        );
        Self {
            bus,
            cs,
            config: BUS::Config::from_link_config(config),
            lock_timeout: config.timeout,
        }
    }
}

impl<BUS, CS> ErrorType for SharedSpiDevice<'_, BUS, CS>
where
    BUS: ErrorType + SetConfig,
    CS: OutputPin,
{
    type Error = SharedSpiError<BUS::Error, CS::Error>;
}

impl<BUS, CS> SpiDevice for SharedSpiDevice<'_, BUS, CS>
where
    BUS: SpiBus + SetConfig,
    CS: OutputPin,
{
    async fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        let mut bus = with_timeout(self.lock_timeout, self.bus.lock())
            .await
            .map_err(|_| SharedSpiError::Timeout)?;
        bus.set_config(&self.config).map_err(|_| SharedSpiError::Config)?;
        self.cs.set_low().map_err(SharedSpiError::Cs)?;

        let mut op_res = Ok(());
        for op in operations.iter_mut() {
            let res = match op {
                Operation::Read(buf) => bus.read(buf).await,
                Operation::Write(buf) => bus.write(buf).await,
                Operation::Transfer(read, write) => bus.transfer(read, write).await,
                Operation::TransferInPlace(buf) => bus.transfer_in_place(buf).await,
                Operation::DelayNs(ns) => {
                    Timer::after_nanos(u64::from(*ns)).await;
                    Ok(())
                }
            };
            if res.is_err() {
                op_res = res;
                break;
            }
        }

        // Finish and deselect even if an operation failed
        let flush_res = bus.flush().await;
        let cs_res = self.cs.set_high();

        op_res.map_err(SharedSpiError::Spi)?;
        flush_res.map_err(SharedSpiError::Spi)?;
        cs_res.map_err(SharedSpiError::Cs)?;
        Ok(())
    }
}

/// An SPI device whose errors can be reported as [`LinkError`]
pub trait ChainSpi: SpiDevice {
    fn link_error(error: Self::Error) -> LinkError;
}

impl<T> ChainSpi for T
where
    T: SpiDevice,
    T::Error: Into<LinkError>,
{
    fn link_error(error: Self::Error) -> LinkError {
        error.into()
    }
}

/// The shift-register chain on an SPI device.
///
/// The device owns the select line: one [`ShiftRegisterLink::receive`] is one
/// select/receive/deselect bracket, never held across calls and never cancelled halfway.
pub struct ShiftRegisterLink<SPI> {
    spi: SPI,
}

impl<SPI: ChainSpi> ShiftRegisterLink<SPI> {
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Read one raw byte per stage, stage 0 first.
    ///
    /// On error the contents of `buf` are undefined.
    pub async fn receive(&mut self, buf: &mut [u8; CHAIN_LEN]) -> Result<(), LinkError> {
        self.spi.read(buf).await.map_err(SPI::link_error)
    }

    /// Returns a reference to the underlying SPI device.
    pub fn device(&mut self) -> &mut SPI {
        &mut self.spi
    }

    /// Consumes this link, returning the underlying SPI device.
    pub fn into_inner(self) -> SPI {
        self.spi
    }
}
