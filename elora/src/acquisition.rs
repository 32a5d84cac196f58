//! The acquisition cycle
//!
//! Runs once per scan tick: read the chain, decode it into the matrix snapshot, let the
//! companion module augment it, and report whether anything changed. A failed transaction
//! freezes the snapshot for that tick and is retried on the next one.

use elora_types::{BoardHalf, CHAIN_LEN, MatrixSnapshot, PHYSICAL_PADS, PadSet};
use crate::chain::decode_chain;
use crate::companion::{CompanionModule, NoCompanion};
use crate::config::AcquisitionConfig;
use crate::encoder_pads::PadMap;
use crate::link::{ChainSpi, LinkError, ShiftRegisterLink};

/// Bookkeeping of failed transactions.
///
/// Failures never reinitialize the bus; sustained ones are escalated to a warning once.
#[derive(Clone, Copy, Debug, Default)]
struct FailureTracker {
    consecutive: u16,
    total: u32,
}

impl FailureTracker {
    fn record_failure(&mut self, error: LinkError, warn_threshold: u16) {
        self.consecutive = self.consecutive.saturating_add(1);
        self.total = self.total.saturating_add(1);
        error!("ERROR: reading matrix shift registers failed: {:?}", error);
        if warn_threshold != 0 && self.consecutive == warn_threshold {
            warn!("Matrix bus failed {} times in a row, scanning stale state", self.consecutive);
        }
    }

    fn record_success(&mut self) {
        if self.consecutive != 0 {
            info!("Matrix bus recovered after {} failed reads", self.consecutive);
            self.consecutive = 0;
        }
    }
}

/// Acquisition state of one board half.
pub struct Acquisition<SPI: ChainSpi, C: CompanionModule = NoCompanion> {
    link: ShiftRegisterLink<SPI>,
    companion: C,
    pad_map: PadMap,
    /// Authoritative matrix state, compared against on every tick
    snapshot: MatrixSnapshot,
    /// True once a sample has been decoded into `snapshot`
    primed: bool,
    failures: FailureTracker,
    config: AcquisitionConfig,
}

impl<SPI: ChainSpi> Acquisition<SPI, NoCompanion> {
    /// Acquisition without a companion module.
    pub fn new(spi: SPI, half: BoardHalf, config: AcquisitionConfig) -> Self {
        Self::with_companion(spi, half, NoCompanion, config)
    }
}

impl<SPI: ChainSpi, C: CompanionModule> Acquisition<SPI, C> {
    /// Initialize the acquisition layer.
    ///
    /// The select lines of every device on the bus must already idle high. No transaction is
    /// issued here.
    pub fn with_companion(spi: SPI, half: BoardHalf, companion: C, config: AcquisitionConfig) -> Self {
        info!("Matrix acquisition on the {:?} half", half);
        Self {
            link: ShiftRegisterLink::new(spi),
            companion,
            pad_map: PadMap::for_half(half),
            snapshot: MatrixSnapshot::new(),
            primed: false,
            failures: FailureTracker::default(),
            config,
        }
    }

    /// Run one scan tick, returning whether the matrix changed.
    pub async fn scan(&mut self) -> bool {
        let mut snapshot = self.snapshot;
        let (changed, decoded) = self.scan_into(&mut snapshot).await;
        self.snapshot = snapshot;
        self.primed |= decoded;
        changed
    }

    /// Read the encoder pads from the current matrix.
    ///
    /// Before the first successful tick this falls back to [`Acquisition::init_pads`].
    pub async fn read_pads(&mut self) -> PadSet {
        if !self.primed {
            debug!("Matrix not scanned yet, seeding encoder pads");
            return self.init_pads().await;
        }
        let pads = self.pad_map.read(&self.snapshot);
        self.finish_pads(pads)
    }

    /// Seed the initial encoder pad state.
    ///
    /// Runs its own scan into a scratch matrix, so the tick snapshot and its change
    /// detection are left alone.
    pub async fn init_pads(&mut self) -> PadSet {
        let mut scratch = MatrixSnapshot::new();
        self.scan_into(&mut scratch).await;
        let pads = self.pad_map.read(&scratch);
        self.finish_pads(pads)
    }

    pub fn snapshot(&self) -> &MatrixSnapshot {
        &self.snapshot
    }

    pub fn half(&self) -> BoardHalf {
        self.pad_map.half()
    }

    pub fn pad_map(&self) -> &PadMap {
        &self.pad_map
    }

    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    /// True once at least one chain sample has been decoded.
    pub fn is_primed(&self) -> bool {
        self.primed
    }

    pub fn consecutive_failures(&self) -> u16 {
        self.failures.consecutive
    }

    pub fn total_failures(&self) -> u32 {
        self.failures.total
    }

    pub fn companion(&mut self) -> &mut C {
        &mut self.companion
    }

    /// Returns a reference to the chain link.
    pub fn link(&mut self) -> &mut ShiftRegisterLink<SPI> {
        &mut self.link
    }

    /// Acquire, decode and augment into `target`.
    ///
    /// Returns the combined change flag and whether a sample was decoded.
    async fn scan_into(&mut self, target: &mut MatrixSnapshot) -> (bool, bool) {
        let mut raw = [0u8; CHAIN_LEN];
        let (changed, decoded) = match self.link.receive(&mut raw).await {
            Ok(()) => {
                self.failures.record_success();
                (decode_chain(&raw, target), true)
            }
            Err(e) => {
                self.failures.record_failure(e, self.config.failure_warn_threshold);
                (false, false)
            }
        };

        self.companion.task().await;
        let augmented = self.companion.hook_matrix(target).await;
        if changed || augmented {
            trace!("Matrix changed: {:?}", target.rows());
        }
        (changed || augmented, decoded)
    }

    /// Clear the reserved slots and let the companion fill them.
    fn finish_pads(&mut self, mut pads: PadSet) -> PadSet {
        pads.clear_reserved();
        let physical = pads;
        self.companion.hook_pads(&mut pads);
        // Only the reserved slots belong to the companion
        for slot in 0..PHYSICAL_PADS {
            pads.set(slot, physical.get(slot));
        }
        pads
    }
}
