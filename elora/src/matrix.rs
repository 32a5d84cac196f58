use elora_types::{CHAIN_LEN, MatrixSnapshot, PadSet, ROW_BITS};
use embassy_time::Ticker;
use heapless::Deque;

use crate::acquisition::Acquisition;
use crate::companion::CompanionModule;
use crate::event::{Event, KeyEvent};
use crate::input_device::InputDevice;
use crate::link::ChainSpi;

/// Events buffered between two scan ticks: every cell of the chain plus one pad update
pub const MATRIX_EVENT_QUEUE_SIZE: usize = CHAIN_LEN * ROW_BITS + 1;

/// MatrixTrait is the trait for keyboard matrix.
pub trait MatrixTrait: InputDevice {
    // Matrix size
    const ROW: usize;
    const COL: usize;
}

/// Matrix read from the shift-register chain.
///
/// Drives the [`Acquisition`] once per scan tick and turns every change into raw events:
/// a [`Event::Key`] per changed key cell and a [`Event::Pads`] whenever the pad set
/// differs from the last one reported. Nothing is debounced here.
pub struct ShiftRegisterMatrix<SPI: ChainSpi, C: CompanionModule> {
    acquisition: Acquisition<SPI, C>,
    /// Created on the first read, so constructing the matrix doesn't touch the timer
    ticker: Option<Ticker>,
    /// Matrix as of the last emitted events
    reported: MatrixSnapshot,
    reported_pads: PadSet,
    pending: Deque<Event, MATRIX_EVENT_QUEUE_SIZE>,
}

impl<SPI: ChainSpi, C: CompanionModule> ShiftRegisterMatrix<SPI, C> {
    pub fn new(acquisition: Acquisition<SPI, C>) -> Self {
        Self {
            acquisition,
            ticker: None,
            reported: MatrixSnapshot::new(),
            reported_pads: PadSet::new(),
            pending: Deque::new(),
        }
    }

    /// Seed the encoder pads before the first tick, so the initial pad
    /// position isn't reported as a change.
    pub async fn init_pads(&mut self) -> PadSet {
        let pads = self.acquisition.init_pads().await;
        self.reported_pads = pads;
        pads
    }

    /// Run one scan tick and queue the resulting events.
    ///
    /// Returns the tick's change flag. Events are queued whatever the flag says, so pads
    /// driven only by the companion are reported too. A change that doesn't fit in the
    /// queue stays unreported and is queued again on a later tick.
    pub async fn tick(&mut self) -> bool {
        let changed = self.acquisition.scan().await;

        let current = *self.acquisition.snapshot();
        let pad_map = *self.acquisition.pad_map();
        let mut reported = self.reported;
        for change in current.changes_from(&self.reported) {
            if !pad_map.is_pad_cell(change.row, change.col)
                && self.pending.push_back(Event::Key(KeyEvent::from(change))).is_err()
            {
                warn!("Matrix event queue full, deferring {:?}", change);
                continue;
            }
            reported.set(change.row as usize, change.col as usize, change.pressed);
        }
        self.reported = reported;

        // No pads before the first decoded sample, to keep one transaction per tick
        if self.acquisition.is_primed() {
            let pads = self.acquisition.read_pads().await;
            if pads != self.reported_pads {
                if self.pending.push_back(Event::Pads(pads)).is_ok() {
                    self.reported_pads = pads;
                } else {
                    warn!("Matrix event queue full, deferring pad update");
                }
            }
        }
        changed
    }

    pub fn acquisition(&mut self) -> &mut Acquisition<SPI, C> {
        &mut self.acquisition
    }

    /// Events queued and not read yet
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl<SPI: ChainSpi, C: CompanionModule> InputDevice for ShiftRegisterMatrix<SPI, C> {
    async fn read_event(&mut self) -> Event {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return event;
            }
            let interval = self.acquisition.config().scan_interval;
            self.ticker.get_or_insert_with(|| Ticker::every(interval)).next().await;
            self.tick().await;
        }
    }
}

impl<SPI: ChainSpi, C: CompanionModule> MatrixTrait for ShiftRegisterMatrix<SPI, C> {
    const ROW: usize = CHAIN_LEN;
    const COL: usize = ROW_BITS;
}
