use core::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use elora::types::CHAIN_LEN;
use embedded_hal::spi::{ErrorKind, ErrorType, Operation};
use embedded_hal_async::spi::SpiDevice;

// Init logger for tests
#[ctor::ctor]
pub fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

/// Raw chain sample of an idle board: every line pulled up
pub const IDLE: [u8; CHAIN_LEN] = [0xff; CHAIN_LEN];

/// Raw chain sample with the given active-high cells asserted
pub fn raw_with(cells: &[(usize, usize)]) -> [u8; CHAIN_LEN] {
    let mut raw = IDLE;
    for &(row, col) in cells {
        raw[row] &= !(1 << col);
    }
    raw
}

/// Fake shift-register chain, playing back queued samples.
///
/// `None` is a failed transaction, and so is an empty queue.
#[derive(Clone, Default)]
pub struct TestChain {
    samples: Rc<RefCell<VecDeque<Option<[u8; CHAIN_LEN]>>>>,
    transactions: Rc<Cell<usize>>,
}

impl TestChain {
    pub fn push(&self, sample: [u8; CHAIN_LEN]) {
        self.samples.borrow_mut().push_back(Some(sample));
    }

    pub fn push_failure(&self) {
        self.samples.borrow_mut().push_back(None);
    }

    pub fn transactions(&self) -> usize {
        self.transactions.get()
    }
}

impl ErrorType for TestChain {
    type Error = ErrorKind;
}

impl SpiDevice for TestChain {
    async fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        self.transactions.set(self.transactions.get() + 1);
        let sample = self
            .samples
            .borrow_mut()
            .pop_front()
            .flatten()
            .ok_or(ErrorKind::Other)?;
        for op in operations.iter_mut() {
            if let Operation::Read(buf) = op {
                buf.copy_from_slice(&sample[..buf.len()]);
            }
        }
        Ok(())
    }
}
