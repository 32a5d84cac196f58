mod common;
pub(crate) use crate::common::*;

mod acquisition_test {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use elora::acquisition::Acquisition;
    use elora::boot::{BootDecision, BootGate, Dormant};
    use elora::config::AcquisitionConfig;
    use elora::types::{CHAIN_LEN, PAD_SLOTS};
    use elora::{BoardHalf, MatrixSnapshot};
    use embassy_futures::block_on;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};

    use super::*;

    struct PanicDormant;

    impl Dormant for PanicDormant {
        fn dormant(&mut self) {
            panic!("dormant");
        }
    }

    #[test]
    fn raw_bytes_decode_inverted() {
        let chain = TestChain::default();
        let mut acq = Acquisition::new(chain.clone(), BoardHalf::Left, AcquisitionConfig::default());

        chain.push([0x00, 0x01, 0x80, 0xf0, 0xff]);
        assert!(block_on(acq.scan()));
        assert_eq!(acq.snapshot().rows(), &[0xff, 0xfe, 0x7f, 0x0f, 0x00]);
    }

    #[test]
    fn change_flag_tracks_consecutive_samples() {
        let chain = TestChain::default();
        let mut acq = Acquisition::new(chain.clone(), BoardHalf::Right, AcquisitionConfig::default());

        let a = raw_with(&[(2, 3), (4, 7)]);
        let b = raw_with(&[(2, 3)]);
        for (sample, expected) in [(a, true), (a, false), (b, true), (b, false), (IDLE, true), (IDLE, false)] {
            chain.push(sample);
            assert_eq!(block_on(acq.scan()), expected);
        }
    }

    #[test]
    fn bus_failure_between_samples_keeps_state() {
        let chain = TestChain::default();
        let mut acq = Acquisition::new(chain.clone(), BoardHalf::Left, AcquisitionConfig::default());

        chain.push(raw_with(&[(3, 1)]));
        block_on(acq.scan());
        let before: MatrixSnapshot = *acq.snapshot();

        for _ in 0..5 {
            chain.push_failure();
            assert!(!block_on(acq.scan()));
            assert_eq!(*acq.snapshot(), before);
        }
        assert_eq!(acq.consecutive_failures(), 5);

        // Stale but consistent: the same sample after recovery is not a change
        chain.push(raw_with(&[(3, 1)]));
        assert!(!block_on(acq.scan()));
        assert_eq!(acq.consecutive_failures(), 0);
    }

    #[test]
    fn sustained_failures_keep_scanning() {
        let chain = TestChain::default();
        let config = AcquisitionConfig {
            failure_warn_threshold: 3,
            ..Default::default()
        };
        let mut acq = Acquisition::new(chain.clone(), BoardHalf::Left, config);

        // Empty queue: every transaction fails
        for _ in 0..10 {
            assert!(!block_on(acq.scan()));
        }
        assert_eq!(chain.transactions(), 10);
        assert_eq!(acq.total_failures(), 10);
    }

    #[test]
    fn documented_pad_tables() {
        let cells = [(0, 6), (0, 7), (1, 0), (1, 1), (1, 2), (1, 3)];

        let chain = TestChain::default();
        let mut left = Acquisition::new(chain.clone(), BoardHalf::Left, AcquisitionConfig::default());
        chain.push(raw_with(&cells));
        block_on(left.scan());
        let pads = block_on(left.read_pads());
        assert!(pads.get(0), "left bit(0,6) -> pad0");
        assert!(pads.get(1), "left bit(0,7) -> pad1");

        let chain = TestChain::default();
        let mut right = Acquisition::new(chain.clone(), BoardHalf::Right, AcquisitionConfig::default());
        chain.push(raw_with(&[(0, 0), (0, 1)]));
        block_on(right.scan());
        let pads = block_on(right.read_pads());
        assert!(pads.get(0), "right bit(0,0) -> pad0");
        assert!(pads.get(1), "right bit(0,1) -> pad1");
        assert_eq!(pads.pads()[2..], [false; PAD_SLOTS - 2]);
    }

    #[test]
    fn reserved_pads_clear_without_companion() {
        for half in [BoardHalf::Left, BoardHalf::Right] {
            let chain = TestChain::default();
            let mut acq = Acquisition::new(chain.clone(), half, AcquisitionConfig::default());
            chain.push([0x00; CHAIN_LEN]);
            block_on(acq.scan());
            let pads = block_on(acq.read_pads());
            assert!(!pads.get(6));
            assert!(!pads.get(7));
        }
    }

    #[test]
    fn boot_gate_with_module_never_touches_bus() {
        let chain = TestChain::default();
        let mut pin = PinMock::new(&[PinTransaction::get(State::Low)]);
        let gate = BootGate::new(pin.clone());

        let result = catch_unwind(AssertUnwindSafe(|| {
            let mut acq = gate.start(&mut PanicDormant, || {
                Acquisition::new(chain.clone(), BoardHalf::Left, AcquisitionConfig::default())
            });
            block_on(acq.scan());
        }));

        assert!(result.is_err());
        assert_eq!(chain.transactions(), 0);
        pin.done();
    }

    #[test]
    fn boot_gate_without_module_starts_acquisition() {
        let chain = TestChain::default();
        let mut pin = PinMock::new(&[PinTransaction::get(State::High)]);
        let mut gate = BootGate::new(pin.clone());
        assert_eq!(gate.decide(), BootDecision::Run);

        let mut acq = Acquisition::new(chain.clone(), BoardHalf::Left, AcquisitionConfig::default());
        chain.push(IDLE);
        block_on(acq.scan());
        assert_eq!(chain.transactions(), 1);
        pin.done();
    }
}
