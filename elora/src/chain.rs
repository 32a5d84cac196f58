//! Shift-register chain decoding
//!
//! The switches use pull-ups and short the line to ground when pressed, so the chain is
//! active-low on the wire. The matrix uses 1 for a pressed switch.

use elora_types::{CHAIN_LEN, MatrixSnapshot};

/// Decode one raw chain sample into `snapshot`, returning whether any row changed.
///
/// Every row is overwritten, changed or not.
pub fn decode_chain(raw: &[u8; CHAIN_LEN], snapshot: &mut MatrixSnapshot) -> bool {
    let mut changed = false;
    for (row, byte) in snapshot.rows_mut().iter_mut().zip(raw.iter()) {
        let word = !byte;
        changed |= (*row ^ word) != 0;
        *row = word;
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_inverts_every_byte() {
        for b in 0..=u8::MAX {
            let mut snapshot = MatrixSnapshot::new();
            decode_chain(&[b; CHAIN_LEN], &mut snapshot);
            assert_eq!(snapshot.rows(), &[!b; CHAIN_LEN]);
        }
    }

    #[test]
    fn idle_bus_decodes_to_empty_matrix() {
        let mut snapshot = MatrixSnapshot::from_rows([0x12; CHAIN_LEN]);
        assert!(decode_chain(&[0xff; CHAIN_LEN], &mut snapshot));
        assert!(snapshot.is_empty());
    }

    #[test]
    fn identical_samples_report_no_change() {
        let raw = [0xfe, 0xff, 0x3f, 0xff, 0x7f];
        let mut snapshot = MatrixSnapshot::new();
        assert!(decode_chain(&raw, &mut snapshot));
        assert!(!decode_chain(&raw, &mut snapshot));
    }

    #[test]
    fn single_bit_flip_reports_change() {
        let mut snapshot = MatrixSnapshot::new();
        let mut raw = [0xff; CHAIN_LEN];
        decode_chain(&raw, &mut snapshot);

        for stage in 0..CHAIN_LEN {
            for bit in 0..8 {
                raw[stage] ^= 1 << bit;
                assert!(decode_chain(&raw, &mut snapshot), "stage {stage} bit {bit}");
                assert!(snapshot.is_on(stage, bit));
                raw[stage] ^= 1 << bit;
                assert!(decode_chain(&raw, &mut snapshot));
                assert!(snapshot.is_empty());
            }
        }
    }
}
