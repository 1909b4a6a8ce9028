//! Canonical orderings for scripts, transaction inputs and transaction outputs.
//!
//! All of these are total orders so that sorting never leaves the final arrangement up to the
//! order in which the caller supplied the items.

use std::cmp::Ordering;

use bitcoin::{hashes::Hash, ScriptBuf, TxIn, TxOut};

/// Compares two scripts: shorter scripts come first and scripts of equal length are compared
/// byte-by-byte.
pub fn compare_scripts(a: &[u8], b: &[u8]) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Compares two transaction inputs by the bytes of the previous txid and then by the previous
/// output index.
///
/// The txid bytes are compared in their internal (wire) order and not in the reversed order in
/// which txids are usually displayed.
pub fn compare_tx_ins(a: &TxIn, b: &TxIn) -> Ordering {
    let (a, b) = (&a.previous_output, &b.previous_output);

    a.txid
        .as_byte_array()
        .cmp(b.txid.as_byte_array())
        .then_with(|| a.vout.cmp(&b.vout))
}

/// Compares two transaction outputs by amount and then by locking script as per
/// [`compare_scripts`].
pub fn compare_tx_outs(a: &TxOut, b: &TxOut) -> Ordering {
    a.value
        .cmp(&b.value)
        .then_with(|| compare_scripts(a.script_pubkey.as_bytes(), b.script_pubkey.as_bytes()))
}

/// Sorts the `scripts` canonically.
pub fn sort_scripts(mut scripts: Vec<ScriptBuf>) -> Vec<ScriptBuf> {
    scripts.sort_by(|a, b| compare_scripts(a.as_bytes(), b.as_bytes()));
    scripts
}

/// Sorts the transaction inputs canonically in place.
pub fn sort_tx_ins(tx_ins: &mut [TxIn]) {
    tx_ins.sort_by(compare_tx_ins);
}

/// Sorts the transaction outputs canonically in place.
pub fn sort_tx_outs(tx_outs: &mut [TxOut]) {
    tx_outs.sort_by(compare_tx_outs);
}

#[cfg(test)]
mod tests {
    use bitcoin::{Amount, OutPoint, Sequence, Txid, Witness};
    use proptest::prelude::*;

    use super::*;

    fn tx_in(txid_byte: u8, vout: u32) -> TxIn {
        TxIn {
            previous_output: OutPoint::new(Txid::from_byte_array([txid_byte; 32]), vout),
            script_sig: ScriptBuf::new(),
            sequence: Sequence::MAX,
            witness: Witness::new(),
        }
    }

    fn tx_out(sats: u64, script: &[u8]) -> TxOut {
        TxOut {
            value: Amount::from_sat(sats),
            script_pubkey: ScriptBuf::from_bytes(script.to_vec()),
        }
    }

    #[test]
    fn test_compare_scripts() {
        assert_eq!(compare_scripts(&[0xff], &[0x00, 0x00]), Ordering::Less);
        assert_eq!(compare_scripts(&[0x01, 0x02], &[0x01, 0x03]), Ordering::Less);
        assert_eq!(compare_scripts(&[0x01, 0x03], &[0x01, 0x02]), Ordering::Greater);
        assert_eq!(compare_scripts(&[0x01], &[0x01]), Ordering::Equal);
        assert_eq!(compare_scripts(&[], &[0x00]), Ordering::Less);
    }

    #[test]
    fn test_compare_tx_ins() {
        assert_eq!(compare_tx_ins(&tx_in(1, 5), &tx_in(2, 0)), Ordering::Less);
        assert_eq!(compare_tx_ins(&tx_in(2, 0), &tx_in(1, 5)), Ordering::Greater);
        assert_eq!(compare_tx_ins(&tx_in(1, 0), &tx_in(1, 1)), Ordering::Less);
        assert_eq!(compare_tx_ins(&tx_in(1, 1), &tx_in(1, 1)), Ordering::Equal);
    }

    #[test]
    fn test_compare_tx_ins_uses_wire_byte_order() {
        let mut low_first_byte = [0xffu8; 32];
        low_first_byte[0] = 0x00;
        let mut low_last_byte = [0x00u8; 32];
        low_last_byte[31] = 0xff;
        low_last_byte[0] = 0x01;

        let a = TxIn {
            previous_output: OutPoint::new(Txid::from_byte_array(low_first_byte), 0),
            ..tx_in(0, 0)
        };
        let b = TxIn {
            previous_output: OutPoint::new(Txid::from_byte_array(low_last_byte), 0),
            ..tx_in(0, 0)
        };

        assert_eq!(compare_tx_ins(&a, &b), Ordering::Less);
    }

    #[test]
    fn test_compare_tx_outs() {
        assert_eq!(
            compare_tx_outs(&tx_out(100, &[0xff, 0xff]), &tx_out(200, &[0x00])),
            Ordering::Less
        );
        assert_eq!(
            compare_tx_outs(&tx_out(100, &[0x00, 0x00]), &tx_out(100, &[0xff])),
            Ordering::Greater,
            "ties on amount are broken by script length first"
        );
        assert_eq!(
            compare_tx_outs(&tx_out(100, &[0x01]), &tx_out(100, &[0x02])),
            Ordering::Less
        );
    }

    #[test]
    fn test_sort_scripts() {
        let scripts = vec![
            ScriptBuf::from_bytes(vec![0x02, 0x00]),
            ScriptBuf::from_bytes(vec![0x03]),
            ScriptBuf::from_bytes(vec![0x01, 0x00]),
        ];

        let sorted = sort_scripts(scripts);
        let sorted: Vec<&[u8]> = sorted.iter().map(|script| script.as_bytes()).collect();

        assert_eq!(sorted, vec![&[0x03][..], &[0x01, 0x00], &[0x02, 0x00]]);
    }

    proptest! {
        #[test]
        fn prop_sorted_inputs_ignore_permutations(
            mut entries in prop::collection::vec((any::<u8>(), 0u32..4), 1..10),
        ) {
            let mut tx_ins: Vec<TxIn> = entries.iter().map(|(byte, vout)| tx_in(*byte, *vout)).collect();
            sort_tx_ins(&mut tx_ins);

            entries.reverse();
            let mut reversed: Vec<TxIn> = entries.iter().map(|(byte, vout)| tx_in(*byte, *vout)).collect();
            sort_tx_ins(&mut reversed);

            prop_assert_eq!(&tx_ins, &reversed);
            prop_assert!(tx_ins.windows(2).all(|pair| compare_tx_ins(&pair[0], &pair[1]) != Ordering::Greater));
        }

        #[test]
        fn prop_sorted_outputs_are_ordered(
            entries in prop::collection::vec((0u64..1_000, prop::collection::vec(any::<u8>(), 0..4)), 1..10),
        ) {
            let mut tx_outs: Vec<TxOut> = entries.iter().map(|(sats, script)| tx_out(*sats, script)).collect();
            sort_tx_outs(&mut tx_outs);

            prop_assert!(tx_outs.windows(2).all(|pair| compare_tx_outs(&pair[0], &pair[1]) != Ordering::Greater));
        }
    }
}
