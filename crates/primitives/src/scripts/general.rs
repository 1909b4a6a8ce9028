//! Leaf scripts and transaction skeletons shared by the builders.

use bitcoin::{
    opcodes::all::{OP_CHECKSIG, OP_CHECKSIGVERIFY, OP_CLTV, OP_CSV},
    script::Builder,
    Amount, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Witness,
};
use secp256k1::XOnlyPublicKey;

use crate::constants::{LOCK_TIME, TX_VERSION};

/// Create a script with the spending condition that a signature corresponding to the `pubkey` must
/// be provided.
///
/// NOTE: The `pubkey` may or may not be an aggregated public key. No additional validation is
/// performed on the key.
pub fn checksig_script(pubkey: &XOnlyPublicKey) -> ScriptBuf {
    Builder::new()
        .push_x_only_key(pubkey)
        .push_opcode(OP_CHECKSIG)
        .into_script()
}

/// Create a script that requires a signature for the `pubkey` and that the spent output be at
/// least `blocks` blocks old.
pub fn checksig_csv_script(pubkey: &XOnlyPublicKey, blocks: u16) -> ScriptBuf {
    Builder::new()
        .push_x_only_key(pubkey)
        .push_opcode(OP_CHECKSIGVERIFY)
        .push_int(blocks as i64)
        .push_opcode(OP_CSV)
        .into_script()
}

/// Create a script that requires a signature for the `pubkey` and that the spending transaction be
/// mined at or after `height`.
pub fn checksig_cltv_script(pubkey: &XOnlyPublicKey, height: u32) -> ScriptBuf {
    Builder::new()
        .push_x_only_key(pubkey)
        .push_opcode(OP_CHECKSIGVERIFY)
        .push_int(height as i64)
        .push_opcode(OP_CLTV)
        .into_script()
}

/// Create a bitcoin [`Transaction`] for the given inputs and outputs.
///
/// The version and the lock time are fixed by the protocol.
pub fn create_tx(tx_ins: Vec<TxIn>, tx_outs: Vec<TxOut>) -> Transaction {
    Transaction {
        version: TX_VERSION,
        lock_time: LOCK_TIME,
        input: tx_ins,
        output: tx_outs,
    }
}

/// Create a list of [`TxIn`]'s from given [`OutPoint`]'s.
///
/// This wraps the [`OutPoint`] in a structure that includes an empty `witness`, an empty
/// `script_sig` and the provided `sequence`.
pub fn create_tx_ins(utxos: impl IntoIterator<Item = OutPoint>, sequence: Sequence) -> Vec<TxIn> {
    utxos
        .into_iter()
        .map(|previous_output| TxIn {
            previous_output,
            sequence,
            script_sig: ScriptBuf::default(),
            witness: Witness::new(),
        })
        .collect()
}

/// Create a list of [`TxOut`]'s' based on pairs of scripts and corresponding amounts.
pub fn create_tx_outs(
    scripts_and_amounts: impl IntoIterator<Item = (ScriptBuf, Amount)>,
) -> Vec<TxOut> {
    scripts_and_amounts
        .into_iter()
        .map(|(script_pubkey, value)| TxOut {
            script_pubkey,
            value,
        })
        .collect()
}
