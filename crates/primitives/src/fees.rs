//! Weight-based size estimation and the linear fee model used by all builders.

use bitcoin::{Amount, FeeRate, Transaction};
use tracing::trace;

use crate::constants::{MIN_FEE_RATE, P2TR_INPUT_WITNESS_SIZE};

/// Returns the fee rate that is actually applied, i.e., `fee_rate` raised to [`MIN_FEE_RATE`] if
/// it is lower.
pub fn effective_fee_rate(fee_rate: FeeRate) -> FeeRate {
    fee_rate.max(MIN_FEE_RATE)
}

/// Estimates the virtual size of the `tx` once its `num_inputs` inputs have been signed.
///
/// The `tx` is expected to be unsigned so that its serialized size equals its base size. If
/// `witness_size` is zero, every input is assumed to carry a witness of
/// [`P2TR_INPUT_WITNESS_SIZE`] bytes.
pub fn estimate_vsize(tx: &Transaction, num_inputs: usize, witness_size: usize) -> u64 {
    let witness_size = if witness_size == 0 {
        num_inputs * P2TR_INPUT_WITNESS_SIZE
    } else {
        witness_size
    };

    let weight = tx.base_size() * 4 + witness_size;

    weight.div_ceil(4) as u64
}

/// Estimates the fee of the `tx` at the given `fee_rate`, assuming the default witness size for
/// each of its `num_inputs` inputs.
///
/// The `fee_rate` is clamped to [`MIN_FEE_RATE`] before use. Returns `None` if the fee
/// overflows.
pub fn estimate_fee(tx: &Transaction, num_inputs: usize, fee_rate: FeeRate) -> Option<Amount> {
    let vsize = estimate_vsize(tx, num_inputs, 0);
    let fee_rate = effective_fee_rate(fee_rate);

    let fee = fee_rate.fee_vb(vsize);
    trace!(%vsize, ?fee_rate, ?fee, "estimated fee");

    fee
}
