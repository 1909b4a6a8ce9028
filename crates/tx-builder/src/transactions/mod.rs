//! This module contains the transaction templates of the Ark protocol.

use ark_tx_primitives::{
    constants::DUST_LIMIT,
    scripts::prelude::{create_key_spend_hash, create_script_spend_hash},
    types::UnspentOutput,
};
use bitcoin::{
    psbt::PsbtSighashType,
    sighash::{Prevouts, SighashCache},
    Amount, Psbt, ScriptBuf, TapSighash, TapSighashType, Transaction, TxOut, Txid,
};

use crate::errors::{AmountViolation, TxBuilderError, TxBuilderResult};

pub mod boarding;
pub mod commitment;
pub mod forfeit;
pub mod prelude;

/// An unsigned Ark transaction along with the outputs it spends.
pub trait ArkTx {
    /// Gets the PSBT.
    fn psbt(&self) -> &Psbt;

    /// Gets the outputs that the transaction spends, in input order.
    fn prevouts(&self) -> &[UnspentOutput];

    /// Gets the absolute fee paid by the transaction, i.e., the value of the inputs that is not
    /// claimed by any output.
    fn fee(&self) -> Amount;

    /// Gets the sighash type that the inputs of the transaction must be signed with.
    fn sighash_type(&self) -> TapSighashType {
        TapSighashType::Default
    }

    /// Gets the unsigned transaction.
    fn unsigned_tx(&self) -> &Transaction {
        &self.psbt().unsigned_tx
    }

    /// Computes the transaction ID.
    fn compute_txid(&self) -> Txid {
        self.unsigned_tx().compute_txid()
    }

    /// Gets the outputs that the transaction spends as [`TxOut`]'s.
    ///
    /// # Errors
    ///
    /// If the locking script of any spent output is unknown.
    fn spent_tx_outs(&self) -> TxBuilderResult<Vec<TxOut>> {
        self.prevouts()
            .iter()
            .map(|utxo| {
                utxo.to_tx_out()
                    .ok_or(TxBuilderError::missing("script_pubkey"))
            })
            .collect()
    }

    /// Computes the sighash for a key path spend of the input at `input_index`.
    fn key_spend_sighash(&self, input_index: usize) -> TxBuilderResult<TapSighash> {
        let prevouts = self.spent_tx_outs()?;
        let mut cache = SighashCache::new(self.unsigned_tx());

        Ok(create_key_spend_hash(
            &mut cache,
            Prevouts::All(&prevouts),
            self.sighash_type(),
            input_index,
        )?)
    }

    /// Computes the sighash for spending the input at `input_index` via the `leaf` script.
    fn script_spend_sighash(
        &self,
        input_index: usize,
        leaf: &ScriptBuf,
    ) -> TxBuilderResult<TapSighash> {
        let prevouts = self.spent_tx_outs()?;
        let mut cache = SighashCache::new(self.unsigned_tx());

        Ok(create_script_spend_hash(
            &mut cache,
            leaf,
            Prevouts::All(&prevouts),
            self.sighash_type(),
            input_index,
        )?)
    }
}

/// Wraps the unsigned `tx` in a PSBT.
///
/// The witness UTXO of every input whose locking script is known is set from the corresponding
/// entry in `prevouts`, and every input is marked with the `sighash_type`.
fn create_psbt(
    tx: Transaction,
    prevouts: &[UnspentOutput],
    sighash_type: TapSighashType,
) -> TxBuilderResult<Psbt> {
    let mut psbt = Psbt::from_unsigned_tx(tx)?;

    for (input, utxo) in psbt.inputs.iter_mut().zip(prevouts) {
        input.witness_utxo = utxo.to_tx_out();
        input.sighash_type = Some(PsbtSighashType::from(sighash_type));
    }

    Ok(psbt)
}

/// Returns the supplied value or fails with [`TxBuilderError::MissingInput`].
fn require<T>(value: Option<T>, field: &'static str) -> TxBuilderResult<T> {
    value.ok_or(TxBuilderError::missing(field))
}

/// Checks that the `amount` is positive.
fn require_positive(amount: Amount, field: &'static str) -> TxBuilderResult<()> {
    if amount == Amount::ZERO {
        return Err(TxBuilderError::invalid_amount(
            field,
            amount,
            AmountViolation::Zero,
        ));
    }

    Ok(())
}

/// Checks that the `amount` is positive and not below the [`DUST_LIMIT`].
fn require_above_dust(amount: Amount, field: &'static str) -> TxBuilderResult<()> {
    require_positive(amount, field)?;

    if amount < DUST_LIMIT {
        return Err(TxBuilderError::invalid_amount(
            field,
            amount,
            AmountViolation::BelowDust,
        ));
    }

    Ok(())
}

/// Sums the `amounts`, failing with [`AmountViolation::Overflow`] attributed to `field` if the
/// total does not fit.
fn checked_sum(
    amounts: impl IntoIterator<Item = Amount>,
    field: &'static str,
) -> TxBuilderResult<Amount> {
    amounts.into_iter().try_fold(Amount::ZERO, |total, amount| {
        total
            .checked_add(amount)
            .ok_or(TxBuilderError::invalid_amount(
                field,
                amount,
                AmountViolation::Overflow,
            ))
    })
}
