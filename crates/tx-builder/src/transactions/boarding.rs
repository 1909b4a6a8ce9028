//! This module contains the boarding transaction, through which a user deposits funds into Ark.

use std::str::FromStr;

use ark_tx_primitives::{
    constants::{DUST_LIMIT, SEQ_BOARDING},
    fees::{effective_fee_rate, estimate_fee},
    ordering::sort_tx_outs,
    scripts::prelude::{create_tx, create_tx_ins},
    types::UnspentOutput,
};
use bitcoin::{Address, Amount, FeeRate, Psbt, ScriptBuf, TapSighashType, Transaction, TxOut};
use secp256k1::PublicKey;
use tracing::debug;

use super::{checked_sum, create_psbt, require, require_above_dust, require_positive, ArkTx};
use crate::{
    errors::{TxBuilderError, TxBuilderResult},
    outputs::{BoardingOutput, TaprootOutput},
};

/// Data needed to construct a [`BoardingTx`].
///
/// The fields that are required by the protocol are optional here so that a missing value is
/// reported as a [`TxBuilderError::MissingInput`] by the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardingParams {
    /// The output that funds the deposit.
    pub funding_utxo: Option<UnspentOutput>,

    /// The amount to deposit into Ark.
    pub amount: Amount,

    /// The key of the depositing user.
    pub user_pubkey: Option<PublicKey>,

    /// The key of the Ark operator.
    pub operator_pubkey: Option<PublicKey>,

    /// The number of blocks after which the user can reclaim the deposit unilaterally.
    pub timeout_blocks: u16,

    /// The address that receives the change, if any.
    pub change_address: Option<String>,

    /// The fee rate of the transaction.
    pub fee_rate: FeeRate,
}

impl BoardingParams {
    /// Creates the parameters for a boarding transaction without a change address.
    pub const fn new(
        funding_utxo: UnspentOutput,
        amount: Amount,
        user_pubkey: PublicKey,
        operator_pubkey: PublicKey,
        timeout_blocks: u16,
        fee_rate: FeeRate,
    ) -> Self {
        Self {
            funding_utxo: Some(funding_utxo),
            amount,
            user_pubkey: Some(user_pubkey),
            operator_pubkey: Some(operator_pubkey),
            timeout_blocks,
            change_address: None,
            fee_rate,
        }
    }

    /// Sets the address that receives the change.
    pub fn with_change_address(mut self, change_address: impl Into<String>) -> Self {
        self.change_address = Some(change_address.into());
        self
    }
}

/// The boarding transaction.
///
/// Spends a single funding output into a [`BoardingOutput`] and, if the residue is worth it, a
/// change output. The outputs are sorted canonically, so the position of the boarding output
/// depends on the amounts involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardingTx {
    psbt: Psbt,
    prevouts: [UnspentOutput; 1],
    fee: Amount,
    boarding_output: BoardingOutput,
    boarding_vout: u32,
}

impl BoardingTx {
    /// Builds a boarding transaction.
    ///
    /// A change output is only added if a change address is supplied and the change, after
    /// accounting for the extra output in the fee, stays above the [`DUST_LIMIT`]. Otherwise, the
    /// residue is left to the miners.
    ///
    /// # Errors
    ///
    /// If a required field is missing, an amount is zero or the deposit is below the dust limit,
    /// the change address cannot be decoded, or the funding output cannot cover the deposit and
    /// the fee.
    pub fn new(params: &BoardingParams) -> TxBuilderResult<Self> {
        let funding_utxo = require(params.funding_utxo.as_ref(), "funding_utxo")?;
        let user_pubkey = require(params.user_pubkey, "user_pubkey")?;
        let operator_pubkey = require(params.operator_pubkey, "operator_pubkey")?;

        require_above_dust(params.amount, "amount")?;
        require_positive(funding_utxo.amount, "funding_utxo.amount")?;

        let change_script = params
            .change_address
            .as_deref()
            .filter(|address| !address.is_empty())
            .map(parse_change_address)
            .transpose()?;

        let fee_rate = effective_fee_rate(params.fee_rate);
        let boarding_output =
            BoardingOutput::new(user_pubkey, operator_pubkey, params.timeout_blocks)?;

        let tx_ins = create_tx_ins([funding_utxo.outpoint()], SEQ_BOARDING);
        let mut tx_outs = vec![boarding_output.tx_out(params.amount)?];

        let fee = boarding_fee(&create_tx(tx_ins.clone(), tx_outs.clone()), fee_rate)?;
        let required = checked_sum([params.amount, fee], "amount")?;
        let Some(change) = funding_utxo.amount.checked_sub(required) else {
            return Err(TxBuilderError::InsufficientFunds {
                available: funding_utxo.amount,
                required,
            });
        };

        if let Some(change_script) = change_script.filter(|_| change > DUST_LIMIT) {
            let mut with_change = tx_outs.clone();
            with_change.push(TxOut {
                value: change,
                script_pubkey: change_script,
            });

            // the extra output increases the fee.
            let fee = boarding_fee(&create_tx(tx_ins.clone(), with_change.clone()), fee_rate)?;
            let change = checked_sum([params.amount, fee], "amount")
                .map(|required| funding_utxo.amount.checked_sub(required))?;

            if let Some(change) = change.filter(|change| *change > DUST_LIMIT) {
                with_change[1].value = change;
                tx_outs = with_change;
            }
        }

        sort_tx_outs(&mut tx_outs);

        let boarding_script = boarding_output.script_pubkey()?;
        let boarding_vout = tx_outs
            .iter()
            .position(|tx_out| {
                tx_out.value == params.amount && tx_out.script_pubkey == boarding_script
            })
            .map_or(0, |vout| vout as u32);

        let tx = create_tx(tx_ins, tx_outs);
        let total_out = checked_sum(tx.output.iter().map(|tx_out| tx_out.value), "outputs")?;
        let fee = funding_utxo.amount.checked_sub(total_out).ok_or(
            TxBuilderError::InsufficientFunds {
                available: funding_utxo.amount,
                required: total_out,
            },
        )?;

        let prevouts = [funding_utxo.clone()];
        let psbt = create_psbt(tx, &prevouts, TapSighashType::Default)?;

        let boarding_tx = Self {
            psbt,
            prevouts,
            fee,
            boarding_output,
            boarding_vout,
        };

        debug!(
            txid = %boarding_tx.compute_txid(),
            %fee,
            num_outputs = boarding_tx.unsigned_tx().output.len(),
            "built boarding transaction"
        );

        Ok(boarding_tx)
    }

    /// Gets the output that locks the deposit.
    pub const fn boarding_output(&self) -> &BoardingOutput {
        &self.boarding_output
    }

    /// Gets the index of the boarding output.
    pub const fn boarding_vout(&self) -> u32 {
        self.boarding_vout
    }

    /// Gets the change output, if there is one.
    pub fn change_tx_out(&self) -> Option<&TxOut> {
        self.unsigned_tx()
            .output
            .iter()
            .enumerate()
            .find(|(vout, _)| *vout as u32 != self.boarding_vout)
            .map(|(_, tx_out)| tx_out)
    }

    /// Gets the boarding output as an [`UnspentOutput`] that a commitment transaction can spend.
    pub fn boarding_utxo(&self) -> UnspentOutput {
        let tx_out = &self.unsigned_tx().output[self.boarding_vout as usize];

        UnspentOutput::new(self.compute_txid(), self.boarding_vout, tx_out.value)
            .with_script_pubkey(tx_out.script_pubkey.clone())
    }
}

impl ArkTx for BoardingTx {
    fn psbt(&self) -> &Psbt {
        &self.psbt
    }

    fn prevouts(&self) -> &[UnspentOutput] {
        &self.prevouts
    }

    fn fee(&self) -> Amount {
        self.fee
    }
}

/// Decodes the `address` into its locking script.
///
/// The address is accepted regardless of the network it encodes.
fn parse_change_address(address: &str) -> TxBuilderResult<ScriptBuf> {
    let address = Address::from_str(address).map_err(|source| TxBuilderError::MalformedAddress {
        address: address.to_string(),
        source,
    })?;

    Ok(address.assume_checked().script_pubkey())
}

/// Estimates the fee of a boarding transaction with its single input.
fn boarding_fee(tx: &Transaction, fee_rate: FeeRate) -> TxBuilderResult<Amount> {
    estimate_fee(tx, 1, fee_rate).ok_or(TxBuilderError::InvalidFeeRate(fee_rate))
}
