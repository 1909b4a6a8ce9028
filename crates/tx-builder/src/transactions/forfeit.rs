//! This module contains the forfeit transaction, through which a user surrenders a VTXO to the
//! operator in exchange for a VTXO in a new batch.
//!
//! The forfeit spends the VTXO together with the connector output of the commitment transaction
//! that creates the new batch. It can therefore only confirm if that commitment transaction does.

use ark_tx_primitives::{
    constants::{FORFEIT_SIGHASH_TYPE, SEQ_FORFEIT},
    fees::{effective_fee_rate, estimate_fee},
    scripts::prelude::{create_tx, create_tx_ins},
    types::UnspentOutput,
};
use bitcoin::{Amount, FeeRate, Psbt, TapSighashType};
use secp256k1::PublicKey;
use tracing::debug;

use super::{checked_sum, create_psbt, require, require_positive, ArkTx};
use crate::{
    errors::{TxBuilderError, TxBuilderResult},
    outputs::{OperatorOutput, TaprootOutput},
};

/// Data needed to construct a [`ForfeitTx`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForfeitParams {
    /// The VTXO being forfeited.
    pub vtxo: Option<UnspentOutput>,

    /// The connector output of the commitment transaction that the forfeit is bound to.
    pub connector_anchor: Option<UnspentOutput>,

    /// The key of the Ark operator.
    pub operator_pubkey: Option<PublicKey>,

    /// The fee rate of the transaction.
    pub fee_rate: FeeRate,
}

impl ForfeitParams {
    /// Creates the parameters for a forfeit transaction.
    pub const fn new(
        vtxo: UnspentOutput,
        connector_anchor: UnspentOutput,
        operator_pubkey: PublicKey,
        fee_rate: FeeRate,
    ) -> Self {
        Self {
            vtxo: Some(vtxo),
            connector_anchor: Some(connector_anchor),
            operator_pubkey: Some(operator_pubkey),
            fee_rate,
        }
    }
}

/// The forfeit transaction.
///
/// # Inputs
///
/// 0. the VTXO.
/// 1. the connector output.
///
/// # Outputs
///
/// 0. the value of both inputs minus the fee, locked to the operator.
///
/// Both inputs must be signed with [`FORFEIT_SIGHASH_TYPE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForfeitTx {
    psbt: Psbt,
    prevouts: [UnspentOutput; 2],
    fee: Amount,
    operator_output: OperatorOutput,
}

impl ForfeitTx {
    /// Index of the VTXO input.
    pub const VTXO_VIN: usize = 0;
    /// Index of the connector input.
    pub const CONNECTOR_VIN: usize = 1;

    /// Builds a forfeit transaction.
    ///
    /// # Errors
    ///
    /// If a required field is missing, either input carries no value, or nothing would be left
    /// for the output after paying the fee.
    pub fn new(params: &ForfeitParams) -> TxBuilderResult<Self> {
        let vtxo = require(params.vtxo.as_ref(), "vtxo")?;
        let connector_anchor = require(params.connector_anchor.as_ref(), "connector_anchor")?;
        let operator_pubkey = require(params.operator_pubkey, "operator_pubkey")?;

        require_positive(vtxo.amount, "vtxo.amount")?;
        require_positive(connector_anchor.amount, "connector_anchor.amount")?;

        let fee_rate = effective_fee_rate(params.fee_rate);
        let available = checked_sum([vtxo.amount, connector_anchor.amount], "inputs")?;

        let prevouts = [vtxo.clone(), connector_anchor.clone()];
        let tx_ins = create_tx_ins(prevouts.iter().map(UnspentOutput::outpoint), SEQ_FORFEIT);

        // the fee is estimated before the payout output is added.
        let fee = estimate_fee(&create_tx(tx_ins.clone(), vec![]), prevouts.len(), fee_rate)
            .ok_or(TxBuilderError::InvalidFeeRate(fee_rate))?;

        let Some(payout) = available.checked_sub(fee).filter(|payout| *payout > Amount::ZERO)
        else {
            return Err(TxBuilderError::InsufficientFunds {
                available,
                required: fee.checked_add(Amount::ONE_SAT).unwrap_or(fee),
            });
        };

        let operator_output = OperatorOutput::new(operator_pubkey);
        let tx = create_tx(tx_ins, vec![operator_output.tx_out(payout)?]);

        let psbt = create_psbt(tx, &prevouts, FORFEIT_SIGHASH_TYPE)?;

        let forfeit_tx = Self {
            psbt,
            prevouts,
            fee,
            operator_output,
        };

        debug!(
            txid = %forfeit_tx.compute_txid(),
            %fee,
            %payout,
            "built forfeit transaction"
        );

        Ok(forfeit_tx)
    }

    /// Gets the output that pays the operator.
    pub const fn operator_output(&self) -> &OperatorOutput {
        &self.operator_output
    }
}

impl ArkTx for ForfeitTx {
    fn psbt(&self) -> &Psbt {
        &self.psbt
    }

    fn prevouts(&self) -> &[UnspentOutput] {
        &self.prevouts
    }

    fn fee(&self) -> Amount {
        self.fee
    }

    fn sighash_type(&self) -> TapSighashType {
        FORFEIT_SIGHASH_TYPE
    }
}
