//! This module contains the commitment transaction, which settles a batch of VTXOs on chain.

use ark_tx_primitives::{
    constants::{DUST_LIMIT, SEQ_COMMITMENT},
    fees::{effective_fee_rate, estimate_fee},
    ordering::compare_tx_ins,
    scripts::prelude::{create_tx, create_tx_ins},
    types::UnspentOutput,
};
use bitcoin::{Amount, FeeRate, Psbt, TapSighashType, TxIn};
use secp256k1::PublicKey;
use tracing::debug;

use super::{checked_sum, create_psbt, require, require_above_dust, require_positive, ArkTx};
use crate::{
    errors::{TxBuilderError, TxBuilderResult},
    outputs::{BatchOutput, OperatorOutput, TaprootOutput},
};

/// Data needed to construct a [`CommitmentTx`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitmentParams {
    /// The outputs of the operator that fund the batch. At least one is required.
    pub operator_utxos: Vec<UnspentOutput>,

    /// The boarding outputs that are swept into the batch.
    pub boarding_utxos: Vec<UnspentOutput>,

    /// The value of the batch output.
    pub batch_amount: Amount,

    /// The value of the connector output.
    ///
    /// This is raised to the [`DUST_LIMIT`] if lower.
    pub connector_amount: Amount,

    /// The key of the Ark operator.
    pub operator_pubkey: Option<PublicKey>,

    /// The keys of the users in the batch.
    pub user_pubkeys: Vec<PublicKey>,

    /// The absolute height after which the operator can sweep the batch.
    pub batch_expiry: u32,

    /// The fee rate of the transaction.
    pub fee_rate: FeeRate,
}

impl CommitmentParams {
    /// Creates the parameters for a commitment transaction without boarding inputs or users.
    pub const fn new(
        operator_utxos: Vec<UnspentOutput>,
        batch_amount: Amount,
        connector_amount: Amount,
        operator_pubkey: PublicKey,
        batch_expiry: u32,
        fee_rate: FeeRate,
    ) -> Self {
        Self {
            operator_utxos,
            boarding_utxos: Vec::new(),
            batch_amount,
            connector_amount,
            operator_pubkey: Some(operator_pubkey),
            user_pubkeys: Vec::new(),
            batch_expiry,
            fee_rate,
        }
    }

    /// Sets the boarding outputs that are swept into the batch.
    pub fn with_boarding_utxos(mut self, boarding_utxos: Vec<UnspentOutput>) -> Self {
        self.boarding_utxos = boarding_utxos;
        self
    }

    /// Sets the keys of the users in the batch.
    pub fn with_user_pubkeys(mut self, user_pubkeys: Vec<PublicKey>) -> Self {
        self.user_pubkeys = user_pubkeys;
        self
    }
}

/// The commitment transaction.
///
/// Its inputs are sorted canonically, but its outputs have a fixed layout:
///
/// | vout | output                            |
/// | ---- | --------------------------------- |
/// | 0    | batch ([`BatchOutput`])           |
/// | 1    | connector ([`OperatorOutput`])    |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitmentTx {
    psbt: Psbt,
    prevouts: Vec<UnspentOutput>,
    fee: Amount,
    batch_output: BatchOutput,
    connector_output: OperatorOutput,
}

impl CommitmentTx {
    /// Index of the batch output.
    pub const BATCH_VOUT: u32 = 0;
    /// Index of the connector output.
    pub const CONNECTOR_VOUT: u32 = 1;

    /// Builds a commitment transaction.
    ///
    /// Any value of the inputs beyond the two outputs and the fee is left to the miners.
    ///
    /// # Errors
    ///
    /// If no operator output or key is supplied, the batch amount is zero or below the dust
    /// limit, any input carries no value, the user keys cannot be aggregated, or the inputs cannot
    /// cover the outputs and the fee.
    pub fn new(params: &CommitmentParams) -> TxBuilderResult<Self> {
        if params.operator_utxos.is_empty() {
            return Err(TxBuilderError::missing("operator_utxos"));
        }
        let operator_pubkey = require(params.operator_pubkey, "operator_pubkey")?;

        require_above_dust(params.batch_amount, "batch_amount")?;
        for utxo in &params.operator_utxos {
            require_positive(utxo.amount, "operator_utxos.amount")?;
        }
        for utxo in &params.boarding_utxos {
            require_positive(utxo.amount, "boarding_utxos.amount")?;
        }

        let connector_amount = params.connector_amount.max(DUST_LIMIT);
        let fee_rate = effective_fee_rate(params.fee_rate);

        let utxos: Vec<&UnspentOutput> = params
            .operator_utxos
            .iter()
            .chain(&params.boarding_utxos)
            .collect();
        let tx_ins = create_tx_ins(utxos.iter().map(|utxo| utxo.outpoint()), SEQ_COMMITMENT);

        // the spent outputs must follow their inputs through the sort.
        let mut spent: Vec<(TxIn, UnspentOutput)> =
            tx_ins.into_iter().zip(utxos.into_iter().cloned()).collect();
        spent.sort_by(|(a, _), (b, _)| compare_tx_ins(a, b));
        let (tx_ins, prevouts): (Vec<TxIn>, Vec<UnspentOutput>) = spent.into_iter().unzip();

        let batch_output =
            BatchOutput::new(operator_pubkey, &params.user_pubkeys, params.batch_expiry)?;
        let connector_output = OperatorOutput::new(operator_pubkey);

        let tx_outs = vec![
            batch_output.tx_out(params.batch_amount)?,
            connector_output.tx_out(connector_amount)?,
        ];

        let tx = create_tx(tx_ins, tx_outs);

        let available = checked_sum(prevouts.iter().map(|utxo| utxo.amount), "inputs")?;
        let estimated_fee = estimate_fee(&tx, tx.input.len(), fee_rate)
            .ok_or(TxBuilderError::InvalidFeeRate(fee_rate))?;
        let required = checked_sum(
            [params.batch_amount, connector_amount, estimated_fee],
            "batch_amount",
        )?;

        if available < required {
            return Err(TxBuilderError::InsufficientFunds {
                available,
                required,
            });
        }

        let fee = available - (params.batch_amount + connector_amount);
        let psbt = create_psbt(tx, &prevouts, TapSighashType::Default)?;

        let commitment_tx = Self {
            psbt,
            prevouts,
            fee,
            batch_output,
            connector_output,
        };

        debug!(
            txid = %commitment_tx.compute_txid(),
            %fee,
            %estimated_fee,
            num_inputs = commitment_tx.prevouts.len(),
            num_users = params.user_pubkeys.len(),
            "built commitment transaction"
        );

        Ok(commitment_tx)
    }

    /// Gets the batch output.
    pub const fn batch_output(&self) -> &BatchOutput {
        &self.batch_output
    }

    /// Gets the connector output.
    pub const fn connector_output(&self) -> &OperatorOutput {
        &self.connector_output
    }

    /// Gets the batch output as an [`UnspentOutput`].
    pub fn batch_utxo(&self) -> UnspentOutput {
        self.utxo_at(Self::BATCH_VOUT)
    }

    /// Gets the connector output as an [`UnspentOutput`] that a forfeit transaction can spend.
    pub fn connector_utxo(&self) -> UnspentOutput {
        self.utxo_at(Self::CONNECTOR_VOUT)
    }

    fn utxo_at(&self, vout: u32) -> UnspentOutput {
        let tx_out = &self.unsigned_tx().output[vout as usize];

        UnspentOutput::new(self.compute_txid(), vout, tx_out.value)
            .with_script_pubkey(tx_out.script_pubkey.clone())
    }
}

impl ArkTx for CommitmentTx {
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
