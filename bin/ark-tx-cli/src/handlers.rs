//! Handlers of the CLI commands.

use std::path::Path;

use anyhow::Context;
use ark_tx_builder::transactions::prelude::{ArkTx, BoardingTx, CommitmentTx, ForfeitTx};
use ark_tx_primitives::key_agg::aggregate_pubkeys;
use bitcoin::{consensus, Txid};
use secp256k1::{PublicKey, XOnlyPublicKey};
use serde::Serialize;
use tracing::info;

use crate::params::{self, BoardingConfig, CommitmentConfig, ForfeitConfig};

/// Output of the CLI commands.
pub(crate) trait Render: Serialize {
    /// Renders the output as human-readable lines.
    fn lines(&self) -> Vec<String>;

    fn render(&self, json: bool) -> anyhow::Result<String> {
        if json {
            return Ok(serde_json::to_string_pretty(self)?);
        }

        Ok(self.lines().join("\n"))
    }
}

/// An unsigned transaction template.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct TemplateReport {
    pub(crate) txid: Txid,
    pub(crate) fee: u64,
    pub(crate) num_inputs: usize,
    pub(crate) num_outputs: usize,
    pub(crate) hex: String,
}

impl TemplateReport {
    fn new(tx: &impl ArkTx) -> Self {
        let unsigned_tx = tx.unsigned_tx();

        Self {
            txid: tx.compute_txid(),
            fee: tx.fee().to_sat(),
            num_inputs: unsigned_tx.input.len(),
            num_outputs: unsigned_tx.output.len(),
            hex: hex::encode(consensus::serialize(unsigned_tx)),
        }
    }
}

impl Render for TemplateReport {
    fn lines(&self) -> Vec<String> {
        vec![
            format!("txid: {}", self.txid),
            format!("fee: {} sat", self.fee),
            format!("inputs: {}", self.num_inputs),
            format!("outputs: {}", self.num_outputs),
            format!("hex: {}", self.hex),
        ]
    }
}

/// An aggregated public key.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct AggregateReport {
    pub(crate) pubkey: PublicKey,
    pub(crate) xonly_pubkey: XOnlyPublicKey,
}

impl Render for AggregateReport {
    fn lines(&self) -> Vec<String> {
        vec![
            format!("pubkey: {}", self.pubkey),
            format!("xonly: {}", self.xonly_pubkey),
        ]
    }
}

pub(crate) fn handle_boarding(path: &Path) -> anyhow::Result<TemplateReport> {
    let params = params::from_path::<BoardingConfig>(path)?.into_params()?;
    let boarding_tx = BoardingTx::new(&params).context("failed to build boarding transaction")?;

    info!(
        txid = %boarding_tx.compute_txid(),
        vout = boarding_tx.boarding_vout(),
        "boarding transaction ready"
    );

    Ok(TemplateReport::new(&boarding_tx))
}

pub(crate) fn handle_commitment(path: &Path) -> anyhow::Result<TemplateReport> {
    let params = params::from_path::<CommitmentConfig>(path)?.into_params()?;
    let commitment_tx =
        CommitmentTx::new(&params).context("failed to build commitment transaction")?;

    info!(txid = %commitment_tx.compute_txid(), "commitment transaction ready");

    Ok(TemplateReport::new(&commitment_tx))
}

pub(crate) fn handle_forfeit(path: &Path) -> anyhow::Result<TemplateReport> {
    let params = params::from_path::<ForfeitConfig>(path)?.into_params()?;
    let forfeit_tx = ForfeitTx::new(&params).context("failed to build forfeit transaction")?;

    info!(txid = %forfeit_tx.compute_txid(), "forfeit transaction ready");

    Ok(TemplateReport::new(&forfeit_tx))
}

pub(crate) fn handle_aggregate(pubkeys: &[PublicKey]) -> anyhow::Result<AggregateReport> {
    let pubkey =
        aggregate_pubkeys(pubkeys.iter().copied()).context("failed to aggregate public keys")?;

    Ok(AggregateReport {
        pubkey,
        xonly_pubkey: pubkey.x_only_public_key().0,
    })
}
