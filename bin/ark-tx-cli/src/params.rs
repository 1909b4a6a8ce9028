//! TOML parameter files of the template commands.
//!
//! Every required field of a builder is optional here so that a missing field is reported by the
//! builder itself.

use std::{fs, path::Path};

use anyhow::{anyhow, Context};
use ark_tx_builder::transactions::prelude::{BoardingParams, CommitmentParams, ForfeitParams};
use ark_tx_primitives::types::UnspentOutput;
use bitcoin::{Amount, FeeRate};
use secp256k1::PublicKey;
use serde::{de::DeserializeOwned, Deserialize};

const fn default_fee_rate() -> u64 {
    1
}

/// Reads and parses the params file at `path`.
pub(crate) fn from_path<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read params file {}", path.display()))?;

    toml::from_str(&contents).map_err(|e| anyhow!("failed to parse params file: {e}"))
}

fn fee_rate(sat_per_vb: u64) -> anyhow::Result<FeeRate> {
    FeeRate::from_sat_per_vb(sat_per_vb).ok_or_else(|| anyhow!("fee rate is too large"))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct BoardingConfig {
    pub(crate) funding_utxo: Option<UnspentOutput>,

    #[serde(default)]
    pub(crate) amount: u64,

    pub(crate) user_pubkey: Option<PublicKey>,

    pub(crate) operator_pubkey: Option<PublicKey>,

    pub(crate) timeout_blocks: u16,

    pub(crate) change_address: Option<String>,

    #[serde(default = "default_fee_rate")]
    pub(crate) fee_rate: u64,
}

impl BoardingConfig {
    pub(crate) fn into_params(self) -> anyhow::Result<BoardingParams> {
        Ok(BoardingParams {
            funding_utxo: self.funding_utxo,
            amount: Amount::from_sat(self.amount),
            user_pubkey: self.user_pubkey,
            operator_pubkey: self.operator_pubkey,
            timeout_blocks: self.timeout_blocks,
            change_address: self.change_address,
            fee_rate: fee_rate(self.fee_rate)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CommitmentConfig {
    #[serde(default)]
    pub(crate) operator_utxos: Vec<UnspentOutput>,

    #[serde(default)]
    pub(crate) boarding_utxos: Vec<UnspentOutput>,

    #[serde(default)]
    pub(crate) batch_amount: u64,

    #[serde(default)]
    pub(crate) connector_amount: u64,

    pub(crate) operator_pubkey: Option<PublicKey>,

    #[serde(default)]
    pub(crate) user_pubkeys: Vec<PublicKey>,

    pub(crate) batch_expiry: u32,

    #[serde(default = "default_fee_rate")]
    pub(crate) fee_rate: u64,
}

impl CommitmentConfig {
    pub(crate) fn into_params(self) -> anyhow::Result<CommitmentParams> {
        Ok(CommitmentParams {
            operator_utxos: self.operator_utxos,
            boarding_utxos: self.boarding_utxos,
            batch_amount: Amount::from_sat(self.batch_amount),
            connector_amount: Amount::from_sat(self.connector_amount),
            operator_pubkey: self.operator_pubkey,
            user_pubkeys: self.user_pubkeys,
            batch_expiry: self.batch_expiry,
            fee_rate: fee_rate(self.fee_rate)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ForfeitConfig {
    pub(crate) vtxo: Option<UnspentOutput>,

    pub(crate) connector_anchor: Option<UnspentOutput>,

    pub(crate) operator_pubkey: Option<PublicKey>,

    #[serde(default = "default_fee_rate")]
    pub(crate) fee_rate: u64,
}

impl ForfeitConfig {
    pub(crate) fn into_params(self) -> anyhow::Result<ForfeitParams> {
        Ok(ForfeitParams {
            vtxo: self.vtxo,
            connector_anchor: self.connector_anchor,
            operator_pubkey: self.operator_pubkey,
            fee_rate: fee_rate(self.fee_rate)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use bitcoin::ScriptBuf;

    use super::*;

    const OPERATOR: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
    const TXID: &str = "f4184fc596403b9d638783cf57adfe4c75c605f6356fbc91338530e9831e9e16";

    #[test]
    fn boarding_config() {
        let config: BoardingConfig = toml::from_str(&format!(
            r#"
            amount = 90000
            operator_pubkey = "{OPERATOR}"
            timeout_blocks = 144
            change_address = "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq"

            [funding_utxo]
            txid = "{TXID}"
            vout = 1
            amount = 100000
            script_pubkey = "0014e8df018c7e326cc253faac7e46cdc51e68542c42"
            "#
        ))
        .expect("config must parse");

        let params = config.into_params().expect("fee rate is valid");
        let funding = params.funding_utxo.expect("funding is set");

        assert_eq!(funding.txid.to_string(), TXID);
        assert_eq!(funding.vout, 1);
        assert_eq!(funding.amount, Amount::from_sat(100_000));
        assert_eq!(
            funding.script_pubkey,
            Some(
                ScriptBuf::from_hex("0014e8df018c7e326cc253faac7e46cdc51e68542c42")
                    .expect("valid hex")
            )
        );
        assert_eq!(params.amount, Amount::from_sat(90_000));
        assert_eq!(params.user_pubkey, None, "absent keys stay absent");
        assert!(params.operator_pubkey.is_some());
        assert_eq!(params.fee_rate, FeeRate::from_sat_per_vb_unchecked(1));
    }

    #[test]
    fn commitment_config() {
        let config: CommitmentConfig = toml::from_str(&format!(
            r#"
            batch_amount = 500000
            operator_pubkey = "{OPERATOR}"
            user_pubkeys = ["{OPERATOR}"]
            batch_expiry = 800000
            fee_rate = 3

            [[operator_utxos]]
            txid = "{TXID}"
            vout = 0
            amount = 600000

            [[operator_utxos]]
            txid = "{TXID}"
            vout = 1
            amount = 1000
            "#
        ))
        .expect("config must parse");

        let params = config.into_params().expect("fee rate is valid");

        assert_eq!(params.operator_utxos.len(), 2);
        assert!(params.boarding_utxos.is_empty());
        assert_eq!(params.connector_amount, Amount::ZERO);
        assert_eq!(params.user_pubkeys.len(), 1);
        assert_eq!(params.fee_rate, FeeRate::from_sat_per_vb_unchecked(3));
    }

    #[test]
    fn forfeit_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("must create temp file");
        write!(
            file,
            r#"
            operator_pubkey = "{OPERATOR}"

            [vtxo]
            txid = "{TXID}"
            vout = 0
            amount = 10000
            "#
        )
        .expect("must write params");

        let config: ForfeitConfig = from_path(file.path()).expect("config must parse");
        let params = config.into_params().expect("fee rate is valid");

        assert!(params.vtxo.is_some());
        assert_eq!(params.connector_anchor, None);
    }

    #[test]
    fn rejects_bad_files() {
        assert!(from_path::<ForfeitConfig>("/nonexistent/forfeit.toml").is_err());
        assert!(toml::from_str::<ForfeitConfig>("unknown = 1").is_err());
        assert!(toml::from_str::<BoardingConfig>("amount = 1").is_err(), "timeout is required");
        assert!(fee_rate(u64::MAX).is_err());
    }
}
