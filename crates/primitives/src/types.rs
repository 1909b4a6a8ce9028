//! Value types shared by the transaction builders.

use bitcoin::{Amount, OutPoint, ScriptBuf, TxOut, Txid};
use serde::{Deserialize, Serialize};

/// A spendable output of a previous transaction.
///
/// The `script_pubkey` is optional because the builders only need the outpoint and the amount to
/// construct a transaction. It is however required to compute signature hashes over the
/// transaction, since taproot sighashes commit to the scripts of all the spent outputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnspentOutput {
    /// The id of the transaction that created this output.
    pub txid: Txid,

    /// The index of this output in the transaction that created it.
    pub vout: u32,

    /// The value locked in this output.
    #[serde(with = "bitcoin::amount::serde::as_sat")]
    pub amount: Amount,

    /// The locking script of this output, if known.
    #[serde(default)]
    pub script_pubkey: Option<ScriptBuf>,
}

impl UnspentOutput {
    /// Creates a new unspent output whose locking script is not known.
    pub const fn new(txid: Txid, vout: u32, amount: Amount) -> Self {
        Self {
            txid,
            vout,
            amount,
            script_pubkey: None,
        }
    }

    /// Attaches the locking script of this output.
    pub fn with_script_pubkey(mut self, script_pubkey: ScriptBuf) -> Self {
        self.script_pubkey = Some(script_pubkey);
        self
    }

    /// Gets the reference to this output.
    pub const fn outpoint(&self) -> OutPoint {
        OutPoint {
            txid: self.txid,
            vout: self.vout,
        }
    }

    /// Converts this output into a [`TxOut`], if the locking script is known.
    pub fn to_tx_out(&self) -> Option<TxOut> {
        self.script_pubkey.as_ref().map(|script_pubkey| TxOut {
            value: self.amount,
            script_pubkey: script_pubkey.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::generate_txid;

    use super::*;

    #[test]
    fn test_tx_out_requires_script() {
        let utxo = UnspentOutput::new(generate_txid(), 3, Amount::from_sat(10_000));
        assert_eq!(utxo.outpoint().vout, 3);
        assert!(utxo.to_tx_out().is_none(), "script is unknown");

        let script_pubkey = ScriptBuf::from_bytes(vec![0x51]);
        let utxo = utxo.with_script_pubkey(script_pubkey.clone());
        let tx_out = utxo.to_tx_out().expect("script is known");

        assert_eq!(tx_out.value, Amount::from_sat(10_000));
        assert_eq!(tx_out.script_pubkey, script_pubkey);
    }
}
