//! Module to generate keys, txids and unspent outputs for testing.
use std::collections::HashSet;

use ark_tx_primitives::types::UnspentOutput;
use bitcoin::{
    hashes::Hash,
    key::rand::{rngs::OsRng, Rng},
    Amount, OutPoint, ScriptBuf, Txid,
};
use secp256k1::{Keypair, PublicKey, SecretKey, XOnlyPublicKey, SECP256K1};

/// Derives the keypair whose secret key bytes are all `seed`.
///
/// # Panics
///
/// If `seed` is zero or the repeated bytes exceed the curve order.
pub fn keypair_from_seed(seed: u8) -> Keypair {
    let sk = SecretKey::from_slice(&[seed; 32]).expect("seed must produce a valid secret key");

    Keypair::from_secret_key(SECP256K1, &sk)
}

/// Derives the public key whose secret key bytes are all `seed`.
pub fn pubkey_from_seed(seed: u8) -> PublicKey {
    keypair_from_seed(seed).public_key()
}

/// Generates a random keypair.
pub fn generate_keypair() -> Keypair {
    let sk = SecretKey::new(&mut OsRng);

    Keypair::from_secret_key(SECP256K1, &sk)
}

/// Generates `count` distinct random public keys.
pub fn generate_pubkeys(count: usize) -> Vec<PublicKey> {
    let mut pubkeys: Vec<PublicKey> = Vec::with_capacity(count);
    let mut pubkeys_set: HashSet<PublicKey> = HashSet::new();

    while pubkeys_set.len() != count {
        let pubkey = generate_keypair().public_key();

        if pubkeys_set.insert(pubkey) {
            pubkeys.push(pubkey);
        }
    }

    pubkeys
}

/// Generates a random transaction ID.
pub fn generate_txid() -> Txid {
    let mut txid = [0u8; 32];
    OsRng.fill(&mut txid);

    Txid::from_byte_array(txid)
}

/// Creates the transaction ID whose bytes are all `seed`.
pub fn fixed_txid(seed: u8) -> Txid {
    Txid::from_byte_array([seed; 32])
}

/// Generates a random outpoint.
pub fn generate_outpoint() -> OutPoint {
    let vout: u32 = OsRng.gen_range(0..16);

    OutPoint {
        txid: generate_txid(),
        vout,
    }
}

/// Creates the key-path-only P2TR locking script of `pubkey`.
pub fn p2tr_script_pubkey(pubkey: XOnlyPublicKey) -> ScriptBuf {
    ScriptBuf::new_p2tr(SECP256K1, pubkey, None)
}

/// Generates an unspent output of `amount` at a random outpoint, locked to a random P2TR key.
pub fn generate_utxo(amount: Amount) -> UnspentOutput {
    let outpoint = generate_outpoint();
    let pubkey = generate_keypair().x_only_public_key().0;

    UnspentOutput::new(outpoint.txid, outpoint.vout, amount)
        .with_script_pubkey(p2tr_script_pubkey(pubkey))
}

/// Creates an unspent output of `amount` at `vout` of the [`fixed_txid`] for `seed`, locked to the
/// P2TR key derived from the same `seed`.
pub fn fixed_utxo(seed: u8, vout: u32, amount: Amount) -> UnspentOutput {
    let pubkey = keypair_from_seed(seed).x_only_public_key().0;

    UnspentOutput::new(fixed_txid(seed), vout, amount)
        .with_script_pubkey(p2tr_script_pubkey(pubkey))
}

/// Proptest generators for bitcoin types.
pub mod prop_test_generators {
    use proptest::{prelude::*, prop_compose};

    use super::*;

    prop_compose! {
        /// Generates an arbitrary [`Amount`] between 1 sat and 1 BTC.
        pub fn arb_amount()(sats in 1..=Amount::ONE_BTC.to_sat()) -> Amount {
            Amount::from_sat(sats)
        }
    }

    prop_compose! {
        /// Generates an arbitrary [`Txid`].
        pub fn arb_txid()(bytes in any::<[u8; 32]>()) -> Txid {
            Txid::from_byte_array(bytes)
        }
    }

    prop_compose! {
        /// Generates an arbitrary [`PublicKey`] from a seeded secret key.
        pub fn arb_pubkey()(seed in 1u8..=0xfe) -> PublicKey {
            pubkey_from_seed(seed)
        }
    }

    prop_compose! {
        /// Generates an arbitrary [`UnspentOutput`] without a locking script.
        pub fn arb_utxo()(txid in arb_txid(), vout in 0u32..16, amount in arb_amount()) -> UnspentOutput {
            UnspentOutput::new(txid, vout, amount)
        }
    }
}
