//! Test utilities for the primitives.
//!
//! These utilities are not written in the `test-utils` crate to keep the primitives crate
//! completely independent.
use std::collections::HashSet;

use bitcoin::{
    hashes::Hash,
    key::rand::{rngs::OsRng, Rng},
    secp256k1::{Keypair, PublicKey, SecretKey, SECP256K1},
    Txid,
};

/// Generates `count` distinct random public keys.
pub(crate) fn generate_pubkeys(count: usize) -> Vec<PublicKey> {
    let mut pubkeys: Vec<PublicKey> = Vec::with_capacity(count);
    let mut pubkeys_set: HashSet<PublicKey> = HashSet::new();

    while pubkeys_set.len() != count {
        let sk = SecretKey::new(&mut OsRng);
        let keypair = Keypair::from_secret_key(SECP256K1, &sk);
        let pubkey = PublicKey::from_keypair(&keypair);

        if pubkeys_set.insert(pubkey) {
            pubkeys.push(pubkey);
        }
    }

    pubkeys
}

/// Derives the public key of the secret key whose bytes are all `seed`.
///
/// `seed` must be non-zero.
pub(crate) fn pubkey_from_seed(seed: u8) -> PublicKey {
    let sk = SecretKey::from_slice(&[seed; 32]).expect("seed must produce a valid secret key");

    PublicKey::from_secret_key(SECP256K1, &sk)
}

/// Generates a random transaction ID.
pub(crate) fn generate_txid() -> Txid {
    let mut txid = [0u8; 32];
    OsRng.fill(&mut txid);

    Txid::from_byte_array(txid)
}
