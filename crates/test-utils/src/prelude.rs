//! This module exports the most commonly used fixtures for convenience.

pub use super::bitcoin::{
    fixed_txid, fixed_utxo, generate_keypair, generate_outpoint, generate_pubkeys, generate_txid,
    generate_utxo, keypair_from_seed, p2tr_script_pubkey, pubkey_from_seed,
};
