//! Error types for the primitives.

use thiserror::Error;

/// Error while aggregating public keys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggError {
    /// No public keys were supplied.
    #[error("at least one public key is required for aggregation")]
    EmptyKeySet,

    /// The coefficient derived for a key is not a usable scalar.
    #[error("invalid key coefficient: {0}")]
    InvalidCoefficient(secp256k1::Error),

    /// The weighted contributions of the keys cancel out.
    #[error("aggregated public key is the point at infinity")]
    PointAtInfinity,
}

/// Error while committing to a taproot output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaprootError {
    /// Tweaking the internal key with the merkle root failed.
    #[error("could not tweak internal key: {0}")]
    Tweak(#[from] secp256k1::Error),
}

