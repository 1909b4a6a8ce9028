//! This module contains constants related to how the Ark transactions are constructed.
//!
//! These constants are integral to the protocol i.e., changing any of them changes the transaction
//! ids produced by the builders and breaks agreement between the operator and its users. These
//! values must be known at compile-time.

use std::sync::LazyLock;

use bitcoin::{absolute::LockTime, transaction::Version, Amount, FeeRate, Sequence, TapSighashType};
use secp256k1::XOnlyPublicKey;

/// The version of every transaction produced by the builders.
pub const TX_VERSION: Version = Version::TWO;

/// The lock time of every transaction produced by the builders.
///
/// Absolute timelocks are enforced in-script via `OP_CLTV` and never through this field.
pub const LOCK_TIME: LockTime = LockTime::ZERO;

/// The sequence of the input in a boarding transaction.
///
/// Signals replace-by-fee without enabling any relative locktime on the input (`0xFFFFFFFD`).
pub const SEQ_BOARDING: Sequence = Sequence::ENABLE_RBF_NO_LOCKTIME;

/// The sequence of every input in a commitment transaction (`0xFFFFFFFF`).
pub const SEQ_COMMITMENT: Sequence = Sequence::MAX;

/// The sequence of both inputs in a forfeit transaction.
pub const SEQ_FORFEIT: Sequence = SEQ_COMMITMENT;

/// The minimum value an output must carry to be created by the builders.
///
/// Change below or equal to this amount is dropped and left to the miners, and the connector
/// output of a commitment transaction is floored to it.
pub const DUST_LIMIT: Amount = Amount::from_sat(546);

/// The minimum fee rate of 1 sat/vB.
///
/// Lower fee rates are silently raised to this value.
pub const MIN_FEE_RATE: FeeRate = FeeRate::from_sat_per_vb_unchecked(1);

/// The estimated witness size (in bytes) of a single input spending a P2TR output.
///
/// This accounts for a schnorr signature along with the leaf script and control block overhead.
pub const P2TR_INPUT_WITNESS_SIZE: usize = 66;

/// The sighash type that the forfeit transaction must be signed with.
///
/// This commits to every input and output so that the forfeit is bound to exactly one commitment
/// transaction and cannot be replayed against another.
pub const FORFEIT_SIGHASH_TYPE: TapSighashType = TapSighashType::All;

/// The x-coordinate of the point `H` from
/// [BIP-341](https://github.com/bitcoin/bips/blob/master/bip-0341.mediawiki#constructing-and-spending-taproot-outputs),
/// obtained by hashing the standard uncompressed encoding of the secp256k1 generator.
const UNSPENDABLE_PUBLIC_KEY_BYTES: [u8; 32] = [
    0x50, 0x92, 0x9b, 0x74, 0xc1, 0xa0, 0x49, 0x54, 0xb7, 0x8b, 0x4b, 0x60, 0x35, 0xe9, 0x7a, 0x5e,
    0x07, 0x8a, 0x5a, 0x0f, 0x28, 0xec, 0x96, 0xd5, 0x47, 0xbf, 0xee, 0x9a, 0xce, 0x80, 0x3a, 0xc0,
];

/// A verifiably unspendable public key with no known discrete logarithm.
///
/// Used as the internal key of every taproot output whose key path must be unusable, so that the
/// output can only be spent via one of the leaves in its script tree.
pub static UNSPENDABLE_INTERNAL_KEY: LazyLock<XOnlyPublicKey> = LazyLock::new(|| {
    XOnlyPublicKey::from_slice(&UNSPENDABLE_PUBLIC_KEY_BYTES).expect("valid xonly public key")
});
