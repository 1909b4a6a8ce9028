//! This module contains the key aggregation used for the cooperative spending paths.
//!
//! Every key is weighted by a coefficient that commits to the entire key set before the points
//! are summed:
//!
//! ```text
//! L   = SHA256(x(P_1) || x(P_2) || ... || x(P_n))    (keys sorted by x-only encoding)
//! a_i = SHA256(L || x(P_i))                           (reduced modulo the curve order)
//! Q   = a_1·P_1 + a_2·P_2 + ... + a_n·P_n
//! ```

use bitcoin::hashes::{sha256, Hash, HashEngine};
use secp256k1::{constants::CURVE_ORDER, PublicKey, Scalar, XOnlyPublicKey, SECP256K1};

use crate::errors::AggError;

/// Aggregates the `public_keys` into a single [`PublicKey`].
///
/// The result does not depend on the order in which the keys are supplied.
///
/// Note that a single key does *not* aggregate to itself, as it is still scaled by its
/// coefficient.
///
/// # Errors
///
/// If no keys are supplied or if the weighted keys sum up to the point at infinity.
pub fn aggregate_pubkeys(
    public_keys: impl IntoIterator<Item = PublicKey>,
) -> Result<PublicKey, AggError> {
    let mut sorted_keys: Vec<PublicKey> = public_keys.into_iter().collect();
    if sorted_keys.is_empty() {
        return Err(AggError::EmptyKeySet);
    }

    sorted_keys.sort_by_key(|key| key.x_only_public_key().0.serialize());

    let key_list_hash = hash_key_list(&sorted_keys);

    let weighted_keys = sorted_keys
        .iter()
        .map(|key| {
            let coefficient = key_coefficient(&key_list_hash, key);

            key.mul_tweak(SECP256K1, &coefficient)
                .map_err(AggError::InvalidCoefficient)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let weighted_keys: Vec<&PublicKey> = weighted_keys.iter().collect();

    PublicKey::combine_keys(&weighted_keys).map_err(|_| AggError::PointAtInfinity)
}

/// Aggregates the `public_keys` and returns the [`XOnlyPublicKey`] of the result.
///
/// This is the form in which the aggregated key appears in leaf scripts.
pub fn aggregated_xonly_pubkey(
    public_keys: impl IntoIterator<Item = PublicKey>,
) -> Result<XOnlyPublicKey, AggError> {
    Ok(aggregate_pubkeys(public_keys)?.x_only_public_key().0)
}

/// Computes `L`, the hash of the x-only encodings of the sorted key set.
fn hash_key_list(sorted_keys: &[PublicKey]) -> sha256::Hash {
    let mut engine = sha256::Hash::engine();
    for key in sorted_keys {
        engine.input(&key.x_only_public_key().0.serialize());
    }

    sha256::Hash::from_engine(engine)
}

/// Computes the coefficient `a_i = SHA256(L || x(P_i))` of a single key.
fn key_coefficient(key_list_hash: &sha256::Hash, key: &PublicKey) -> Scalar {
    let mut engine = sha256::Hash::engine();
    engine.input(key_list_hash.as_byte_array());
    engine.input(&key.x_only_public_key().0.serialize());

    scalar_from_hash(sha256::Hash::from_engine(engine).to_byte_array())
}

/// Interprets a 32-byte big-endian hash as a scalar modulo the curve order.
///
/// Any 256-bit value is smaller than twice the curve order, so one subtraction suffices.
fn scalar_from_hash(hash: [u8; 32]) -> Scalar {
    match Scalar::from_be_bytes(hash) {
        Ok(scalar) => scalar,
        Err(_) => {
            let reduced = sub_curve_order(hash);
            // `reduced` is strictly smaller than the curve order.
            Scalar::from_be_bytes(reduced).unwrap_or(Scalar::ZERO)
        }
    }
}

/// Subtracts the curve order from a big-endian 256-bit value that is at least the curve order.
fn sub_curve_order(value: [u8; 32]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut borrow = 0u16;

    for i in (0..32).rev() {
        let minuend = value[i] as u16;
        let subtrahend = CURVE_ORDER[i] as u16 + borrow;

        if minuend >= subtrahend {
            result[i] = (minuend - subtrahend) as u8;
            borrow = 0;
        } else {
            result[i] = (minuend + 0x100 - subtrahend) as u8;
            borrow = 1;
        }
    }

    result
}
