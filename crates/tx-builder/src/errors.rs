//! Error types for the transaction builders.

use std::fmt;

use ark_tx_primitives::errors::{AggError, TaprootError};
use bitcoin::{address, psbt, sighash, Amount, FeeRate};
use thiserror::Error;

/// The rule that an amount violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AmountViolation {
    /// The amount is zero.
    Zero,

    /// The amount is below the dust limit.
    BelowDust,

    /// Summing the amount with others overflows.
    Overflow,
}

impl fmt::Display for AmountViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmountViolation::Zero => write!(f, "must be positive"),
            AmountViolation::BelowDust => write!(f, "below dust limit"),
            AmountViolation::Overflow => write!(f, "overflows"),
        }
    }
}

/// Errors that can occur while building a transaction.
///
/// Every variant is a deterministic function of the parameters, so retrying a build with the same
/// parameters always fails the same way.
#[derive(Debug, Error)]
pub enum TxBuilderError {
    /// A required UTXO, key or address was not supplied.
    #[error("missing required input: {field}")]
    MissingInput {
        /// The name of the missing field.
        field: &'static str,
    },

    /// An amount violates the rules of the protocol.
    #[error("invalid amount {amount} for {field}: {reason}")]
    InvalidAmount {
        /// The name of the offending field.
        field: &'static str,
        /// The offending amount.
        amount: Amount,
        /// The rule that the amount violates.
        reason: AmountViolation,
    },

    /// The inputs cannot cover the outputs along with the fee.
    #[error("insufficient funds: available {available}, required {required}")]
    InsufficientFunds {
        /// The total value of the inputs.
        available: Amount,
        /// The minimum total value the inputs must have.
        required: Amount,
    },

    /// The change address could not be decoded.
    #[error("malformed address {address}: {source}")]
    MalformedAddress {
        /// The address as supplied.
        address: String,
        /// The decoding failure.
        source: address::ParseError,
    },

    /// The keys for a cooperative spending path could not be aggregated.
    #[error("key aggregation: {0}")]
    Aggregation(#[from] AggError),

    /// The taproot commitment of an output could not be computed.
    #[error("taproot: {0}")]
    Taproot(#[from] TaprootError),

    /// The unsigned transaction could not be wrapped in a PSBT.
    #[error("psbt: {0}")]
    Psbt(#[from] psbt::Error),

    /// A signature hash could not be computed.
    #[error("sighash: {0}")]
    Sighash(#[from] sighash::TaprootError),

    /// The fee at the supplied fee rate overflows.
    #[error("invalid fee rate: {0:?}")]
    InvalidFeeRate(FeeRate),
}

impl TxBuilderError {
    pub(crate) const fn missing(field: &'static str) -> Self {
        TxBuilderError::MissingInput { field }
    }

    pub(crate) const fn invalid_amount(
        field: &'static str,
        amount: Amount,
        reason: AmountViolation,
    ) -> Self {
        TxBuilderError::InvalidAmount {
            field,
            amount,
            reason,
        }
    }
}

/// Wrapper type for results that can fail with a [`TxBuilderError`].
pub type TxBuilderResult<T> = Result<T, TxBuilderError>;
