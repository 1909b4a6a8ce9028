//! This module exports all transactions in this crate for convenience.

pub use super::{boarding::*, commitment::*, forfeit::*, ArkTx};
