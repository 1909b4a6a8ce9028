//! This crate contains the types, constants and pure functions that the Ark transaction builders
//! are assembled from: key aggregation, leaf scripts, taproot commitments, canonical ordering and
//! fee estimation.
//!
//! Everything in this crate is deterministic. Given the same inputs, every function returns the
//! same bytes on every machine, which is what allows the operator and its users to derive the same
//! transaction ids independently. This crate lies at the bottom of the crate-hierarchy in this
//! workspace i.e., it does not depend on any other crate in this workspace.

pub mod constants;
pub mod errors;
pub mod fees;
pub mod key_agg;
pub mod ordering;
pub mod scripts;
pub mod types;

#[cfg(test)]
mod test_utils;
