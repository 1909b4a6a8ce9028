//! This crate builds the unsigned transaction templates of the Ark protocol: the boarding
//! transaction that moves user funds into Ark, the commitment transaction that settles a batch on
//! chain, and the forfeit transaction that ties a spent VTXO to a specific commitment.
//!
//! Builders are pure functions of their parameters. They hold no state and can be invoked
//! concurrently from any number of threads.

pub mod errors;
pub mod outputs;
pub mod transactions;
