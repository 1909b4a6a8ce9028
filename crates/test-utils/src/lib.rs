//! This crate provides test-utilities for the Ark transaction builders.
//!
//! Fixtures come in two flavours: seeded ones that produce the same keys and txids on every run
//! (for determinism tests) and random ones backed by the OS RNG (for everything else).

pub mod bitcoin;
pub mod prelude;
