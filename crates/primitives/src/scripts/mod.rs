//! Bitcoin scripts.

pub mod general;
pub mod prelude;
pub mod taproot;
