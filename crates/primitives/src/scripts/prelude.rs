//! This module exports the script helpers in this module for convenience.
pub use super::{general::*, taproot::*};
