//! Shared constants used across the metadata, connection and comparer modules.

mod constants;

pub use constants::*;
