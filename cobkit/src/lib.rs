//! Umbrella crate bundling the core SDK for binding generation.

pub use cobkit_core::*;

pub type CobKitResult<T, E = CobKitError> = std::result::Result<T, E>;
