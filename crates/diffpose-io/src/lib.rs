#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the io module.
pub mod error;

/// High-level read and write functions for images.
pub mod functional;

/// Animated GIF writer.
pub mod gif;

pub use error::IoError;
