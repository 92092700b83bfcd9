#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// image cropping module.
pub mod crop;

/// utilities for interpolation.
pub mod interpolation;

/// image processing metrics module.
pub mod metrics;

/// utility functions for resizing images.
pub mod resize;
