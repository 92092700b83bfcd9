#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

mod adam;
pub use adam::{Adam, AdamConfig};

mod error;
pub use error::OptimError;

/// Numerical gradients.
pub mod gradient;

mod refine;
pub use refine::{refine_orientation, RefineConfig, RefineResult};
