#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

mod dispatch;
pub use dispatch::{compute_loss, compute_loss_by_name, LossOptions, LossOutput, PoseBatch};

mod error;
pub use error::LossError;

/// Closed-form loss formulas over rendered batches and rotations.
pub mod formulas;

mod method;
pub use method::{LossMethod, MethodSpec};

/// Multiview rendering helpers.
pub mod render;

mod representation;
pub use representation::PoseRepresentation;

/// Step functions with pass-through gradients.
pub mod surrogate;
