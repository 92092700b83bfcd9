#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! Rotations are `glam::Mat3` acting on column vectors, `p_cam = R * p_model + t`.

/// Chamfer distance between point sets.
pub mod chamfer;

/// Error types for the 3d module.
pub mod error;

/// Linear algebra utilities.
pub mod linalg;

/// Point cloud container.
pub mod pointcloud;

/// Conversions from pose encodings to rotation matrices.
pub mod rotation;

/// Random viewpoint sampling.
pub mod sampling;

pub use error::GeometryError;
