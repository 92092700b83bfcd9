use diffpose_3d::GeometryError;
use diffpose_image::ImageError;

/// An error type for the render module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RenderError {
    /// Error from the image module.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error from the geometry module.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// The number of rotations and translations differ.
    #[error("Got {0} rotations but {1} translations")]
    MismatchedBatch(usize, usize),

    /// The data length does not match the batch shape.
    #[error("Data length ({0}) does not match the batch shape ({1})")]
    InvalidBatchShape(usize, usize),

    /// Batches that must share a shape do not.
    #[error("Batch shapes differ: {0}")]
    IncompatibleBatches(String),

    /// The mesh geometry is inconsistent.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// The output image has no pixels.
    #[error("Cannot render into an empty image ({0}x{1})")]
    EmptyImage(usize, usize),

    /// The mesh has no faces to render.
    #[error("Mesh has no faces")]
    EmptyMesh,
}
