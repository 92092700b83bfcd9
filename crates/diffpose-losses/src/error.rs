use diffpose_3d::GeometryError;
use diffpose_render::RenderError;

/// An error type for the loss computation.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum LossError {
    /// Error converting a pose to a rotation.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Error rendering the poses.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The loss method identifier is not known.
    #[error("Unknown loss method: {0}")]
    UnknownMethod(String),

    /// The pose representation identifier is not known.
    #[error("Unknown pose representation: {0}")]
    UnknownRepresentation(String),

    /// The inputs do not describe the same number of samples.
    #[error("Mismatched number of samples: {0} != {1}")]
    MismatchedSamples(usize, usize),

    /// A predicted row has the wrong number of values for the method.
    #[error("Invalid pose row length. Expected {0}, got {1}")]
    InvalidRowLength(usize, usize),

    /// At least one view is needed to render.
    #[error("At least one view is required")]
    NoViews,

    /// The batch is empty.
    #[error("The pose batch is empty")]
    EmptyBatch,

    /// The method reads confidence and hypothesis rows, not single poses.
    #[error("{0} expects confidence and hypothesis rows")]
    HypothesisMethod(String),

    /// The weight is outside of its valid range.
    #[error("Invalid loss weight: {0}")]
    InvalidWeight(f32),
}
