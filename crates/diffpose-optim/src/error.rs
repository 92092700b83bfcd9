use diffpose_image::ImageError;
use diffpose_render::RenderError;

/// An error type for the optimization.
#[derive(thiserror::Error, Debug)]
pub enum OptimError {
    /// Error comparing the render with the target.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error rendering the current estimate.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The gradient does not match the parameters.
    #[error("Gradient length {0} does not match the {1} parameters")]
    MismatchedGradient(usize, usize),

    /// The finite difference step is not positive.
    #[error("Invalid finite difference step: {0}")]
    InvalidStep(f32),

    /// The frame callback failed.
    #[error("Frame sink failed: {0}")]
    FrameSink(Box<dyn std::error::Error + Send + Sync>),
}
