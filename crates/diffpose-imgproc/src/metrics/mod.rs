//! Image similarity metrics.
//!
//! - **SSE** (Sum of Squared Errors): the photometric objective used by pose refinement

mod mse;

pub use mse::sse;

use diffpose_image::{Image, ImageError};

pub(crate) fn check_same_size<const C: usize>(
    image1: &Image<f32, C>,
    image2: &Image<f32, C>,
) -> Result<(), ImageError> {
    if image1.size() != image2.size() {
        return Err(ImageError::InvalidImageSize(
            image1.height(),
            image1.width(),
            image2.height(),
            image2.width(),
        ));
    }
    Ok(())
}
