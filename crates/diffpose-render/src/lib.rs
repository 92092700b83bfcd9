#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

mod batch;
pub use batch::ImageBatch;

/// Pinhole camera model.
pub mod camera;

mod error;
pub use error::RenderError;

/// Triangle meshes.
pub mod mesh;

/// CPU soft rasterizer.
pub mod rasterizer;

use diffpose_image::{Image, ImageSize};
use glam::{Mat3, Vec3};

/// A renderer producing single-channel images of an object in a given pose.
///
/// Implementations render `R * p + t` for every model point `p`.
pub trait Renderer {
    /// Size of the rendered images.
    fn image_size(&self) -> ImageSize;

    /// Points sampled on the model surface, in the object frame.
    fn points(&self) -> &[[f32; 3]];

    /// Render a single pose.
    fn render(&self, rotation: &Mat3, translation: Vec3) -> Result<Image<f32, 1>, RenderError>;

    /// Render a batch of poses into a `(batch, 1, H, W)` image batch.
    fn render_batch(
        &self,
        rotations: &[Mat3],
        translations: &[Vec3],
    ) -> Result<ImageBatch, RenderError> {
        if rotations.len() != translations.len() {
            return Err(RenderError::MismatchedBatch(
                rotations.len(),
                translations.len(),
            ));
        }

        let images = rotations
            .iter()
            .zip(translations.iter())
            .map(|(r, t)| self.render(r, *t))
            .collect::<Result<Vec<_>, _>>()?;

        ImageBatch::from_images(&images, self.image_size())
    }
}
