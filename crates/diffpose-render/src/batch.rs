use diffpose_image::{Image, ImageSize};

use crate::error::RenderError;

/// A dense batch of float images with shape `(batch, channels, H, W)`.
///
/// Rendering several views of the same sample stacks them along the channel axis, so a batch
/// with `V` views of single-channel renders has `V` channels.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBatch {
    data: Vec<f32>,
    batch: usize,
    channels: usize,
    size: ImageSize,
}

impl ImageBatch {
    /// Create a batch from raw data in `(batch, channels, H, W)` order.
    pub fn new(
        batch: usize,
        channels: usize,
        size: ImageSize,
        data: Vec<f32>,
    ) -> Result<Self, RenderError> {
        let expected = batch * channels * size.area();
        if data.len() != expected {
            return Err(RenderError::InvalidBatchShape(data.len(), expected));
        }
        Ok(Self {
            data,
            batch,
            channels,
            size,
        })
    }

    /// Create a batch filled with `val`.
    pub fn from_size_val(batch: usize, channels: usize, size: ImageSize, val: f32) -> Self {
        Self {
            data: vec![val; batch * channels * size.area()],
            batch,
            channels,
            size,
        }
    }

    /// Stack single-channel images into a `(N, 1, H, W)` batch.
    pub fn from_images(images: &[Image<f32, 1>], size: ImageSize) -> Result<Self, RenderError> {
        let mut data = Vec::with_capacity(images.len() * size.area());
        for image in images {
            if image.size() != size {
                return Err(RenderError::IncompatibleBatches(format!(
                    "image {} != {}",
                    image.size(),
                    size
                )));
            }
            data.extend_from_slice(image.as_slice());
        }
        Self::new(images.len(), 1, size, data)
    }

    /// Number of samples.
    pub fn batch_size(&self) -> usize {
        self.batch
    }

    /// Number of channels per sample.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Spatial size of every channel.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Number of values per sample, `channels * H * W`.
    pub fn sample_len(&self) -> usize {
        self.channels * self.size.area()
    }

    /// The whole buffer.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// The whole buffer, mutable.
    pub fn as_slice_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// The flattened values of sample `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn sample(&self, index: usize) -> &[f32] {
        let len = self.sample_len();
        &self.data[index * len..(index + 1) * len]
    }

    /// Iterate over the flattened samples.
    pub fn samples(&self) -> impl Iterator<Item = &[f32]> + '_ {
        // chunks_exact panics on a zero chunk size
        let len = self.sample_len().max(1);
        self.data.chunks_exact(len).take(self.batch)
    }

    /// Copy one channel of one sample into an image.
    pub fn channel_image(&self, index: usize, channel: usize) -> Result<Image<f32, 1>, RenderError> {
        if index >= self.batch || channel >= self.channels {
            return Err(RenderError::IncompatibleBatches(format!(
                "no channel {channel} of sample {index} in a {}x{} batch",
                self.batch, self.channels
            )));
        }
        let area = self.size.area();
        let offset = index * self.sample_len() + channel * area;
        Ok(Image::new(
            self.size,
            self.data[offset..offset + area].to_vec(),
        )?)
    }

    /// Return `(x - mean) / std` for every value.
    pub fn normalized(&self, mean: f32, std: f32) -> Self {
        Self {
            data: self.data.iter().map(|&x| (x - mean) / std).collect(),
            batch: self.batch,
            channels: self.channels,
            size: self.size,
        }
    }

    /// Concatenate batches along the channel axis.
    ///
    /// All batches must have the same batch size and spatial size.
    pub fn concat_channels(batches: &[ImageBatch]) -> Result<Self, RenderError> {
        let first = batches
            .first()
            .ok_or_else(|| RenderError::IncompatibleBatches("no batches to concatenate".into()))?;

        for other in batches.iter().skip(1) {
            if other.batch != first.batch || other.size != first.size {
                return Err(RenderError::IncompatibleBatches(format!(
                    "{}x{} != {}x{}",
                    other.batch, other.size, first.batch, first.size
                )));
            }
        }

        let channels = batches.iter().map(|b| b.channels).sum();
        let mut data = Vec::with_capacity(first.batch * channels * first.size.area());
        for index in 0..first.batch {
            for batch in batches {
                data.extend_from_slice(batch.sample(index));
            }
        }

        Self::new(first.batch, channels, first.size, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size() -> ImageSize {
        ImageSize {
            width: 2,
            height: 1,
        }
    }

    #[test]
    fn batch_shape() -> Result<(), RenderError> {
        let batch = ImageBatch::new(2, 3, size(), vec![0.0; 12])?;
        assert_eq!(batch.sample_len(), 6);
        assert_eq!(batch.samples().count(), 2);
        assert_eq!(
            ImageBatch::new(2, 3, size(), vec![0.0; 5]),
            Err(RenderError::InvalidBatchShape(5, 12))
        );
        Ok(())
    }

    #[test]
    fn concat_interleaves_samples() -> Result<(), RenderError> {
        let a = ImageBatch::new(2, 1, size(), vec![1.0, 1.0, 2.0, 2.0])?;
        let b = ImageBatch::new(2, 1, size(), vec![3.0, 3.0, 4.0, 4.0])?;

        let cat = ImageBatch::concat_channels(&[a, b])?;
        assert_eq!(cat.channels(), 2);
        assert_eq!(cat.sample(0), &[1.0, 1.0, 3.0, 3.0]);
        assert_eq!(cat.sample(1), &[2.0, 2.0, 4.0, 4.0]);
        assert_eq!(cat.channel_image(1, 1)?.as_slice(), &[4.0, 4.0]);

        let c = ImageBatch::new(1, 1, size(), vec![0.0, 0.0])?;
        assert!(ImageBatch::concat_channels(&[cat, c]).is_err());
        Ok(())
    }

    #[test]
    fn normalize_batch() -> Result<(), RenderError> {
        let batch = ImageBatch::new(1, 1, size(), vec![2.0, 4.0])?;
        assert_eq!(batch.normalized(2.0, 2.0).as_slice(), &[0.0, 1.0]);
        Ok(())
    }
}
