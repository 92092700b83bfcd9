use crate::interpolation::{interpolate_pixel, InterpolationMode};
use diffpose_image::{Image, ImageDtype, ImageError, ImageSize};
use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

/// Map a destination index to a source coordinate through the pixel centers.
///
/// `(i + 0.5) * src / dst - 0.5`, the mapping of OpenCV's `resize`. Coordinates that fall
/// before the first center or after the last one are clamped by the kernels.
fn source_coordinate(i: usize, dst_len: usize, src_len: usize) -> f32 {
    (i as f32 + 0.5) * src_len as f32 / dst_len as f32 - 0.5
}

/// Resize an image to a new size.
///
/// The function resizes an image to the size of `dst` using the specified interpolation mode.
/// It supports any number of channels and data types.
///
/// # Arguments
///
/// * `src` - The input image container.
/// * `dst` - The output image container.
/// * `interpolation` - The interpolation mode to use.
///
/// # Example
///
/// ```
/// use diffpose_image::{Image, ImageSize};
/// use diffpose_imgproc::resize::resize_native;
/// use diffpose_imgproc::interpolation::InterpolationMode;
///
/// let image = Image::<_, 3>::new(
///     ImageSize {
///         width: 4,
///         height: 5,
///     },
///     vec![0f32; 4 * 5 * 3],
/// )
/// .unwrap();
///
/// let new_size = ImageSize {
///     width: 2,
///     height: 3,
/// };
///
/// let mut image_resized = Image::<_, 3>::from_size_val(new_size, 0.0).unwrap();
///
/// resize_native(&image, &mut image_resized, InterpolationMode::Nearest).unwrap();
///
/// assert_eq!(image_resized.size().width, 2);
/// assert_eq!(image_resized.size().height, 3);
/// ```
pub fn resize_native<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    interpolation: InterpolationMode,
) -> Result<(), ImageError>
where
    T: ImageDtype,
{
    if src.size().area() == 0 || dst.size().area() == 0 {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    let (src_cols, src_rows) = (src.cols(), src.rows());
    let (dst_cols, dst_rows) = (dst.cols(), dst.rows());

    dst.as_slice_mut()
        .par_chunks_exact_mut(dst_cols * C)
        .enumerate()
        .for_each(|(row, dst_row)| {
            let v = source_coordinate(row, dst_rows, src_rows);
            for (col, out) in dst_row.chunks_exact_mut(C).enumerate() {
                let u = source_coordinate(col, dst_cols, src_cols);
                let pixel = interpolate_pixel(src, u, v, interpolation);
                for (o, p) in out.iter_mut().zip(pixel.iter()) {
                    *o = T::from_f32(*p);
                }
            }
        });

    Ok(())
}

/// Resize an image and return a newly allocated image of the given size.
pub fn resize<T, const C: usize>(
    src: &Image<T, C>,
    new_size: ImageSize,
    interpolation: InterpolationMode,
) -> Result<Image<T, C>, ImageError>
where
    T: ImageDtype,
{
    let mut dst = Image::from_size_val(new_size, T::default())?;
    resize_native(src, &mut dst, interpolation)?;
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use crate::interpolation::InterpolationMode;
    use diffpose_image::{Image, ImageError, ImageSize};

    #[test]
    fn resize_smoke_ch3() -> Result<(), ImageError> {
        let image = Image::<_, 3>::new(
            ImageSize {
                width: 4,
                height: 5,
            },
            vec![0u8; 4 * 5 * 3],
        )?;

        let new_size = ImageSize {
            width: 2,
            height: 3,
        };

        let image_resized = super::resize(&image, new_size, InterpolationMode::Bilinear)?;

        assert_eq!(image_resized.num_channels(), 3);
        assert_eq!(image_resized.size(), new_size);

        Ok(())
    }

    #[test]
    fn resize_same_size_is_identity() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 3,
            height: 2,
        };
        let image = Image::<u8, 1>::new(size, vec![1, 2, 3, 4, 5, 6])?;

        let resized = super::resize(&image, size, InterpolationMode::Nearest)?;
        assert_eq!(resized.as_slice(), image.as_slice());

        let resized = super::resize(&image, size, InterpolationMode::Bilinear)?;
        assert_eq!(resized.as_slice(), image.as_slice());

        Ok(())
    }

    #[test]
    fn resize_upscale_bilinear() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new(
            ImageSize {
                width: 2,
                height: 1,
            },
            vec![0.0, 4.0],
        )?;

        let resized = super::resize(
            &image,
            ImageSize {
                width: 3,
                height: 1,
            },
            InterpolationMode::Bilinear,
        )?;
        assert_eq!(resized.as_slice(), &[0.0, 2.0, 4.0]);

        Ok(())
    }

    #[test]
    fn resize_samples_pixel_centers() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new(
            ImageSize {
                width: 4,
                height: 1,
            },
            vec![0.0, 1.0, 2.0, 3.0],
        )?;
        let half = ImageSize {
            width: 2,
            height: 1,
        };

        // each output pixel averages the two source pixels it covers
        let resized = super::resize(&image, half, InterpolationMode::Bilinear)?;
        assert_eq!(resized.as_slice(), &[0.5, 2.5]);

        let resized = super::resize(&image, half, InterpolationMode::Nearest)?;
        assert_eq!(resized.as_slice(), &[1.0, 3.0]);

        Ok(())
    }

    #[test]
    fn resize_empty_fails() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::new(
            ImageSize {
                width: 0,
                height: 0,
            },
            vec![],
        )?;
        let mut dst = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 2,
                height: 2,
            },
            0,
        )?;
        assert!(super::resize_native(&image, &mut dst, InterpolationMode::Nearest).is_err());
        Ok(())
    }
}
