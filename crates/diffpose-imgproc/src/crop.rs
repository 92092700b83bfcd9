use diffpose_image::{Image, ImageDtype, ImageError, ImageSize};
use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

use crate::interpolation::InterpolationMode;
use crate::resize::resize;

/// Crop an image to a specified region.
///
/// # Arguments
///
/// * `src` - The source image to crop.
/// * `dst` - The destination image to store the cropped image.
/// * `x` - The x-coordinate of the top-left corner of the region to crop.
/// * `y` - The y-coordinate of the top-left corner of the region to crop.
///
/// # Examples
///
/// ```rust
/// use diffpose_image::{Image, ImageSize};
/// use diffpose_imgproc::crop::crop_image;
///
/// let image = Image::<_, 1>::new(ImageSize { width: 4, height: 4 }, vec![
///     0u8, 1, 2, 3,
///     4u8, 5, 6, 7,
///     8u8, 9, 10, 11,
///     12u8, 13, 14, 15
/// ]).unwrap();
///
/// let mut cropped = Image::<_, 1>::from_size_val(ImageSize { width: 2, height: 2 }, 0u8).unwrap();
///
/// crop_image(&image, &mut cropped, 1, 1).unwrap();
///
/// assert_eq!(cropped.as_slice(), &[5u8, 6, 9, 10]);
/// ```
pub fn crop_image<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    x: usize,
    y: usize,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync,
{
    if x + dst.cols() > src.cols() || y + dst.rows() > src.rows() {
        return Err(ImageError::InvalidCropRegion(
            x,
            x + dst.cols(),
            y,
            y + dst.rows(),
        ));
    }

    let dst_cols = dst.cols();
    if dst_cols == 0 {
        return Ok(());
    }

    let src_cols = src.cols();
    let src_data = src.as_slice();

    dst.as_slice_mut()
        .par_chunks_exact_mut(dst_cols * C)
        .enumerate()
        .for_each(|(i, dst_row)| {
            // get the slice at the top left corner
            let offset = (y + i) * src_cols * C + x * C;
            dst_row.copy_from_slice(&src_data[offset..offset + dst_cols * C]);
        });

    Ok(())
}

/// An axis-aligned bounding box in pixel units, stored as `(x, y, w, h)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    /// x-coordinate of the top-left corner.
    pub x: i32,
    /// y-coordinate of the top-left corner.
    pub y: i32,
    /// width of the box.
    pub w: i32,
    /// height of the box.
    pub h: i32,
}

impl BoundingBox {
    /// Whether the box has no area.
    pub fn is_degenerate(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }
}

impl From<[i32; 4]> for BoundingBox {
    fn from(xywh: [i32; 4]) -> Self {
        Self {
            x: xywh[0],
            y: xywh[1],
            w: xywh[2],
            h: xywh[3],
        }
    }
}

/// A crop region in image coordinates, half-open on the right and bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    /// first column of the region.
    pub left: usize,
    /// first row of the region.
    pub top: usize,
    /// one past the last column.
    pub right: usize,
    /// one past the last row.
    pub bottom: usize,
}

impl CropRegion {
    /// Size of the region in pixels.
    pub fn size(&self) -> ImageSize {
        ImageSize {
            width: self.right - self.left,
            height: self.bottom - self.top,
        }
    }
}

/// Parameters for [`extract_square_patch`].
#[derive(Debug, Clone, Copy)]
pub struct SquarePatchParams {
    /// scale applied to the longest side of the box.
    pub pad_factor: f64,
    /// output resolution of the patch.
    pub size: ImageSize,
    /// interpolation used to resize the patch.
    pub interpolation: InterpolationMode,
    /// zero the pixels of the patch outside the original box.
    pub black_borders: bool,
}

impl Default for SquarePatchParams {
    fn default() -> Self {
        Self {
            pad_factor: 1.2,
            size: ImageSize {
                width: 128,
                height: 128,
            },
            interpolation: InterpolationMode::Bilinear,
            black_borders: false,
        }
    }
}

/// Compute the square region centered on `bbox`, scaled by `pad_factor` and clamped to the image.
///
/// # Errors
///
/// Returns [`ImageError::InvalidCropRegion`] if the clamped region is empty.
pub fn square_region(
    image_size: ImageSize,
    bbox: &BoundingBox,
    pad_factor: f64,
) -> Result<CropRegion, ImageError> {
    let size = (bbox.w.max(bbox.h) as f64 * pad_factor).trunc();
    let half = size / 2.0;

    let cx = bbox.x as f64 + bbox.w as f64 / 2.0;
    let cy = bbox.y as f64 + bbox.h as f64 / 2.0;

    // truncate toward zero after clamping, coordinates are never negative here
    let left = (cx - half).max(0.0).trunc();
    let right = (cx + half).min(image_size.width as f64).trunc();
    let top = (cy - half).max(0.0).trunc();
    let bottom = (cy + half).min(image_size.height as f64).trunc();

    if right <= left || bottom <= top {
        return Err(ImageError::InvalidCropRegion(
            left.max(0.0) as usize,
            right.max(0.0) as usize,
            top.max(0.0) as usize,
            bottom.max(0.0) as usize,
        ));
    }

    Ok(CropRegion {
        left: left as usize,
        top: top as usize,
        right: right as usize,
        bottom: bottom as usize,
    })
}

/// Zero every pixel of `crop` lying outside `bbox`, where `crop` was taken at `region`.
pub fn zero_outside_box<T, const C: usize>(
    crop: &mut Image<T, C>,
    region: &CropRegion,
    bbox: &BoundingBox,
) where
    T: Copy + Default,
{
    let (rows, cols) = (crop.rows() as i64, crop.cols() as i64);

    // box limits relative to the crop, clamped to the crop extent
    let y0 = (bbox.y as i64 - region.top as i64).clamp(0, rows) as usize;
    let y1 = (bbox.y as i64 + bbox.h as i64 - region.top as i64).clamp(0, rows) as usize;
    let x0 = (bbox.x as i64 - region.left as i64).clamp(0, cols) as usize;
    let x1 = (bbox.x as i64 + bbox.w as i64 - region.left as i64).clamp(0, cols) as usize;

    let cols = cols as usize;
    for (row, pixels) in crop.as_slice_mut().chunks_exact_mut(cols * C).enumerate() {
        let inside_rows = row >= y0 && row < y1;
        for (col, px) in pixels.chunks_exact_mut(C).enumerate() {
            if !inside_rows || col < x0 || col >= x1 {
                px.fill(T::default());
            }
        }
    }
}

/// Extract a padded square patch around a bounding box and resize it to a fixed resolution.
///
/// The square has side `max(w, h) * pad_factor` and is centered on the box; it is clamped to
/// the image bounds, so patches near the border are not square before resizing.
///
/// # Arguments
///
/// * `src` - The scene image.
/// * `bbox` - The object bounding box `(x, y, w, h)`.
/// * `params` - Padding, output size, interpolation and border policy.
///
/// # Example
///
/// ```
/// use diffpose_image::{Image, ImageSize};
/// use diffpose_imgproc::crop::{extract_square_patch, BoundingBox, SquarePatchParams};
///
/// let scene = Image::<u8, 3>::from_size_val(ImageSize { width: 100, height: 100 }, 128).unwrap();
/// let params = SquarePatchParams {
///     pad_factor: 1.0,
///     size: ImageSize { width: 20, height: 20 },
///     ..Default::default()
/// };
///
/// let patch = extract_square_patch(&scene, &BoundingBox { x: 10, y: 10, w: 50, h: 50 }, &params).unwrap();
/// assert_eq!(patch.size(), ImageSize { width: 20, height: 20 });
/// ```
pub fn extract_square_patch<T, const C: usize>(
    src: &Image<T, C>,
    bbox: &BoundingBox,
    params: &SquarePatchParams,
) -> Result<Image<T, C>, ImageError>
where
    T: ImageDtype,
{
    let region = square_region(src.size(), bbox, params.pad_factor)?;

    let mut crop = Image::from_size_val(region.size(), T::default())?;
    crop_image(src, &mut crop, region.left, region.top)?;

    if params.black_borders {
        zero_outside_box(&mut crop, &region, bbox);
    }

    resize(&crop, params.size, params.interpolation)
}
