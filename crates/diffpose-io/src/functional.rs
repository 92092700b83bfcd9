use std::path::Path;

use diffpose_image::{Image, ImageSize};

use crate::error::IoError;

/// Reads an RGB image from the given file path.
///
/// The method reads any format supported by the image crate and converts it to 8-bit RGB.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// An image containing the RGB data.
pub fn read_image_rgb8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let file_path = file_path.as_ref();

    // verify the file exists
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let img = image::ImageReader::open(file_path)?
        .with_guessed_format()?
        .decode()?;

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    Ok(Image::new(size, img.into_rgb8().into_raw())?)
}

/// Writes an RGB image to the given file path.
///
/// The format is deduced from the file extension.
pub fn write_image_rgb8(file_path: impl AsRef<Path>, image: &Image<u8, 3>) -> Result<(), IoError> {
    let size = image.size();
    image::save_buffer(
        file_path,
        image.as_slice(),
        size.width as u32,
        size.height as u32,
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(())
}
