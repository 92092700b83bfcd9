/// An error type for the io module.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    /// Error when the file does not exist.
    #[error("File does not exist: {0}")]
    FileDoesNotExist(std::path::PathBuf),

    /// Error to open the file.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),

    /// Error to create the image.
    #[error("Failed to create image. {0}")]
    ImageCreationError(#[from] diffpose_image::ImageError),

    /// Error to decode or encode the image.
    #[error("Failed to encode or decode the image. {0}")]
    ImageCodecError(#[from] image::ImageError),

    /// The frame buffer does not match the frame size.
    #[error("Invalid frame of size {0}x{1}")]
    InvalidFrame(usize, usize),
}
