use std::path::PathBuf;

/// An error type for the BOP dataset module.
#[derive(thiserror::Error, Debug)]
pub enum BopError {
    /// Error reading or writing a file.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),

    /// Error parsing an annotation file.
    #[error("Failed to parse {path}: {source}")]
    Json {
        /// the annotation file.
        path: PathBuf,
        /// the parse error.
        source: serde_json::Error,
    },

    /// Error reading a scene image.
    #[error(transparent)]
    Io(#[from] diffpose_io::IoError),

    /// Error extracting a patch.
    #[error(transparent)]
    Image(#[from] diffpose_image::ImageError),

    /// Error encoding or decoding a scene record.
    #[error("Bincode error: {0}")]
    Bincode(String),

    /// The dataset split directory does not exist.
    #[error("Split directory not found: {0}")]
    SplitNotFound(PathBuf),

    /// An annotated instance has no matching info record.
    #[error("No gt info for scene {scene_id}, image {im_id}, instance {gt_id}")]
    MissingGtInfo {
        /// the scene.
        scene_id: u32,
        /// the image.
        im_id: u32,
        /// the instance index in the image.
        gt_id: usize,
    },

    /// The record fields do not have the same length.
    #[error("Corrupted scene record: {0}")]
    CorruptedRecord(String),
}

/// Result alias of the BOP module.
pub type BopResult<T> = Result<T, BopError>;
