#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Ground-truth annotation records.
pub mod annotations;
pub use annotations::{GtInfo, GtPose};

mod config;
pub use config::CropConfig;

mod crop;
pub use crop::{considered_scene_ids, crop_dataset, crop_scene};

mod error;
pub use error::{BopError, BopResult};

mod record;
pub use record::SceneRecord;
