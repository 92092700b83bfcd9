use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use diffpose_image::{Image, ImageSize};

use crate::{
    annotations::{GtInfo, GtPose},
    error::{BopError, BopResult},
};

/// Patches and ground truth of one scene, stored as parallel lists.
#[derive(Debug, Clone, Default, PartialEq, bincode::Encode, bincode::Decode)]
pub struct SceneRecord {
    /// width of every patch.
    pub patch_width: u32,
    /// height of every patch.
    pub patch_height: u32,
    /// RGB patches, row-major and interleaved.
    pub images: Vec<Vec<u8>>,
    /// model to camera rotations, row-major.
    pub rs: Vec<[f32; 9]>,
    /// model to camera translations.
    pub ts: Vec<[f32; 3]>,
    /// visible fraction of every instance.
    pub visib_fract: Vec<f32>,
    /// object id of every instance.
    pub obj_ids: Vec<u32>,
}

impl SceneRecord {
    /// Create an empty record for patches of the given size.
    pub fn new(patch_size: ImageSize) -> Self {
        Self {
            patch_width: patch_size.width as u32,
            patch_height: patch_size.height as u32,
            ..Default::default()
        }
    }

    /// Size of the stored patches.
    pub fn patch_size(&self) -> ImageSize {
        ImageSize {
            width: self.patch_width as usize,
            height: self.patch_height as usize,
        }
    }

    /// Append the patch of an instance with its annotations.
    pub fn push(&mut self, patch: Image<u8, 3>, gt: &GtPose, info: &GtInfo) -> BopResult<()> {
        if patch.size() != self.patch_size() {
            return Err(BopError::CorruptedRecord(format!(
                "patch of size {} in a record of {} patches",
                patch.size(),
                self.patch_size()
            )));
        }
        self.images.push(patch.into_vec());
        self.rs.push(gt.cam_r_m2c);
        self.ts.push(gt.cam_t_m2c);
        self.visib_fract.push(info.visib_fract);
        self.obj_ids.push(gt.obj_id);
        Ok(())
    }

    /// Number of stored instances.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether the record holds no instance.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// The patch of instance `index` as an image.
    pub fn patch(&self, index: usize) -> Option<Image<u8, 3>> {
        let data = self.images.get(index)?.clone();
        Image::new(self.patch_size(), data).ok()
    }

    /// Persist the record to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> BopResult<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        bincode::encode_into_std_write(self, &mut writer, bincode::config::standard())
            .map_err(|e| BopError::Bincode(e.to_string()))?;
        Ok(())
    }

    /// Load a record from a file and check that its lists are consistent.
    pub fn load(path: impl AsRef<Path>) -> BopResult<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let record: SceneRecord =
            bincode::decode_from_std_read(&mut reader, bincode::config::standard())
                .map_err(|e| BopError::Bincode(e.to_string()))?;

        let n = record.images.len();
        if record.rs.len() != n
            || record.ts.len() != n
            || record.visib_fract.len() != n
            || record.obj_ids.len() != n
        {
            return Err(BopError::CorruptedRecord(
                "lists of different lengths".to_string(),
            ));
        }

        let patch_len = record.patch_size().area() * 3;
        if record.images.iter().any(|image| image.len() != patch_len) {
            return Err(BopError::CorruptedRecord(format!(
                "patches are not {}x{} RGB",
                record.patch_width, record.patch_height
            )));
        }

        Ok(record)
    }
}
