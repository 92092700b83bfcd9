use std::path::{Path, PathBuf};

use diffpose_image::ImageSize;
use diffpose_imgproc::{crop::SquarePatchParams, interpolation::InterpolationMode};
use serde::{Deserialize, Serialize};

use crate::error::BopResult;

/// Parameters of the ground-truth patch extraction.
///
/// Empty id lists select everything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    /// the dataset name, e.g. `tless`.
    pub dataset: String,
    /// the dataset split: `train`, `val` or `test`.
    pub split: String,
    /// optional split type, e.g. `primesense`.
    pub split_type: Option<String>,
    /// targets file inside the dataset folder restricting the processed images.
    pub targets_filename: Option<String>,
    /// scenes to process.
    pub scene_ids: Vec<u32>,
    /// images to process.
    pub im_ids: Vec<u32>,
    /// instance indices to process within each image.
    pub gt_ids: Vec<usize>,
    /// objects to keep.
    pub obj_ids: Vec<u32>,
    /// folder containing the BOP datasets.
    pub datasets_path: PathBuf,
    /// scale applied to the longest side of the visible box.
    pub pad_factor: f64,
    /// width of the extracted patches.
    pub patch_width: usize,
    /// height of the extracted patches.
    pub patch_height: usize,
    /// zero the patch pixels outside the visible box.
    pub black_borders: bool,
    /// resize with nearest neighbor instead of bilinear interpolation.
    pub nearest: bool,
    /// extension of the color images.
    pub rgb_ext: String,
    /// folder receiving the scene records.
    pub output_dir: PathBuf,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            dataset: "tless".to_string(),
            split: "test".to_string(),
            split_type: None,
            targets_filename: None,
            scene_ids: vec![13],
            im_ids: Vec::new(),
            gt_ids: Vec::new(),
            obj_ids: vec![19],
            datasets_path: PathBuf::from("datasets"),
            pad_factor: 1.2,
            patch_width: 128,
            patch_height: 128,
            black_borders: false,
            nearest: false,
            rgb_ext: "png".to_string(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl CropConfig {
    /// Load a configuration from a JSON file, missing fields take their default value.
    pub fn from_json_file(path: impl AsRef<Path>) -> BopResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        serde_json::from_reader(std::io::BufReader::new(file)).map_err(|source| {
            crate::BopError::Json {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    /// Folder of the dataset.
    pub fn dataset_path(&self) -> PathBuf {
        self.datasets_path.join(&self.dataset)
    }

    /// Folder of the split, `<split>` or `<split>_<split_type>`.
    pub fn split_path(&self) -> PathBuf {
        let name = match &self.split_type {
            Some(split_type) => format!("{}_{}", self.split, split_type),
            None => self.split.clone(),
        };
        self.dataset_path().join(name)
    }

    /// Folder of a scene.
    pub fn scene_path(&self, scene_id: u32) -> PathBuf {
        self.split_path().join(format!("{scene_id:06}"))
    }

    /// Ground-truth poses of a scene.
    pub fn scene_gt_path(&self, scene_id: u32) -> PathBuf {
        self.scene_path(scene_id).join("scene_gt.json")
    }

    /// Ground-truth visibility information of a scene.
    pub fn scene_gt_info_path(&self, scene_id: u32) -> PathBuf {
        self.scene_path(scene_id).join("scene_gt_info.json")
    }

    /// Color image of a scene.
    pub fn rgb_path(&self, scene_id: u32, im_id: u32) -> PathBuf {
        self.scene_path(scene_id)
            .join("rgb")
            .join(format!("{im_id:06}.{}", self.rgb_ext))
    }

    /// Targets file, if one is configured.
    pub fn targets_path(&self) -> Option<PathBuf> {
        self.targets_filename
            .as_ref()
            .map(|name| self.dataset_path().join(name))
    }

    /// Where the record of a scene is written.
    pub fn output_path(&self, scene_id: u32) -> PathBuf {
        let name = if self.split == "train" {
            format!("{}-train-obj{}.bin", self.dataset, scene_id)
        } else {
            format!("{}-{}-scene{}.bin", self.dataset, self.split, scene_id)
        };
        self.output_dir.join(name)
    }

    /// Patch extraction parameters.
    pub fn patch_params(&self) -> SquarePatchParams {
        SquarePatchParams {
            pad_factor: self.pad_factor,
            size: ImageSize {
                width: self.patch_width,
                height: self.patch_height,
            },
            interpolation: if self.nearest {
                InterpolationMode::Nearest
            } else {
                InterpolationMode::Bilinear
            },
            black_borders: self.black_borders,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bop_layout() {
        let config = CropConfig {
            datasets_path: PathBuf::from("/data"),
            ..Default::default()
        };
        assert_eq!(config.split_path(), PathBuf::from("/data/tless/test"));
        assert_eq!(
            config.rgb_path(13, 42),
            PathBuf::from("/data/tless/test/000013/rgb/000042.png")
        );
        assert_eq!(
            config.scene_gt_info_path(2),
            PathBuf::from("/data/tless/test/000002/scene_gt_info.json")
        );
        assert_eq!(config.targets_path(), None);

        let config = CropConfig {
            split_type: Some("primesense".to_string()),
            ..config
        };
        assert_eq!(
            config.split_path(),
            PathBuf::from("/data/tless/test_primesense")
        );
    }

    #[test]
    fn output_names() {
        let config = CropConfig::default();
        assert_eq!(
            config.output_path(13),
            PathBuf::from("./tless-test-scene13.bin")
        );

        let config = CropConfig {
            split: "train".to_string(),
            ..Default::default()
        };
        assert_eq!(config.output_path(19), PathBuf::from("./tless-train-obj19.bin"));
    }

    #[test]
    fn partial_json() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let path = tmp_dir.path().join("crop.json");
        std::fs::write(&path, r#"{"dataset": "lmo", "scene_ids": [], "nearest": true}"#)?;

        let config = CropConfig::from_json_file(&path)?;
        assert_eq!(config.dataset, "lmo");
        assert!(config.scene_ids.is_empty());
        assert_eq!(config.obj_ids, vec![19]);
        assert_eq!(
            config.patch_params().interpolation,
            InterpolationMode::Nearest
        );
        Ok(())
    }
}
