use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{BopError, BopResult};

/// Ground-truth pose of one object instance (`scene_gt.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GtPose {
    /// the object id.
    pub obj_id: u32,
    /// model to camera rotation, row-major.
    #[serde(rename = "cam_R_m2c")]
    pub cam_r_m2c: [f32; 9],
    /// model to camera translation in millimeters.
    pub cam_t_m2c: [f32; 3],
}

/// Visibility information of one object instance (`scene_gt_info.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GtInfo {
    /// box of the full object silhouette, `[x, y, w, h]`.
    pub bbox_obj: [i32; 4],
    /// box of the visible part of the object, `[x, y, w, h]`.
    pub bbox_visib: [i32; 4],
    /// fraction of the object silhouette that is visible.
    pub visib_fract: f32,
    /// number of pixels of the full silhouette.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub px_count_all: Option<u32>,
    /// number of silhouette pixels with a valid depth.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub px_count_valid: Option<u32>,
    /// number of visible silhouette pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub px_count_visib: Option<u32>,
}

/// One entry of a BOP targets file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// the scene id.
    pub scene_id: u32,
    /// the image id.
    pub im_id: u32,
    /// the object id.
    pub obj_id: u32,
    /// number of instances of the object in the image.
    #[serde(default)]
    pub inst_count: u32,
}

/// Annotations of a scene, keyed by image id.
pub type SceneAnnotations<T> = BTreeMap<u32, Vec<T>>;

fn load_json<T: DeserializeOwned>(path: &Path) -> BopResult<T> {
    let file = std::fs::File::open(path)?;
    serde_json::from_reader(std::io::BufReader::new(file)).map_err(|source| BopError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the ground-truth poses of a scene.
pub fn load_scene_gt(path: impl AsRef<Path>) -> BopResult<SceneAnnotations<GtPose>> {
    load_json(path.as_ref())
}

/// Load the ground-truth visibility information of a scene.
pub fn load_scene_gt_info(path: impl AsRef<Path>) -> BopResult<SceneAnnotations<GtInfo>> {
    load_json(path.as_ref())
}

/// Load a targets file and group the image ids by scene.
pub fn load_targets(path: impl AsRef<Path>) -> BopResult<BTreeMap<u32, BTreeSet<u32>>> {
    let targets: Vec<Target> = load_json(path.as_ref())?;

    let mut scene_im_ids = BTreeMap::<u32, BTreeSet<u32>>::new();
    for target in targets {
        scene_im_ids
            .entry(target.scene_id)
            .or_default()
            .insert(target.im_id);
    }

    Ok(scene_im_ids)
}
