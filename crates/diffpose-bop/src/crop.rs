use std::{
    collections::{BTreeMap, BTreeSet},
    path::PathBuf,
};

use diffpose_imgproc::crop::{extract_square_patch, BoundingBox};
use diffpose_io::functional::read_image_rgb8;

use crate::{
    annotations::{load_scene_gt, load_scene_gt_info, load_targets},
    config::CropConfig,
    error::{BopError, BopResult},
    record::SceneRecord,
};

/// Keep the ids of `ids` found in `filter`, or all of them when `filter` is empty.
fn select<T: Ord + Copy>(ids: impl IntoIterator<Item = T>, filter: &[T]) -> Vec<T> {
    let ids = ids.into_iter();
    if filter.is_empty() {
        return ids.collect();
    }
    let filter = filter.iter().copied().collect::<BTreeSet<_>>();
    ids.filter(|id| filter.contains(id)).collect()
}

/// Scenes of the split folder selected by the configuration, in increasing order.
pub fn considered_scene_ids(config: &CropConfig) -> BopResult<Vec<u32>> {
    let split_path = config.split_path();
    if !split_path.is_dir() {
        return Err(BopError::SplitNotFound(split_path));
    }

    let mut scene_ids = BTreeSet::new();
    for entry in std::fs::read_dir(&split_path)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(scene_id) = entry
            .file_name()
            .to_str()
            .and_then(|name| name.parse::<u32>().ok())
        {
            scene_ids.insert(scene_id);
        }
    }

    Ok(select(scene_ids, &config.scene_ids))
}

/// Extract the patches of the selected instances of a scene.
///
/// # Arguments
///
/// * `config` - Dataset location, id filters and patch parameters.
/// * `scene_id` - The scene to process.
/// * `targets` - Image ids per scene from a targets file, if any.
pub fn crop_scene(
    config: &CropConfig,
    scene_id: u32,
    targets: Option<&BTreeMap<u32, BTreeSet<u32>>>,
) -> BopResult<SceneRecord> {
    let scene_gt = load_scene_gt(config.scene_gt_path(scene_id))?;
    let scene_gt_info = load_scene_gt_info(config.scene_gt_info_path(scene_id))?;

    let im_ids = match targets {
        Some(targets) => targets.get(&scene_id).cloned().unwrap_or_default(),
        None => scene_gt.keys().copied().collect(),
    };
    let im_ids = select(im_ids, &config.im_ids);

    log::debug!("scene {scene_id}: {} images", im_ids.len());

    let params = config.patch_params();
    let mut record = SceneRecord::new(params.size);

    for (im_counter, &im_id) in im_ids.iter().enumerate() {
        let Some(gts) = scene_gt.get(&im_id) else {
            log::debug!("scene {scene_id}: image {im_id} has no annotations");
            continue;
        };
        let infos = scene_gt_info.get(&im_id).map(Vec::as_slice).unwrap_or(&[]);

        let mut rgb = None;
        for gt_id in select(0..gts.len(), &config.gt_ids) {
            let gt = &gts[gt_id];
            if !config.obj_ids.is_empty() && !config.obj_ids.contains(&gt.obj_id) {
                continue;
            }

            let info = infos.get(gt_id).ok_or(BopError::MissingGtInfo {
                scene_id,
                im_id,
                gt_id,
            })?;

            let bbox = BoundingBox::from(info.bbox_visib);
            if bbox.is_degenerate() {
                log::debug!("scene {scene_id}: instance {gt_id} of image {im_id} is not visible");
                continue;
            }

            let image = match rgb.take() {
                Some(image) => image,
                None => read_image_rgb8(config.rgb_path(scene_id, im_id))?,
            };
            let patch = extract_square_patch(&image, &bbox, &params)?;
            rgb = Some(image);

            record.push(patch, gt, info)?;

            log::info!("Processing image {}/{}", im_counter + 1, im_ids.len());
        }
    }

    Ok(record)
}

/// Crop every selected scene and write one record per non-empty scene.
///
/// Returns the paths of the written records.
pub fn crop_dataset(config: &CropConfig) -> BopResult<Vec<PathBuf>> {
    let targets = config.targets_path().map(load_targets).transpose()?;

    if !config.output_dir.as_os_str().is_empty() {
        std::fs::create_dir_all(&config.output_dir)?;
    }

    let mut written = Vec::new();
    for scene_id in considered_scene_ids(config)? {
        let record = crop_scene(config, scene_id, targets.as_ref())?;
        if record.is_empty() {
            log::debug!("scene {scene_id}: no patches");
            continue;
        }

        let output_path = config.output_path(scene_id);
        record.save(&output_path)?;
        log::info!(
            "Wrote {} patches of scene {} to {}",
            record.len(),
            scene_id,
            output_path.display()
        );
        written.push(output_path);
    }

    Ok(written)
}
