use argh::FromArgs;
use std::path::PathBuf;

use diffpose::bop::{crop_dataset, CropConfig};

#[derive(FromArgs)]
/// Crop the ground-truth object patches of a BOP dataset and store them per scene
struct Args {
    /// optional JSON configuration, the flags below override it
    #[argh(option)]
    config: Option<PathBuf>,

    /// folder containing the BOP datasets
    #[argh(option)]
    datasets_path: Option<PathBuf>,

    /// dataset name, e.g. tless
    #[argh(option)]
    dataset: Option<String>,

    /// dataset split: train, val or test
    #[argh(option)]
    split: Option<String>,

    /// dataset split type, e.g. primesense
    #[argh(option)]
    split_type: Option<String>,

    /// targets file inside the dataset folder
    #[argh(option)]
    targets: Option<String>,

    /// scene to process, repeat for several, none keeps the configured scenes
    #[argh(option)]
    scene_id: Vec<u32>,

    /// object to keep, repeat for several, none keeps the configured objects
    #[argh(option)]
    obj_id: Vec<u32>,

    /// process every scene
    #[argh(switch)]
    all_scenes: bool,

    /// keep every object
    #[argh(switch)]
    all_objects: bool,

    /// scale applied to the longest side of the visible box
    #[argh(option)]
    pad_factor: Option<f64>,

    /// side of the square patches in pixels
    #[argh(option)]
    patch_size: Option<usize>,

    /// zero the patch pixels outside the visible box
    #[argh(switch)]
    black_borders: bool,

    /// resize with nearest neighbor interpolation
    #[argh(switch)]
    nearest: bool,

    /// folder receiving the scene records
    #[argh(option)]
    output_dir: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let mut config = match &args.config {
        Some(path) => CropConfig::from_json_file(path)?,
        None => CropConfig::default(),
    };

    if let Some(datasets_path) = args.datasets_path {
        config.datasets_path = datasets_path;
    }
    if let Some(dataset) = args.dataset {
        config.dataset = dataset;
    }
    if let Some(split) = args.split {
        config.split = split;
    }
    if args.split_type.is_some() {
        config.split_type = args.split_type;
    }
    if args.targets.is_some() {
        config.targets_filename = args.targets;
    }
    if args.all_scenes {
        config.scene_ids.clear();
    } else if !args.scene_id.is_empty() {
        config.scene_ids = args.scene_id;
    }
    if args.all_objects {
        config.obj_ids.clear();
    } else if !args.obj_id.is_empty() {
        config.obj_ids = args.obj_id;
    }
    if let Some(pad_factor) = args.pad_factor {
        config.pad_factor = pad_factor;
    }
    if let Some(patch_size) = args.patch_size {
        config.patch_width = patch_size;
        config.patch_height = patch_size;
    }
    config.black_borders |= args.black_borders;
    config.nearest |= args.nearest;
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }

    let written = crop_dataset(&config)?;
    for path in &written {
        println!("{}", path.display());
    }
    println!("Wrote {} scene records", written.len());

    Ok(())
}
