use argh::FromArgs;
use glam::{Mat3, Vec3};
use rand::{rngs::StdRng, Rng, SeedableRng};

use diffpose::image::ImageSize;
use diffpose::k3d::{rotation::rotation_to_row_major, sampling::sample_sphere_view};
use diffpose::losses::{
    compute_loss_by_name, LossMethod, LossOptions, MethodSpec, PoseBatch, PoseRepresentation,
};
use diffpose::render::{
    camera::Camera,
    mesh::Mesh,
    rasterizer::{RasterSettings, RenderMode, SoftRasterizer},
};

#[derive(FromArgs)]
/// Evaluate a pose loss on random poses of a box
struct Args {
    /// loss method, e.g. multiview or vsd-random-multiview
    #[argh(option, default = "String::from(\"multiview\")")]
    method: String,

    /// pose representation of the predictions, e.g. 6d-pose or quat
    #[argh(option, default = "String::from(\"6d-pose\")")]
    representation: String,

    /// number of samples
    #[argh(option, default = "4")]
    batch_size: usize,

    /// number of views, the first one is the identity
    #[argh(option, default = "3")]
    num_views: usize,

    /// side of the rendered images in pixels
    #[argh(option, default = "64")]
    image_size: usize,

    /// render depth maps instead of silhouettes
    #[argh(switch)]
    depth: bool,

    /// seed of the random poses
    #[argh(option, default = "0")]
    seed: u64,
}

/// Length of a predicted row for the given method and representation names.
fn row_len(method: &str, representation: &str, num_views: usize) -> usize {
    let dim = representation
        .parse::<PoseRepresentation>()
        .map(|r| r.dim())
        .unwrap_or(6);
    match method.parse::<MethodSpec>().map(|spec| spec.method) {
        Ok(LossMethod::PredictiveMultiview) => 7 * num_views,
        Ok(LossMethod::Chamfer) => 4 * 7,
        Ok(LossMethod::ChamferOld) => 2 + 6,
        _ => dim,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let settings = RasterSettings {
        image_size: ImageSize {
            width: args.image_size,
            height: args.image_size,
        },
        mode: if args.depth {
            RenderMode::Depth
        } else {
            RenderMode::Silhouette
        },
        ..Default::default()
    };
    let camera = Camera::from_fov(50.0, settings.image_size);
    let renderer = SoftRasterizer::new(Mesh::cuboid(Vec3::new(1.0, 0.6, 0.3)), camera, settings)?;

    let mut rng = StdRng::seed_from_u64(args.seed);

    let gt_rotations = (0..args.batch_size)
        .map(|_| sample_sphere_view(&mut rng))
        .collect::<Result<Vec<_>, _>>()?;
    let translations = vec![Vec3::new(0.0, 0.0, 3.0); args.batch_size];

    let len = row_len(&args.method, &args.representation, args.num_views);
    let predicted = gt_rotations
        .iter()
        .map(|gt| {
            // rotation matrices are used as they are, so keep them orthonormal
            if args.representation == PoseRepresentation::RotationMatrix.as_str() {
                let perturbed = *gt * Mat3::from_rotation_x(rng.random_range(-0.3..0.3));
                rotation_to_row_major(&perturbed).to_vec()
            } else {
                (0..len).map(|_| rng.random_range(-1.0..1.0)).collect()
            }
        })
        .collect::<Vec<Vec<f32>>>();

    let mut views = vec![Mat3::IDENTITY; args.num_views.max(1)];
    for view in views.iter_mut().skip(1) {
        *view = sample_sphere_view(&mut rng)?;
    }

    let batch = PoseBatch {
        predicted: &predicted,
        gt_rotations: &gt_rotations,
        translations: &translations,
        fixed_gt_images: None,
    };

    let output = compute_loss_by_name(
        &batch,
        &renderer,
        &args.method,
        &args.representation,
        &mut views,
        &LossOptions::default(),
    )?;

    if !output.is_valid() {
        println!("Unknown method or representation, loss: {}", output.loss);
        return Ok(());
    }

    println!("{} ({}): {}", args.method, args.representation, output.loss);
    if let Some(per_sample) = &output.per_sample {
        for (i, loss) in per_sample.iter().enumerate() {
            println!("  sample {i}: {loss}");
        }
    }

    Ok(())
}
