use argh::FromArgs;
use glam::{Mat3, Vec3};
use std::path::PathBuf;

use diffpose::image::ImageSize;
use diffpose::io::gif::{GifWriter, DEFAULT_FRAME_DELAY_MS};
use diffpose::k3d::rotation::rotation_from_quaternion_vector;
use diffpose::optim::{refine_orientation, RefineConfig};
use diffpose::render::{
    camera::Camera,
    mesh::Mesh,
    rasterizer::{RasterSettings, RenderMode, SoftRasterizer},
    Renderer,
};

#[derive(FromArgs)]
/// Recover the orientation of a camera by matching renders of a mug to a reference render
struct Args {
    /// path to the output animation
    #[argh(option, default = "PathBuf::from(\"camera-pose-optimization-demo.gif\")")]
    output: PathBuf,

    /// side of the rendered images in pixels
    #[argh(option, default = "128")]
    image_size: usize,

    /// maximum number of iterations
    #[argh(option, default = "1000")]
    max_iterations: usize,

    /// the refinement stops once the loss drops below this value
    #[argh(option, default = "100.0")]
    loss_threshold: f32,

    /// adam learning rate
    #[argh(option, default = "0.1")]
    learning_rate: f32,

    /// match soft silhouettes instead of shaded renders
    #[argh(switch)]
    silhouette: bool,
}

/// A mug built from boxes: a body and a handle made of three bars.
fn mug() -> Mesh {
    let bar = |extent: Vec3, center: Vec3| {
        Mesh::cuboid(extent).transformed(&Mat3::IDENTITY, center)
    };
    Mesh::cuboid(Vec3::new(0.6, 0.8, 0.6))
        .merge(&bar(Vec3::new(0.3, 0.08, 0.1), Vec3::new(0.45, -0.25, 0.0)))
        .merge(&bar(Vec3::new(0.3, 0.08, 0.1), Vec3::new(0.45, 0.25, 0.0)))
        .merge(&bar(Vec3::new(0.08, 0.58, 0.1), Vec3::new(0.56, 0.0, 0.0)))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let settings = RasterSettings {
        image_size: ImageSize {
            width: args.image_size,
            height: args.image_size,
        },
        blur_sigma: 1.0,
        mode: if args.silhouette {
            RenderMode::Silhouette
        } else {
            RenderMode::Shaded
        },
        ..Default::default()
    };
    let camera = Camera::from_fov(60.0, settings.image_size);
    let renderer = SoftRasterizer::new(mug(), camera, settings)?;

    // the translation is fixed, only the orientation is estimated
    let translation = Vec3::new(0.0, 0.0, 2.0);
    let reference = rotation_from_quaternion_vector(Vec3::new(-1.0, 1.4, -3.0));
    let target = renderer.render(&reference, translation)?;

    let mut gif = GifWriter::create(&args.output, DEFAULT_FRAME_DELAY_MS)?;

    let config = RefineConfig {
        learning_rate: args.learning_rate,
        max_iterations: args.max_iterations,
        loss_threshold: args.loss_threshold,
        ..Default::default()
    };

    let result = refine_orientation(
        &renderer,
        &target,
        Vec3::new(-0.1, 0.14, -0.3),
        translation,
        &config,
        |_, frame| Ok(gif.append_gray_f32(frame)?),
    )?;

    println!(
        "Finished after {} iterations with loss {} (converged: {})",
        result.num_iterations, result.loss, result.converged
    );
    println!("Estimated orientation: {:?}", result.parameters);
    println!(
        "Wrote {} frames to {}",
        gif.num_frames(),
        args.output.display()
    );

    Ok(())
}
