use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use diffpose_image::ImageSize;
use diffpose_losses::{compute_loss, LossMethod, LossOptions, PoseBatch, PoseRepresentation};
use diffpose_render::{
    camera::Camera,
    mesh::Mesh,
    rasterizer::{RasterSettings, RenderMode, SoftRasterizer},
};
use glam::{Mat3, Vec3};
use rand::{rngs::StdRng, SeedableRng};

fn bench_losses(c: &mut Criterion) {
    let mut group = c.benchmark_group("Losses");

    let settings = RasterSettings {
        image_size: ImageSize {
            width: 64,
            height: 64,
        },
        mode: RenderMode::Depth,
        ..Default::default()
    };
    let camera = Camera::from_fov(50.0, settings.image_size);
    let renderer = SoftRasterizer::new(Mesh::cuboid(Vec3::new(1.0, 0.6, 0.3)), camera, settings)
        .expect("valid mesh");

    let batch_size = 8;
    let predicted = vec![vec![0.9, 0.2, -0.1, 0.1, 1.0, 0.3]; batch_size];
    let gt_rotations = vec![Mat3::from_rotation_y(0.2); batch_size];
    let translations = vec![Vec3::new(0.0, 0.0, 3.0); batch_size];
    let batch = PoseBatch {
        predicted: &predicted,
        gt_rotations: &gt_rotations,
        translations: &translations,
        fixed_gt_images: None,
    };
    let options = LossOptions::default();

    for method in [
        LossMethod::L1Depth,
        LossMethod::DepthMasked,
        LossMethod::Vsd,
        LossMethod::PosePlusDepth,
    ] {
        group.bench_with_input(
            BenchmarkId::new("compute_loss", method),
            &method,
            |b, &method| {
                let mut rng = StdRng::seed_from_u64(0);
                b.iter(|| {
                    compute_loss(
                        black_box(&batch),
                        &renderer,
                        method.into(),
                        PoseRepresentation::Ortho6d,
                        &mut [Mat3::IDENTITY, Mat3::from_rotation_x(1.0)],
                        &options,
                        &mut rng,
                    )
                    .expect("loss")
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_losses);
criterion_main!(benches);
