use glam::{Mat3, Vec3};
use rand::Rng;

use crate::{error::GeometryError, rotation::look_at_rotation};

/// Sample a random view rotation, uniformly distributed over camera positions on the unit sphere.
///
/// The camera position is drawn with `z ~ U(-1, 1)` and azimuth `θ ~ U(0, 2π)`, which is
/// uniform on the sphere. The camera looks at the origin with `up = -z` below the equator and
/// `up = +z` above it, followed by a random in-plane rotation in `[-90°, 90°]` about `z`.
///
/// See: Deserno, "How to generate equidistributed points on the surface of a sphere".
pub fn sample_sphere_view<R: Rng + ?Sized>(rng: &mut R) -> Result<Mat3, GeometryError> {
    let z: f32 = rng.random_range(-1.0..1.0);
    let theta: f32 = rng.random_range(0.0..std::f32::consts::TAU);

    let r = (1.0 - z * z).max(0.0).sqrt();
    let camera_position = Vec3::new(r * theta.cos(), r * theta.sin(), z);

    let up = if z < 0.0 { Vec3::NEG_Z } else { Vec3::Z };
    let view = look_at_rotation(camera_position, Vec3::ZERO, up)?;

    let in_plane_degrees: f32 = rng.random_range(-90.0..90.0);
    Ok(view * Mat3::from_rotation_z(in_plane_degrees.to_radians()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotation::orthonormality_error;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn sampled_views_are_rotations() -> Result<(), GeometryError> {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let view = sample_sphere_view(&mut rng)?;
            assert!(orthonormality_error(&view) < 1e-5);
            assert!((view.determinant() - 1.0).abs() < 1e-5);
        }
        Ok(())
    }

    #[test]
    fn sampled_views_are_seeded() -> Result<(), GeometryError> {
        let a = sample_sphere_view(&mut StdRng::seed_from_u64(7))?;
        let b = sample_sphere_view(&mut StdRng::seed_from_u64(7))?;
        assert_eq!(a, b);
        Ok(())
    }
}
