use glam::{Mat3, Vec3};

use crate::error::GeometryError;

/// Transform a set of points using a rotation and translation, `dst = R * src + t`.
///
/// # Arguments
///
/// * `src_points` - A set of points to be transformed.
/// * `dst_r_src` - A rotation matrix.
/// * `dst_t_src` - A translation vector.
/// * `dst_points` - A pre-allocated buffer of the same size as `src_points`.
///
/// Example:
///
/// ```
/// use diffpose_3d::linalg::transform_points;
///
/// let src_points = vec![[2.0, 2.0, 2.0], [3.0, 4.0, 5.0]];
/// let mut dst_points = vec![[0.0; 3]; src_points.len()];
/// transform_points(&src_points, &glam::Mat3::IDENTITY, glam::Vec3::ZERO, &mut dst_points).unwrap();
/// assert_eq!(dst_points, src_points);
/// ```
pub fn transform_points(
    src_points: &[[f32; 3]],
    dst_r_src: &Mat3,
    dst_t_src: Vec3,
    dst_points: &mut [[f32; 3]],
) -> Result<(), GeometryError> {
    if src_points.len() != dst_points.len() {
        return Err(GeometryError::MismatchedPoints(
            src_points.len(),
            dst_points.len(),
        ));
    }

    for (src, dst) in src_points.iter().zip(dst_points.iter_mut()) {
        *dst = (*dst_r_src * Vec3::from_array(*src) + dst_t_src).to_array();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn transform_points_roundtrip() -> Result<(), GeometryError> {
        let src_points = vec![[2.0, 2.0, 2.0], [3.0, 4.0, 5.0]];
        let rotation = Mat3::from_rotation_x(std::f32::consts::FRAC_PI_2);
        let translation = Vec3::new(1.0, 2.0, 3.0);

        let mut dst_points = vec![[0.0; 3]; src_points.len()];
        transform_points(&src_points, &rotation, translation, &mut dst_points)?;

        // invert the transformation, R' = R^T and t' = -R^T t
        let rotation_inv = rotation.transpose();
        let translation_inv = -(rotation_inv * translation);
        let mut back = vec![[0.0; 3]; src_points.len()];
        transform_points(&dst_points, &rotation_inv, translation_inv, &mut back)?;

        for (a, b) in back.iter().zip(src_points.iter()) {
            for k in 0..3 {
                assert_relative_eq!(a[k], b[k], epsilon = 1e-5);
            }
        }

        Ok(())
    }

    #[test]
    fn transform_points_mismatch() {
        let src_points = vec![[0.0; 3]; 2];
        let mut dst_points = vec![[0.0; 3]; 3];
        assert_eq!(
            transform_points(&src_points, &Mat3::IDENTITY, Vec3::ZERO, &mut dst_points),
            Err(GeometryError::MismatchedPoints(2, 3))
        );
    }
}
