use glam::{EulerRot, Mat3, Quat, Vec3};

use crate::error::GeometryError;

const EPS: f32 = 1e-8;

fn check_len(values: &[f32], expected: usize) -> Result<(), GeometryError> {
    if values.len() != expected {
        return Err(GeometryError::InvalidLength(expected, values.len()));
    }
    Ok(())
}

fn normalize(v: Vec3, what: &'static str) -> Result<Vec3, GeometryError> {
    let norm = v.length();
    if norm < EPS || !norm.is_finite() {
        return Err(GeometryError::DegenerateRotation(what));
    }
    Ok(v / norm)
}

/// Compute the rotation matrix from the continuous 6d representation.
///
/// The two 3-vectors are orthonormalized with Gram-Schmidt: `x = a / |a|`,
/// `z = (x × b) / |x × b|`, `y = z × x`. The matrix columns are `x, y, z`.
///
/// # Errors
///
/// Fails if `values` does not hold 6 numbers, or if `a` is zero or parallel to `b`.
///
/// Example:
///
/// ```
/// use diffpose_3d::rotation::rotation_from_ortho6d;
///
/// let rotation = rotation_from_ortho6d(&[2.0, 0.0, 0.0, 0.0, 3.0, 0.0]).unwrap();
/// assert_eq!(rotation, glam::Mat3::IDENTITY);
/// ```
pub fn rotation_from_ortho6d(values: &[f32]) -> Result<Mat3, GeometryError> {
    check_len(values, 6)?;

    let a = Vec3::new(values[0], values[1], values[2]);
    let b = Vec3::new(values[3], values[4], values[5]);

    let x = normalize(a, "ortho6d first column is zero")?;
    let z = normalize(x.cross(b), "ortho6d columns are parallel")?;
    let y = z.cross(x);

    Ok(Mat3::from_cols(x, y, z))
}

/// Build a rotation matrix from 9 values in row-major order.
///
/// The rows are projected onto a rotation with Gram-Schmidt: `x = r0 / |r0|`,
/// `z = (x × r1) / |x × r1|`, `y = z × x`, and the third row is replaced by `z`. A rotation
/// matrix is returned unchanged up to rounding.
///
/// # Errors
///
/// Fails if `values` does not hold 9 numbers, or if the first row is zero or parallel to the
/// second.
pub fn rotation_from_row_major(values: &[f32]) -> Result<Mat3, GeometryError> {
    check_len(values, 9)?;

    let r0 = Vec3::new(values[0], values[1], values[2]);
    let r1 = Vec3::new(values[3], values[4], values[5]);

    let x = normalize(r0, "first row is zero")?;
    let z = normalize(x.cross(r1), "first rows are parallel")?;
    let y = z.cross(x);

    // glam stores columns, the rows are x, y, z
    Ok(Mat3::from_cols(x, y, z).transpose())
}

/// Flatten a rotation matrix into 9 values in row-major order.
pub fn rotation_to_row_major(rotation: &Mat3) -> [f32; 9] {
    rotation.transpose().to_cols_array()
}

/// Compute the rotation matrix from a quaternion stored as `(w, x, y, z)`.
///
/// The quaternion is normalized first, so any non-zero quaternion is accepted.
pub fn rotation_from_quaternion(values: &[f32]) -> Result<Mat3, GeometryError> {
    check_len(values, 4)?;

    let q = Quat::from_xyzw(values[1], values[2], values[3], values[0]);
    let norm = q.length();
    if norm < EPS || !norm.is_finite() {
        return Err(GeometryError::DegenerateRotation("quaternion is zero"));
    }

    Ok(Mat3::from_quat(q / norm))
}

/// Compute the rotation matrix from the vector part of a quaternion with unit real part.
///
/// The quaternion `(1, v.x, v.y, v.z)` is normalized, so every `v` maps to a valid rotation.
/// This is the three-parameter orientation optimized by the camera pose refinement.
pub fn rotation_from_quaternion_vector(v: Vec3) -> Mat3 {
    Mat3::from_quat(Quat::from_xyzw(v.x, v.y, v.z, 1.0).normalize())
}

/// Compute the rotation matrix from intrinsic `XYZ` Euler angles in radians.
pub fn rotation_from_euler(values: &[f32]) -> Result<Mat3, GeometryError> {
    check_len(values, 3)?;
    Ok(Mat3::from_euler(
        EulerRot::XYZ,
        values[0],
        values[1],
        values[2],
    ))
}

/// Compute the rotation matrix from a rotation vector (axis scaled by the angle in radians).
///
/// The zero vector maps to the identity.
pub fn rotation_from_axis_angle(values: &[f32]) -> Result<Mat3, GeometryError> {
    check_len(values, 3)?;
    let v = Vec3::new(values[0], values[1], values[2]);
    if !v.is_finite() {
        return Err(GeometryError::DegenerateRotation("axis-angle is not finite"));
    }
    Ok(Mat3::from_quat(Quat::from_scaled_axis(v)))
}

/// Compute the rotation of a camera at `camera_position` looking at `at`.
///
/// The camera `z` axis points from the camera towards `at`, `x = up × z` and `y = z × x`;
/// the matrix columns are `x, y, z`. When `up` is parallel to the viewing direction another
/// reference axis is used.
pub fn look_at_rotation(camera_position: Vec3, at: Vec3, up: Vec3) -> Result<Mat3, GeometryError> {
    let z = normalize(at - camera_position, "camera is located at the target")?;

    let x = match normalize(up.cross(z), "up is parallel to the viewing direction") {
        Ok(x) => x,
        Err(_) => {
            let fallback = if z.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
            normalize(fallback.cross(z), "viewing direction is degenerate")?
        }
    };
    let y = z.cross(x);

    Ok(Mat3::from_cols(x, y, z))
}

/// Compute the rotation of a camera at `values` looking at the origin with `+y` up.
pub fn rotation_from_look_at(values: &[f32]) -> Result<Mat3, GeometryError> {
    check_len(values, 3)?;
    look_at_rotation(
        Vec3::new(values[0], values[1], values[2]),
        Vec3::ZERO,
        Vec3::Y,
    )
}

/// Compute the geodesic angle in radians between two rotation matrices.
///
/// `theta = arccos((trace(AᵀB) - 1) / 2)`, with the argument clamped to `[-1, 1]` so that
/// rounding never leaves the domain of `arccos`.
///
/// Example:
///
/// ```
/// use diffpose_3d::rotation::mat_theta;
///
/// let rotation = glam::Mat3::from_rotation_z(0.3);
/// assert!(mat_theta(&rotation, &rotation) < 2e-3);
/// ```
pub fn mat_theta(a: &Mat3, b: &Mat3) -> f32 {
    let ab = a.transpose() * *b;
    let trace = ab.x_axis.x + ab.y_axis.y + ab.z_axis.z;
    let cos = ((trace - 1.0) / 2.0).clamp(-1.0, 1.0);
    cos.acos()
}

/// The largest absolute entry of `RᵀR - I`.
pub fn orthonormality_error(rotation: &Mat3) -> f32 {
    let residual = rotation.transpose() * *rotation - Mat3::IDENTITY;
    residual
        .to_cols_array()
        .iter()
        .fold(0.0f32, |acc, v| acc.max(v.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TOL: f32 = 1e-5;

    #[test]
    fn ortho6d_is_orthonormal() -> Result<(), GeometryError> {
        let inputs = [
            [1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            [0.3, -2.0, 0.5, 1.0, 1.0, 1.0],
            [-5.0, 0.1, 0.0, 0.2, 0.3, -7.0],
        ];
        for input in inputs {
            let rotation = rotation_from_ortho6d(&input)?;
            assert!(orthonormality_error(&rotation) < TOL);
            assert_relative_eq!(rotation.determinant(), 1.0, epsilon = TOL);
        }
        Ok(())
    }

    #[test]
    fn ortho6d_degenerate() {
        assert_eq!(
            rotation_from_ortho6d(&[0.0; 6]),
            Err(GeometryError::DegenerateRotation("ortho6d first column is zero"))
        );
        assert!(rotation_from_ortho6d(&[1.0, 0.0, 0.0, 2.0, 0.0, 0.0]).is_err());
        assert_eq!(
            rotation_from_ortho6d(&[1.0; 5]),
            Err(GeometryError::InvalidLength(6, 5))
        );
    }

    #[test]
    fn row_major_roundtrip() -> Result<(), GeometryError> {
        #[rustfmt::skip]
        let values = [
            0.0, -1.0, 0.0,
            1.0, 0.0, 0.0,
            0.0, 0.0, 1.0,
        ];
        let rotation = rotation_from_row_major(&values)?;
        // the first row maps the y axis to -x
        assert_eq!(rotation * Vec3::Y, -Vec3::X);
        assert_eq!(rotation_to_row_major(&rotation), values);
        Ok(())
    }

    #[test]
    fn row_major_is_projected_on_rotations() -> Result<(), GeometryError> {
        #[rustfmt::skip]
        let stretched = [
            1.0, 0.0, 0.0,
            0.0, 2.0, 0.0,
            0.0, 0.0, 1.0,
        ];
        let rotation = rotation_from_row_major(&stretched)?;
        assert!(orthonormality_error(&rotation) < TOL);
        assert!(rotation.abs_diff_eq(Mat3::IDENTITY, TOL));

        let noisy = [0.9, 0.2, -0.1, 0.3, 1.1, 0.4, 5.0, 5.0, 5.0];
        let rotation = rotation_from_row_major(&noisy)?;
        assert!(orthonormality_error(&rotation) < TOL);
        assert_relative_eq!(rotation.determinant(), 1.0, epsilon = TOL);

        assert!(rotation_from_row_major(&[0.0; 9]).is_err());
        assert_eq!(
            rotation_from_row_major(&[1.0; 8]),
            Err(GeometryError::InvalidLength(9, 8))
        );
        Ok(())
    }

    #[test]
    fn quaternion_is_orthonormal() -> Result<(), GeometryError> {
        for q in [[1.0, 0.0, 0.0, 0.0], [0.2, 3.0, -1.0, 0.5], [-4.0, 0.0, 0.0, 1.0]] {
            let rotation = rotation_from_quaternion(&q)?;
            assert!(orthonormality_error(&rotation) < TOL);
        }
        assert!(rotation_from_quaternion(&[0.0; 4]).is_err());
        Ok(())
    }

    #[test]
    fn quaternion_vector() {
        assert_eq!(rotation_from_quaternion_vector(Vec3::ZERO), Mat3::IDENTITY);
        let rotation = rotation_from_quaternion_vector(Vec3::new(-1.0, 1.4, -3.0));
        assert!(orthonormality_error(&rotation) < TOL);
    }

    #[test]
    fn euler_and_axis_angle_are_orthonormal() -> Result<(), GeometryError> {
        for v in [[0.0, 0.0, 0.0], [0.1, -2.0, 3.0], [10.0, 5.0, -7.5]] {
            assert!(orthonormality_error(&rotation_from_euler(&v)?) < TOL);
            assert!(orthonormality_error(&rotation_from_axis_angle(&v)?) < TOL);
        }
        Ok(())
    }

    #[test]
    fn axis_angle_quarter_turn() -> Result<(), GeometryError> {
        let rotation = rotation_from_axis_angle(&[0.0, 0.0, std::f32::consts::FRAC_PI_2])?;
        let x = rotation * Vec3::X;
        assert_relative_eq!(x.x, 0.0, epsilon = TOL);
        assert_relative_eq!(x.y, 1.0, epsilon = TOL);
        Ok(())
    }

    #[test]
    fn look_at_points_towards_target() -> Result<(), GeometryError> {
        let eye = Vec3::new(0.0, 0.0, -2.0);
        let rotation = look_at_rotation(eye, Vec3::ZERO, Vec3::Y)?;
        assert!(orthonormality_error(&rotation) < TOL);
        assert_relative_eq!(rotation.z_axis.z, 1.0, epsilon = TOL);

        // up parallel to the viewing direction
        let rotation = look_at_rotation(Vec3::new(0.0, 3.0, 0.0), Vec3::ZERO, Vec3::Y)?;
        assert!(orthonormality_error(&rotation) < TOL);

        assert!(rotation_from_look_at(&[0.0, 0.0, 0.0]).is_err());
        Ok(())
    }

    #[test]
    fn mat_theta_self_is_zero() -> Result<(), GeometryError> {
        for v in [[0.0, 0.0, 0.0], [0.3, 0.2, -0.1], [3.0, 0.0, 0.0]] {
            let rotation = rotation_from_axis_angle(&v)?;
            assert!(mat_theta(&rotation, &rotation) < 2e-3);
        }
        Ok(())
    }

    #[test]
    fn mat_theta_known_angle() {
        let a = Mat3::IDENTITY;
        let b = Mat3::from_rotation_x(0.5);
        assert_relative_eq!(mat_theta(&a, &b), 0.5, epsilon = 1e-4);

        let c = Mat3::from_rotation_y(std::f32::consts::PI);
        assert_relative_eq!(mat_theta(&a, &c), std::f32::consts::PI, epsilon = 1e-3);
    }

    #[test]
    fn mat_theta_clamps_overshoot() {
        // trace slightly above 3 from rounding must not produce NaN
        let a = Mat3::IDENTITY * 1.000_001;
        let theta = mat_theta(&a, &a);
        assert!(theta.is_finite());
        assert_eq!(theta, 0.0);

        let b = Mat3::from_diagonal(Vec3::new(-1.000_001, -1.000_001, 1.0));
        assert!(mat_theta(&Mat3::IDENTITY, &b).is_finite());
    }
}
