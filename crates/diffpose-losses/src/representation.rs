use std::{fmt, str::FromStr};

use diffpose_3d::rotation::{
    rotation_from_axis_angle, rotation_from_euler, rotation_from_look_at,
    rotation_from_ortho6d, rotation_from_quaternion, rotation_from_row_major,
};
use glam::Mat3;

use crate::error::LossError;

/// Encoding of the predicted orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoseRepresentation {
    /// Two 3-vectors orthonormalized with Gram-Schmidt.
    Ortho6d,
    /// A 3x3 matrix in row-major order, orthonormalized with Gram-Schmidt on its rows.
    RotationMatrix,
    /// A quaternion `(w, x, y, z)`, normalized before use.
    Quaternion,
    /// Intrinsic `XYZ` Euler angles in radians.
    Euler,
    /// A rotation vector.
    AxisAngle,
    /// A camera position looking at the origin.
    LookAt,
}

impl PoseRepresentation {
    /// All the representations.
    pub const ALL: [PoseRepresentation; 6] = [
        PoseRepresentation::Ortho6d,
        PoseRepresentation::RotationMatrix,
        PoseRepresentation::Quaternion,
        PoseRepresentation::Euler,
        PoseRepresentation::AxisAngle,
        PoseRepresentation::LookAt,
    ];

    /// The identifier used on the command line and in configs.
    pub fn as_str(&self) -> &'static str {
        match self {
            PoseRepresentation::Ortho6d => "6d-pose",
            PoseRepresentation::RotationMatrix => "rot-mat",
            PoseRepresentation::Quaternion => "quat",
            PoseRepresentation::Euler => "euler",
            PoseRepresentation::AxisAngle => "axis-angle",
            PoseRepresentation::LookAt => "look-at",
        }
    }

    /// Number of values encoding one orientation.
    pub fn dim(&self) -> usize {
        match self {
            PoseRepresentation::Ortho6d => 6,
            PoseRepresentation::RotationMatrix => 9,
            PoseRepresentation::Quaternion => 4,
            PoseRepresentation::Euler
            | PoseRepresentation::AxisAngle
            | PoseRepresentation::LookAt => 3,
        }
    }

    /// Convert one encoded orientation to a rotation matrix.
    pub fn to_rotation(self, values: &[f32]) -> Result<Mat3, LossError> {
        if values.len() != self.dim() {
            return Err(LossError::InvalidRowLength(self.dim(), values.len()));
        }

        let rotation = match self {
            PoseRepresentation::Ortho6d => rotation_from_ortho6d(values)?,
            PoseRepresentation::RotationMatrix => rotation_from_row_major(values)?,
            PoseRepresentation::Quaternion => rotation_from_quaternion(values)?,
            PoseRepresentation::Euler => rotation_from_euler(values)?,
            PoseRepresentation::AxisAngle => rotation_from_axis_angle(values)?,
            PoseRepresentation::LookAt => rotation_from_look_at(values)?,
        };

        Ok(rotation)
    }

    /// Convert a batch of encoded orientations.
    pub fn to_rotations(self, rows: &[Vec<f32>]) -> Result<Vec<Mat3>, LossError> {
        rows.iter().map(|row| self.to_rotation(row)).collect()
    }
}

impl fmt::Display for PoseRepresentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PoseRepresentation {
    type Err = LossError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| LossError::UnknownRepresentation(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diffpose_3d::rotation::orthonormality_error;

    #[test]
    fn parse_representations() -> Result<(), LossError> {
        for repr in PoseRepresentation::ALL {
            assert_eq!(repr.as_str().parse::<PoseRepresentation>()?, repr);
        }
        assert_eq!(
            "quaternion".parse::<PoseRepresentation>(),
            Err(LossError::UnknownRepresentation("quaternion".into()))
        );
        Ok(())
    }

    #[test]
    fn every_representation_is_orthonormal() -> Result<(), LossError> {
        let inputs: [(PoseRepresentation, Vec<f32>); 6] = [
            (PoseRepresentation::Ortho6d, vec![0.3, -2.0, 0.5, 1.0, 1.0, 1.0]),
            (
                PoseRepresentation::RotationMatrix,
                vec![1.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 1.0],
            ),
            (PoseRepresentation::Quaternion, vec![0.2, 3.0, -1.0, 0.5]),
            (PoseRepresentation::Euler, vec![0.1, -2.0, 3.0]),
            (PoseRepresentation::AxisAngle, vec![1.0, 0.5, -0.25]),
            (PoseRepresentation::LookAt, vec![1.0, 2.0, -3.0]),
        ];

        for (repr, values) in inputs {
            let rotation = repr.to_rotation(&values)?;
            assert!(orthonormality_error(&rotation) < 1e-5, "{repr}");
        }
        Ok(())
    }

    #[test]
    fn wrong_row_length() {
        assert_eq!(
            PoseRepresentation::Quaternion.to_rotation(&[1.0, 0.0, 0.0]),
            Err(LossError::InvalidRowLength(4, 3))
        );
    }
}
