use glam::{Mat3, Vec3};

use crate::{error::GeometryError, linalg::transform_points};

/// A point cloud in the object frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    points: Vec<[f32; 3]>,
}

impl PointCloud {
    /// Create a new point cloud from points.
    pub fn new(points: Vec<[f32; 3]>) -> Self {
        Self { points }
    }

    /// Get the number of points in the point cloud.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get as reference the points in the point cloud.
    pub fn points(&self) -> &[[f32; 3]] {
        &self.points
    }

    /// Return a copy of the point cloud transformed by `R * p + t`.
    pub fn transformed(&self, rotation: &Mat3, translation: Vec3) -> Result<Self, GeometryError> {
        let mut points = vec![[0.0; 3]; self.points.len()];
        transform_points(&self.points, rotation, translation, &mut points)?;
        Ok(Self { points })
    }

    /// Return a copy of the point cloud rotated by `R`.
    pub fn rotated(&self, rotation: &Mat3) -> Result<Self, GeometryError> {
        self.transformed(rotation, Vec3::ZERO)
    }

}

impl From<Vec<Vec3>> for PointCloud {
    fn from(points: Vec<Vec3>) -> Self {
        Self::new(points.into_iter().map(|p| p.to_array()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointcloud_smoke() -> Result<(), GeometryError> {
        let cloud = PointCloud::new(vec![[0.0, 0.0, 0.0], [2.0, 4.0, 6.0]]);
        assert_eq!(cloud.len(), 2);

        let moved = cloud.transformed(&Mat3::IDENTITY, Vec3::ONE)?;
        assert_eq!(moved.points()[1], [3.0, 5.0, 7.0]);

        let rotated = cloud.rotated(&Mat3::from_rotation_z(std::f32::consts::FRAC_PI_2))?;
        let p = Vec3::from_array(rotated.points()[1]);
        assert!(p.abs_diff_eq(Vec3::new(-4.0, 2.0, 6.0), 1e-5));
        Ok(())
    }
}
