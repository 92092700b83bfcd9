use diffpose_image::ImageSize;
use glam::{Vec2, Vec3};

/// A pinhole camera with the optical axis along `+z`.
///
/// Pixel coordinates follow the image convention: `u` grows to the right, `v` grows downwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// focal length along x in pixels.
    pub fx: f32,
    /// focal length along y in pixels.
    pub fy: f32,
    /// principal point x in pixels.
    pub cx: f32,
    /// principal point y in pixels.
    pub cy: f32,
    /// points closer than this depth are not rendered.
    pub near: f32,
}

impl Camera {
    /// Create a camera from the intrinsic parameters.
    pub fn new(fx: f32, fy: f32, cx: f32, cy: f32) -> Self {
        Self {
            fx,
            fy,
            cx,
            cy,
            near: 1e-3,
        }
    }

    /// Create a camera with a vertical field of view in degrees, centered on the image.
    pub fn from_fov(fov_degrees: f32, size: ImageSize) -> Self {
        let f = 0.5 * size.height as f32 / (0.5 * fov_degrees.to_radians()).tan();
        Self::new(
            f,
            f,
            0.5 * size.width as f32,
            0.5 * size.height as f32,
        )
    }

    /// Project a point in the camera frame to pixel coordinates.
    ///
    /// Returns `None` for points behind the near plane.
    pub fn project(&self, point: Vec3) -> Option<Vec2> {
        if point.z < self.near {
            return None;
        }
        Some(Vec2::new(
            self.fx * point.x / point.z + self.cx,
            self.fy * point.y / point.z + self.cy,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn project_principal_point() {
        let camera = Camera::new(100.0, 100.0, 64.0, 32.0);
        assert_eq!(camera.project(Vec3::new(0.0, 0.0, 2.0)), Some(Vec2::new(64.0, 32.0)));
        assert_eq!(camera.project(Vec3::new(1.0, 0.0, 2.0)), Some(Vec2::new(114.0, 32.0)));
        assert_eq!(camera.project(Vec3::new(0.0, 0.0, -1.0)), None);
    }

    #[test]
    fn fov_camera() {
        let size = ImageSize {
            width: 128,
            height: 128,
        };
        let camera = Camera::from_fov(90.0, size);
        assert_relative_eq!(camera.fx, 64.0, epsilon = 1e-3);
        assert_eq!(camera.cx, 64.0);
    }
}
