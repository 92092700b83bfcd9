use diffpose_image::{Image, ImageSize};
use glam::{Mat3, Vec2, Vec3};
use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;

use crate::{camera::Camera, error::RenderError, mesh::Mesh, ImageBatch, Renderer};

/// Quantity written to every pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Soft coverage in `[0, 1]`.
    #[default]
    Silhouette,
    /// Depth along the optical axis of the nearest surface, `0` for background.
    Depth,
    /// Lambertian shading with a point light, blended with the soft coverage.
    Shaded,
}

/// Rasterization parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterSettings {
    /// output resolution.
    pub image_size: ImageSize,
    /// width in pixels of the blurred silhouette edge, `0` renders hard edges.
    pub blur_sigma: f32,
    /// quantity to render.
    pub mode: RenderMode,
    /// point light position in the camera frame.
    pub light_position: Vec3,
    /// ambient term of the shading.
    pub ambient: f32,
    /// number of surface points sampled for point-cloud losses.
    pub num_points: usize,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            image_size: ImageSize {
                width: 128,
                height: 128,
            },
            blur_sigma: 0.5,
            mode: RenderMode::Silhouette,
            light_position: Vec3::new(1.5, -1.5, -0.4),
            ambient: 0.3,
            num_points: 500,
        }
    }
}

/// A CPU rasterizer with soft silhouette edges.
///
/// Every triangle contributes a coverage probability `σ(d / blur_sigma)` per pixel, where `d` is
/// the signed distance of the pixel center to the triangle border (positive inside). Coverage of
/// several triangles is aggregated as `1 - Π(1 - p)`. The blurred border makes the rendered
/// image vary smoothly with the pose.
pub struct SoftRasterizer {
    mesh: Mesh,
    camera: Camera,
    settings: RasterSettings,
    points: Vec<[f32; 3]>,
}

impl SoftRasterizer {
    /// Create a rasterizer for a mesh.
    ///
    /// `settings.num_points` surface points are sampled with a fixed seed.
    pub fn new(mesh: Mesh, camera: Camera, settings: RasterSettings) -> Result<Self, RenderError> {
        if mesh.faces().is_empty() {
            return Err(RenderError::EmptyMesh);
        }

        let ImageSize { width, height } = settings.image_size;
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyImage(width, height));
        }

        let mut rng = StdRng::seed_from_u64(0);
        let points = mesh.sample_points(settings.num_points, &mut rng)?;

        Ok(Self {
            mesh,
            camera,
            settings,
            points,
        })
    }

    /// Replace the model points used by point-cloud losses.
    pub fn with_points(mut self, points: Vec<[f32; 3]>) -> Self {
        self.points = points;
        self
    }

    /// The rendered mesh.
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// The camera.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// The rasterization settings.
    pub fn settings(&self) -> &RasterSettings {
        &self.settings
    }

    fn face_shade(&self, corners: &[Vec3; 3]) -> f32 {
        let [a, b, c] = *corners;
        let centroid = (a + b + c) / 3.0;

        let mut normal = (b - a).cross(c - a).normalize_or_zero();
        // light the side facing the camera
        if normal.dot(-centroid) < 0.0 {
            normal = -normal;
        }

        let light = (self.settings.light_position - centroid).normalize_or_zero();
        let diffuse = normal.dot(light).max(0.0);
        let ambient = self.settings.ambient;

        (ambient + (1.0 - ambient) * diffuse).clamp(0.0, 1.0)
    }

    fn rasterize(&self, rotation: &Mat3, translation: Vec3) -> Result<Image<f32, 1>, RenderError> {
        let size = self.settings.image_size;
        let (width, height) = (size.width, size.height);
        let num_pixels = size.area();

        let mut background = vec![1.0f32; num_pixels];
        let mut zbuffer = vec![f32::INFINITY; num_pixels];
        let mut shade = vec![0.0f32; num_pixels];
        let mut best_prob = vec![0.0f32; num_pixels];
        let mut best_shade = vec![0.0f32; num_pixels];

        let sigma = self.settings.blur_sigma;
        // sigmoid(-7) is below 1e-3, farther pixels are not touched
        let margin = if sigma > 0.0 { 7.0 * sigma } else { 0.0 };

        let cam_vertices = self
            .mesh
            .vertices()
            .iter()
            .map(|v| *rotation * *v + translation)
            .collect::<Vec<_>>();
        let projected = cam_vertices
            .iter()
            .map(|p| self.camera.project(*p))
            .collect::<Vec<_>>();

        for face in self.mesh.faces() {
            let [ia, ib, ic] = face.map(|i| i as usize);
            let (Some(a), Some(b), Some(c)) = (projected[ia], projected[ib], projected[ic]) else {
                continue;
            };
            let corners = [cam_vertices[ia], cam_vertices[ib], cam_vertices[ic]];

            let area = edge(a, b, c);
            if area.abs() < 1e-9 {
                continue;
            }

            let lo = a.min(b).min(c) - Vec2::splat(margin + 0.5);
            let hi = a.max(b).max(c) + Vec2::splat(margin - 0.5);
            if hi.x < 0.0 || hi.y < 0.0 || lo.x > (width - 1) as f32 || lo.y > (height - 1) as f32
            {
                continue;
            }
            let x0 = lo.x.floor().max(0.0) as usize;
            let y0 = lo.y.floor().max(0.0) as usize;
            let x1 = (hi.x.ceil() as usize).min(width - 1);
            let y1 = (hi.y.ceil() as usize).min(height - 1);

            let face_shade = self.face_shade(&corners);

            for y in y0..=y1 {
                for x in x0..=x1 {
                    let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                    let w0 = edge(b, c, p) / area;
                    let w1 = edge(c, a, p) / area;
                    let w2 = edge(a, b, p) / area;
                    let inside = w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0;
                    let idx = y * width + x;

                    if inside {
                        // perspective-correct depth
                        let z = 1.0
                            / (w0 / corners[0].z + w1 / corners[1].z + w2 / corners[2].z);
                        if z < zbuffer[idx] {
                            zbuffer[idx] = z;
                            shade[idx] = face_shade;
                        }
                    }

                    let prob = if sigma > 0.0 {
                        let d = distance_to_triangle_border(p, a, b, c);
                        let signed = if inside { d } else { -d };
                        sigmoid(signed / sigma)
                    } else if inside {
                        1.0
                    } else {
                        0.0
                    };

                    background[idx] *= 1.0 - prob;
                    if prob > best_prob[idx] {
                        best_prob[idx] = prob;
                        best_shade[idx] = face_shade;
                    }
                }
            }
        }

        let data = match self.settings.mode {
            RenderMode::Silhouette => background.iter().map(|b| 1.0 - b).collect(),
            RenderMode::Depth => zbuffer
                .iter()
                .map(|&z| if z.is_finite() { z } else { 0.0 })
                .collect(),
            RenderMode::Shaded => (0..num_pixels)
                .map(|i| {
                    let alpha = 1.0 - background[i];
                    let s = if zbuffer[i].is_finite() {
                        shade[i]
                    } else {
                        best_shade[i]
                    };
                    alpha * s
                })
                .collect(),
        };

        Ok(Image::new(size, data)?)
    }
}

impl Renderer for SoftRasterizer {
    fn image_size(&self) -> ImageSize {
        self.settings.image_size
    }

    fn points(&self) -> &[[f32; 3]] {
        &self.points
    }

    fn render(&self, rotation: &Mat3, translation: Vec3) -> Result<Image<f32, 1>, RenderError> {
        self.rasterize(rotation, translation)
    }

    fn render_batch(
        &self,
        rotations: &[Mat3],
        translations: &[Vec3],
    ) -> Result<ImageBatch, RenderError> {
        if rotations.len() != translations.len() {
            return Err(RenderError::MismatchedBatch(
                rotations.len(),
                translations.len(),
            ));
        }

        let images = rotations
            .par_iter()
            .zip(translations.par_iter())
            .map(|(r, t)| self.rasterize(r, *t))
            .collect::<Result<Vec<_>, _>>()?;

        log::trace!("rendered a batch of {} poses", images.len());

        ImageBatch::from_images(&images, self.settings.image_size)
    }
}

/// Twice the signed area of the triangle `(a, b, p)`.
#[inline]
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

#[inline]
fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len2 = ab.length_squared();
    let t = if len2 > 0.0 {
        ((p - a).dot(ab) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    p.distance(a + ab * t)
}

fn distance_to_triangle_border(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> f32 {
    distance_to_segment(p, a, b)
        .min(distance_to_segment(p, b, c))
        .min(distance_to_segment(p, c, a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rasterizer(mode: RenderMode, blur_sigma: f32) -> Result<SoftRasterizer, RenderError> {
        let settings = RasterSettings {
            image_size: ImageSize {
                width: 32,
                height: 32,
            },
            blur_sigma,
            mode,
            num_points: 50,
            ..Default::default()
        };
        let camera = Camera::from_fov(60.0, settings.image_size);
        SoftRasterizer::new(Mesh::cuboid(Vec3::ONE), camera, settings)
    }

    #[test]
    fn silhouette_covers_center() -> Result<(), RenderError> {
        let renderer = rasterizer(RenderMode::Silhouette, 0.5)?;
        let image = renderer.render(&Mat3::IDENTITY, Vec3::new(0.0, 0.0, 3.0))?;

        assert!(image.get_pixel(14, 18, 0)? > 0.99);
        assert!(image.get_pixel(0, 0, 0)? < 1e-3);
        assert!(image.as_slice().iter().all(|&v| (0.0..=1.0).contains(&v)));
        Ok(())
    }

    #[test]
    fn hard_silhouette_is_binary() -> Result<(), RenderError> {
        let renderer = rasterizer(RenderMode::Silhouette, 0.0)?;
        let image = renderer.render(&Mat3::from_rotation_y(0.4), Vec3::new(0.0, 0.0, 3.0))?;

        assert!(image.as_slice().iter().all(|&v| v == 0.0 || v == 1.0));
        assert!(image.as_slice().iter().any(|&v| v == 1.0));
        Ok(())
    }

    #[test]
    fn depth_of_front_face() -> Result<(), RenderError> {
        let renderer = rasterizer(RenderMode::Depth, 0.5)?;
        let image = renderer.render(&Mat3::IDENTITY, Vec3::new(0.0, 0.0, 3.0))?;

        assert_relative_eq!(image.get_pixel(14, 18, 0)?, 2.5, epsilon = 1e-3);
        assert_eq!(image.get_pixel(0, 0, 0)?, 0.0);
        Ok(())
    }

    #[test]
    fn shaded_is_bounded() -> Result<(), RenderError> {
        let renderer = rasterizer(RenderMode::Shaded, 0.5)?;
        let image = renderer.render(&Mat3::from_rotation_x(0.3), Vec3::new(0.0, 0.0, 3.0))?;

        assert!(image.get_pixel(14, 18, 0)? > 0.0);
        assert!(image.as_slice().iter().all(|&v| (0.0..=1.0).contains(&v)));
        Ok(())
    }

    #[test]
    fn object_behind_camera_is_empty() -> Result<(), RenderError> {
        let renderer = rasterizer(RenderMode::Silhouette, 0.5)?;
        let image = renderer.render(&Mat3::IDENTITY, Vec3::new(0.0, 0.0, -3.0))?;
        assert!(image.as_slice().iter().all(|&v| v == 0.0));
        Ok(())
    }

    #[test]
    fn render_batch_shape() -> Result<(), RenderError> {
        let renderer = rasterizer(RenderMode::Silhouette, 0.5)?;
        let rotations = [Mat3::IDENTITY, Mat3::from_rotation_z(0.5)];
        let translations = [Vec3::new(0.0, 0.0, 3.0); 2];

        let batch = renderer.render_batch(&rotations, &translations)?;
        assert_eq!(batch.batch_size(), 2);
        assert_eq!(batch.channels(), 1);
        assert_eq!(batch.sample_len(), 32 * 32);
        assert_eq!(renderer.points().len(), 50);

        assert_eq!(
            renderer.render_batch(&rotations, &translations[..1]),
            Err(RenderError::MismatchedBatch(2, 1))
        );
        Ok(())
    }

    #[test]
    fn empty_mesh_is_rejected() {
        let settings = RasterSettings::default();
        let camera = Camera::from_fov(60.0, settings.image_size);
        assert!(matches!(
            SoftRasterizer::new(Mesh::default(), camera, settings),
            Err(RenderError::EmptyMesh)
        ));
    }

    #[test]
    fn empty_image_is_rejected() {
        for (width, height) in [(0, 32), (32, 0), (0, 0)] {
            let settings = RasterSettings {
                image_size: ImageSize { width, height },
                ..Default::default()
            };
            let camera = Camera::from_fov(60.0, settings.image_size);
            assert!(matches!(
                SoftRasterizer::new(Mesh::cuboid(Vec3::ONE), camera, settings),
                Err(RenderError::EmptyImage(w, h)) if w == width && h == height
            ));
        }
    }
}
