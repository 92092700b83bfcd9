use glam::{Mat3, Vec3};
use rand::Rng;

use crate::error::RenderError;

/// An indexed triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    vertices: Vec<Vec3>,
    faces: Vec<[u32; 3]>,
}

impl Mesh {
    /// Create a mesh from vertices and counter-clockwise triangles.
    ///
    /// # Errors
    ///
    /// Fails if a face references a vertex that does not exist.
    pub fn new(vertices: Vec<Vec3>, faces: Vec<[u32; 3]>) -> Result<Self, RenderError> {
        let num_vertices = vertices.len();
        if let Some(face) = faces
            .iter()
            .find(|f| f.iter().any(|&i| i as usize >= num_vertices))
        {
            return Err(RenderError::InvalidMesh(format!(
                "face {face:?} references a vertex out of {num_vertices}"
            )));
        }
        Ok(Self { vertices, faces })
    }

    /// An axis-aligned box centered at the origin with the given edge lengths.
    pub fn cuboid(extent: Vec3) -> Self {
        let h = extent * 0.5;
        let vertices = vec![
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(-h.x, h.y, -h.z),
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
        ];
        #[rustfmt::skip]
        let faces = vec![
            [0, 2, 1], [0, 3, 2], // -z
            [4, 5, 6], [4, 6, 7], // +z
            [0, 1, 5], [0, 5, 4], // -y
            [3, 7, 6], [3, 6, 2], // +y
            [0, 4, 7], [0, 7, 3], // -x
            [1, 2, 6], [1, 6, 5], // +x
        ];
        Self { vertices, faces }
    }

    /// Append the vertices and faces of `other`.
    pub fn merge(mut self, other: &Mesh) -> Self {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|f| [f[0] + offset, f[1] + offset, f[2] + offset]),
        );
        self
    }

    /// Return a copy with every vertex mapped to `R * v + t`.
    pub fn transformed(&self, rotation: &Mat3, translation: Vec3) -> Self {
        Self {
            vertices: self
                .vertices
                .iter()
                .map(|v| *rotation * *v + translation)
                .collect(),
            faces: self.faces.clone(),
        }
    }

    /// The mesh vertices.
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// The triangle indices.
    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    /// The corners of face `index`.
    pub fn triangle(&self, index: usize) -> [Vec3; 3] {
        let f = self.faces[index];
        [
            self.vertices[f[0] as usize],
            self.vertices[f[1] as usize],
            self.vertices[f[2] as usize],
        ]
    }

    /// Total surface area.
    pub fn area(&self) -> f32 {
        (0..self.faces.len()).map(|i| triangle_area(&self.triangle(i))).sum()
    }

    /// Sample `num_points` points uniformly over the surface.
    pub fn sample_points<R: Rng + ?Sized>(
        &self,
        num_points: usize,
        rng: &mut R,
    ) -> Result<Vec<[f32; 3]>, RenderError> {
        if self.faces.is_empty() {
            return Err(RenderError::EmptyMesh);
        }

        // cumulative areas to pick faces proportionally to their size
        let mut cumulative = Vec::with_capacity(self.faces.len());
        let mut total = 0.0;
        for i in 0..self.faces.len() {
            total += triangle_area(&self.triangle(i));
            cumulative.push(total);
        }
        if total <= 0.0 {
            return Err(RenderError::EmptyMesh);
        }

        let points = (0..num_points)
            .map(|_| {
                let target = rng.random_range(0.0..total);
                let face = cumulative
                    .partition_point(|&c| c <= target)
                    .min(self.faces.len() - 1);
                let [a, b, c] = self.triangle(face);

                // uniform barycentric sample
                let r1: f32 = rng.random::<f32>().sqrt();
                let r2: f32 = rng.random();
                let p = a * (1.0 - r1) + b * (r1 * (1.0 - r2)) + c * (r1 * r2);
                p.to_array()
            })
            .collect();

        Ok(points)
    }
}

fn triangle_area(t: &[Vec3; 3]) -> f32 {
    0.5 * (t[1] - t[0]).cross(t[2] - t[0]).length()
}
