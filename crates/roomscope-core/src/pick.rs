//! Ray construction and ray/mesh intersection.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::scene::{MeshKey, Scene};

/// Size of the viewport in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Viewport {
    /// Creates a viewport.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A world-space ray with a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Ray origin.
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    /// Creates a ray. Returns `None` for a zero direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.normalize_or_zero();
        if direction.length_squared() < 1e-12 {
            return None;
        }
        Some(Self { origin, direction })
    }

    /// Builds the camera ray through a pointer position given in pixels.
    ///
    /// `inverse_view_projection` maps clip space back to world space, with
    /// depth in `[0, 1]`. Returns `None` for an empty viewport or a degenerate
    /// projection.
    pub fn from_screen(
        pointer: Vec2,
        viewport: Viewport,
        inverse_view_projection: Mat4,
    ) -> Option<Self> {
        if viewport.width == 0 || viewport.height == 0 {
            return None;
        }

        let half_width = viewport.width as f32 / 2.0;
        let half_height = viewport.height as f32 / 2.0;
        let ndc_x = (pointer.x / half_width) - 1.0;
        let ndc_y = 1.0 - (pointer.y / half_height);

        let near = inverse_view_projection * Vec4::new(ndc_x, ndc_y, 0.0, 1.0);
        let far = inverse_view_projection * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);

        if near.w.abs() < 1e-6 || far.w.abs() < 1e-6 {
            return None;
        }

        let origin = near.truncate() / near.w;
        let far = far.truncate() / far.w;
        Self::new(origin, far - origin)
    }

    /// Point at parameter `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// A ray/mesh intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// The mesh that was hit.
    pub mesh: MeshKey,
    /// World-space hit point.
    pub point: Vec3,
    /// Triangle index within the mesh geometry.
    pub face_index: usize,
    /// Distance along the ray.
    pub distance: f32,
}

/// Intersects rays with scene meshes.
pub trait Raycaster {
    /// Returns the hits of `ray` against `meshes`, nearest first.
    fn intersect(&self, scene: &Scene, meshes: &[MeshKey], ray: &Ray) -> Vec<Hit>;
}

/// Brute-force triangle raycaster over world-transformed geometry.
#[derive(Debug, Clone, Copy)]
pub struct TriangleRaycaster {
    epsilon: f32,
}

impl Default for TriangleRaycaster {
    fn default() -> Self {
        Self { epsilon: 1e-6 }
    }
}

impl TriangleRaycaster {
    /// Creates a raycaster accepting hits beyond `epsilon` along the ray.
    pub fn new(epsilon: f32) -> Self {
        Self { epsilon }
    }

    /// Möller–Trumbore ray/triangle test. Returns the ray parameter of the hit.
    pub fn ray_intersect_triangle(&self, ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let h = ray.direction.cross(edge2);
        let a = edge1.dot(h);
        if a.abs() < self.epsilon {
            return None;
        }
        let f = 1.0 / a;
        let s = ray.origin - v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(edge1);
        let v = f * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = f * edge2.dot(q);
        (t > self.epsilon).then_some(t)
    }
}

impl Raycaster for TriangleRaycaster {
    fn intersect(&self, scene: &Scene, meshes: &[MeshKey], ray: &Ray) -> Vec<Hit> {
        let mut hits = Vec::new();

        for &key in meshes {
            let Some(mesh) = scene.mesh(key) else {
                continue;
            };
            let Some(geometry) = mesh.geometry() else {
                continue;
            };
            let model = mesh.transform();

            let mut best: Option<(usize, f32)> = None;
            for (face, [a, b, c]) in geometry.triangles() {
                let v0 = model.transform_point3(a);
                let v1 = model.transform_point3(b);
                let v2 = model.transform_point3(c);
                if let Some(t) = self.ray_intersect_triangle(ray, v0, v1, v2) {
                    if best.map_or(true, |(_, best_t)| t < best_t) {
                        best = Some((face, t));
                    }
                }
            }

            if let Some((face_index, distance)) = best {
                hits.push(Hit {
                    mesh: key,
                    point: ray.at(distance),
                    face_index,
                    distance,
                });
            }
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}
