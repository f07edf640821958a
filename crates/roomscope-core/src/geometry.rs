//! Triangle geometry buffers and the metrics derived from them.
//!
//! A [`Geometry`] holds vertex positions and an optional triangle index buffer.
//! Faces are read three indices at a time when indexed, otherwise three
//! positions at a time.

use glam::Vec3;

/// Axis-aligned bounding box of a geometry, in local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
    /// Extent along each axis (`max - min`).
    pub size: Vec3,
    /// Midpoint of the box.
    pub center: Vec3,
}

impl BoundingBox {
    /// Creates a bounding box from its corners.
    pub fn from_corners(min: Vec3, max: Vec3) -> Self {
        Self {
            min,
            max,
            size: max - min,
            center: (min + max) * 0.5,
        }
    }

    /// Computes the bounds of a set of points.
    ///
    /// Returns `None` for an empty set or when any coordinate is not finite.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for p in points {
            if !p.is_finite() {
                return None;
            }
            min = min.min(*p);
            max = max.max(*p);
        }
        if points.is_empty() {
            None
        } else {
            Some(Self::from_corners(min, max))
        }
    }
}

/// Vertex and index buffers of a mesh.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    positions: Vec<Vec3>,
    indices: Option<Vec<u32>>,
    /// Lazily computed local bounds.
    bounds: Option<BoundingBox>,
}

impl Geometry {
    /// Creates a non-indexed geometry: every three positions form a triangle.
    pub fn new(positions: Vec<Vec3>) -> Self {
        Self {
            positions,
            indices: None,
            bounds: None,
        }
    }

    /// Creates an indexed geometry.
    pub fn indexed(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices: Some(indices),
            bounds: None,
        }
    }

    /// Returns the vertex positions.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Returns the index buffer, if any.
    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    /// Returns the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles: `indexCount / 3` when indexed, else `vertexCount / 3`.
    pub fn face_count(&self) -> usize {
        self.indices
            .as_ref()
            .map_or(self.positions.len(), Vec::len)
            / 3
    }

    /// Returns the corners of a triangle, or `None` if it references missing vertices.
    pub fn triangle(&self, face: usize) -> Option<[Vec3; 3]> {
        let base = face.checked_mul(3)?;
        match &self.indices {
            Some(indices) => {
                let tri = indices.get(base..base + 3)?;
                Some([
                    *self.positions.get(tri[0] as usize)?,
                    *self.positions.get(tri[1] as usize)?,
                    *self.positions.get(tri[2] as usize)?,
                ])
            }
            None => {
                let tri = self.positions.get(base..base + 3)?;
                Some([tri[0], tri[1], tri[2]])
            }
        }
    }

    /// Iterates over all well-formed triangles, paired with their face index.
    pub fn triangles(&self) -> impl Iterator<Item = (usize, [Vec3; 3])> + '_ {
        (0..self.face_count()).filter_map(|face| self.triangle(face).map(|tri| (face, tri)))
    }

    /// Returns the local bounds, computing and caching them on first use.
    pub fn bounding_box(&mut self) -> Option<BoundingBox> {
        if self.bounds.is_none() {
            self.bounds = BoundingBox::from_points(&self.positions);
        }
        self.bounds
    }

    /// Returns the cached bounds without computing them.
    pub fn cached_bounding_box(&self) -> Option<BoundingBox> {
        self.bounds
    }

    /// Total surface area: sum of half cross-product magnitudes.
    pub fn area(&self) -> f32 {
        self.triangles()
            .map(|(_, [a, b, c])| triangle_area(a, b, c))
            .sum()
    }

    /// Enclosed volume from signed tetrahedra against the origin.
    ///
    /// The signed sum is absolute-valued so open or inverted meshes still give
    /// a non-negative figure.
    pub fn volume(&self) -> f32 {
        self.triangles()
            .map(|(_, [a, b, c])| signed_tetrahedron_volume(a, b, c))
            .sum::<f32>()
            .abs()
    }
}

/// Area of the triangle `abc`.
pub fn triangle_area(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    (b - a).cross(c - a).length() * 0.5
}

/// Signed volume of the tetrahedron formed by the origin and triangle `abc`.
pub fn signed_tetrahedron_volume(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    a.dot(b.cross(c)) / 6.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_cube() -> Geometry {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(0.0, 1.0, 1.0),
        ];
        #[rustfmt::skip]
        let indices = vec![
            0, 2, 1, 0, 3, 2, // bottom
            4, 5, 6, 4, 6, 7, // top
            0, 1, 5, 0, 5, 4, // front
            2, 3, 7, 2, 7, 6, // back
            1, 2, 6, 1, 6, 5, // right
            0, 4, 7, 0, 7, 3, // left
        ];
        Geometry::indexed(positions, indices)
    }

    #[test]
    fn test_face_count_indexed_and_flat() {
        assert_eq!(unit_cube().face_count(), 12);
        let flat = Geometry::new(vec![Vec3::ZERO; 7]);
        assert_eq!(flat.face_count(), 2);
    }

    #[test]
    fn test_cube_area_and_volume() {
        let cube = unit_cube();
        assert!((cube.area() - 6.0).abs() < 1e-5);
        assert!((cube.volume() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_inverted_cube_volume_is_positive() {
        let cube = unit_cube();
        let flipped: Vec<u32> = cube
            .indices()
            .unwrap()
            .chunks(3)
            .flat_map(|t| [t[0], t[2], t[1]])
            .collect();
        let inverted = Geometry::indexed(cube.positions().to_vec(), flipped);
        assert!((inverted.volume() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_geometry_metrics() {
        let mut empty = Geometry::default();
        assert_eq!(empty.face_count(), 0);
        assert_eq!(empty.area(), 0.0);
        assert_eq!(empty.volume(), 0.0);
        assert!(empty.bounding_box().is_none());
    }

    #[test]
    fn test_out_of_range_index_is_skipped() {
        let geometry = Geometry::indexed(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![0, 1, 2, 0, 1, 9],
        );
        assert_eq!(geometry.face_count(), 2);
        assert_eq!(geometry.triangles().count(), 1);
        assert!((geometry.area() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_bounding_box_cached() {
        let mut cube = unit_cube();
        assert!(cube.cached_bounding_box().is_none());
        let bounds = cube.bounding_box().unwrap();
        assert_eq!(bounds.min, Vec3::ZERO);
        assert_eq!(bounds.max, Vec3::ONE);
        assert_eq!(bounds.size, Vec3::ONE);
        assert_eq!(bounds.center, Vec3::splat(0.5));
        assert_eq!(cube.cached_bounding_box(), Some(bounds));
    }

    #[test]
    fn test_non_finite_bounds_omitted() {
        let mut geometry = Geometry::new(vec![Vec3::ZERO, Vec3::splat(f32::NAN), Vec3::X]);
        assert!(geometry.bounding_box().is_none());
    }
}
