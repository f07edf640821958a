//! Surfaces derived from the meshes of a loaded scene.
//!
//! Surfaces are recomputed wholesale on every scene load. The first
//! derivation tags each mesh with its traversal ordinal, so later
//! derivations against the same scene resolve the same ids.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::BoundingBox;
use crate::scene::{MeshKey, Scene};

/// Stable identity of a surface within one loaded scene.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceId(String);

impl SurfaceId {
    /// Creates a surface id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SurfaceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SurfaceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One mesh of a scene, as presented to surface panels.
#[derive(Debug, Clone)]
pub struct Surface {
    /// Stable identity used for material assignment.
    pub id: SurfaceId,
    /// 1-based position among the derived surfaces.
    pub display_index: usize,
    /// Mesh name, possibly empty.
    pub name: String,
    /// Number of triangles.
    pub face_count: usize,
    /// Total triangle area.
    pub area: f32,
    /// Absolute enclosed volume.
    pub volume: f32,
    /// Local bounds, absent when they cannot be computed.
    pub bounding_box: Option<BoundingBox>,
    /// Owning mesh. Only meaningful against the scene it was derived from.
    pub mesh: MeshKey,
}

impl Surface {
    /// Human-facing label: the mesh name, or `Surface [n]` when unnamed.
    pub fn label(&self) -> String {
        if self.name.trim().is_empty() {
            format!("Surface [{}]", self.display_index)
        } else {
            self.name.clone()
        }
    }
}

/// Derives the ordered surface list of a scene.
///
/// Meshes without geometry are skipped with a warning.
pub fn derive_surfaces(scene: &mut Scene) -> Vec<Surface> {
    let order = scene.mesh_order();
    let mut surfaces = Vec::with_capacity(order.len());

    for (ordinal, key) in order.into_iter().enumerate() {
        let Some(mesh) = scene.mesh_mut(key) else {
            continue;
        };
        mesh.tag_ordinal(ordinal);

        if mesh.geometry().is_none() {
            log::warn!(
                "skipping mesh '{}' (ordinal {ordinal}): no geometry",
                mesh.name()
            );
            continue;
        }
        let Some(geometry) = mesh.geometry_mut() else {
            continue;
        };
        let bounding_box = geometry.bounding_box();
        let face_count = geometry.face_count();
        let area = geometry.area();
        let volume = geometry.volume();

        surfaces.push(Surface {
            id: SurfaceId::new(mesh.stable_id()),
            display_index: surfaces.len() + 1,
            name: mesh.name().to_string(),
            face_count,
            area,
            volume,
            bounding_box,
            mesh: key,
        });
    }

    log::debug!(
        "derived {} surfaces from model '{}'",
        surfaces.len(),
        scene.model_id()
    );
    surfaces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use glam::Vec3;
    use proptest::prelude::*;

    /// A strip of `n` triangles sharing an index buffer.
    fn strip(n: usize) -> Geometry {
        let mut positions = Vec::new();
        for i in 0..=n + 1 {
            positions.push(Vec3::new(i as f32, (i % 2) as f32, 0.0));
        }
        let mut indices = Vec::new();
        for i in 0..n as u32 {
            indices.extend_from_slice(&[i, i + 1, i + 2]);
        }
        Geometry::indexed(positions, indices)
    }

    #[test]
    fn test_face_counts_and_display_indices() {
        let mut scene = Scene::new("room");
        let root = scene.root();
        for n in [2, 4, 6] {
            scene
                .add_mesh(root, "", Some(strip(n)), vec![])
                .unwrap();
        }
        let surfaces = derive_surfaces(&mut scene);
        let counts: Vec<usize> = surfaces.iter().map(|s| s.face_count).collect();
        let indices: Vec<usize> = surfaces.iter().map(|s| s.display_index).collect();
        assert_eq!(counts, vec![2, 4, 6]);
        assert_eq!(indices, vec![1, 2, 3]);
        assert_eq!(surfaces[1].label(), "Surface [2]");
    }

    #[test]
    fn test_flat_face_count_floors() {
        let mut scene = Scene::new("room");
        let root = scene.root();
        scene
            .add_mesh(root, "flat", Some(Geometry::new(vec![Vec3::ZERO; 8])), vec![])
            .unwrap();
        let surfaces = derive_surfaces(&mut scene);
        assert_eq!(surfaces[0].face_count, 2);
        assert_eq!(surfaces[0].label(), "flat");
    }

    #[test]
    fn test_malformed_mesh_is_skipped() {
        let mut scene = Scene::new("room");
        let root = scene.root();
        scene.add_mesh(root, "a", Some(strip(1)), vec![]).unwrap();
        scene.add_mesh(root, "broken", None, vec![]).unwrap();
        scene.add_mesh(root, "c", Some(strip(1)), vec![]).unwrap();
        let surfaces = derive_surfaces(&mut scene);
        assert_eq!(surfaces.len(), 2);
        assert_eq!(surfaces[1].name, "c");
        // Ordinals follow the traversal, so the skipped mesh keeps its slot.
        assert_eq!(surfaces[1].id.as_str(), "2");
    }

    #[test]
    fn test_attribute_id_wins() {
        let mut scene = Scene::new("room");
        let root = scene.root();
        let key = scene.add_mesh(root, "floor", Some(strip(2)), vec![]).unwrap();
        scene.mesh_mut(key).unwrap().set_attribute_id("floor-01");
        let surfaces = derive_surfaces(&mut scene);
        assert_eq!(surfaces[0].id, SurfaceId::from("floor-01"));
        assert_eq!(scene.mesh(key).unwrap().ordinal(), Some(0));
    }

    #[test]
    fn test_empty_geometry_yields_zero_metrics() {
        let mut scene = Scene::new("room");
        let root = scene.root();
        scene
            .add_mesh(root, "empty", Some(Geometry::default()), vec![])
            .unwrap();
        let surfaces = derive_surfaces(&mut scene);
        assert_eq!(surfaces.len(), 1);
        assert_eq!(surfaces[0].area, 0.0);
        assert_eq!(surfaces[0].volume, 0.0);
        assert!(surfaces[0].bounding_box.is_none());
    }

    #[test]
    fn test_surface_id_serializes_as_string() {
        let json = serde_json::to_string(&SurfaceId::from("7")).unwrap();
        assert_eq!(json, "\"7\"");
    }

    proptest! {
        #[test]
        fn prop_derivation_ids_are_idempotent(
            sizes in proptest::collection::vec(0usize..5, 0..12),
            tagged in proptest::collection::vec(any::<bool>(), 12),
        ) {
            let mut scene = Scene::new("room");
            let root = scene.root();
            for (i, n) in sizes.iter().enumerate() {
                let geometry = (*n > 0).then(|| strip(*n));
                let key = scene.add_mesh(root, format!("m{i}"), geometry, vec![]).unwrap();
                if tagged[i] {
                    scene.mesh_mut(key).unwrap().set_attribute_id(format!("attr-{i}"));
                }
            }
            let first: Vec<SurfaceId> = derive_surfaces(&mut scene).into_iter().map(|s| s.id).collect();
            let second: Vec<SurfaceId> = derive_surfaces(&mut scene).into_iter().map(|s| s.id).collect();
            prop_assert_eq!(first, second);
        }
    }
}
