//! Per-model state: the loaded scene, its surfaces and its selection.
//!
//! A session lives exactly as long as its scene. Swapping models drops the
//! whole session, which discards selection state and every cached
//! pre-highlight color of the old scene's materials.

use std::collections::HashSet;

use roomscope_core::{
    derive_surfaces, MeshKey, Scene, SelectedGeometry, SelectionStore, Surface, SurfaceId,
};

/// State tied to one loaded scene.
#[derive(Debug)]
pub struct Session {
    scene: Scene,
    surfaces: Vec<Surface>,
    selection: SelectionStore,
}

impl Session {
    /// Takes ownership of a freshly loaded scene and derives its surfaces.
    pub fn new(mut scene: Scene) -> Self {
        let surfaces = derive_surfaces(&mut scene);
        log::info!(
            "loaded model '{}' with {} surfaces",
            scene.model_id(),
            surfaces.len()
        );
        Self {
            scene,
            surfaces,
            selection: SelectionStore::new(),
        }
    }

    /// Returns the scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub(crate) fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Splits the session for the interaction controller.
    pub(crate) fn parts_mut(&mut self) -> (&mut Scene, &mut SelectionStore) {
        (&mut self.scene, &mut self.selection)
    }

    /// Returns the derived surfaces in traversal order.
    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    /// Looks a surface up by id.
    pub fn surface(&self, id: &SurfaceId) -> Option<&Surface> {
        self.surfaces.iter().find(|s| &s.id == id)
    }

    /// Returns the surface derived from `mesh`.
    pub fn surface_for_mesh(&self, mesh: MeshKey) -> Option<&Surface> {
        self.surfaces.iter().find(|s| s.mesh == mesh)
    }

    /// Returns the ids of all surfaces.
    pub fn surface_ids(&self) -> HashSet<SurfaceId> {
        self.surfaces.iter().map(|s| s.id.clone()).collect()
    }

    /// Returns the selection store.
    pub fn selection(&self) -> &SelectionStore {
        &self.selection
    }

    /// Returns the current selection, even if its mesh has since been hidden.
    pub fn selected_geometry(&self) -> Option<&SelectedGeometry> {
        self.selection.selected_geometry()
    }

    /// Returns the selection only while its mesh is visible.
    pub fn visible_selection(&self) -> Option<&SelectedGeometry> {
        self.selection.selected_geometry().filter(|selected| {
            self.scene
                .mesh(selected.mesh)
                .is_some_and(roomscope_core::Mesh::is_visible)
        })
    }

    /// Returns the surface of the visible selection.
    pub fn selected_surface(&self) -> Option<&Surface> {
        self.visible_selection()
            .and_then(|selected| self.surface_for_mesh(selected.mesh))
    }

    /// Returns the hovered mesh.
    pub fn hovered_mesh(&self) -> Option<MeshKey> {
        self.selection.hovered_mesh()
    }

    /// Returns the highlighted meshes.
    pub fn highlighted_meshes(&self) -> &HashSet<MeshKey> {
        self.selection.highlighted_meshes()
    }

    /// Sum of all surface areas.
    pub fn total_area(&self) -> f32 {
        self.surfaces.iter().map(|s| s.area).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomscope_core::{Geometry, Vec3};

    #[test]
    fn test_session_derives_surfaces() {
        let mut scene = Scene::new("room");
        let root = scene.root();
        let tri = Geometry::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
        let a = scene.add_mesh(root, "a", Some(tri.clone()), vec![]).unwrap();
        scene.add_mesh(root, "b", Some(tri), vec![]).unwrap();
        let session = Session::new(scene);
        assert_eq!(session.surfaces().len(), 2);
        assert_eq!(session.surface_for_mesh(a).unwrap().id, SurfaceId::from("0"));
        assert!(session.surface(&SurfaceId::from("1")).is_some());
        assert!((session.total_area() - 1.0).abs() < 1e-6);
        assert!(session.selected_geometry().is_none());
    }
}
