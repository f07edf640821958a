//! Hover, selection and highlight-set state for one loaded scene.
//!
//! Pure state: nothing here touches material colors.

use std::collections::HashSet;

use glam::Vec3;

use crate::scene::{MaterialKey, MeshKey};

/// The primary selection: what was clicked and where.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedGeometry {
    /// The clicked mesh.
    pub mesh: MeshKey,
    /// Triangle index of the hit, when known.
    pub face_index: Option<usize>,
    /// World-space hit point.
    pub point: Vec3,
    /// First material of the mesh, for display only.
    pub material: Option<MaterialKey>,
}

/// Selection state container.
#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    selected: Option<SelectedGeometry>,
    hovered: Option<MeshKey>,
    highlighted: HashSet<MeshKey>,
}

impl SelectionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the selection. `None` clears it.
    pub fn select_geometry(&mut self, selection: Option<SelectedGeometry>) {
        self.selected = selection;
    }

    /// Clears the selection; highlighted meshes are left untouched.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Returns the current selection.
    pub fn selected_geometry(&self) -> Option<&SelectedGeometry> {
        self.selected.as_ref()
    }

    /// Returns the mesh of the current selection.
    pub fn primary_mesh(&self) -> Option<MeshKey> {
        self.selected.as_ref().map(|s| s.mesh)
    }

    /// Sets the hovered mesh.
    pub fn set_hovered_mesh(&mut self, mesh: Option<MeshKey>) {
        self.hovered = mesh;
    }

    /// Returns the hovered mesh.
    pub fn hovered_mesh(&self) -> Option<MeshKey> {
        self.hovered
    }

    /// Adds a mesh to the highlighted set. Adding twice is a no-op.
    pub fn add_highlighted_mesh(&mut self, mesh: MeshKey) {
        self.highlighted.insert(mesh);
    }

    /// Removes a mesh from the highlighted set. Removing a non-member is a no-op.
    pub fn remove_highlighted_mesh(&mut self, mesh: MeshKey) {
        self.highlighted.remove(&mesh);
    }

    /// Empties the highlighted set.
    pub fn clear_highlights(&mut self) {
        self.highlighted.clear();
    }

    /// Returns the highlighted set.
    pub fn highlighted_meshes(&self) -> &HashSet<MeshKey> {
        &self.highlighted
    }

    /// Returns whether `mesh` is highlighted.
    pub fn is_highlighted(&self, mesh: MeshKey) -> bool {
        self.highlighted.contains(&mesh)
    }

    /// Drops all state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
