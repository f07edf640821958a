//! Pointer-driven hover and selection.
//!
//! Every pointer move and click is raycast against the visible meshes of the
//! active scene. The controller moves the selection store and the material
//! tints together, giving the primary selection precedence over hover.

use roomscope_core::{
    HighlightEngine, HighlightState, Hit, MeshKey, Options, Ray, Raycaster, Scene,
    SelectedGeometry, SelectionStore, TriangleRaycaster,
};

use crate::session::Session;

/// The source/receiver placement feature, as seen from mesh picking.
pub trait MarkerPlacement {
    /// Whether a marker transform gesture (gizmo drag) is in progress.
    fn is_transforming(&self) -> bool;

    /// Whether any source or receiver marker is selected.
    fn has_selected_markers(&self) -> bool;

    /// Deselects all source and receiver markers.
    fn deselect_markers(&mut self);
}

/// Placement stub for scenes without sources or receivers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMarkers;

impl MarkerPlacement for NoMarkers {
    fn is_transforming(&self) -> bool {
        false
    }

    fn has_selected_markers(&self) -> bool {
        false
    }

    fn deselect_markers(&mut self) {}
}

/// What a click did to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A mesh became the primary selection.
    Selected(MeshKey),
    /// The click missed; any primary selection was cleared.
    Cleared,
    /// Picking was skipped because a transform gesture was active.
    Suppressed,
}

/// Drives hover and selection from pointer input.
#[derive(Debug, Clone)]
pub struct InteractionController<R = TriangleRaycaster> {
    raycaster: R,
    highlight: HighlightEngine,
    suppress_picking_while_transforming: bool,
}

impl InteractionController<TriangleRaycaster> {
    /// Creates a controller with the built-in triangle raycaster.
    pub fn from_options(options: &Options) -> Self {
        Self::with_raycaster(TriangleRaycaster::new(options.pick_epsilon), options)
    }
}

impl<R: Raycaster> InteractionController<R> {
    /// Creates a controller around a custom raycaster.
    pub fn with_raycaster(raycaster: R, options: &Options) -> Self {
        Self {
            raycaster,
            highlight: HighlightEngine::from_options(options),
            suppress_picking_while_transforming: options.suppress_picking_while_transforming,
        }
    }

    /// Returns the highlight engine.
    pub fn highlight(&self) -> &HighlightEngine {
        &self.highlight
    }

    fn nearest_hit(&self, scene: &Scene, ray: Option<&Ray>) -> Option<Hit> {
        let ray = ray?;
        let targets = scene.pickable_meshes();
        self.raycaster.intersect(scene, &targets, ray).into_iter().next()
    }

    /// Handles a pointer move. `None` means the pointer has no ray (e.g. left the viewport).
    pub fn pointer_move(&self, session: &mut Session, ray: Option<&Ray>) {
        let (scene, selection) = session.parts_mut();
        let hit = self.nearest_hit(scene, ray).map(|hit| hit.mesh);
        let previous = selection.hovered_mesh();
        if hit == previous {
            return;
        }

        if let Some(previous) = previous {
            if !selection.is_highlighted(previous) {
                self.highlight
                    .apply_state(scene, previous, HighlightState::None);
            }
        }
        if let Some(mesh) = hit {
            if !selection.is_highlighted(mesh) {
                self.highlight.apply_state(scene, mesh, HighlightState::Hover);
            }
        }
        log::debug!("hover {previous:?} -> {hit:?}");
        selection.set_hovered_mesh(hit);
    }

    /// Handles a click.
    pub fn click(
        &self,
        session: &mut Session,
        ray: Option<&Ray>,
        markers: &mut dyn MarkerPlacement,
    ) -> ClickOutcome {
        let transforming = markers.is_transforming();
        if !transforming && markers.has_selected_markers() {
            markers.deselect_markers();
        }
        if transforming && self.suppress_picking_while_transforming {
            log::debug!("click ignored during transform gesture");
            return ClickOutcome::Suppressed;
        }

        let (scene, selection) = session.parts_mut();
        let previous = selection.primary_mesh();

        let Some(hit) = self.nearest_hit(scene, ray) else {
            if let Some(previous) = previous {
                self.release(scene, selection, previous);
                selection.clear_selection();
                log::debug!("selection cleared");
            }
            return ClickOutcome::Cleared;
        };

        if let Some(previous) = previous.filter(|p| *p != hit.mesh) {
            self.release(scene, selection, previous);
        }
        self.highlight
            .apply_state(scene, hit.mesh, HighlightState::Selected);
        selection.add_highlighted_mesh(hit.mesh);
        scene.ensure_ordinal(hit.mesh);

        let material = scene
            .mesh(hit.mesh)
            .and_then(|mesh| mesh.materials().first().copied());
        selection.select_geometry(Some(SelectedGeometry {
            mesh: hit.mesh,
            face_index: Some(hit.face_index),
            point: hit.point,
            material,
        }));
        log::debug!(
            "selected face {} at ({:.3}, {:.3}, {:.3})",
            hit.face_index,
            hit.point.x,
            hit.point.y,
            hit.point.z
        );
        ClickOutcome::Selected(hit.mesh)
    }

    /// Explicitly clears the primary selection and restores its colors.
    pub fn clear_selection(&self, session: &mut Session) {
        let (scene, selection) = session.parts_mut();
        if let Some(previous) = selection.primary_mesh() {
            self.release(scene, selection, previous);
        }
        selection.clear_selection();
    }

    /// Adds meshes to the highlighted set with the selection tint.
    ///
    /// Meshes the session's scene did not issue are skipped.
    pub fn emphasize(&self, session: &mut Session, meshes: &[MeshKey]) {
        let (scene, selection) = session.parts_mut();
        for &mesh in meshes {
            if scene.mesh(mesh).is_none() {
                continue;
            }
            self.highlight
                .apply_state(scene, mesh, HighlightState::Selected);
            selection.add_highlighted_mesh(mesh);
        }
    }

    /// Removes every highlighted mesh except the primary selection.
    ///
    /// A mesh still under the pointer falls back to the hover tint.
    pub fn clear_emphasis(&self, session: &mut Session) {
        let (scene, selection) = session.parts_mut();
        let primary = selection.primary_mesh();
        let emphasized: Vec<MeshKey> = selection
            .highlighted_meshes()
            .iter()
            .copied()
            .filter(|mesh| Some(*mesh) != primary)
            .collect();
        for mesh in emphasized {
            self.release(scene, selection, mesh);
            if selection.hovered_mesh() == Some(mesh) {
                self.highlight.apply_state(scene, mesh, HighlightState::Hover);
            }
        }
    }

    fn release(&self, scene: &mut Scene, selection: &mut SelectionStore, mesh: MeshKey) {
        selection.remove_highlighted_mesh(mesh);
        self.highlight.apply_state(scene, mesh, HighlightState::None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomscope_core::{Geometry, Vec3};

    const ORIGINAL: Vec3 = Vec3::new(0.4, 0.4, 0.4);

    struct Markers {
        transforming: bool,
        selected: bool,
    }

    impl MarkerPlacement for Markers {
        fn is_transforming(&self) -> bool {
            self.transforming
        }

        fn has_selected_markers(&self) -> bool {
            self.selected
        }

        fn deselect_markers(&mut self) {
            self.selected = false;
        }
    }

    /// Two unit quads side by side facing +Z: `a` around x = 0, `b` around x = 5.
    fn session() -> (Session, MeshKey, MeshKey) {
        let mut scene = Scene::new("room");
        let root = scene.root();
        let quad = |x: f32| {
            Geometry::indexed(
                vec![
                    Vec3::new(x - 1.0, -1.0, 0.0),
                    Vec3::new(x + 1.0, -1.0, 0.0),
                    Vec3::new(x + 1.0, 1.0, 0.0),
                    Vec3::new(x - 1.0, 1.0, 0.0),
                ],
                vec![0, 1, 2, 0, 2, 3],
            )
        };
        let ma = scene.add_material("a", ORIGINAL);
        let mb = scene.add_material("b", ORIGINAL);
        let a = scene.add_mesh(root, "a", Some(quad(0.0)), vec![ma]).unwrap();
        let b = scene.add_mesh(root, "b", Some(quad(5.0)), vec![mb]).unwrap();
        (Session::new(scene), a, b)
    }

    fn ray_at(x: f32) -> Ray {
        Ray::new(Vec3::new(x, 0.2, 5.0), Vec3::NEG_Z).unwrap()
    }

    fn color(session: &Session, mesh: MeshKey) -> Vec3 {
        let scene = session.scene();
        let key = scene.mesh(mesh).unwrap().materials()[0];
        scene.material(key).unwrap().color()
    }

    #[test]
    fn test_hover_moves_between_meshes() {
        let controller = InteractionController::from_options(&Options::default());
        let hover = controller.highlight().hover_color();
        let (mut session, a, b) = session();

        controller.pointer_move(&mut session, Some(&ray_at(0.0)));
        assert_eq!(session.hovered_mesh(), Some(a));
        assert_eq!(color(&session, a), hover);

        controller.pointer_move(&mut session, Some(&ray_at(5.0)));
        assert_eq!(session.hovered_mesh(), Some(b));
        assert_eq!(color(&session, a), ORIGINAL);
        assert_eq!(color(&session, b), hover);

        controller.pointer_move(&mut session, Some(&ray_at(20.0)));
        assert!(session.hovered_mesh().is_none());
        assert_eq!(color(&session, b), ORIGINAL);
    }

    #[test]
    fn test_no_ray_is_a_miss() {
        let controller = InteractionController::from_options(&Options::default());
        let (mut session, a, _) = session();
        controller.pointer_move(&mut session, Some(&ray_at(0.0)));
        controller.pointer_move(&mut session, None);
        assert!(session.hovered_mesh().is_none());
        assert_eq!(color(&session, a), ORIGINAL);
    }

    #[test]
    fn test_hover_does_not_override_selection() {
        let controller = InteractionController::from_options(&Options::default());
        let selected = controller.highlight().selected_color();
        let (mut session, a, _) = session();
        controller.click(&mut session, Some(&ray_at(0.0)), &mut NoMarkers);
        controller.pointer_move(&mut session, Some(&ray_at(0.0)));
        controller.pointer_move(&mut session, Some(&ray_at(5.0)));
        controller.pointer_move(&mut session, Some(&ray_at(0.0)));
        assert_eq!(color(&session, a), selected);
    }

    #[test]
    fn test_click_then_miss_clears() {
        let controller = InteractionController::from_options(&Options::default());
        let (mut session, a, _) = session();
        let outcome = controller.click(&mut session, Some(&ray_at(0.0)), &mut NoMarkers);
        assert_eq!(outcome, ClickOutcome::Selected(a));
        let selection = session.selected_geometry().unwrap();
        assert_eq!(selection.face_index, Some(1));
        assert!((selection.point - Vec3::new(0.0, 0.2, 0.0)).length() < 1e-5);
        assert!(selection.material.is_some());
        assert!(session.highlighted_meshes().contains(&a));

        let outcome = controller.click(&mut session, Some(&ray_at(20.0)), &mut NoMarkers);
        assert_eq!(outcome, ClickOutcome::Cleared);
        assert!(session.selected_geometry().is_none());
        assert!(!session.highlighted_meshes().contains(&a));
        assert_eq!(color(&session, a), ORIGINAL);
    }

    #[test]
    fn test_click_other_mesh_moves_selection() {
        let controller = InteractionController::from_options(&Options::default());
        let (mut session, a, b) = session();
        controller.click(&mut session, Some(&ray_at(0.0)), &mut NoMarkers);
        controller.click(&mut session, Some(&ray_at(5.0)), &mut NoMarkers);
        assert_eq!(session.selection().primary_mesh(), Some(b));
        assert!(!session.highlighted_meshes().contains(&a));
        assert_eq!(color(&session, a), ORIGINAL);
    }

    #[test]
    fn test_click_deselects_markers_unless_transforming() {
        let controller = InteractionController::from_options(&Options::default());
        let (mut session, a, _) = session();

        let mut markers = Markers {
            transforming: true,
            selected: true,
        };
        let outcome = controller.click(&mut session, Some(&ray_at(0.0)), &mut markers);
        assert!(markers.selected);
        assert_eq!(outcome, ClickOutcome::Selected(a));

        markers.transforming = false;
        controller.click(&mut session, Some(&ray_at(0.0)), &mut markers);
        assert!(!markers.selected);
    }

    #[test]
    fn test_optional_suppression_during_transform() {
        let options = Options {
            suppress_picking_while_transforming: true,
            ..Options::default()
        };
        let controller = InteractionController::from_options(&options);
        let (mut session, _, _) = session();
        let mut markers = Markers {
            transforming: true,
            selected: false,
        };
        let outcome = controller.click(&mut session, Some(&ray_at(0.0)), &mut markers);
        assert_eq!(outcome, ClickOutcome::Suppressed);
        assert!(session.selected_geometry().is_none());
    }

    #[test]
    fn test_hidden_mesh_is_not_pickable() {
        let controller = InteractionController::from_options(&Options::default());
        let (mut session, a, _) = session();
        controller.click(&mut session, Some(&ray_at(0.0)), &mut NoMarkers);
        session.scene_mut().mesh_mut(a).unwrap().set_visible(false);
        assert!(session.visible_selection().is_none());
        assert!(session.selected_geometry().is_some());

        let outcome = controller.click(&mut session, Some(&ray_at(0.0)), &mut NoMarkers);
        assert_eq!(outcome, ClickOutcome::Cleared);
        assert!(session.selected_geometry().is_none());
        assert_eq!(color(&session, a), ORIGINAL);
    }

    #[test]
    fn test_emphasis_and_clear() {
        let controller = InteractionController::from_options(&Options::default());
        let selected = controller.highlight().selected_color();
        let hover = controller.highlight().hover_color();
        let (mut session, a, b) = session();
        controller.click(&mut session, Some(&ray_at(0.0)), &mut NoMarkers);
        controller.pointer_move(&mut session, Some(&ray_at(5.0)));
        controller.emphasize(&mut session, &[b]);
        assert_eq!(color(&session, b), selected);

        controller.clear_emphasis(&mut session);
        assert!(session.highlighted_meshes().contains(&a));
        assert!(!session.highlighted_meshes().contains(&b));
        assert_eq!(color(&session, b), hover);
        assert_eq!(color(&session, a), selected);
    }

    #[test]
    fn test_handles_from_previous_session_are_ignored() {
        let controller = InteractionController::from_options(&Options::default());
        let (old, stale, _) = session();
        drop(old);
        let (mut session, a, _) = session();

        controller.emphasize(&mut session, &[stale]);
        assert!(session.highlighted_meshes().is_empty());
        assert_eq!(color(&session, a), ORIGINAL);
    }

    #[test]
    fn test_explicit_clear_selection() {
        let controller = InteractionController::from_options(&Options::default());
        let (mut session, a, _) = session();
        controller.click(&mut session, Some(&ray_at(0.0)), &mut NoMarkers);
        controller.clear_selection(&mut session);
        assert!(session.selected_geometry().is_none());
        assert!(session.highlighted_meshes().is_empty());
        assert_eq!(color(&session, a), ORIGINAL);
    }
}
