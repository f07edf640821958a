//! The viewer facade tying scene, interaction and material assignment together.

use std::time::Instant;

use roomscope_assign::{
    BulkValue, MaterialCatalog, MaterialChoice, MaterialId, MaterialLibrary, Notice, Reconciler,
    SaveRequest, SimulationId, SimulationRecord, SimulationStore,
};
use roomscope_core::{
    Mat4, MeshKey, Options, Ray, Raycaster, Result, RoomscopeError, Scene, Surface, SurfaceId,
    TriangleRaycaster, Vec2, Viewport,
};

use crate::interaction::{ClickOutcome, InteractionController, MarkerPlacement};
use crate::session::Session;

/// One viewer window: at most one loaded model plus its simulation binding.
pub struct Viewer<R = TriangleRaycaster> {
    options: Options,
    controller: InteractionController<R>,
    session: Option<Session>,
    reconciler: Reconciler,
    materials: MaterialLibrary,
}

impl Viewer<TriangleRaycaster> {
    /// Creates a viewer with the built-in raycaster.
    pub fn new(options: Options) -> Self {
        let controller = InteractionController::from_options(&options);
        Self::with_controller(options, controller)
    }
}

impl Default for Viewer<TriangleRaycaster> {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl<R: Raycaster> Viewer<R> {
    /// Creates a viewer around a custom raycaster.
    pub fn with_raycaster(options: Options, raycaster: R) -> Self {
        let controller = InteractionController::with_raycaster(raycaster, &options);
        Self::with_controller(options, controller)
    }

    fn with_controller(options: Options, controller: InteractionController<R>) -> Self {
        let reconciler = Reconciler::new(options.save_debounce());
        Self {
            options,
            controller,
            session: None,
            reconciler,
            materials: MaterialLibrary::default(),
        }
    }

    /// Returns the options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    // ========================================================================
    // Scene lifecycle
    // ========================================================================

    /// Replaces the active scene. All selection state of the previous scene is dropped.
    ///
    /// A simulation hydrated before any scene was loaded has its assignments
    /// checked against the new surfaces here.
    pub fn load_scene(&mut self, scene: Scene) -> &Session {
        if let Some(previous) = self.session.take() {
            log::info!("unloading model '{}'", previous.scene().model_id());
        }
        let session = Session::new(scene);
        self.reconciler.reconcile_surfaces(&session.surface_ids());
        self.session.insert(session)
    }

    /// Drops the active scene, if any.
    pub fn unload_scene(&mut self) {
        if let Some(previous) = self.session.take() {
            log::info!("unloading model '{}'", previous.scene().model_id());
        }
    }

    /// Returns the active session.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Surfaces of the active scene, empty when nothing is loaded.
    pub fn surfaces(&self) -> &[Surface] {
        self.session.as_ref().map_or(&[], Session::surfaces)
    }

    /// The surface of the visible selection.
    pub fn selected_surface(&self) -> Option<&Surface> {
        self.session.as_ref().and_then(Session::selected_surface)
    }

    fn session_mut(&mut self) -> Result<&mut Session> {
        self.session.as_mut().ok_or(RoomscopeError::NoSceneLoaded)
    }

    fn mesh_of(&self, id: &SurfaceId) -> Result<MeshKey> {
        let session = self.session.as_ref().ok_or(RoomscopeError::NoSceneLoaded)?;
        session
            .surface(id)
            .map(|surface| surface.mesh)
            .ok_or_else(|| RoomscopeError::SurfaceNotFound(id.to_string()))
    }

    // ========================================================================
    // Pointer input
    // ========================================================================

    /// Handles a pointer move. Ignored when no scene is loaded.
    pub fn pointer_move(&mut self, ray: Option<&Ray>) {
        if let Some(session) = self.session.as_mut() {
            self.controller.pointer_move(session, ray);
        }
    }

    /// Handles a pointer move given in pixels.
    pub fn pointer_move_screen(
        &mut self,
        pointer: Vec2,
        viewport: Viewport,
        inverse_view_projection: Mat4,
    ) {
        let ray = Ray::from_screen(pointer, viewport, inverse_view_projection);
        self.pointer_move(ray.as_ref());
    }

    /// Handles a click. Returns `None` when no scene is loaded.
    pub fn click(
        &mut self,
        ray: Option<&Ray>,
        markers: &mut dyn MarkerPlacement,
    ) -> Option<ClickOutcome> {
        let session = self.session.as_mut()?;
        Some(self.controller.click(session, ray, markers))
    }

    /// Handles a click given in pixels.
    pub fn click_screen(
        &mut self,
        pointer: Vec2,
        viewport: Viewport,
        inverse_view_projection: Mat4,
        markers: &mut dyn MarkerPlacement,
    ) -> Option<ClickOutcome> {
        let ray = Ray::from_screen(pointer, viewport, inverse_view_projection);
        self.click(ray.as_ref(), markers)
    }

    /// Clears the primary selection.
    pub fn clear_selection(&mut self) {
        if let Some(session) = self.session.as_mut() {
            self.controller.clear_selection(session);
        }
    }

    /// Shows or hides the mesh behind a surface.
    ///
    /// Hidden meshes are skipped by picking and hide a selection on them.
    pub fn set_surface_visible(&mut self, id: &SurfaceId, visible: bool) -> Result<()> {
        let mesh = self.mesh_of(id)?;
        let session = self.session_mut()?;
        if let Some(mesh) = session.scene_mut().mesh_mut(mesh) {
            mesh.set_visible(visible);
        }
        log::debug!("surface {id} visible = {visible}");
        Ok(())
    }

    /// Tints additional surfaces with the selection color. Returns how many were found.
    pub fn emphasize_surfaces(&mut self, ids: &[SurfaceId]) -> usize {
        let meshes: Vec<MeshKey> = ids
            .iter()
            .filter_map(|id| match self.mesh_of(id) {
                Ok(mesh) => Some(mesh),
                Err(err) => {
                    log::warn!("cannot emphasize {id}: {err}");
                    None
                }
            })
            .collect();
        if let Some(session) = self.session.as_mut() {
            self.controller.emphasize(session, &meshes);
        }
        meshes.len()
    }

    /// Removes all emphasis, keeping the primary selection.
    pub fn clear_emphasis(&mut self) {
        if let Some(session) = self.session.as_mut() {
            self.controller.clear_emphasis(session);
        }
    }

    // ========================================================================
    // Material assignment
    // ========================================================================

    /// Binds a simulation and loads its assignments, blocking on the store.
    ///
    /// Assignments to surfaces missing from the active scene are dropped.
    pub fn hydrate(
        &mut self,
        store: &mut dyn SimulationStore,
        simulation: impl Into<SimulationId>,
    ) -> Result<()> {
        let known = self.session.as_ref().map(Session::surface_ids);
        self.reconciler
            .hydrate(store, simulation.into(), known.as_ref())
    }

    /// Starts binding a simulation whose record is fetched elsewhere.
    ///
    /// Returns a pending save of the previously bound simulation to run first.
    pub fn begin_hydrate(&mut self, simulation: &SimulationId) -> Option<SaveRequest> {
        self.reconciler.begin_hydrate(simulation)
    }

    /// Finishes binding with the fetched record or the fetch error.
    pub fn finish_hydrate(
        &mut self,
        simulation: SimulationId,
        fetched: Result<SimulationRecord>,
    ) -> Result<()> {
        let known = self.session.as_ref().map(Session::surface_ids);
        self.reconciler
            .finish_hydrate(simulation, fetched, known.as_ref())
    }

    /// Fetches the acoustic materials catalog.
    pub fn load_materials(&mut self, catalog: &dyn MaterialCatalog) -> Result<()> {
        self.materials = MaterialLibrary::fetch(catalog)?;
        Ok(())
    }

    /// Returns the fetched materials catalog.
    pub fn materials(&self) -> &MaterialLibrary {
        &self.materials
    }

    /// Returns the assignment reconciler.
    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Material assigned to a surface, `None` meaning default.
    pub fn material_for(&self, id: &SurfaceId) -> Option<MaterialId> {
        self.reconciler.material_for(id)
    }

    /// Assigns a material to one surface. Unknown surfaces are ignored.
    pub fn assign(&mut self, id: &SurfaceId, choice: MaterialChoice, now: Instant) -> bool {
        if let Err(err) = self.mesh_of(id) {
            log::warn!("ignoring assignment to {id}: {err}");
            return false;
        }
        self.reconciler.assign(id.clone(), choice, now);
        true
    }

    /// Assigns a material to every listed surface in one edit.
    ///
    /// Unknown ids are skipped. Returns how many surfaces were assigned.
    pub fn assign_all(&mut self, choice: MaterialChoice, ids: &[SurfaceId], now: Instant) -> usize {
        let known = self.known(ids);
        self.reconciler.assign_all(choice, &known, now);
        known.len()
    }

    /// Whether the listed surfaces carry more than one distinct material.
    pub fn is_mixed(&self, ids: &[SurfaceId]) -> bool {
        self.reconciler.is_mixed(&self.known(ids))
    }

    /// Value to show in a bulk material control for the listed surfaces.
    pub fn resolved_value_for_bulk_control(&self, ids: &[SurfaceId]) -> BulkValue {
        self.reconciler
            .resolved_value_for_bulk_control(&self.known(ids))
    }

    /// Label for a bulk material control, using catalog names where known.
    pub fn describe_bulk_value(&self, ids: &[SurfaceId]) -> String {
        self.materials
            .describe(self.resolved_value_for_bulk_control(ids))
    }

    fn known(&self, ids: &[SurfaceId]) -> Vec<SurfaceId> {
        ids.iter()
            .filter(|id| match self.mesh_of(id) {
                Ok(_) => true,
                Err(err) => {
                    log::warn!("skipping {id}: {err}");
                    false
                }
            })
            .cloned()
            .collect()
    }

    /// Writes out saves whose debounce has elapsed, blocking on the store.
    ///
    /// Hosts with a remote store use [`Self::take_due_saves`] instead.
    pub fn tick(&mut self, store: &mut dyn SimulationStore, now: Instant) -> usize {
        self.reconciler.poll(store, now)
    }

    /// Takes the saves whose debounce has elapsed, for execution off the UI thread.
    pub fn take_due_saves(&mut self, now: Instant) -> Vec<SaveRequest> {
        self.reconciler.take_due_saves(now)
    }

    /// Takes the pending save immediately, for execution off the UI thread.
    pub fn take_pending_save(&mut self) -> Option<SaveRequest> {
        self.reconciler.take_pending_save()
    }

    /// Reports the outcome of a save taken with [`Self::take_due_saves`].
    pub fn complete_save(&mut self, simulation: &SimulationId, outcome: Result<()>) {
        self.reconciler.complete_save(simulation, outcome);
    }

    /// Writes out any pending save immediately.
    pub fn flush(&mut self, store: &mut dyn SimulationStore) -> bool {
        self.reconciler.flush(store)
    }

    /// Schedules another save of the current mapping after a failure.
    pub fn retry_save(&mut self, now: Instant) -> Result<()> {
        self.reconciler.retry_save(now)
    }

    /// Takes the pending user notices.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.reconciler.drain_notices()
    }
}
