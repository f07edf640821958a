//! Surface to material assignment with optimistic local edits and debounced saves.
//!
//! Local edits apply immediately and schedule a write of the whole map.
//! Bursts of edits inside the debounce window coalesce into one write that
//! carries the map as it is when the timer fires. A failed write is reported
//! but never rolled back.
//!
//! Store I/O is detached from the reconciler: due saves are handed out as
//! [`SaveRequest`] snapshots that can run on any thread, and their outcome is
//! reported back with [`Reconciler::complete_save`]. Hydration splits the
//! same way into [`Reconciler::begin_hydrate`] and
//! [`Reconciler::finish_hydrate`]. The `poll`, `flush` and `hydrate`
//! wrappers run both halves inline for local stores.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::fmt;
use std::time::{Duration, Instant};

use roomscope_core::{Result, RoomscopeError, SurfaceId};

use crate::record::{AssignmentMap, MaterialChoice, MaterialId, SimulationId, SimulationRecord};
use crate::scheduler::Debouncer;
use crate::store::SimulationStore;

/// Resolved value of a bulk material control over a set of surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BulkValue {
    /// Surfaces do not share one assignment.
    Mixed,
    /// All surfaces use the default material.
    Default,
    /// All surfaces use this material.
    Shared(MaterialId),
}

impl fmt::Display for BulkValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mixed => f.write_str("mixed"),
            Self::Default => f.write_str("default"),
            Self::Shared(id) => write!(f, "{id}"),
        }
    }
}

/// Severity of a user notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Operation succeeded.
    Success,
    /// Operation failed.
    Error,
}

/// A non-blocking user notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Message text.
    pub message: String,
}

impl Notice {
    fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Most notices kept when the host does not drain them; older ones are dropped.
pub const MAX_NOTICES: usize = 16;

/// A snapshot of the mapping to write, detached from the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    /// Target simulation.
    pub simulation: SimulationId,
    /// Mapping at the moment the save was taken.
    pub assignments: AssignmentMap,
    /// Reconciler revision of the snapshot.
    pub revision: u64,
}

impl SaveRequest {
    /// Fetch-modify-write of the whole record with this snapshot.
    ///
    /// Fields other than the assignments are written back as fetched.
    pub fn execute<S: SimulationStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        let mut record = store.get(&self.simulation)?;
        record.layer_id_by_material_id = self.assignments.clone();
        store.update(&self.simulation, &record)
    }
}

/// Owner of the surface to material mapping of the bound simulation.
#[derive(Debug)]
pub struct Reconciler {
    simulation: Option<SimulationId>,
    assignments: AssignmentMap,
    saves: Debouncer<SimulationId>,
    in_flight: usize,
    unchecked: bool,
    revision: u64,
    notices: VecDeque<Notice>,
    last_error: Option<String>,
}

impl Reconciler {
    /// Creates an unbound reconciler saving after `debounce` of quiet.
    pub fn new(debounce: Duration) -> Self {
        Self {
            simulation: None,
            assignments: AssignmentMap::new(),
            saves: Debouncer::new(debounce),
            in_flight: 0,
            unchecked: false,
            revision: 0,
            notices: VecDeque::new(),
            last_error: None,
        }
    }

    /// Returns the bound simulation.
    pub fn simulation(&self) -> Option<&SimulationId> {
        self.simulation.as_ref()
    }

    /// Returns the current mapping.
    pub fn assignments(&self) -> &AssignmentMap {
        &self.assignments
    }

    /// Returns the number of logical state transitions so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Loads `id` from the store and replaces the local mapping with it.
    ///
    /// When `known_surfaces` is given, keys outside it are dropped. A pending
    /// save for a previously bound simulation is written out first. On failure
    /// the previous state is kept and an error notice is raised.
    pub fn hydrate(
        &mut self,
        store: &mut dyn SimulationStore,
        id: SimulationId,
        known_surfaces: Option<&HashSet<SurfaceId>>,
    ) -> Result<()> {
        if let Some(request) = self.begin_hydrate(&id) {
            let outcome = request.execute(&mut *store);
            self.complete_save(&request.simulation, outcome);
        }
        let fetched = store.get(&id);
        self.finish_hydrate(id, fetched, known_surfaces)
    }

    /// First half of binding `id`.
    ///
    /// Returns the pending save of a different, previously bound simulation.
    /// It still has to be executed and completed like any other save.
    pub fn begin_hydrate(&mut self, id: &SimulationId) -> Option<SaveRequest> {
        let previous = self.simulation.clone()?;
        if previous != *id && self.saves.cancel(&previous) {
            return Some(self.start_save(previous));
        }
        None
    }

    /// Second half of binding `id`, given the fetched record or the fetch error.
    pub fn finish_hydrate(
        &mut self,
        id: SimulationId,
        fetched: Result<SimulationRecord>,
        known_surfaces: Option<&HashSet<SurfaceId>>,
    ) -> Result<()> {
        let record = match fetched {
            Ok(record) => record,
            Err(err) => {
                log::error!("failed to load simulation {id}: {err}");
                self.push_notice(Notice::error(format!("Could not load simulation: {err}")));
                return Err(err);
            }
        };

        let mut assignments = record.layer_id_by_material_id;
        if let Some(known) = known_surfaces {
            let dropped = retain_known(&mut assignments, known);
            if dropped > 0 {
                log::warn!("dropped {dropped} stale assignments from simulation {id}");
            }
        }

        log::info!(
            "hydrated simulation {id} with {} assignments",
            assignments.len()
        );
        self.saves.cancel(&id);
        self.assignments = assignments;
        self.simulation = Some(id);
        self.unchecked = known_surfaces.is_none();
        self.last_error = None;
        self.revision += 1;
        Ok(())
    }

    /// Checks a mapping hydrated without surfaces against the surfaces of a
    /// freshly loaded scene, dropping unknown keys. Returns how many were dropped.
    ///
    /// Does nothing once the mapping has been checked, so edits of a bound
    /// simulation survive later scene swaps.
    pub fn reconcile_surfaces(&mut self, known: &HashSet<SurfaceId>) -> usize {
        if !self.unchecked {
            return 0;
        }
        self.unchecked = false;
        let dropped = retain_known(&mut self.assignments, known);
        if dropped > 0 {
            log::warn!("dropped {dropped} assignments to surfaces missing from the scene");
            self.revision += 1;
        }
        dropped
    }

    /// Returns the material assigned to `surface`, `None` for default.
    pub fn material_for(&self, surface: &SurfaceId) -> Option<MaterialId> {
        self.assignments.get(surface).copied()
    }

    /// Sets or clears the material of one surface.
    pub fn assign(&mut self, surface: SurfaceId, choice: MaterialChoice, now: Instant) {
        self.apply(&surface, choice);
        self.commit(now);
    }

    /// Applies one choice to every surface in a single transition.
    pub fn assign_all(&mut self, choice: MaterialChoice, surfaces: &[SurfaceId], now: Instant) {
        if surfaces.is_empty() {
            return;
        }
        for surface in surfaces {
            self.apply(surface, choice);
        }
        self.commit(now);
    }

    fn apply(&mut self, surface: &SurfaceId, choice: MaterialChoice) {
        match choice {
            MaterialChoice::Default => {
                self.assignments.remove(surface);
            }
            MaterialChoice::Material(id) => {
                self.assignments.insert(surface.clone(), id);
            }
        }
    }

    fn commit(&mut self, now: Instant) {
        self.revision += 1;
        match &self.simulation {
            Some(id) => self.saves.schedule(id.clone(), now),
            None => log::warn!("no simulation bound; assignment kept locally only"),
        }
    }

    /// Whether the surfaces do not all resolve to the same assignment.
    ///
    /// Default counts as its own value. Empty sets are not mixed.
    pub fn is_mixed(&self, surfaces: &[SurfaceId]) -> bool {
        let distinct: BTreeSet<Option<MaterialId>> =
            surfaces.iter().map(|s| self.material_for(s)).collect();
        distinct.len() > 1
    }

    /// Value to show in a bulk material control for `surfaces`.
    pub fn resolved_value_for_bulk_control(&self, surfaces: &[SurfaceId]) -> BulkValue {
        if self.is_mixed(surfaces) {
            return BulkValue::Mixed;
        }
        match surfaces.first().and_then(|s| self.material_for(s)) {
            Some(id) => BulkValue::Shared(id),
            None => BulkValue::Default,
        }
    }

    /// Whether a save is waiting for its quiet period to elapse.
    pub fn has_pending_save(&self) -> bool {
        !self.saves.is_empty()
    }

    /// When the next pending save fires.
    pub fn next_save_deadline(&self) -> Option<Instant> {
        self.saves.next_deadline()
    }

    /// Writes out every save whose quiet period has elapsed. Returns how many ran.
    pub fn poll(&mut self, store: &mut dyn SimulationStore, now: Instant) -> usize {
        let due = self.take_due_saves(now);
        for request in &due {
            let outcome = request.execute(&mut *store);
            self.complete_save(&request.simulation, outcome);
        }
        due.len()
    }

    /// Writes a pending save immediately.
    pub fn flush(&mut self, store: &mut dyn SimulationStore) -> bool {
        let Some(request) = self.take_pending_save() else {
            return false;
        };
        let outcome = request.execute(&mut *store);
        self.complete_save(&request.simulation, outcome);
        true
    }

    /// Takes every save whose quiet period has elapsed, as snapshots of the current mapping.
    pub fn take_due_saves(&mut self, now: Instant) -> Vec<SaveRequest> {
        let mut requests = Vec::new();
        for id in self.saves.take_due(now) {
            if self.simulation.as_ref() == Some(&id) {
                requests.push(self.start_save(id));
            } else {
                log::warn!("dropping save for unbound simulation {id}");
            }
        }
        requests
    }

    /// Takes the pending save of the bound simulation without waiting for its deadline.
    pub fn take_pending_save(&mut self) -> Option<SaveRequest> {
        let id = self.simulation.clone()?;
        if !self.saves.cancel(&id) {
            return None;
        }
        Some(self.start_save(id))
    }

    /// Number of saves taken but not yet completed.
    pub fn saves_in_flight(&self) -> usize {
        self.in_flight
    }

    /// Schedules another write of the current mapping, e.g. after a failure.
    pub fn retry_save(&mut self, now: Instant) -> Result<()> {
        let id = self.simulation.clone().ok_or(RoomscopeError::NoSimulation)?;
        self.saves.schedule(id, now);
        Ok(())
    }

    fn start_save(&mut self, simulation: SimulationId) -> SaveRequest {
        self.in_flight += 1;
        log::debug!(
            "save of simulation {simulation} started at revision {}",
            self.revision
        );
        SaveRequest {
            simulation,
            assignments: self.assignments.clone(),
            revision: self.revision,
        }
    }

    /// Reports the outcome of a save taken from this reconciler.
    ///
    /// The local mapping is never touched. Completions are taken in arrival
    /// order: the last one sets the notice and [`Self::last_error`].
    pub fn complete_save(&mut self, simulation: &SimulationId, outcome: Result<()>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match outcome {
            Ok(()) => {
                log::info!("saved assignments to simulation {simulation}");
                self.last_error = None;
                self.push_notice(Notice::success("Material assignments saved"));
            }
            Err(err) => {
                log::error!("failed to save assignments to simulation {simulation}: {err}");
                self.last_error = Some(err.to_string());
                self.push_notice(Notice::error(format!("Could not save materials: {err}")));
            }
        }
    }

    fn push_notice(&mut self, notice: Notice) {
        if self.notices.len() == MAX_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back(notice);
    }

    /// Message of the last failed save, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Takes all pending notifications.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }
}

fn retain_known(assignments: &mut AssignmentMap, known: &HashSet<SurfaceId>) -> usize {
    let before = assignments.len();
    assignments.retain(|surface, _| known.contains(surface));
    before - assignments.len()
}
