//! Remote simulation record store interface.

use std::collections::HashMap;

use roomscope_core::{Result, RoomscopeError};

use crate::record::{SimulationId, SimulationRecord};

/// The REST-backed simulation record store.
pub trait SimulationStore {
    /// Fetches the current record.
    fn get(&mut self, id: &SimulationId) -> Result<SimulationRecord>;

    /// Replaces the whole record.
    fn update(&mut self, id: &SimulationId, record: &SimulationRecord) -> Result<()>;
}

/// In-process store, for headless use and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: HashMap<SimulationId, SimulationRecord>,
    writes: Vec<(SimulationId, SimulationRecord)>,
    fail_updates: bool,
    fail_gets: bool,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a record without counting it as a write.
    pub fn insert(&mut self, id: SimulationId, record: SimulationRecord) {
        self.records.insert(id, record);
    }

    /// Returns the stored record.
    pub fn record(&self, id: &SimulationId) -> Option<&SimulationRecord> {
        self.records.get(id)
    }

    /// Returns every successful update, oldest first.
    pub fn writes(&self) -> &[(SimulationId, SimulationRecord)] {
        &self.writes
    }

    /// Makes subsequent updates fail.
    pub fn set_fail_updates(&mut self, fail: bool) {
        self.fail_updates = fail;
    }

    /// Makes subsequent fetches fail.
    pub fn set_fail_gets(&mut self, fail: bool) {
        self.fail_gets = fail;
    }
}

impl SimulationStore for MemoryStore {
    fn get(&mut self, id: &SimulationId) -> Result<SimulationRecord> {
        if self.fail_gets {
            return Err(RoomscopeError::Store(format!("fetch of simulation {id} failed")));
        }
        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| RoomscopeError::Store(format!("simulation {id} not found")))
    }

    fn update(&mut self, id: &SimulationId, record: &SimulationRecord) -> Result<()> {
        if self.fail_updates {
            return Err(RoomscopeError::Store(format!("update of simulation {id} failed")));
        }
        if !self.records.contains_key(id) {
            return Err(RoomscopeError::Store(format!("simulation {id} not found")));
        }
        self.records.insert(id.clone(), record.clone());
        self.writes.push((id.clone(), record.clone()));
        Ok(())
    }
}
