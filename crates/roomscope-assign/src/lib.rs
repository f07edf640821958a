//! Acoustic material assignment for roomscope.
//!
//! This crate owns the surface to material mapping of a simulation:
//! - [`Reconciler`] applies single and bulk edits locally, answers
//!   mixed/uniform queries and writes the mapping back through a debounce
//! - [`Debouncer`] is the keyed scheduler behind the coalesced writes
//! - [`SimulationStore`] and [`MaterialCatalog`] are the remote collaborators
//! - [`MaterialLibrary`] caches the catalog for pickers

#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]

pub mod catalog;
pub mod reconciler;
pub mod record;
pub mod scheduler;
pub mod store;

pub use catalog::{AcousticMaterial, MaterialCatalog, MaterialLibrary};
pub use reconciler::{BulkValue, Notice, NoticeLevel, Reconciler, SaveRequest, MAX_NOTICES};
pub use record::{AssignmentMap, MaterialChoice, MaterialId, SimulationId, SimulationRecord};
pub use scheduler::Debouncer;
pub use store::{MemoryStore, SimulationStore};
