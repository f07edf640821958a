//! roomscope: surface selection and acoustic material assignment for room models.
//!
//! Load a model into a [`Viewer`], feed it pointer rays to hover and select
//! surfaces, and assign acoustic materials that are written back to the
//! simulation through a debounced save.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Instant;
//! use roomscope::*;
//!
//! fn main() -> Result<()> {
//!     roomscope::init_logging();
//!
//!     let mut viewer = Viewer::new(Options::default());
//!     viewer.load_scene(roomscope::loader::load_obj("room.obj", "room")?);
//!
//!     let mut store = MemoryStore::new();
//!     store.insert(SimulationId::from("sim"), SimulationRecord::new("Hall", "draft"));
//!     viewer.hydrate(&mut store, "sim")?;
//!
//!     let ray = Ray::new(Vec3::new(0.0, 1.0, 5.0), Vec3::NEG_Z);
//!     viewer.click(ray.as_ref(), &mut NoMarkers);
//!     if let Some(surface) = viewer.selected_surface().cloned() {
//!         viewer.assign(&surface.id, MaterialChoice::Material(MaterialId(7)), Instant::now());
//!     }
//!     viewer.flush(&mut store);
//!     Ok(())
//! }
//! ```

#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod interaction;
pub mod loader;
pub mod session;
pub mod viewer;

pub use roomscope_assign::*;
pub use roomscope_core::*;

pub use interaction::{ClickOutcome, InteractionController, MarkerPlacement, NoMarkers};
pub use session::Session;
pub use viewer::Viewer;

/// Installs the `env_logger` backend, honoring `RUST_LOG`.
///
/// Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::try_init();
}
