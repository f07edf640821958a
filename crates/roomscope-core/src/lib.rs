//! Core abstractions for roomscope.
//!
//! This crate provides the scene-side building blocks of the viewer:
//! - [`Scene`] arena of nodes, meshes and render materials
//! - [`derive_surfaces`] producing the stable [`Surface`] list of a scene
//! - [`SelectionStore`] for hover/selection/highlight state
//! - [`HighlightEngine`] for reversible material tinting
//! - [`Ray`] and [`Raycaster`] for pointer picking
//! - [`Options`] and the shared error type

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Accessors return plain values which don't need must_use
#![allow(clippy::must_use_candidate)]
// Pixel and index counts are far below f32 precision limits
#![allow(clippy::cast_precision_loss)]

pub mod error;
pub mod geometry;
pub mod highlight;
pub mod options;
pub mod pick;
pub mod scene;
pub mod selection;
pub mod surface;

pub use error::{Result, RoomscopeError};
pub use geometry::{BoundingBox, Geometry};
pub use highlight::{HighlightEngine, HighlightState};
pub use options::Options;
pub use pick::{Hit, Ray, Raycaster, TriangleRaycaster, Viewport};
pub use scene::{MaterialKey, Mesh, MeshKey, Node, NodeKey, Scene, SceneId, SceneMaterial};
pub use selection::{SelectedGeometry, SelectionStore};
pub use surface::{derive_surfaces, Surface, SurfaceId};

// Re-export glam types for convenience
pub use glam::{Mat4, Vec2, Vec3, Vec4};
