//! Error types for roomscope.

use thiserror::Error;

/// The main error type for roomscope operations.
#[derive(Error, Debug)]
pub enum RoomscopeError {
    /// No scene is currently loaded.
    #[error("no scene loaded")]
    NoSceneLoaded,

    /// A surface id was not found in the active scene.
    #[error("surface '{0}' not found in the active scene")]
    SurfaceNotFound(String),

    /// A node handle does not belong to the scene.
    #[error("node not found in scene '{0}'")]
    NodeNotFound(String),

    /// A mesh handle does not belong to the scene.
    #[error("mesh not found in scene '{0}'")]
    MeshNotFound(String),

    /// No simulation record is bound to the reconciler.
    #[error("no simulation bound")]
    NoSimulation,

    /// The remote simulation store rejected or failed a request.
    #[error("simulation store error: {0}")]
    Store(String),

    /// The remote materials catalog could not be listed.
    #[error("materials catalog error: {0}")]
    Catalog(String),

    /// A 3D model file could not be turned into a scene.
    #[error("scene load error: {0}")]
    SceneLoad(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for roomscope operations.
pub type Result<T> = std::result::Result<T, RoomscopeError>;
