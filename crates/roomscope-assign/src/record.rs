//! Simulation records and acoustic material identifiers.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use roomscope_core::SurfaceId;
use serde::{Deserialize, Serialize};

/// Identifier of a simulation record in the remote store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimulationId(String);

impl SimulationId {
    /// Creates a simulation id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SimulationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SimulationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Identifier of an acoustic material in the materials catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialId(pub u32);

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A value picked in a material control: a catalog material or the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MaterialChoice {
    /// No material assigned.
    #[default]
    Default,
    /// A catalog material.
    Material(MaterialId),
}

impl From<MaterialId> for MaterialChoice {
    fn from(id: MaterialId) -> Self {
        Self::Material(id)
    }
}

impl FromStr for MaterialChoice {
    type Err = std::num::ParseIntError;

    /// Parses `"default"` or a numeric material id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("default") {
            Ok(Self::Default)
        } else {
            s.trim().parse().map(|id| Self::Material(MaterialId(id)))
        }
    }
}

/// Surface to material mapping. Absent keys mean "default".
pub type AssignmentMap = BTreeMap<SurfaceId, MaterialId>;

/// A whole simulation record as stored remotely.
///
/// Updates are whole-record, so every field read is written back, including
/// fields this crate does not interpret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRecord {
    /// Display name.
    pub name: String,
    /// Backend status string.
    pub status: String,
    /// Surface to material assignments.
    #[serde(default)]
    pub layer_id_by_material_id: AssignmentMap,
    /// Fields passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SimulationRecord {
    /// Creates a record with no assignments.
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
            layer_id_by_material_id: AssignmentMap::new(),
            extra: serde_json::Map::new(),
        }
    }
}
