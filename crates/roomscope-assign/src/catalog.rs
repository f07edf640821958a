//! Acoustic materials catalog.

use std::collections::BTreeMap;

use roomscope_core::Result;
use serde::{Deserialize, Serialize};

use crate::reconciler::BulkValue;
use crate::record::MaterialId;

/// An acoustic material as listed by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcousticMaterial {
    /// Catalog id.
    pub id: MaterialId,
    /// Display name.
    pub name: String,
    /// Category used to group materials in pickers.
    pub category: String,
    /// Absorption coefficient per octave band.
    #[serde(default)]
    pub absorption_coefficients: Vec<f32>,
}

impl AcousticMaterial {
    /// Mean absorption over all bands, `None` when no bands are listed.
    pub fn mean_absorption(&self) -> Option<f32> {
        if self.absorption_coefficients.is_empty() {
            return None;
        }
        let sum: f32 = self.absorption_coefficients.iter().sum();
        Some(sum / self.absorption_coefficients.len() as f32)
    }
}

/// The remote materials catalog.
pub trait MaterialCatalog {
    /// Lists all materials.
    fn list(&self) -> Result<Vec<AcousticMaterial>>;
}

impl MaterialCatalog for Vec<AcousticMaterial> {
    fn list(&self) -> Result<Vec<AcousticMaterial>> {
        Ok(self.clone())
    }
}

/// A fetched copy of the catalog with lookups for assignment panels.
#[derive(Debug, Clone, Default)]
pub struct MaterialLibrary {
    materials: Vec<AcousticMaterial>,
}

impl MaterialLibrary {
    /// Wraps an already fetched list.
    pub fn from_materials(materials: Vec<AcousticMaterial>) -> Self {
        Self { materials }
    }

    /// Fetches the catalog.
    pub fn fetch(catalog: &dyn MaterialCatalog) -> Result<Self> {
        let materials = catalog.list()?;
        log::info!("loaded {} acoustic materials", materials.len());
        Ok(Self::from_materials(materials))
    }

    /// Looks a material up by id.
    pub fn get(&self, id: MaterialId) -> Option<&AcousticMaterial> {
        self.materials.iter().find(|m| m.id == id)
    }

    /// Returns the name of a material, if known.
    pub fn name_of(&self, id: MaterialId) -> Option<&str> {
        self.get(id).map(|m| m.name.as_str())
    }

    /// Materials grouped by category, categories and names sorted.
    pub fn by_category(&self) -> BTreeMap<&str, Vec<&AcousticMaterial>> {
        let mut groups: BTreeMap<&str, Vec<&AcousticMaterial>> = BTreeMap::new();
        for material in &self.materials {
            groups.entry(material.category.as_str()).or_default().push(material);
        }
        for group in groups.values_mut() {
            group.sort_by(|a, b| a.name.cmp(&b.name));
        }
        groups
    }

    /// Text for a bulk material control.
    pub fn describe(&self, value: BulkValue) -> String {
        match value {
            BulkValue::Mixed => "Mixed".to_string(),
            BulkValue::Default => "Default".to_string(),
            BulkValue::Shared(id) => self
                .name_of(id)
                .map_or_else(|| format!("Material {id}"), str::to_string),
        }
    }

    /// Iterates over all materials.
    pub fn iter(&self) -> impl Iterator<Item = &AcousticMaterial> {
        self.materials.iter()
    }

    /// Returns the number of materials.
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Returns whether the library is empty.
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomscope_core::RoomscopeError;

    fn material(id: u32, name: &str, category: &str, coefficients: &[f32]) -> AcousticMaterial {
        AcousticMaterial {
            id: MaterialId(id),
            name: name.to_string(),
            category: category.to_string(),
            absorption_coefficients: coefficients.to_vec(),
        }
    }

    fn library() -> MaterialLibrary {
        MaterialLibrary::fetch(&vec![
            material(1, "Plaster", "Walls", &[0.1, 0.2]),
            material(2, "Carpet", "Floors", &[0.3, 0.5]),
            material(3, "Brick", "Walls", &[]),
        ])
        .unwrap()
    }

    struct Offline;

    impl MaterialCatalog for Offline {
        fn list(&self) -> Result<Vec<AcousticMaterial>> {
            Err(RoomscopeError::Catalog("offline".to_string()))
        }
    }

    #[test]
    fn test_lookup_and_grouping() {
        let library = library();
        assert_eq!(library.len(), 3);
        assert_eq!(library.name_of(MaterialId(2)), Some("Carpet"));
        let groups = library.by_category();
        let categories: Vec<&str> = groups.keys().copied().collect();
        assert_eq!(categories, vec!["Floors", "Walls"]);
        let walls: Vec<&str> = groups["Walls"].iter().map(|m| m.name.as_str()).collect();
        assert_eq!(walls, vec!["Brick", "Plaster"]);
    }

    #[test]
    fn test_mean_absorption() {
        let library = library();
        let carpet = library.get(MaterialId(2)).unwrap();
        assert!((carpet.mean_absorption().unwrap() - 0.4).abs() < 1e-6);
        assert!(library.get(MaterialId(3)).unwrap().mean_absorption().is_none());
    }

    #[test]
    fn test_describe_bulk_value() {
        let library = library();
        assert_eq!(library.describe(BulkValue::Mixed), "Mixed");
        assert_eq!(library.describe(BulkValue::Default), "Default");
        assert_eq!(library.describe(BulkValue::Shared(MaterialId(1))), "Plaster");
        assert_eq!(library.describe(BulkValue::Shared(MaterialId(9))), "Material 9");
    }

    #[test]
    fn test_fetch_failure_propagates() {
        assert!(matches!(
            MaterialLibrary::fetch(&Offline),
            Err(RoomscopeError::Catalog(_))
        ));
    }
}
