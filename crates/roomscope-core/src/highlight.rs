//! Hover and selection tinting of mesh materials.
//!
//! The engine is the only writer of material colors. The first time a
//! material is tinted its color is cached on the material itself; restoring
//! always goes back to that cached value, so any sequence of transitions
//! ends at the exact original color.

use glam::Vec3;

use crate::options::Options;
use crate::scene::{MeshKey, Scene};

/// Visual state of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HighlightState {
    /// Original colors.
    #[default]
    None,
    /// Pointer is over the mesh.
    Hover,
    /// Mesh is selected or emphasized.
    Selected,
}

/// Applies highlight states to meshes.
///
/// Precedence between hover and selection is the caller's concern.
#[derive(Debug, Clone, Copy)]
pub struct HighlightEngine {
    hover_color: Vec3,
    selected_color: Vec3,
}

impl Default for HighlightEngine {
    fn default() -> Self {
        Self::from_options(&Options::default())
    }
}

impl HighlightEngine {
    /// Creates an engine with explicit tints.
    pub fn new(hover_color: Vec3, selected_color: Vec3) -> Self {
        Self {
            hover_color,
            selected_color,
        }
    }

    /// Creates an engine using the tints configured in `options`.
    pub fn from_options(options: &Options) -> Self {
        Self::new(options.hover_color, options.selected_color)
    }

    /// Returns the hover tint.
    pub fn hover_color(&self) -> Vec3 {
        self.hover_color
    }

    /// Returns the selection tint.
    pub fn selected_color(&self) -> Vec3 {
        self.selected_color
    }

    /// Applies `state` to every material of `mesh`.
    ///
    /// Meshes that `scene` did not issue, including handles kept from a
    /// previous scene, are a warned no-op.
    pub fn apply_state(&self, scene: &mut Scene, mesh: MeshKey, state: HighlightState) {
        let Some(materials) = scene.mesh(mesh).map(|m| m.materials().to_vec()) else {
            log::warn!("highlight ignored for mesh outside scene '{}'", scene.model_id());
            return;
        };

        for key in materials {
            let Some(material) = scene.material_mut(key) else {
                continue;
            };
            match state {
                HighlightState::None => material.restore_original(),
                HighlightState::Hover => {
                    material.capture_original();
                    material.set_color(self.hover_color);
                }
                HighlightState::Selected => {
                    material.capture_original();
                    material.set_color(self.selected_color);
                }
            }
        }
    }
}
