//! Wavefront OBJ loading.
//!
//! Every OBJ object becomes a mesh under the scene root with its own render
//! material, colored from the MTL diffuse color or a neutral grey.

use std::io::BufRead;
use std::path::Path;

use roomscope_core::{Geometry, Result, RoomscopeError, Scene, Vec3};

const DEFAULT_COLOR: Vec3 = Vec3::splat(0.8);

/// Loads an OBJ file from disk.
pub fn load_obj(path: impl AsRef<Path>, model_id: impl Into<String>) -> Result<Scene> {
    let path = path.as_ref();
    let (models, materials) = tobj::load_obj(path, &load_options())
        .map_err(|err| RoomscopeError::SceneLoad(format!("{}: {err}", path.display())))?;
    build_scene(model_id.into(), models, materials)
}

/// Loads OBJ data from a reader. `mtllib` references are not followed.
pub fn load_obj_reader<B: BufRead>(reader: &mut B, model_id: impl Into<String>) -> Result<Scene> {
    let (models, materials) = tobj::load_obj_buf(reader, &load_options(), |_| {
        Err(tobj::LoadError::OpenFileFailed)
    })
    .map_err(|err| RoomscopeError::SceneLoad(err.to_string()))?;
    build_scene(model_id.into(), models, materials)
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    }
}

fn build_scene(
    model_id: String,
    models: Vec<tobj::Model>,
    materials: std::result::Result<Vec<tobj::Material>, tobj::LoadError>,
) -> Result<Scene> {
    let materials = materials.unwrap_or_else(|err| {
        log::warn!("material library for '{model_id}' not loaded: {err}");
        Vec::new()
    });

    let mut scene = Scene::new(model_id);
    let root = scene.root();
    for model in models {
        let mesh = model.mesh;
        let geometry = if mesh.positions.is_empty() {
            None
        } else {
            let positions = mesh
                .positions
                .chunks_exact(3)
                .map(|p| Vec3::new(p[0], p[1], p[2]))
                .collect();
            Some(Geometry::indexed(positions, mesh.indices))
        };

        // Highlighting mutates colors, so meshes never share a material.
        let source = mesh.material_id.and_then(|id| materials.get(id));
        let material = match source {
            Some(source) => scene.add_material(
                source.name.clone(),
                source.diffuse.map_or(DEFAULT_COLOR, Vec3::from_array),
            ),
            None => scene.add_material("default", DEFAULT_COLOR),
        };
        scene.add_mesh(root, model.name, geometry, vec![material])?;
    }

    log::debug!(
        "built scene '{}' with {} meshes",
        scene.model_id(),
        scene.num_meshes()
    );
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const ROOM: &str = "\
o floor
v 0 0 0
v 4 0 0
v 4 0 3
v 0 0 3
f 1 2 3 4
o wall
v 0 0 0
v 4 0 0
v 4 2.5 0
f 5 6 7
";

    #[test]
    fn test_objects_become_meshes() {
        let scene = load_obj_reader(&mut Cursor::new(ROOM), "room").unwrap();
        assert_eq!(scene.model_id(), "room");
        assert_eq!(scene.num_meshes(), 2);
        let order = scene.mesh_order();
        let floor = scene.mesh(order[0]).unwrap();
        assert_eq!(floor.name(), "floor");
        assert_eq!(floor.geometry().unwrap().face_count(), 2);
        let material = scene.material(floor.materials()[0]).unwrap();
        assert_eq!(material.color(), DEFAULT_COLOR);
        let wall = scene.mesh(order[1]).unwrap();
        assert_ne!(floor.materials()[0], wall.materials()[0]);
    }

    #[test]
    fn test_missing_file_is_a_load_error() {
        assert!(matches!(
            load_obj("/nonexistent/room.obj", "room"),
            Err(RoomscopeError::SceneLoad(_))
        ));
    }
}
