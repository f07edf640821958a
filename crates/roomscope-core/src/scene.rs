//! Scene graph arena.
//!
//! A [`Scene`] owns its nodes, meshes and materials by value in slot maps and
//! hands out typed keys. Everything derived from a scene (surfaces,
//! selections, highlight state) refers back through these keys, so nothing
//! outlives the scene that produced it.
//!
//! Keys are stamped with the [`SceneId`] of the issuing scene. A key from
//! another scene never resolves, even when its slot happens to be occupied.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use glam::{Mat4, Vec3};
use slotmap::SlotMap;

use crate::error::{Result, RoomscopeError};
use crate::geometry::Geometry;

/// Identity of one [`Scene`] instance, unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneId(u64);

impl SceneId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

mod slots {
    slotmap::new_key_type! {
        pub struct NodeSlot;
        pub struct MeshSlot;
        pub struct MaterialSlot;
    }
}

/// Declares a handle that pairs a slot map key with the scene that issued it.
macro_rules! scene_key {
    ($(#[$meta:meta])* $name:ident => $slot:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name {
            scene: SceneId,
            slot: $slot,
        }

        impl $name {
            /// Returns the scene that issued this handle.
            pub fn scene(&self) -> SceneId {
                self.scene
            }
        }
    };
}

scene_key! {
    /// Handle to a node in a [`Scene`].
    NodeKey => slots::NodeSlot
}
scene_key! {
    /// Handle to a mesh in a [`Scene`].
    MeshKey => slots::MeshSlot
}
scene_key! {
    /// Handle to a render material in a [`Scene`].
    MaterialKey => slots::MaterialSlot
}

/// A node of the scene tree. Mesh nodes carry a [`MeshKey`].
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
    mesh: Option<MeshKey>,
}

impl Node {
    /// Returns the node name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parent node, `None` for the root.
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    /// Returns the children in insertion order.
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    /// Returns the mesh carried by this node, if it is a mesh node.
    pub fn mesh(&self) -> Option<MeshKey> {
        self.mesh
    }
}

/// A render material. Only its color is of interest here.
#[derive(Debug, Clone)]
pub struct SceneMaterial {
    name: String,
    color: Vec3,
    /// Color before the first highlight touched this material.
    original_color: Option<Vec3>,
}

impl SceneMaterial {
    /// Returns the material name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current (possibly tinted) color.
    pub fn color(&self) -> Vec3 {
        self.color
    }

    /// Returns the cached pre-highlight color, if this material was ever highlighted.
    pub fn original_color(&self) -> Option<Vec3> {
        self.original_color
    }

    pub(crate) fn set_color(&mut self, color: Vec3) {
        self.color = color;
    }

    /// Caches the current color unless a cached value already exists.
    pub(crate) fn capture_original(&mut self) {
        if self.original_color.is_none() {
            self.original_color = Some(self.color);
        }
    }

    /// Restores the cached color. No-op when nothing was cached.
    pub(crate) fn restore_original(&mut self) {
        if let Some(original) = self.original_color {
            self.color = original;
        }
    }
}

/// A mesh primitive: geometry plus one or more materials.
#[derive(Debug, Clone)]
pub struct Mesh {
    name: String,
    node: NodeKey,
    uid: u64,
    geometry: Option<Geometry>,
    materials: Vec<MaterialKey>,
    transform: Mat4,
    visible: bool,
    attribute_id: Option<String>,
    ordinal: Option<usize>,
}

impl Mesh {
    /// Returns the mesh name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the node carrying this mesh.
    pub fn node(&self) -> NodeKey {
        self.node
    }

    /// Returns the scene-assigned unique id.
    pub fn uid(&self) -> u64 {
        self.uid
    }

    /// Returns the geometry, `None` for a malformed mesh.
    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    /// Returns the geometry mutably (used for caching bounds).
    pub fn geometry_mut(&mut self) -> Option<&mut Geometry> {
        self.geometry.as_mut()
    }

    /// Returns the material instances used by this mesh.
    pub fn materials(&self) -> &[MaterialKey] {
        &self.materials
    }

    /// Returns the local-to-world transform.
    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    /// Sets the local-to-world transform.
    pub fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
    }

    /// Returns whether the user has left this mesh visible.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Shows or hides the mesh.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Returns the externally supplied surface id, if any.
    pub fn attribute_id(&self) -> Option<&str> {
        self.attribute_id.as_deref()
    }

    /// Tags the mesh with an externally supplied surface id.
    pub fn set_attribute_id(&mut self, id: impl Into<String>) {
        self.attribute_id = Some(id.into());
    }

    /// Returns the per-load ordinal tag, if assigned.
    pub fn ordinal(&self) -> Option<usize> {
        self.ordinal
    }

    /// Assigns the ordinal tag unless one is already present. Returns the tag in effect.
    pub fn tag_ordinal(&mut self, ordinal: usize) -> usize {
        *self.ordinal.get_or_insert(ordinal)
    }

    /// Resolves the stable surface id: attribute id, then ordinal tag, then unique id.
    pub fn stable_id(&self) -> String {
        if let Some(id) = &self.attribute_id {
            return id.clone();
        }
        match self.ordinal {
            Some(ordinal) => ordinal.to_string(),
            None => format!("mesh-{}", self.uid),
        }
    }
}

/// A loaded 3D model.
#[derive(Debug)]
pub struct Scene {
    id: SceneId,
    model_id: String,
    loaded_at: DateTime<Utc>,
    root: NodeKey,
    nodes: SlotMap<slots::NodeSlot, Node>,
    meshes: SlotMap<slots::MeshSlot, Mesh>,
    materials: SlotMap<slots::MaterialSlot, SceneMaterial>,
    next_uid: u64,
}

impl Scene {
    /// Creates an empty scene with a root group, stamped with the current time.
    pub fn new(model_id: impl Into<String>) -> Self {
        let id = SceneId::next();
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node {
            name: "root".to_string(),
            parent: None,
            children: Vec::new(),
            mesh: None,
        });
        Self {
            id,
            model_id: model_id.into(),
            loaded_at: Utc::now(),
            root: NodeKey {
                scene: id,
                slot: root,
            },
            nodes,
            meshes: SlotMap::with_key(),
            materials: SlotMap::with_key(),
            next_uid: 1,
        }
    }

    /// Returns the process-unique identity of this scene.
    pub fn id(&self) -> SceneId {
        self.id
    }

    /// Returns the model identifier.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Returns when this scene was loaded.
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Returns the root group.
    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// Whether a handle was issued by this scene. Foreign handles are logged.
    fn owns(&self, scene: SceneId, kind: &str) -> bool {
        if scene == self.id {
            return true;
        }
        log::warn!(
            "ignoring {kind} handle from {scene:?} on model '{}' ({:?})",
            self.model_id,
            self.id
        );
        false
    }

    /// Adds a render material.
    pub fn add_material(&mut self, name: impl Into<String>, color: Vec3) -> MaterialKey {
        let slot = self.materials.insert(SceneMaterial {
            name: name.into(),
            color,
            original_color: None,
        });
        MaterialKey {
            scene: self.id,
            slot,
        }
    }

    /// Adds an empty group under `parent`.
    pub fn add_group(&mut self, parent: NodeKey, name: impl Into<String>) -> Result<NodeKey> {
        self.insert_node(parent, name.into())
    }

    /// Adds a mesh node under `parent`.
    ///
    /// `geometry` may be `None` for meshes whose buffers failed to decode; such
    /// meshes stay in the tree but contribute no surface.
    pub fn add_mesh(
        &mut self,
        parent: NodeKey,
        name: impl Into<String>,
        geometry: Option<Geometry>,
        materials: Vec<MaterialKey>,
    ) -> Result<MeshKey> {
        let name = name.into();
        let node = self.insert_node(parent, name.clone())?;
        let uid = self.next_uid;
        self.next_uid += 1;
        let slot = self.meshes.insert(Mesh {
            name,
            node,
            uid,
            geometry,
            materials,
            transform: Mat4::IDENTITY,
            visible: true,
            attribute_id: None,
            ordinal: None,
        });
        let mesh = MeshKey {
            scene: self.id,
            slot,
        };
        self.nodes[node.slot].mesh = Some(mesh);
        Ok(mesh)
    }

    fn insert_node(&mut self, parent: NodeKey, name: String) -> Result<NodeKey> {
        if !self.owns(parent.scene, "node") || !self.nodes.contains_key(parent.slot) {
            return Err(RoomscopeError::NodeNotFound(format!("{parent:?}")));
        }
        let slot = self.nodes.insert(Node {
            name,
            parent: Some(parent),
            children: Vec::new(),
            mesh: None,
        });
        let key = NodeKey {
            scene: self.id,
            slot,
        };
        self.nodes[parent.slot].children.push(key);
        Ok(key)
    }

    /// Returns a node.
    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        if !self.owns(key.scene, "node") {
            return None;
        }
        self.nodes.get(key.slot)
    }

    /// Returns a mesh.
    pub fn mesh(&self, key: MeshKey) -> Option<&Mesh> {
        if !self.owns(key.scene, "mesh") {
            return None;
        }
        self.meshes.get(key.slot)
    }

    /// Returns a mesh mutably.
    pub fn mesh_mut(&mut self, key: MeshKey) -> Option<&mut Mesh> {
        if !self.owns(key.scene, "mesh") {
            return None;
        }
        self.meshes.get_mut(key.slot)
    }

    /// Returns a material.
    pub fn material(&self, key: MaterialKey) -> Option<&SceneMaterial> {
        if !self.owns(key.scene, "material") {
            return None;
        }
        self.materials.get(key.slot)
    }

    pub(crate) fn material_mut(&mut self, key: MaterialKey) -> Option<&mut SceneMaterial> {
        if !self.owns(key.scene, "material") {
            return None;
        }
        self.materials.get_mut(key.slot)
    }

    /// Returns the number of meshes.
    pub fn num_meshes(&self) -> usize {
        self.meshes.len()
    }

    /// Depth-first pre-order traversal from the root, children in insertion order.
    pub fn traverse(&self) -> Vec<NodeKey> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(key) = stack.pop() {
            let Some(node) = self.nodes.get(key.slot) else {
                continue;
            };
            order.push(key);
            stack.extend(node.children.iter().rev().copied());
        }
        order
    }

    /// Meshes in traversal order.
    pub fn mesh_order(&self) -> Vec<MeshKey> {
        self.traverse()
            .into_iter()
            .filter_map(|key| self.nodes.get(key.slot).and_then(|node| node.mesh))
            .collect()
    }

    /// Visible meshes with geometry, in traversal order. These are the raycast targets.
    pub fn pickable_meshes(&self) -> Vec<MeshKey> {
        self.mesh_order()
            .into_iter()
            .filter(|key| {
                self.meshes
                    .get(key.slot)
                    .is_some_and(|mesh| mesh.visible && mesh.geometry.is_some())
            })
            .collect()
    }

    /// Ensures `mesh` carries its ordinal tag, assigning its traversal position if absent.
    pub fn ensure_ordinal(&mut self, mesh: MeshKey) -> Option<usize> {
        if let Some(ordinal) = self.mesh(mesh)?.ordinal {
            return Some(ordinal);
        }
        let position = self.mesh_order().iter().position(|key| *key == mesh)?;
        self.meshes
            .get_mut(mesh.slot)
            .map(|m| m.tag_ordinal(position))
    }

    /// Finds the mesh whose stable id equals `id`.
    pub fn find_mesh_by_stable_id(&self, id: &str) -> Option<MeshKey> {
        self.meshes
            .iter()
            .find(|(_, mesh)| mesh.stable_id() == id)
            .map(|(slot, _)| MeshKey {
                scene: self.id,
                slot,
            })
    }
}
