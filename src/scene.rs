//! In-memory host used by the CLI and tests.
//!
//! [`MemoryScene`] receives imported models like a real host would, and its
//! [`MemoryObject`]s can be handed straight back to the exporters.

use crate::host::{ArmatureSource, MeshObject, ModelSink, Parent};
use crate::mesh::EditMesh;
use crate::skeleton::BoneTree;
use crate::types::Triangle;
use glam::{Vec2, Vec3};

/// Named bone heads in armature space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryArmature {
    pub name: String,
    pub bones: Vec<(String, Vec3)>,
}

impl MemoryArmature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bones: Vec::new(),
        }
    }

    pub fn from_tree(name: impl Into<String>, tree: &BoneTree) -> Self {
        Self {
            name: name.into(),
            bones: tree
                .bones
                .iter()
                .map(|bone| (bone.name.to_string(), bone.head))
                .collect(),
        }
    }

    pub fn with_bone(mut self, name: impl Into<String>, head: Vec3) -> Self {
        self.bones.push((name.into(), head));
        self
    }
}

impl ArmatureSource for MemoryArmature {
    fn bone_head(&self, name: &str) -> Option<Vec3> {
        self.bones.iter().find(|(n, _)| n == name).map(|(_, head)| *head)
    }
}

/// What a [`MemoryObject`] is parented to.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MemoryParent {
    #[default]
    None,
    Armature(MemoryArmature),
    /// A non-armature parent, by type name.
    Other(String),
}

/// A mesh object, optionally without mesh data.
#[derive(Debug, Clone, Default)]
pub struct MemoryObject {
    pub name: String,
    pub mesh: Option<EditMesh>,
    pub parent: MemoryParent,
}

impl MemoryObject {
    pub fn new(name: impl Into<String>, mesh: EditMesh) -> Self {
        Self {
            name: name.into(),
            mesh: Some(mesh),
            parent: MemoryParent::None,
        }
    }

    pub fn with_armature(mut self, armature: MemoryArmature) -> Self {
        self.parent = MemoryParent::Armature(armature);
        self
    }
}

impl MeshObject for MemoryObject {
    type Mesh = EditMesh;
    type Armature = MemoryArmature;

    fn name(&self) -> &str {
        &self.name
    }

    fn evaluated_mesh(&self) -> Option<EditMesh> {
        self.mesh.clone()
    }

    fn parent(&self) -> Parent<'_, MemoryArmature> {
        match &self.parent {
            MemoryParent::None => Parent::None,
            MemoryParent::Armature(armature) => Parent::Armature(armature),
            MemoryParent::Other(kind) => Parent::Other(kind),
        }
    }
}

/// An object created through [`ModelSink`].
#[derive(Debug, Clone)]
pub enum SceneEntry {
    Mesh(MemoryObject),
    Armature(MemoryArmature),
}

/// Objects collected from importers.
#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    pub entries: Vec<SceneEntry>,
    /// Indices of linked entries, in link order.
    pub linked: Vec<usize>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Linked mesh objects in link order.
    pub fn mesh_objects(&self) -> impl Iterator<Item = &MemoryObject> + '_ {
        self.linked.iter().filter_map(|&i| match &self.entries[i] {
            SceneEntry::Mesh(object) => Some(object),
            SceneEntry::Armature(_) => None,
        })
    }

    /// The most recently linked mesh object, standing in for the active
    /// selection.
    pub fn last_mesh(&self) -> Option<&MemoryObject> {
        self.mesh_objects().last()
    }

    fn mesh_mut(&mut self, handle: usize) -> Option<&mut MemoryObject> {
        match self.entries.get_mut(handle) {
            Some(SceneEntry::Mesh(object)) => Some(object),
            _ => None,
        }
    }
}

impl ModelSink for MemoryScene {
    type Handle = usize;

    fn create_mesh_object(
        &mut self,
        name: &str,
        vertices: &[Vec3],
        faces: &[Triangle],
        uvs: &[Vec2],
    ) -> usize {
        let mesh = EditMesh::from_triangles(vertices, faces, Some(uvs));
        self.entries.push(SceneEntry::Mesh(MemoryObject::new(name, mesh)));
        self.entries.len() - 1
    }

    fn create_armature(&mut self, name: &str, bones: &BoneTree) -> usize {
        self.entries
            .push(SceneEntry::Armature(MemoryArmature::from_tree(name, bones)));
        self.entries.len() - 1
    }

    fn parent_to_armature(&mut self, mesh: usize, armature: usize) {
        let armature = match self.entries.get(armature) {
            Some(SceneEntry::Armature(armature)) => armature.clone(),
            _ => return,
        };
        if let Some(object) = self.mesh_mut(mesh) {
            object.parent = MemoryParent::Armature(armature);
        }
    }

    fn assign_vertex_weight(&mut self, mesh: usize, vertex: usize, bone: &str, weight: f32) {
        if let Some(edit) = self.mesh_mut(mesh).and_then(|object| object.mesh.as_mut()) {
            if vertex < edit.positions.len() {
                edit.set_group(vertex, bone, weight);
            }
        }
    }

    fn link_into_scene(&mut self, handle: usize) {
        if !self.linked.contains(&handle) {
            self.linked.push(handle);
        }
    }
}
