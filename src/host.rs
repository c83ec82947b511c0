//! Interface to the authoring host.
//!
//! The codec never reads ambient selection or scene state. Exporters are
//! handed the selected [`MeshObject`] explicitly, and importers hand their
//! results to a [`ModelSink`].

use crate::mesh::MeshSurgery;
use crate::skeleton::{BoneTree, SkeletonKind};
use crate::types::Triangle;
use glam::{Vec2, Vec3};

/// Read access to a host armature.
pub trait ArmatureSource {
    /// Armature-space head position of a bone, if the armature has it.
    fn bone_head(&self, name: &str) -> Option<Vec3>;
}

/// What a mesh object is parented to.
pub enum Parent<'a, A: ?Sized> {
    None,
    Armature(&'a A),
    /// Some other kind of object, described by its type name.
    Other(&'a str),
}

/// A mesh object chosen for export.
pub trait MeshObject {
    type Mesh: MeshSurgery;
    type Armature: ArmatureSource + ?Sized;

    fn name(&self) -> &str;

    /// An evaluated, editable copy of the object's mesh. `None` when the
    /// object cannot be converted to a mesh.
    fn evaluated_mesh(&self) -> Option<Self::Mesh>;

    fn parent(&self) -> Parent<'_, Self::Armature>;
}

/// Receives imported geometry and skeletons.
pub trait ModelSink {
    type Handle: Copy;

    /// Create a mesh object from host-space triangles with one UV per vertex.
    fn create_mesh_object(
        &mut self,
        name: &str,
        vertices: &[Vec3],
        faces: &[Triangle],
        uvs: &[Vec2],
    ) -> Self::Handle;

    fn create_armature(&mut self, name: &str, bones: &BoneTree) -> Self::Handle;

    /// Parent a mesh to an armature so the armature deforms it.
    fn parent_to_armature(&mut self, mesh: Self::Handle, armature: Self::Handle);

    /// Set a vertex's weight for a bone, replacing any earlier value.
    fn assign_vertex_weight(&mut self, mesh: Self::Handle, vertex: usize, bone: &str, weight: f32);

    fn link_into_scene(&mut self, handle: Self::Handle);
}

/// Head positions of every bone of `kind`, `None` where the armature lacks one.
pub fn bone_heads<A: ArmatureSource + ?Sized>(kind: SkeletonKind, armature: &A) -> Vec<Option<Vec3>> {
    kind.bone_names()
        .iter()
        .map(|name| armature.bone_head(name))
        .collect()
}
