//! Export and import pipelines.
//!
//! Export: host mesh → triangulate → (legacy) UV split → extract → axis swap
//! → bone offsets → weight slots → bytes.
//!
//! Import: bytes → bone tree → bind positions and weights → axis swap →
//! host sink.

use crate::config::{ExportConfig, ImportConfig};
use crate::error::{CmodError, Result};
use crate::format::{CmcModel, CmcVertex, CmoModel, FormatKind};
use crate::host::{bone_heads, MeshObject, ModelSink, Parent};
use crate::mesh::{first_corner_uvs, triangles, MeshSurgery};
use crate::skeleton::{decode_skeleton, encode_bones, BoneTree, SkeletonKind};
use crate::splitter::split_multi_uv_vertices;
use crate::types::{to_file_space, to_host_space, BoundingBox, Triangle};
use crate::weights::{decode_vertex, encode_vertex, VertexWeights};
use glam::{Vec2, Vec3};
use std::io::{Read, Write};

/// Message reported when a character export has no usable selection.
pub const SELECTION_MESSAGE: &str = "Select a mesh with an armature as its parent";

/// Triangulate a mesh and pull out file-space geometry.
fn extract<M: MeshSurgery>(
    mesh: &mut M,
    format: FormatKind,
    config: &ExportConfig,
) -> (Vec<Vec3>, Vec<Vec2>, Vec<Triangle>) {
    mesh.triangulate();
    if config.splits_uv_seams(format == FormatKind::LegacyCmc) {
        split_multi_uv_vertices(mesh);
    }

    let vertices = (0..mesh.vertex_count())
        .map(|v| to_file_space(mesh.position(v)))
        .collect();
    let uvs = first_corner_uvs(mesh, config.uv_layer_index());
    let faces = triangles(mesh)
        .into_iter()
        .map(|tri| format.stored_face(tri))
        .collect();
    (vertices, uvs, faces)
}

/// Merge every convertible object into one object file body.
///
/// Objects that cannot be converted to a mesh are skipped.
pub fn build_cmo<'a, O, I>(objects: I, config: &ExportConfig) -> CmoModel
where
    O: MeshObject + 'a,
    I: IntoIterator<Item = &'a O>,
{
    let mut model = CmoModel::default();
    for object in objects {
        let Some(mut mesh) = object.evaluated_mesh() else {
            log::debug!("skipping {}: not convertible to a mesh", object.name());
            continue;
        };
        let (vertices, uvs, faces) = extract(&mut mesh, FormatKind::Cmo, config);
        model.merge(&CmoModel {
            vertices,
            uvs,
            faces,
        });
    }
    model
}

/// Build a character file body from the selected mesh object.
///
/// Fails with [`CmodError::Precondition`] when nothing is selected, the
/// selection is not parented to an armature, or it has no mesh data.
pub fn build_character<O: MeshObject>(
    selection: Option<&O>,
    format: FormatKind,
    config: &ExportConfig,
) -> Result<CmcModel> {
    let skeleton = format.skeleton().ok_or_else(|| {
        CmodError::Precondition(format!("{} files carry no character data", format))
    })?;
    let object = selection.ok_or_else(|| CmodError::Precondition(SELECTION_MESSAGE.into()))?;
    let armature = match object.parent() {
        Parent::Armature(armature) => armature,
        Parent::None | Parent::Other(_) => {
            return Err(CmodError::Precondition(SELECTION_MESSAGE.into()))
        }
    };
    let mut mesh = object
        .evaluated_mesh()
        .ok_or_else(|| CmodError::Precondition(SELECTION_MESSAGE.into()))?;

    let (positions, uvs, faces) = extract(&mut mesh, format, config);

    let heads = bone_heads(skeleton, armature);
    let bone_offsets = encode_bones(skeleton, &heads);

    let vertices = positions
        .into_iter()
        .zip(uvs)
        .enumerate()
        .map(|(v, (position, uv))| CmcVertex {
            position,
            slots: encode_vertex(skeleton, mesh.position(v), mesh.influences(v), &heads),
            uv,
        })
        .collect();

    Ok(CmcModel {
        skeleton,
        bone_offsets,
        vertices,
        faces,
    })
}

/// Write every convertible object as one merged object file.
pub fn export_cmo<'a, O, I, W>(objects: I, config: &ExportConfig, writer: W) -> Result<W>
where
    O: MeshObject + 'a,
    I: IntoIterator<Item = &'a O>,
    W: Write,
{
    let model = build_cmo(objects, config);
    let writer = model.write(writer)?;
    log::info!(
        "exported object: {} vertices, {} faces",
        model.vertices.len(),
        model.faces.len()
    );
    Ok(writer)
}

/// Write the selected mesh as a character file.
///
/// Nothing is written when a precondition fails.
pub fn export_character<O: MeshObject, W: Write>(
    selection: Option<&O>,
    format: FormatKind,
    config: &ExportConfig,
    writer: W,
) -> Result<W> {
    let model = build_character(selection, format, config)?;
    let writer = model.write(writer)?;
    log::info!(
        "exported {} character: {} vertices, {} faces",
        format,
        model.vertices.len(),
        model.faces.len()
    );
    Ok(writer)
}

/// Host-space geometry read from a file.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedMesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    /// Triangles in host winding.
    pub faces: Vec<Triangle>,
}

impl ImportedMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.positions.iter().copied())
    }

    fn create<S: ModelSink>(&self, sink: &mut S) -> S::Handle {
        sink.create_mesh_object(&self.name, &self.positions, &self.faces, &self.uvs)
    }

    /// Hand the mesh to the host and link it.
    pub fn apply<S: ModelSink>(&self, sink: &mut S) -> S::Handle {
        let handle = self.create(sink);
        sink.link_into_scene(handle);
        handle
    }
}

/// A character read from a file.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedCharacter {
    pub skeleton: SkeletonKind,
    pub mesh: ImportedMesh,
    /// `None` when the import was configured as mesh-only.
    pub armature: Option<BoneTree>,
    pub weights: VertexWeights,
}

impl ImportedCharacter {
    /// Decode a stored character.
    pub fn from_model(model: &CmcModel, name: &str, config: &ImportConfig) -> Self {
        let skeleton = model.skeleton;
        let format = model.format();
        let heads = decode_skeleton(skeleton, &model.bone_offsets);

        let mut weights = VertexWeights::new();
        let positions = model
            .vertices
            .iter()
            .enumerate()
            .map(|(index, vertex)| {
                if !config.applies_weights() {
                    return to_host_space(vertex.position);
                }
                let decoded = decode_vertex(vertex.position, &vertex.slots, &heads);
                for influence in &decoded.influences {
                    weights.assign(index, influence.bone, influence.weight);
                }
                decoded.position
            })
            .collect();

        let mesh = ImportedMesh {
            name: name.to_string(),
            positions,
            uvs: model.vertices.iter().map(|v| v.uv).collect(),
            faces: model.faces.iter().map(|&f| format.host_face(f)).collect(),
        };

        Self {
            skeleton,
            mesh,
            armature: config
                .build_armature
                .then(|| BoneTree::from_positions(skeleton, &heads)),
            weights,
        }
    }

    /// Hand the character to the host: armature first, then the mesh
    /// parented to it with its vertex weights.
    pub fn apply<S: ModelSink>(&self, sink: &mut S) -> S::Handle {
        let mesh = self.mesh.create(sink);

        if let Some(tree) = &self.armature {
            let armature = sink.create_armature(&format!("{}_armature", self.mesh.name), tree);
            sink.link_into_scene(armature);
            sink.parent_to_armature(mesh, armature);
            for (vertex, bone, weight) in self.weights.iter() {
                sink.assign_vertex_weight(mesh, vertex, self.skeleton.bone_name(bone), weight);
            }
        }

        sink.link_into_scene(mesh);
        mesh
    }
}

/// Read a character file. `skeleton` of `None` detects the generation from
/// the stored bone count.
pub fn import_character<R: Read>(
    reader: R,
    skeleton: Option<SkeletonKind>,
    name: &str,
    config: &ImportConfig,
) -> Result<ImportedCharacter> {
    let model = match skeleton {
        Some(kind) => CmcModel::read(reader, kind)?,
        None => CmcModel::read_detect(reader)?,
    };
    let name = config.name.as_deref().unwrap_or(name);
    let character = ImportedCharacter::from_model(&model, name, config);
    log::info!(
        "imported {:?} character {}: {} vertices, {} weights",
        character.skeleton,
        name,
        character.mesh.vertex_count(),
        character.weights.len()
    );
    Ok(character)
}

/// Read an object file.
pub fn import_cmo<R: Read>(reader: R, name: &str, config: &ImportConfig) -> Result<ImportedMesh> {
    let model = CmoModel::read(reader)?;
    let mesh = ImportedMesh {
        name: config.name.as_deref().unwrap_or(name).to_string(),
        positions: model.vertices.iter().map(|&v| to_host_space(v)).collect(),
        uvs: model.uvs,
        faces: model
            .faces
            .iter()
            .map(|&f| FormatKind::Cmo.host_face(f))
            .collect(),
    };
    log::info!(
        "imported object {}: {} vertices, {} faces",
        mesh.name,
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(mesh)
}
