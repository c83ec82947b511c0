//! Character (`.cmc`) body codec.
//!
//! ```text
//! i32 bone_count
//! bone_count × f32[3]                bone offsets (file space)
//! i32 vertex_count
//! vertex_count × {
//!     f32[3]                         position (file space)
//!     bone_count × f32[4]            weight slots: offset.xyz, weight
//!     f32[2]                         uv
//! }
//! i32 face_count
//! face_count × i32[3]                vertex indices
//! ```

use super::binary::{CmodReader, CmodWriter};
use super::{face_index, validate_faces, FormatKind, CMC_VERSION};
use crate::error::{CmodError, Result};
use crate::skeleton::SkeletonKind;
use crate::types::Triangle;
use crate::weights::WeightSlot;
use glam::{Vec2, Vec3};
use std::io::{Read, Write};

/// One stored character vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct CmcVertex {
    /// Raw position in file space.
    pub position: Vec3,
    /// One slot per bone ordinal.
    pub slots: Vec<WeightSlot>,
    pub uv: Vec2,
}

/// A character file as stored on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct CmcModel {
    pub skeleton: SkeletonKind,
    /// Per-bone offsets from the parent, file space and units.
    pub bone_offsets: Vec<Vec3>,
    pub vertices: Vec<CmcVertex>,
    /// Faces in stored corner order.
    pub faces: Vec<Triangle>,
}

impl CmcModel {
    pub fn format(&self) -> FormatKind {
        FormatKind::for_skeleton(self.skeleton)
    }

    /// Write the complete file, header included.
    pub fn write<W: Write>(&self, writer: W) -> Result<W> {
        let bone_count = self.skeleton.bone_count();
        if self.bone_offsets.len() != bone_count {
            return Err(CmodError::Format(format!(
                "{} bone offsets given for a {}-bone skeleton",
                self.bone_offsets.len(),
                bone_count
            )));
        }

        if let Some((index, vertex)) = self
            .vertices
            .iter()
            .enumerate()
            .find(|(_, v)| v.slots.len() != bone_count)
        {
            return Err(CmodError::Format(format!(
                "vertex {} has {} weight slots, expected {}",
                index,
                vertex.slots.len(),
                bone_count
            )));
        }

        let mut out = CmodWriter::new(writer);
        out.write_header(CMC_VERSION)?;

        out.write_count(bone_count, "bones")?;
        for offset in &self.bone_offsets {
            out.write_vec3(*offset)?;
        }

        out.write_count(self.vertices.len(), "vertices")?;
        for vertex in &self.vertices {
            out.write_vec3(vertex.position)?;
            for slot in &vertex.slots {
                out.write_vec3(slot.offset)?;
                out.write_f32(slot.weight)?;
            }
            out.write_vec2(vertex.uv)?;
        }

        out.write_count(self.faces.len(), "faces")?;
        for face in &self.faces {
            for &index in face {
                out.write_count(index as usize, "vertex index")?;
            }
        }

        out.flush()?;
        Ok(out.into_inner())
    }

    /// Read a file of a known skeleton generation.
    ///
    /// The stored bone count must match `skeleton`, so a legacy read never
    /// consumes a sixteenth offset.
    pub fn read<R: Read>(reader: R, skeleton: SkeletonKind) -> Result<Self> {
        Self::read_with(reader, Some(skeleton))
    }

    /// Read a file, picking the skeleton from the stored bone count.
    pub fn read_detect<R: Read>(reader: R) -> Result<Self> {
        Self::read_with(reader, None)
    }

    fn read_with<R: Read>(reader: R, expected: Option<SkeletonKind>) -> Result<Self> {
        let mut input = CmodReader::new(reader);
        input.read_header(&[CMC_VERSION])?;

        let bone_count = input.read_count("bone count")?;
        let skeleton = match expected {
            Some(kind) if kind.bone_count() == bone_count => kind,
            Some(kind) => {
                return Err(CmodError::Format(format!(
                    "expected {} bones for the {:?} skeleton, file has {}",
                    kind.bone_count(),
                    kind,
                    bone_count
                )))
            }
            None => SkeletonKind::from_bone_count(bone_count).ok_or_else(|| {
                CmodError::Format(format!("no skeleton has {} bones", bone_count))
            })?,
        };

        let mut bone_offsets = Vec::with_capacity(bone_count);
        for _ in 0..bone_count {
            bone_offsets.push(input.read_vec3("bone offset")?);
        }

        let vertex_count = input.read_count("vertex count")?;
        let mut vertices = Vec::new();
        for _ in 0..vertex_count {
            let position = input.read_vec3("vertex position")?;
            let mut slots = Vec::with_capacity(bone_count);
            for _ in 0..bone_count {
                let offset = input.read_vec3("weight slot")?;
                let weight = input.read_f32("weight slot")?;
                slots.push(WeightSlot { offset, weight });
            }
            let uv = input.read_vec2("vertex uv")?;
            vertices.push(CmcVertex { position, slots, uv });
        }

        let face_count = input.read_count("face count")?;
        let mut faces = Vec::new();
        for _ in 0..face_count {
            faces.push([
                face_index(input.read_i32("face index")?)?,
                face_index(input.read_i32("face index")?)?,
                face_index(input.read_i32("face index")?)?,
            ]);
        }
        validate_faces(&faces, vertices.len())?;

        log::debug!(
            "read {:?} character: {} vertices, {} faces",
            skeleton,
            vertices.len(),
            faces.len()
        );

        Ok(Self {
            skeleton,
            bone_offsets,
            vertices,
            faces,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample(skeleton: SkeletonKind) -> CmcModel {
        let bone_count = skeleton.bone_count();
        let mut slots = vec![WeightSlot::default(); bone_count];
        slots[bone_count - 1] = WeightSlot {
            offset: Vec3::new(0.5, 0.25, -1.0),
            weight: 1.0,
        };
        let vertex = |x: f32| CmcVertex {
            position: Vec3::new(x, 1.0, 2.0),
            slots: slots.clone(),
            uv: Vec2::new(x, 0.5),
        };
        CmcModel {
            skeleton,
            bone_offsets: (0..bone_count)
                .map(|i| Vec3::new(0.0, i as f32, 0.0))
                .collect(),
            vertices: vec![vertex(0.0), vertex(1.0), vertex(2.0)],
            faces: vec![[2, 1, 0]],
        }
    }

    fn encode(model: &CmcModel) -> Vec<u8> {
        model.write(Vec::new()).unwrap()
    }

    #[test]
    fn test_byte_layout_sizes() {
        let bytes = encode(&sample(SkeletonKind::Current));
        // header + bones + vertices + faces
        let expected = 8 + (4 + 16 * 12) + (4 + 3 * (12 + 16 * 16 + 8)) + (4 + 12);
        assert_eq!(bytes.len(), expected);
        assert_eq!(&bytes[..4], b"CMod");
        assert_eq!(&bytes[8..12], &16i32.to_le_bytes());

        let legacy = encode(&sample(SkeletonKind::Legacy));
        let expected = 8 + (4 + 15 * 12) + (4 + 3 * (12 + 15 * 16 + 8)) + (4 + 12);
        assert_eq!(legacy.len(), expected);
    }

    #[test]
    fn test_read_back() {
        for skeleton in [SkeletonKind::Current, SkeletonKind::Legacy] {
            let model = sample(skeleton);
            let read = CmcModel::read(Cursor::new(encode(&model)), skeleton).unwrap();
            assert_eq!(read, model);
        }
    }

    #[test]
    fn test_detect_skeleton() {
        let bytes = encode(&sample(SkeletonKind::Legacy));
        let read = CmcModel::read_detect(Cursor::new(bytes)).unwrap();
        assert_eq!(read.skeleton, SkeletonKind::Legacy);
        assert_eq!(read.format(), FormatKind::LegacyCmc);
    }

    #[test]
    fn test_bone_count_mismatch() {
        let bytes = encode(&sample(SkeletonKind::Legacy));
        let err = CmcModel::read(Cursor::new(bytes), SkeletonKind::Current).unwrap_err();
        assert!(matches!(err, CmodError::Format(_)));
    }

    #[test]
    fn test_legacy_reader_stops_after_fifteen_bones() {
        // A legacy file with no vertices or faces: the vertex count sits
        // right after the fifteenth offset.
        let mut out = CmodWriter::new(Vec::new());
        out.write_header(2).unwrap();
        out.write_i32(15).unwrap();
        for _ in 0..15 {
            out.write_vec3(Vec3::ONE).unwrap();
        }
        out.write_i32(0).unwrap();
        out.write_i32(0).unwrap();
        let read = CmcModel::read(Cursor::new(out.into_inner()), SkeletonKind::Legacy).unwrap();
        assert_eq!(read.bone_offsets.len(), 15);
        assert!(read.vertices.is_empty());
    }

    #[test]
    fn test_version_rejected_before_body() {
        let mut out = CmodWriter::new(Vec::new());
        out.write_header(99).unwrap();
        let err = CmcModel::read(Cursor::new(out.into_inner()), SkeletonKind::Current).unwrap_err();
        assert!(matches!(err, CmodError::Format(_)));
    }

    #[test]
    fn test_cmo_version_rejected() {
        let mut out = CmodWriter::new(Vec::new());
        out.write_header(3).unwrap();
        let err = CmcModel::read_detect(Cursor::new(out.into_inner())).unwrap_err();
        assert!(matches!(err, CmodError::Format(_)));
    }

    #[test]
    fn test_truncated_vertex() {
        let mut bytes = encode(&sample(SkeletonKind::Current));
        bytes.truncate(8 + 4 + 16 * 12 + 4 + 20);
        let err = CmcModel::read(Cursor::new(bytes), SkeletonKind::Current).unwrap_err();
        assert!(matches!(err, CmodError::Truncated(_)));
    }

    #[test]
    fn test_out_of_range_face() {
        let mut model = sample(SkeletonKind::Current);
        model.faces.push([0, 1, 7]);
        let err = CmcModel::read(Cursor::new(encode(&model)), SkeletonKind::Current).unwrap_err();
        assert!(matches!(err, CmodError::Format(_)));
    }

    #[test]
    fn test_write_rejects_wrong_slot_count() {
        let mut model = sample(SkeletonKind::Current);
        model.vertices[1].slots.pop();
        let mut out = Vec::new();
        assert!(matches!(model.write(&mut out), Err(CmodError::Format(_))));
        assert!(out.is_empty());
    }
}
