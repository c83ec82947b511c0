//! Object (`.cmo`) body codec.
//!
//! ```text
//! i32 vertex_count
//! vertex_count × { f32[3] position, f32[3] uv (third always 0) }
//! i32 face_count
//! face_count × { i32 arity (3), i32[3] indices, i32[2] reserved (0) }
//! ```

use super::binary::{CmodReader, CmodWriter};
use super::{face_index, validate_faces, CMO_VERSION};
use crate::error::{CmodError, Result};
use crate::types::Triangle;
use glam::{Vec2, Vec3};
use std::io::{Read, Write};

const TRIANGLE_ARITY: i32 = 3;

/// An object file as stored on disk.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CmoModel {
    /// Positions in file space.
    pub vertices: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub faces: Vec<Triangle>,
}

impl CmoModel {
    /// Write the complete file, header included.
    pub fn write<W: Write>(&self, writer: W) -> Result<W> {
        if self.uvs.len() != self.vertices.len() {
            return Err(CmodError::Format(format!(
                "{} uvs for {} vertices",
                self.uvs.len(),
                self.vertices.len()
            )));
        }

        let mut out = CmodWriter::new(writer);
        out.write_header(CMO_VERSION)?;

        out.write_count(self.vertices.len(), "vertices")?;
        for (position, uv) in self.vertices.iter().zip(&self.uvs) {
            out.write_vec3(*position)?;
            out.write_vec3(uv.extend(0.0))?;
        }

        out.write_count(self.faces.len(), "faces")?;
        for face in &self.faces {
            out.write_i32(TRIANGLE_ARITY)?;
            for &index in face {
                out.write_count(index as usize, "vertex index")?;
            }
            out.write_i32(0)?;
            out.write_i32(0)?;
        }

        out.flush()?;
        Ok(out.into_inner())
    }

    pub fn read<R: Read>(reader: R) -> Result<Self> {
        let mut input = CmodReader::new(reader);
        input.read_header(&[CMO_VERSION])?;

        let vertex_count = input.read_count("vertex count")?;
        let mut vertices = Vec::new();
        let mut uvs = Vec::new();
        for _ in 0..vertex_count {
            vertices.push(input.read_vec3("vertex position")?);
            uvs.push(input.read_vec3("vertex uv")?.truncate());
        }

        let face_count = input.read_count("face count")?;
        let mut faces = Vec::new();
        for index in 0..face_count {
            let arity = input.read_i32("face arity")?;
            if arity != TRIANGLE_ARITY {
                return Err(CmodError::Format(format!(
                    "face {} has {} corners, only triangles are supported",
                    index, arity
                )));
            }
            faces.push([
                face_index(input.read_i32("face index")?)?,
                face_index(input.read_i32("face index")?)?,
                face_index(input.read_i32("face index")?)?,
            ]);
            input.read_i32("face reserved")?;
            input.read_i32("face reserved")?;
        }
        validate_faces(&faces, vertices.len())?;

        log::debug!("read object: {} vertices, {} faces", vertices.len(), faces.len());

        Ok(Self {
            vertices,
            uvs,
            faces,
        })
    }

    /// Append another object, offsetting its face indices.
    pub fn merge(&mut self, other: &CmoModel) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.uvs.extend_from_slice(&other.uvs);
        self.faces
            .extend(other.faces.iter().map(|&f| f.map(|i| i + offset)));
    }
}
