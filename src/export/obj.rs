//! Wavefront OBJ export.
//!
//! OBJ is a simple, widely-supported text-based 3D format. Decoded CMod
//! meshes carry one UV per vertex, so every face corner uses the same index
//! for its position and texture coordinate.

use crate::error::Result;
use crate::pipeline::ImportedMesh;
use std::io::Write;

/// Write a decoded mesh as OBJ text and hand the writer back.
pub fn export_obj<W: Write>(mesh: &ImportedMesh, mut obj: W) -> Result<W> {
    writeln!(obj, "# CMod OBJ Export")?;
    writeln!(obj, "# Vertices: {}", mesh.vertex_count())?;
    writeln!(obj, "# Triangles: {}", mesh.triangle_count())?;
    writeln!(obj)?;
    writeln!(obj, "o {}", mesh.name)?;
    writeln!(obj)?;

    for p in &mesh.positions {
        writeln!(obj, "v {} {} {}", p.x, p.y, p.z)?;
    }
    writeln!(obj)?;

    for uv in &mesh.uvs {
        writeln!(obj, "vt {} {}", uv.x, uv.y)?;
    }
    writeln!(obj)?;

    for face in &mesh.faces {
        let [i0, i1, i2] = face.map(|i| i as usize + 1);
        writeln!(obj, "f {}/{} {}/{} {}/{}", i0, i0, i1, i1, i2, i2)?;
    }

    obj.flush()?;
    Ok(obj)
}
