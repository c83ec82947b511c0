//! Little-endian primitive reader/writer with `CMod` framing.
//!
//! Every CMod file starts with the 4-byte ASCII tag `CMod` followed by an
//! `i32` version. All later integers are `i32` and all floats are `f32`,
//! both little-endian, packed with no padding.

use crate::error::{CmodError, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use glam::{Vec2, Vec3};
use std::io::{Read, Write};

/// Magic tag shared by every CMod file.
pub const MAGIC: [u8; 4] = *b"CMod";

/// Writer for CMod primitives.
pub struct CmodWriter<W: Write> {
    writer: W,
}

impl<W: Write> CmodWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write the magic tag and version.
    pub fn write_header(&mut self, version: i32) -> Result<()> {
        self.writer.write_all(&MAGIC)?;
        self.write_i32(version)
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.writer.write_i32::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.writer.write_f32::<LittleEndian>(value)?;
        Ok(())
    }

    /// Write a section length. Lengths above `i32::MAX` cannot be framed.
    pub fn write_count(&mut self, count: usize, what: &str) -> Result<()> {
        let count = i32::try_from(count)
            .map_err(|_| CmodError::Format(format!("too many {} ({})", what, count)))?;
        self.write_i32(count)
    }

    pub fn write_vec2(&mut self, v: Vec2) -> Result<()> {
        self.write_f32(v.x)?;
        self.write_f32(v.y)
    }

    pub fn write_vec3(&mut self, v: Vec3) -> Result<()> {
        self.write_f32(v.x)?;
        self.write_f32(v.y)?;
        self.write_f32(v.z)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Reader for CMod primitives.
pub struct CmodReader<R: Read> {
    reader: R,
}

impl<R: Read> CmodReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Read and validate the magic tag and version.
    ///
    /// Fails with [`CmodError::Format`] when the tag is wrong or the version
    /// is not in `supported`.
    pub fn read_header(&mut self, supported: &[i32]) -> Result<i32> {
        let mut magic = [0u8; 4];
        self.reader
            .read_exact(&mut magic)
            .map_err(|e| CmodError::from_read(e, "magic tag"))?;
        if magic != MAGIC {
            return Err(CmodError::Format(format!(
                "bad magic tag {:?}, expected {:?}",
                String::from_utf8_lossy(&magic),
                "CMod"
            )));
        }

        let version = self.read_i32("version")?;
        if !supported.contains(&version) {
            return Err(CmodError::Format(format!(
                "unsupported version {} (supported: {:?})",
                version, supported
            )));
        }
        Ok(version)
    }

    pub fn read_i32(&mut self, what: &str) -> Result<i32> {
        self.reader
            .read_i32::<LittleEndian>()
            .map_err(|e| CmodError::from_read(e, what))
    }

    pub fn read_f32(&mut self, what: &str) -> Result<f32> {
        self.reader
            .read_f32::<LittleEndian>()
            .map_err(|e| CmodError::from_read(e, what))
    }

    /// Read a section length, rejecting negative values.
    pub fn read_count(&mut self, what: &str) -> Result<usize> {
        let count = self.read_i32(what)?;
        usize::try_from(count)
            .map_err(|_| CmodError::Format(format!("negative {}: {}", what, count)))
    }

    pub fn read_vec2(&mut self, what: &str) -> Result<Vec2> {
        Ok(Vec2::new(self.read_f32(what)?, self.read_f32(what)?))
    }

    pub fn read_vec3(&mut self, what: &str) -> Result<Vec3> {
        Ok(Vec3::new(
            self.read_f32(what)?,
            self.read_f32(what)?,
            self.read_f32(what)?,
        ))
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}
