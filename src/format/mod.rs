//! CMod file formats.
//!
//! Three pipelines share the `CMod` header and little-endian primitives:
//!
//! | format      | version | skeleton | per-vertex record                     | per-face record            |
//! |-------------|---------|----------|---------------------------------------|----------------------------|
//! | CMO         | 3       | none     | position, UV padded to 3 floats       | 3, i0 i1 i2, 0, 0          |
//! | CMC         | 2       | 16 bones | position, 16 weight slots, UV         | i2 i1 i0 (reversed)        |
//! | legacy CMC  | 2       | 15 bones | position, 15 weight slots, UV         | i0 i1 i2                   |

pub mod binary;
pub mod cmc;
pub mod cmo;

pub use binary::{CmodReader, CmodWriter, MAGIC};
pub use cmc::{CmcModel, CmcVertex};
pub use cmo::CmoModel;

use crate::error::CmodError;
use crate::skeleton::SkeletonKind;
use crate::types::{reversed, Triangle};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Version stored by character files of both generations.
pub const CMC_VERSION: i32 = 2;

/// Version stored by object files.
pub const CMO_VERSION: i32 = 3;

/// A concrete file flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormatKind {
    /// Static scenery, no skeleton.
    Cmo,
    /// Skinned character, 16-bone skeleton.
    Cmc,
    /// Skinned character, 15-bone skeleton, one UV per vertex enforced.
    LegacyCmc,
}

impl FormatKind {
    pub fn version(self) -> i32 {
        match self {
            FormatKind::Cmo => CMO_VERSION,
            FormatKind::Cmc | FormatKind::LegacyCmc => CMC_VERSION,
        }
    }

    /// Skeleton used by character formats.
    pub fn skeleton(self) -> Option<SkeletonKind> {
        match self {
            FormatKind::Cmo => None,
            FormatKind::Cmc => Some(SkeletonKind::Current),
            FormatKind::LegacyCmc => Some(SkeletonKind::Legacy),
        }
    }

    /// Character format for a skeleton generation.
    pub fn for_skeleton(kind: SkeletonKind) -> Self {
        match kind {
            SkeletonKind::Current => FormatKind::Cmc,
            SkeletonKind::Legacy => FormatKind::LegacyCmc,
        }
    }

    /// Whether faces are written in the opposite corner order to the host.
    pub fn reverses_winding(self) -> bool {
        matches!(self, FormatKind::Cmc)
    }

    /// Host triangle to the order stored on disk.
    pub fn stored_face(self, tri: Triangle) -> Triangle {
        if self.reverses_winding() {
            reversed(tri)
        } else {
            tri
        }
    }

    /// Stored triangle back to host order.
    pub fn host_face(self, tri: Triangle) -> Triangle {
        // Reversal is its own inverse.
        self.stored_face(tri)
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormatKind::Cmo => "cmo",
            FormatKind::Cmc => "cmc",
            FormatKind::LegacyCmc => "legacy-cmc",
        };
        f.write_str(name)
    }
}

impl FromStr for FormatKind {
    type Err = CmodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cmo" => Ok(FormatKind::Cmo),
            "cmc" => Ok(FormatKind::Cmc),
            "legacy-cmc" | "legacycmc" | "legacy" => Ok(FormatKind::LegacyCmc),
            other => Err(CmodError::Format(format!("unknown format '{}'", other))),
        }
    }
}

/// Check that every index of every face addresses an existing vertex.
pub(crate) fn validate_faces(faces: &[Triangle], vertex_count: usize) -> crate::Result<()> {
    for (index, face) in faces.iter().enumerate() {
        if let Some(bad) = face.iter().find(|&&v| v as usize >= vertex_count) {
            return Err(CmodError::Format(format!(
                "face {} references vertex {} but only {} vertices exist",
                index, bad, vertex_count
            )));
        }
    }
    Ok(())
}

/// Convert a stored `i32` vertex index.
pub(crate) fn face_index(value: i32) -> crate::Result<u32> {
    u32::try_from(value).map_err(|_| CmodError::Format(format!("negative vertex index {}", value)))
}
