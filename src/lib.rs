//! # CMod
//!
//! Read and write CMod model files: skinned character meshes (`.cmc`, in the
//! current 16-bone and the legacy 15-bone skeleton generations) and static
//! object meshes (`.cmo`).
//!
//! ## Overview
//!
//! The codec talks to the authoring host through two traits. Exporters take
//! a [`MeshObject`] (the selected mesh and its armature parent), importers
//! hand their results to a [`ModelSink`]. [`MemoryScene`] implements both
//! sides in memory.
//!
//! ## Quick Start
//!
//! ```ignore
//! use cmod::{load_character, save_character, FormatKind, ImportConfig, ExportConfig, MemoryScene};
//!
//! // Decode a character into an in-memory scene
//! let character = load_character("hero.cmc", None, &ImportConfig::default())?;
//! let mut scene = MemoryScene::new();
//! character.apply(&mut scene);
//!
//! // Write it back out with the legacy skeleton
//! save_character("hero_old.cmc", scene.last_mesh(), FormatKind::LegacyCmc, &ExportConfig::default())?;
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod format;
pub mod host;
pub mod mesh;
pub mod pipeline;
pub mod scene;
pub mod skeleton;
pub mod splitter;
pub mod types;
pub mod weights;

// Re-export main types for convenience
pub use config::{ConversionConfig, ExportConfig, ImportConfig};
pub use error::{CmodError, Result};
pub use export::obj::export_obj;
pub use format::{CmcModel, CmoModel, FormatKind};
pub use host::{ArmatureSource, MeshObject, ModelSink, Parent};
pub use mesh::{EditMesh, MeshSurgery};
pub use pipeline::{
    build_character, build_cmo, export_character, export_cmo, import_character, import_cmo,
    ImportedCharacter, ImportedMesh,
};
pub use scene::{MemoryArmature, MemoryObject, MemoryScene};
pub use skeleton::{BoneTree, SkeletonKind};
pub use types::{BoundingBox, Triangle};

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string())
}

/// Write the selected mesh as a character file.
///
/// The model is built before the file is created, so a failed precondition
/// leaves the filesystem untouched.
pub fn save_character<P: AsRef<Path>, O: MeshObject>(
    path: P,
    selection: Option<&O>,
    format: FormatKind,
    config: &ExportConfig,
) -> Result<()> {
    let model = build_character(selection, format, config)?;
    let writer = BufWriter::new(File::create(path.as_ref())?);
    model.write(writer)?;
    Ok(())
}

/// Write every convertible object into one object file.
pub fn save_cmo<'a, P, O, I>(path: P, objects: I, config: &ExportConfig) -> Result<()>
where
    P: AsRef<Path>,
    O: MeshObject + 'a,
    I: IntoIterator<Item = &'a O>,
{
    let model = build_cmo(objects, config);
    let writer = BufWriter::new(File::create(path.as_ref())?);
    model.write(writer)?;
    Ok(())
}

/// Read a character file, naming the mesh after the file stem unless the
/// config overrides it.
pub fn load_character<P: AsRef<Path>>(
    path: P,
    skeleton: Option<SkeletonKind>,
    config: &ImportConfig,
) -> Result<ImportedCharacter> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    import_character(reader, skeleton, &file_stem(path), config)
}

/// Read an object file.
pub fn load_cmo<P: AsRef<Path>>(path: P, config: &ImportConfig) -> Result<ImportedMesh> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    import_cmo(reader, &file_stem(path), config)
}
