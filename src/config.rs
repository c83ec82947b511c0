//! Import and export options.

use crate::error::Result;
use serde::Deserialize;

/// Options for writing model files.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// UV layer sampled for the per-vertex UV. `None` uses the first layer.
    pub uv_layer: Option<usize>,
    /// Force the multi-UV split pass on or off. `None` runs it for legacy
    /// characters only.
    pub split_uv_seams: Option<bool>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            uv_layer: None,
            split_uv_seams: None,
        }
    }
}

impl ExportConfig {
    pub fn with_uv_layer(mut self, layer: usize) -> Self {
        self.uv_layer = Some(layer);
        self
    }

    pub fn with_uv_split(mut self, split: bool) -> Self {
        self.split_uv_seams = Some(split);
        self
    }

    /// Whether the split pass runs for a writer whose default is `legacy`.
    pub fn splits_uv_seams(&self, legacy: bool) -> bool {
        self.split_uv_seams.unwrap_or(legacy)
    }

    pub fn uv_layer_index(&self) -> usize {
        self.uv_layer.unwrap_or(0)
    }
}

/// Options for reading model files.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Object name; readers fall back to the file stem.
    pub name: Option<String>,
    /// Rebuild the armature of character files.
    pub build_armature: bool,
    /// Rebuild vertex weights and bind positions. Needs `build_armature`.
    pub assign_weights: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            name: None,
            build_armature: true,
            assign_weights: true,
        }
    }
}

impl ImportConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Import geometry only.
    pub fn mesh_only(mut self) -> Self {
        self.build_armature = false;
        self.assign_weights = false;
        self
    }

    pub fn applies_weights(&self) -> bool {
        self.build_armature && self.assign_weights
    }
}

/// Import and export options of one conversion, as loaded from JSON.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    pub import: ImportConfig,
    pub export: ExportConfig,
}

impl ConversionConfig {
    /// Parse `{"import": {..}, "export": {..}}`; missing sections and fields
    /// keep their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
