//! Artifact serialization formats

use std::path::Path;

/// Text format of a model artifact, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArtifactFormat {
    /// JSON (`.json` and anything unrecognised)
    #[default]
    Json,
    /// YAML (`.yaml`, `.yml`)
    Yaml,
}

impl ArtifactFormat {
    /// Format for an extension, `None` if unknown.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Format for a path, falling back to JSON.
    pub fn for_path(path: &Path) -> Self {
        path.extension()
            .and_then(|s| s.to_str())
            .and_then(Self::from_extension)
            .unwrap_or_default()
    }
}
