//! Format detection and deserialization helpers.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

/// Error type for deserialization.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// JSON deserialization failed.
    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML deserialization failed.
    #[error("YAML deserialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The file extension names no supported format.
    #[error("unsupported document format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// `.json`
    Json,
    /// `.yaml` or `.yml`
    Yaml,
}

impl DocumentFormat {
    /// Detects the format from the extension of `path`.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Deserializes JSON from a string.
///
/// # Errors
///
/// Returns an error if the JSON is invalid or doesn't match the expected type.
pub fn from_json<T: DeserializeOwned>(json: &str) -> Result<T, SerializationError> {
    Ok(serde_json::from_str(json)?)
}

/// Deserializes YAML from a string.
///
/// # Errors
///
/// Returns an error if the YAML is invalid or doesn't match the expected type.
pub fn from_yaml<T: DeserializeOwned>(yaml: &str) -> Result<T, SerializationError> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Deserializes `content` read from `path`, in the format named by its
/// extension.
///
/// # Errors
///
/// Returns an error if the extension is unknown or the content is invalid.
pub fn from_document<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T, SerializationError> {
    match DocumentFormat::from_path(path) {
        Some(DocumentFormat::Json) => from_json(content),
        Some(DocumentFormat::Yaml) => from_yaml(content),
        None => Err(SerializationError::UnsupportedFormat(path.to_path_buf())),
    }
}
