//! Settings and manifest loading.
//!
//! Settings are layered: defaults, then an optional settings file, then
//! `JADEGEN_*` environment variables. Command-line flags are applied last by
//! the binary.

use std::path::{Path, PathBuf};

use jadegen_application::ports::{FileSystem, FileSystemError};
use jadegen_domain::{CompiledUnit, GeneratorSettings};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::serialization::{SerializationError, from_document};

/// Prefix of the environment variables read by [`apply_env_overrides`].
pub const ENV_PREFIX: &str = "JADEGEN_";

/// Error type for configuration and manifest loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: FileSystemError,
    },

    /// The file content is invalid.
    #[error("invalid document {}: {source}", path.display())]
    Parse {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: SerializationError,
    },

    /// An environment variable holds an unusable value.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// Rejected value.
        value: String,
    },
}

/// A batch of compiled templates to generate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Units in generation order.
    #[serde(default)]
    pub units: Vec<CompiledUnit>,
}

async fn read_document<T, F>(fs: &F, path: &Path) -> Result<T, ConfigError>
where
    T: serde::de::DeserializeOwned,
    F: FileSystem,
{
    let content = fs
        .read_file_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    from_document(path, &content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads settings from `path`, or returns the defaults when no file is
/// given.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub async fn load_settings<F: FileSystem>(
    fs: &F,
    path: Option<&Path>,
) -> Result<GeneratorSettings, ConfigError> {
    let Some(path) = path else {
        return Ok(GeneratorSettings::default());
    };
    let settings: GeneratorSettings = read_document(fs, path).await?;
    debug!(path = %path.display(), package = %settings.package, "settings loaded");
    Ok(settings)
}

/// Loads a manifest of compiled units.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub async fn load_manifest<F: FileSystem>(fs: &F, path: &Path) -> Result<Manifest, ConfigError> {
    let manifest: Manifest = read_document(fs, path).await?;
    debug!(path = %path.display(), units = manifest.units.len(), "manifest loaded");
    Ok(manifest)
}

/// Applies `JADEGEN_PKG`, `JADEGEN_INLINE`, `JADEGEN_STDBUF`,
/// `JADEGEN_FORMAT` and `JADEGEN_IMPORTS` from `vars`. Other variables are
/// ignored.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for a flag that is not a boolean.
pub fn apply_env_overrides<I, K, V>(
    settings: &mut GeneratorSettings,
    vars: I,
) -> Result<(), ConfigError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    for (key, value) in vars {
        let (key, value) = (key.as_ref(), value.as_ref());
        let Some(name) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let flag = match name {
            "PKG" => {
                settings.package = value.trim().to_string();
                continue;
            }
            "INLINE" => &mut settings.inline,
            "STDBUF" => &mut settings.stdbuf,
            "FORMAT" => &mut settings.format,
            "IMPORTS" => &mut settings.imports,
            _ => continue,
        };
        *flag = parse_bool(value).ok_or_else(|| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })?;
        debug!(key, value, "environment override");
    }
    Ok(())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::TokioFileSystem;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_env_overrides() {
        let mut settings = GeneratorSettings::default();
        apply_env_overrides(
            &mut settings,
            [
                ("JADEGEN_PKG", "views"),
                ("JADEGEN_STDBUF", "true"),
                ("JADEGEN_FORMAT", "1"),
                ("JADEGEN_IMPORTS", "off"),
                ("JADEGEN_UNKNOWN", "x"),
                ("HOME", "/root"),
            ],
        )
        .unwrap();

        assert_eq!(settings.package, "views");
        assert!(settings.stdbuf);
        assert!(settings.format);
        assert!(!settings.imports);
        assert!(!settings.inline);
    }

    #[test]
    fn test_env_override_rejects_non_boolean() {
        let mut settings = GeneratorSettings::default();
        let err = apply_env_overrides(&mut settings, [("JADEGEN_INLINE", "maybe")]).unwrap_err();
        assert_eq!(err.to_string(), "invalid value for JADEGEN_INLINE: \"maybe\"");
    }

    #[tokio::test]
    async fn test_load_settings_defaults_without_file() {
        let settings = load_settings(&TokioFileSystem::new(), None).await.unwrap();
        assert_eq!(settings, GeneratorSettings::default());
    }

    #[tokio::test]
    async fn test_load_settings_from_yaml_and_json() {
        let temp = TempDir::new().unwrap();
        let fs = TokioFileSystem::new();

        let yaml = temp.path().join("jadegen.yaml");
        std::fs::write(&yaml, "package: views\ninline: true\nknown_packages:\n  yaml: gopkg.in/yaml.v3\n").unwrap();
        let settings = load_settings(&fs, Some(&yaml)).await.unwrap();
        assert_eq!(settings.package, "views");
        assert!(settings.inline);
        assert_eq!(settings.known_packages["yaml"], "gopkg.in/yaml.v3");

        let json = temp.path().join("jadegen.json");
        std::fs::write(&json, r#"{"stdbuf": true, "format_options": {"tab_indent": false}}"#).unwrap();
        let settings = load_settings(&fs, Some(&json)).await.unwrap();
        assert_eq!(settings.package, "jade");
        assert!(settings.stdbuf);
        assert!(!settings.format_options.tab_indent);
        assert_eq!(settings.format_options.tab_width, 4);
    }

    #[tokio::test]
    async fn test_load_settings_errors() {
        let temp = TempDir::new().unwrap();
        let fs = TokioFileSystem::new();

        let missing = temp.path().join("missing.yaml");
        let err = load_settings(&fs, Some(&missing)).await.unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));

        let toml = temp.path().join("jadegen.toml");
        std::fs::write(&toml, "package = 'x'").unwrap();
        let err = load_settings(&fs, Some(&toml)).await.unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Parse {
                source: SerializationError::UnsupportedFormat(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_load_manifest() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("units.yaml");
        std::fs::write(
            &path,
            "units:\n  - seed: index\n    body: buffer.WriteString(\"hi\")\n    meta:\n      name: Index\n      params:\n        - name: title\n          type: string\n  - seed: page\n    body: \"\"\n    legacy:\n      name: Page\n      args: \"a, b int\"\n      import: \"\"\n",
        )
        .unwrap();

        let manifest = load_manifest(&TokioFileSystem::new(), &path).await.unwrap();
        assert_eq!(manifest.units.len(), 2);
        assert_eq!(manifest.units[0].meta.name.as_deref(), Some("Index"));
        assert_eq!(manifest.units[0].meta.params[0].ty, "string");
        assert_eq!(manifest.units[1].legacy.as_ref().unwrap().args, "a, b int");
    }
}
