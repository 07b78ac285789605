//! Generator settings.
//!
//! Process-wide configuration, set once before generation and read-only
//! afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::codegen::FormatOptions;
use crate::error::{DomainError, DomainResult};
use crate::ident::is_go_identifier;
use crate::layout::BufferKind;

/// Settings shared by every unit of a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorSettings {
    /// Go package name of the generated files.
    #[serde(default = "default_package")]
    pub package: String,

    /// Constants are inlined into the function body; no definitions block.
    #[serde(default)]
    pub inline: bool,

    /// Use `*bytes.Buffer` instead of the pooled buffer.
    #[serde(default)]
    pub stdbuf: bool,

    /// Pretty-print the produced HTML before the function returns.
    #[serde(default)]
    pub format: bool,

    /// Run import resolution and formatting on the generated source.
    #[serde(default = "default_true")]
    pub imports: bool,

    /// Suffix appended to the seed to name output files.
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,

    /// Printer options for the formatting pass.
    #[serde(default)]
    pub format_options: FormatOptions,

    /// Extra packages the import resolver may add, by package name.
    #[serde(default)]
    pub known_packages: BTreeMap<String, String>,
}

fn default_package() -> String {
    "jade".to_string()
}

const fn default_true() -> bool {
    true
}

fn default_output_suffix() -> String {
    ".jade.go".to_string()
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            package: default_package(),
            inline: false,
            stdbuf: false,
            format: false,
            imports: true,
            output_suffix: default_output_suffix(),
            format_options: FormatOptions::default(),
            known_packages: BTreeMap::new(),
        }
    }
}

impl GeneratorSettings {
    /// Creates default settings for `package`.
    #[must_use]
    pub fn for_package(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            ..Default::default()
        }
    }

    /// Buffer type selected by the `stdbuf` flag.
    #[must_use]
    pub const fn buffer_kind(&self) -> BufferKind {
        BufferKind::from_stdbuf(self.stdbuf)
    }

    /// Output file name for a seed.
    #[must_use]
    pub fn output_file_name(&self, seed: &str) -> String {
        format!("{seed}{}", self.output_suffix)
    }

    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidPackageName`] if the package name is not
    /// a Go identifier, and [`DomainError::InvalidImport`] for a known package
    /// entry with an unusable path.
    pub fn validate(&self) -> DomainResult<()> {
        if !is_go_identifier(&self.package) {
            return Err(DomainError::InvalidPackageName(self.package.clone()));
        }
        for (name, path) in &self.known_packages {
            if !is_go_identifier(name) || path.is_empty() || path.contains(char::is_whitespace) {
                return Err(DomainError::InvalidImport(format!("{name} \"{path}\"")));
            }
        }
        Ok(())
    }
}
