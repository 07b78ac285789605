//! Code generation output types.
//!
//! Options for the Go formatting pass and the file a generation run
//! produces.

use serde::{Deserialize, Serialize};

/// Options for printing Go source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Width of one indentation level when indenting with spaces.
    #[serde(default = "default_tab_width")]
    pub tab_width: usize,
    /// Indent with tabs instead of spaces.
    #[serde(default = "default_true")]
    pub tab_indent: bool,
    /// Keep comments.
    #[serde(default = "default_true")]
    pub comments: bool,
    /// Accept sources without a package clause.
    #[serde(default = "default_true")]
    pub fragment: bool,
}

const fn default_tab_width() -> usize {
    4
}

const fn default_true() -> bool {
    true
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            tab_width: default_tab_width(),
            tab_indent: true,
            comments: true,
            fragment: true,
        }
    }
}

impl FormatOptions {
    /// Indentation string for one level.
    #[must_use]
    pub fn indent(&self) -> String {
        if self.tab_indent {
            "\t".to_string()
        } else {
            " ".repeat(self.tab_width)
        }
    }
}

/// A generated Go source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    /// File name, relative to the output directory.
    pub file_name: String,
    /// Complete Go source.
    pub source: String,
    /// Name of the generated function.
    pub function: String,
}

impl GeneratedFile {
    /// Creates a generated file.
    #[must_use]
    pub fn new(
        file_name: impl Into<String>,
        source: impl Into<String>,
        function: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            source: source.into(),
            function: function.into(),
        }
    }

    /// Size of the source in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.source.len()
    }

    /// Returns true if the source is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_options_default() {
        let options = FormatOptions::default();
        assert_eq!(options.tab_width, 4);
        assert!(options.tab_indent);
        assert!(options.comments);
        assert!(options.fragment);
        assert_eq!(options.indent(), "\t");
    }

    #[test]
    fn test_space_indent() {
        let options = FormatOptions {
            tab_indent: false,
            tab_width: 2,
            ..Default::default()
        };
        assert_eq!(options.indent(), "  ");
    }

    #[test]
    fn test_generated_file() {
        let file = GeneratedFile::new("index.jade.go", "package jade\n", "tpl_index");
        assert_eq!(file.len(), 13);
        assert!(!file.is_empty());
    }
}
