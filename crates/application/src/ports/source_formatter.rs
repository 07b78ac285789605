//! Source formatter port.
//!
//! Post-processing of generated Go source: syntax validation, import
//! resolution and canonical formatting.

use jadegen_domain::FormatOptions;

/// Error type for source formatting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// The source does not parse.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// Import resolution failed.
    #[error("import resolution failed: {0}")]
    Imports(String),
}

/// Port for checking and formatting Go source.
pub trait SourceFormatter: Send + Sync {
    /// Checks that `source` parses as a Go file.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::Syntax`] describing the first syntax error.
    fn check(&self, file_name: &str, source: &str) -> Result<(), FormatError>;

    /// Resolves imports and prints `source` canonically.
    ///
    /// # Errors
    ///
    /// Returns an error if the source does not parse or imports cannot be
    /// resolved.
    fn format(
        &self,
        file_name: &str,
        source: &[u8],
        options: &FormatOptions,
    ) -> Result<Vec<u8>, FormatError>;
}
