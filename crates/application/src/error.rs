//! Application error types

use thiserror::Error;
use jadegen_domain::DomainError;

use crate::ports::{FileSystemError, FormatError};
use crate::emitter::TemplateError;

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// Rendering the file layout failed.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// The generated source could not be checked or formatted.
    #[error("format error in {file}: {source}")]
    Format {
        /// File being generated.
        file: String,
        /// Underlying formatter error.
        source: FormatError,
    },

    /// A storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] FileSystemError),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
