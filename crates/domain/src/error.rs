//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The package name is not a valid Go identifier.
    #[error("invalid package name: {0}")]
    InvalidPackageName(String),

    /// A seed or function name is not a valid Go identifier.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A parameter entry could not be understood.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// An import line or import path is malformed.
    #[error("invalid import: {0}")]
    InvalidImport(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
