//! File access port.
//!
//! Manifests and settings are read through this port and generated sources
//! are written through it.

use std::future::Future;
use std::path::{Path, PathBuf};

/// Error type for file access.
#[derive(Debug, thiserror::Error)]
pub enum FileSystemError {
    /// The file does not exist.
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Access was refused.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// A path component that must be a directory is not one.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Any other I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Port for the files a generation run reads and writes.
pub trait FileSystem: Send + Sync {
    /// Reads a UTF-8 document such as a manifest or a settings file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid UTF-8.
    fn read_file_string(&self, path: &Path)
    -> impl Future<Output = Result<String, FileSystemError>> + Send;

    /// Writes a generated file, replacing any previous content.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn write_file(
        &self,
        path: &Path,
        contents: &[u8],
    ) -> impl Future<Output = Result<(), FileSystemError>> + Send;

    /// Creates an output directory and its parents.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    fn create_dir_all(&self, path: &Path)
    -> impl Future<Output = Result<(), FileSystemError>> + Send;

    /// Returns true if `path` exists.
    fn exists(&self, path: &Path) -> impl Future<Output = bool> + Send;
}
