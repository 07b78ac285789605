//! Jadegen Application - Generation pipeline and ports
//!
//! This crate defines the application layer with:
//! - The layout builder and emitter producing the code around a template body
//! - Header and footer templates rendered with minijinja
//! - Port traits (interfaces for formatting and file access)
//! - Use case orchestration
//! - Application-level error handling

pub mod emitter;
pub mod error;
pub mod layout_builder;
pub mod metadata;
pub mod ports;
pub mod use_cases;

pub use emitter::{EmitLayout, FILE_BEGIN, FILE_END, TemplateError};
pub use error::{ApplicationError, ApplicationResult};
pub use layout_builder::new_layout;
pub use metadata::{derive_seed, parse_legacy_meta, resolve_meta};
pub use ports::{FileSystem, FileSystemError, FormatError, SourceFormatter};
pub use use_cases::{GenerateFile, GenerateFiles, GenerateFilesInput, GenerateFilesOutput};
