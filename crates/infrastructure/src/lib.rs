//! Jadegen Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer: the Go front end used to check and
//! format generated sources, the `tokio` file system, and configuration
//! loading.

pub mod adapters;
pub mod config;
pub mod go;
pub mod persistence;
pub mod serialization;

pub use adapters::GoFormatter;
pub use config::{
    ConfigError, ENV_PREFIX, Manifest, apply_env_overrides, load_manifest, load_settings,
};
pub use go::{GoAst, ImportResolver, ImportsError, ParseError, go_imports, parse_go_src};
pub use persistence::TokioFileSystem;
pub use serialization::{DocumentFormat, SerializationError, from_document, from_json, from_yaml};
