//! Jadegen Domain - Core generation types
//!
//! This crate defines the domain model of the Go code generator: the layout
//! of a generated file, the metadata a compiled template carries and the
//! settings of a generation run.
//! All types here are pure Rust with no I/O dependencies.

pub mod codegen;
pub mod error;
pub mod ident;
pub mod layout;
pub mod metadata;
pub mod settings;

pub use codegen::{FormatOptions, GeneratedFile};
pub use error::{DomainError, DomainResult};
pub use ident::{is_go_identifier, is_go_keyword};
pub use layout::{BufferKind, Layout};
pub use metadata::{CompiledUnit, ImportSpec, Param, RawMeta, TemplateMeta};
pub use settings::GeneratorSettings;
