//! Reading YAML and JSON documents.
//!
//! The format is chosen from the file extension: `.yaml`/`.yml` documents
//! are read with `serde_yaml`, `.json` documents with `serde_json`.

mod document;

pub use document::*;
