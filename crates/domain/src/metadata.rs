//! Per-template metadata handed over by the template compiler.
//!
//! The template compiler produces one [`CompiledUnit`] per template: the Go
//! statements of the function body plus the hints that shape the function
//! around it (name, parameters, extra imports).

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::ident::is_go_identifier;

/// A function parameter declared by the template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name.
    pub name: String,
    /// Parameter type. Empty for grouped parameters such as `a` in `a, b int`.
    #[serde(rename = "type", default)]
    pub ty: String,
}

impl Param {
    /// Creates a parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }

    /// Creates a parameter without a type.
    #[must_use]
    pub fn untyped(name: impl Into<String>) -> Self {
        Self::new(name, "")
    }
}

impl std::fmt::Display for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.ty.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{} {}", self.name, self.ty)
        }
    }
}

/// An import requested by the template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportSpec {
    /// Optional local name (`pool`, `_` or `.`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Unquoted import path.
    pub path: String,
}

impl ImportSpec {
    /// Creates an import without alias.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            alias: None,
            path: path.into(),
        }
    }

    /// Creates an import with a local name.
    #[must_use]
    pub fn aliased(alias: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            path: path.into(),
        }
    }

    /// Checks that the path can be written as a Go string literal and that
    /// the alias is usable as a local name.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidImport`] for an empty path, a path with
    /// quotes, backslashes or whitespace, or an unusable alias.
    pub fn validate(&self) -> DomainResult<()> {
        if self.path.is_empty()
            || self
                .path
                .chars()
                .any(|c| c == '"' || c == '\\' || c.is_whitespace())
        {
            return Err(DomainError::InvalidImport(self.path.clone()));
        }
        if let Some(alias) = &self.alias {
            if alias != "_" && alias != "." && !is_go_identifier(alias) {
                return Err(DomainError::InvalidImport(format!("{alias} \"{}\"", self.path)));
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for ImportSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{alias} \"{}\"", self.path),
            None => write!(f, "\"{}\"", self.path),
        }
    }
}

/// Structured metadata of one compiled template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateMeta {
    /// Explicit function name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Declared parameters, in order.
    pub params: Vec<Param>,
    /// Extra imports, in order.
    pub imports: Vec<ImportSpec>,
}

impl TemplateMeta {
    /// Returns true if no field carries a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.params.is_empty() && self.imports.is_empty()
    }

    /// Sets the function name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Adds a parameter.
    #[must_use]
    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Adds an import.
    #[must_use]
    pub fn with_import(mut self, import: ImportSpec) -> Self {
        self.imports.push(import);
        self
    }
}

/// Metadata in the delimited-string form older template compilers emit:
/// comma separated arguments and newline separated import lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawMeta {
    /// Function name, possibly empty.
    pub name: String,
    /// Comma separated parameter list, e.g. `title string, items []Item`.
    pub args: String,
    /// Newline separated import lines, quoted or bare.
    pub import: String,
}

/// One compiled template: a function body and its metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledUnit {
    /// Seed for generated names (`tpl_<seed>`, `<seed>__buffer`).
    pub seed: String,
    /// Go statements forming the function body.
    pub body: String,
    /// Output file name; derived from the seed when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Structured metadata.
    #[serde(default)]
    pub meta: TemplateMeta,
    /// Delimited-string metadata; takes precedence over `meta` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy: Option<RawMeta>,
}

impl CompiledUnit {
    /// Creates a unit with empty metadata.
    #[must_use]
    pub fn new(seed: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            body: body.into(),
            ..Default::default()
        }
    }

    /// Attaches structured metadata.
    #[must_use]
    pub fn with_meta(mut self, meta: TemplateMeta) -> Self {
        self.meta = meta;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_param_display() {
        assert_eq!(Param::new("title", "string").to_string(), "title string");
        assert_eq!(Param::untyped("a").to_string(), "a");
    }

    #[test]
    fn test_import_display() {
        assert_eq!(ImportSpec::new("strings").to_string(), r#""strings""#);
        assert_eq!(
            ImportSpec::aliased("pool", "github.com/valyala/bytebufferpool").to_string(),
            r#"pool "github.com/valyala/bytebufferpool""#
        );
    }

    #[test]
    fn test_import_validation() {
        assert!(ImportSpec::new("net/http").validate().is_ok());
        assert!(ImportSpec::aliased("_", "embed").validate().is_ok());
        assert!(ImportSpec::new("").validate().is_err());
        assert!(ImportSpec::new("bad path").validate().is_err());
        assert!(ImportSpec::new("a\"b").validate().is_err());
        assert!(ImportSpec::aliased("1x", "fmt").validate().is_err());
    }

    #[test]
    fn test_meta_builder_and_take() {
        let mut meta = TemplateMeta::default()
            .with_name("Index")
            .with_param(Param::new("title", "string"))
            .with_import(ImportSpec::new("strings"));
        assert!(!meta.is_empty());

        let taken = std::mem::take(&mut meta);
        assert!(meta.is_empty());
        assert_eq!(taken.name.as_deref(), Some("Index"));
    }

    #[test]
    fn test_unit_from_yaml() {
        let yaml = r#"
seed: index
body: "buffer.WriteString(title)"
meta:
  name: Index
  params:
    - name: title
      type: string
  imports:
    - path: strings
    - alias: pool
      path: github.com/valyala/bytebufferpool
"#;
        let unit: CompiledUnit = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(unit.seed, "index");
        assert_eq!(unit.meta.params, vec![Param::new("title", "string")]);
        assert_eq!(unit.meta.imports.len(), 2);
        assert!(unit.legacy.is_none());
        assert!(unit.file_name.is_none());
    }

    #[test]
    fn test_unit_with_legacy_meta() {
        let json = r#"{"seed":"x","body":"","legacy":{"args":"a int"}}"#;
        let unit: CompiledUnit = serde_json::from_str(json).unwrap();
        let legacy = unit.legacy.unwrap();
        assert_eq!(legacy.args, "a int");
        assert!(legacy.name.is_empty());
    }
}
