//! Go source formatter adapter

use std::collections::BTreeMap;

use jadegen_application::ports::{FormatError, SourceFormatter};
use jadegen_domain::FormatOptions;

use crate::go::{ImportResolver, ImportsError, parse_go_src};

/// Formatter backed by the built-in Go parser, printer and import resolver.
#[derive(Debug, Clone, Default)]
pub struct GoFormatter {
    resolver: ImportResolver,
}

impl GoFormatter {
    /// Creates a formatter knowing the default package table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a formatter that also resolves `packages` (name to path).
    #[must_use]
    pub fn with_packages(packages: &BTreeMap<String, String>) -> Self {
        Self {
            resolver: ImportResolver::new().with_packages(packages.clone()),
        }
    }

    /// The underlying import resolver.
    #[must_use]
    pub const fn resolver(&self) -> &ImportResolver {
        &self.resolver
    }
}

impl SourceFormatter for GoFormatter {
    fn check(&self, file_name: &str, source: &str) -> Result<(), FormatError> {
        parse_go_src(file_name, source)
            .map(|_| ())
            .map_err(|e| FormatError::Syntax(e.to_string()))
    }

    fn format(
        &self,
        file_name: &str,
        source: &[u8],
        options: &FormatOptions,
    ) -> Result<Vec<u8>, FormatError> {
        self.resolver
            .process(file_name, source, options)
            .map_err(|e| match e {
                ImportsError::Parse(e) => FormatError::Syntax(e.to_string()),
                other => FormatError::Imports(other.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_check() {
        let formatter = GoFormatter::new();
        assert!(formatter.check("a.go", "package a\n\nfunc f() {}\n").is_ok());

        let err = formatter.check("a.go", "package a\n\nfunc f() {\n").unwrap_err();
        assert_eq!(
            err,
            FormatError::Syntax("a.go:4:1: expected '}', found 'EOF'".to_string())
        );
    }

    #[test]
    fn test_format_resolves_imports() {
        let formatter = GoFormatter::new();
        let src = b"package a\n\nimport \"os\"\n\nfunc f() string {\n\treturn strings.TrimSpace(\" x \")\n}\n";
        let out = formatter
            .format("a.go", src, &FormatOptions::default())
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "package a\n\nimport \"strings\"\n\nfunc f() string {\n\treturn strings.TrimSpace(\" x \")\n}\n"
        );
    }

    #[test]
    fn test_format_with_extra_packages() {
        let packages = BTreeMap::from([("yaml".to_string(), "gopkg.in/yaml.v3".to_string())]);
        let formatter = GoFormatter::with_packages(&packages);
        assert_eq!(formatter.resolver().lookup("yaml"), Some("gopkg.in/yaml.v3"));
        assert_eq!(formatter.resolver().lookup("fmt"), Some("fmt"));
    }

    #[test]
    fn test_format_errors() {
        let formatter = GoFormatter::new();
        let err = formatter
            .format("a.go", b"package a\nfunc f() {", &FormatOptions::default())
            .unwrap_err();
        assert!(matches!(err, FormatError::Syntax(_)));

        let err = formatter
            .format("a.go", &[0xff, 0xfe], &FormatOptions::default())
            .unwrap_err();
        assert!(matches!(err, FormatError::Imports(_)));
    }
}
