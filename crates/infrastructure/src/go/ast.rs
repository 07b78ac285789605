//! Syntax tree for Go source files.
//!
//! Only the file level is structured: package clause, import declarations
//! and top-level declarations. Declarations keep their tokens, comments
//! included, so the printer can rebuild them line by line. Their grammar is
//! checked by the parser, which also sets the printing role of each token.

use std::fmt;

use super::token::Token;

/// Maps byte offsets of one file to line and column numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSet {
    name: String,
    lines: Vec<usize>,
}

impl FileSet {
    /// Records the line starts of `src`.
    #[must_use]
    pub fn new(name: impl Into<String>, src: &str) -> Self {
        let lines = std::iter::once(0)
            .chain(src.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            name: name.into(),
            lines,
        }
    }

    /// File name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 1-based line and column (in bytes) of `offset`.
    #[must_use]
    pub fn position(&self, offset: usize) -> Position {
        let line = self.lines.partition_point(|&start| start <= offset).max(1);
        Position {
            line,
            column: offset - self.lines[line - 1] + 1,
        }
    }
}

/// A source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// 1-based line.
    pub line: usize,
    /// 1-based byte column.
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A parsed Go file with its position table.
#[derive(Debug, Clone)]
pub struct GoAst {
    /// Position table of the source.
    pub fset: FileSet,
    /// File syntax tree.
    pub file: File,
}

/// File-level syntax.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct File {
    /// Comments before the package clause.
    pub doc: Vec<Token>,
    /// Whether a blank line separates `doc` from the package clause.
    pub doc_detached: bool,
    /// Package name.
    pub package: String,
    /// Import declarations, in source order.
    pub imports: Vec<ImportDecl>,
    /// Top-level declarations, in source order.
    pub decls: Vec<Decl>,
    /// Comments after the last declaration.
    pub trailing: Vec<Token>,
}

impl File {
    /// All import specs of the file.
    pub fn import_specs(&self) -> impl Iterator<Item = &ImportSpec> {
        self.imports.iter().flat_map(|decl| decl.specs.iter())
    }
}

/// An `import` declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportDecl {
    /// Comments before the `import` keyword.
    pub doc: Vec<String>,
    /// Whether the specs are wrapped in parentheses.
    pub grouped: bool,
    /// Imported packages.
    pub specs: Vec<ImportSpec>,
    /// Comments before the closing parenthesis.
    pub trailing: Vec<String>,
}

/// One imported package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSpec {
    /// Explicit name: an identifier, `_` or `.`.
    pub name: Option<String>,
    /// Import path without quotes.
    pub path: String,
    /// Comment lines before the spec.
    pub doc: Vec<String>,
    /// Comment on the same line.
    pub comment: Option<String>,
    /// Whether a blank line separates the spec from the previous one.
    pub blank_before: bool,
}

impl ImportSpec {
    /// Creates a spec importing `path`.
    #[must_use]
    pub fn new(name: Option<String>, path: impl Into<String>) -> Self {
        Self {
            name,
            path: path.into(),
            ..Self::default()
        }
    }

    /// Name the package is referenced by in the file.
    #[must_use]
    pub fn local_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| package_name_from_path(&self.path))
    }

    /// Whether the package lives in the standard library.
    #[must_use]
    pub fn is_std(&self) -> bool {
        let first = self.path.split('/').next().unwrap_or_default();
        !first.contains('.')
    }
}

/// Package name guessed from an import path: the last element, without a
/// `go-` prefix or a `.vN`/`-vN` suffix, skipping a trailing `/vN` element.
#[must_use]
pub fn package_name_from_path(path: &str) -> String {
    let mut segments = path.rsplit('/');
    let mut last = segments.next().unwrap_or(path);
    if is_major_version(last) {
        last = segments.next().unwrap_or(last);
    }

    let last = last.strip_prefix("go-").unwrap_or(last);
    let last = last
        .rsplit_once(['.', '-'])
        .filter(|(_, version)| is_major_version(version))
        .map_or(last, |(name, _)| name);
    last.replace(['-', '.'], "_")
}

fn is_major_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Kind of a top-level declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    /// `const`
    Const,
    /// `var`
    Var,
    /// `type`
    Type,
    /// `func`
    Func,
}

impl DeclKind {
    /// Kind for a declaration keyword.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "const" => Some(Self::Const),
            "var" => Some(Self::Var),
            "type" => Some(Self::Type),
            "func" => Some(Self::Func),
            _ => None,
        }
    }
}

/// A top-level declaration kept as tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decl {
    /// Declaration kind.
    pub kind: DeclKind,
    /// Declared names.
    pub names: Vec<String>,
    /// Tokens from the leading comments to the end of the declaration,
    /// without the terminating semicolon.
    pub tokens: Vec<Token>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_position() {
        let fset = FileSet::new("a.go", "ab\ncd\n\nx");
        assert_eq!(fset.position(0), Position { line: 1, column: 1 });
        assert_eq!(fset.position(4), Position { line: 2, column: 2 });
        assert_eq!(fset.position(7), Position { line: 4, column: 1 });
        assert_eq!(fset.position(7).to_string(), "4:1");
    }

    #[test]
    fn test_package_name_from_path() {
        assert_eq!(package_name_from_path("fmt"), "fmt");
        assert_eq!(package_name_from_path("html/template"), "template");
        assert_eq!(package_name_from_path("github.com/valyala/bytebufferpool"), "bytebufferpool");
        assert_eq!(package_name_from_path("github.com/mattn/go-isatty"), "isatty");
        assert_eq!(package_name_from_path("gopkg.in/yaml.v3"), "yaml");
        assert_eq!(package_name_from_path("github.com/jackc/pgx/v5"), "pgx");
    }

    #[test]
    fn test_import_spec() {
        let spec = ImportSpec::new(Some("pool".into()), "github.com/valyala/bytebufferpool");
        assert_eq!(spec.local_name(), "pool");
        assert!(!spec.is_std());
        assert!(ImportSpec::new(None, "net/http").is_std());
    }
}
