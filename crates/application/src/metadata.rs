//! Template metadata parsing
//!
//! Older template compilers hand over metadata as delimited strings: a comma
//! separated argument list and newline separated import lines. This module
//! converts that form into [`TemplateMeta`] once, at the boundary, so the
//! rest of the generator only sees structured values.

use std::path::Path;
use std::sync::LazyLock;

use jadegen_domain::{DomainError, DomainResult, ImportSpec, Param, RawMeta, TemplateMeta};
use regex::Regex;

#[allow(clippy::expect_used)]
static QUOTED_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:(?P<alias>[\p{L}_][\p{L}\p{N}_]*|\.)\s+)?"(?P<path>[^"\\\s]+)"$"#)
        .expect("valid regex")
});

#[allow(clippy::expect_used)]
static BARE_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^[^"\\\s]+$"#).expect("valid regex"));

/// Converts delimited-string metadata into structured metadata.
///
/// # Errors
///
/// Returns [`DomainError::InvalidIdentifier`] for a function name that is not
/// a Go identifier, [`DomainError::InvalidParameter`] for a parameter entry
/// whose name is not an identifier, and [`DomainError::InvalidImport`] for an
/// import line that is neither a bare path nor a quoted path with optional
/// local name.
///
/// # Examples
///
/// ```
/// use jadegen_application::metadata::parse_legacy_meta;
/// use jadegen_domain::RawMeta;
///
/// let meta = parse_legacy_meta(RawMeta {
///     name: "Index".into(),
///     args: "title string, items []string".into(),
///     import: "strings\nh \"github.com/x/helpers\"".into(),
/// })
/// .unwrap();
/// assert_eq!(meta.params.len(), 2);
/// assert_eq!(meta.imports[1].alias.as_deref(), Some("h"));
/// ```
pub fn parse_legacy_meta(raw: RawMeta) -> DomainResult<TemplateMeta> {
    let name = raw.name.trim();
    let name = if name.is_empty() {
        None
    } else if jadegen_domain::is_go_identifier(name) {
        Some(name.to_string())
    } else {
        return Err(DomainError::InvalidIdentifier(name.to_string()));
    };

    Ok(TemplateMeta {
        name,
        params: parse_args(&raw.args)?,
        imports: parse_import_lines(&raw.import)?,
    })
}

/// Parses a comma separated parameter list.
///
/// Commas nested in brackets, parentheses, braces or string literals do not
/// split entries, so `m map[string]int, f func(a, b int)` yields two
/// parameters.
///
/// # Errors
///
/// Returns [`DomainError::InvalidParameter`] for an entry whose first word
/// is not an identifier.
pub fn parse_args(args: &str) -> DomainResult<Vec<Param>> {
    let mut params = Vec::new();

    for entry in split_top_level(args) {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        let (name, ty) = entry
            .split_once(char::is_whitespace)
            .map_or((entry, ""), |(name, ty)| (name, ty.trim()));

        if !jadegen_domain::is_go_identifier(name) {
            return Err(DomainError::InvalidParameter(entry.to_string()));
        }
        params.push(Param::new(name, ty));
    }

    Ok(params)
}

/// Splits `input` at commas outside brackets and quotes.
pub(crate) fn split_top_level(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, ch) in input.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' && q != '`' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        match ch {
            '"' | '\'' | '`' => quote = Some(ch),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);

    parts
}

/// Parses newline separated import lines.
///
/// Each line is trimmed; blank lines are skipped. A line ending in a quote is
/// a quoted path with an optional local name (`pool "github.com/x/pool"`),
/// any other line is a bare path (`strings`).
///
/// # Errors
///
/// Returns [`DomainError::InvalidImport`] for a line matching neither form.
pub fn parse_import_lines(lines: &str) -> DomainResult<Vec<ImportSpec>> {
    let mut imports = Vec::new();

    for line in lines.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let spec = if line.ends_with('"') {
            let caps = QUOTED_IMPORT
                .captures(line)
                .ok_or_else(|| DomainError::InvalidImport(line.to_string()))?;
            ImportSpec {
                alias: caps.name("alias").map(|m| m.as_str().to_string()),
                path: caps["path"].to_string(),
            }
        } else if BARE_IMPORT.is_match(line) {
            ImportSpec::new(line)
        } else {
            return Err(DomainError::InvalidImport(line.to_string()));
        };

        imports.push(spec);
    }

    Ok(imports)
}

/// Chooses the metadata of a unit: the delimited-string form wins when
/// present. Every import is validated.
///
/// # Errors
///
/// Returns the error of [`parse_legacy_meta`] or of
/// [`ImportSpec::validate`].
pub fn resolve_meta(meta: TemplateMeta, legacy: Option<RawMeta>) -> DomainResult<TemplateMeta> {
    let meta = match legacy {
        Some(raw) => parse_legacy_meta(raw)?,
        None => meta,
    };

    for import in &meta.imports {
        import.validate()?;
    }

    Ok(meta)
}

/// Derives a name seed from a template file name: the file stem with every
/// character outside `[A-Za-z0-9_]` replaced by `_`.
///
/// ```
/// use jadegen_application::metadata::derive_seed;
///
/// assert_eq!(derive_seed("views/user-list.jade"), "user_list");
/// ```
#[must_use]
pub fn derive_seed(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .map_or_else(|| file_name.to_string(), |s| s.to_string_lossy().into_owned());

    let seed: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if seed.is_empty() { "_".to_string() } else { seed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_args_simple() {
        let params = parse_args("title string, items []string").unwrap();
        assert_eq!(
            params,
            vec![Param::new("title", "string"), Param::new("items", "[]string")]
        );
    }

    #[test]
    fn test_parse_args_trims_whitespace() {
        let params = parse_args(" \ta int ,\n b  map[string]int \n").unwrap();
        assert_eq!(
            params,
            vec![Param::new("a", "int"), Param::new("b", "map[string]int")]
        );
    }

    #[test]
    fn test_parse_args_nested_commas() {
        let params = parse_args("f func(a, b int) error, m map[string]struct{ x, y int }").unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].ty, "func(a, b int) error");
        assert_eq!(params[1].ty, "map[string]struct{ x, y int }");
    }

    #[test]
    fn test_parse_args_grouped() {
        let params = parse_args("a, b int").unwrap();
        assert_eq!(params, vec![Param::untyped("a"), Param::new("b", "int")]);
    }

    #[test]
    fn test_parse_args_variadic_and_trailing_comma() {
        let params = parse_args("args ...string,").unwrap();
        assert_eq!(params, vec![Param::new("args", "...string")]);
    }

    #[test]
    fn test_parse_args_invalid_name() {
        let err = parse_args("1a int").unwrap_err();
        assert_eq!(err, DomainError::InvalidParameter("1a int".to_string()));
    }

    #[test]
    fn test_parse_args_empty() {
        assert!(parse_args("").unwrap().is_empty());
        assert!(parse_args(" , ").unwrap().is_empty());
    }

    #[test]
    fn test_import_lines_quoted_and_bare() {
        let imports =
            parse_import_lines("strings\n\"net/http\"\npool \"github.com/valyala/bytebufferpool\"\n")
                .unwrap();
        assert_eq!(
            imports,
            vec![
                ImportSpec::new("strings"),
                ImportSpec::new("net/http"),
                ImportSpec::aliased("pool", "github.com/valyala/bytebufferpool"),
            ]
        );
    }

    #[test]
    fn test_import_lines_trailing_whitespace_after_quote() {
        let imports = parse_import_lines("\t\"fmt\"  \n").unwrap();
        assert_eq!(imports, vec![ImportSpec::new("fmt")]);
    }

    #[test]
    fn test_import_lines_blank_lines_skipped() {
        let imports = parse_import_lines("\n\n  \nfmt\n\n").unwrap();
        assert_eq!(imports, vec![ImportSpec::new("fmt")]);
    }

    #[test]
    fn test_import_lines_dot_import() {
        let imports = parse_import_lines(". \"math\"").unwrap();
        assert_eq!(imports, vec![ImportSpec::aliased(".", "math")]);
    }

    #[test]
    fn test_import_lines_invalid() {
        assert!(parse_import_lines("pool github.com/x").is_err());
        assert!(parse_import_lines("\"unterminated").is_err());
        assert!(parse_import_lines("a b \"c\"").is_err());
    }

    #[test]
    fn test_parse_legacy_meta() {
        let meta = parse_legacy_meta(RawMeta {
            name: " Index ".to_string(),
            args: "title string".to_string(),
            import: "strings".to_string(),
        })
        .unwrap();
        assert_eq!(meta.name.as_deref(), Some("Index"));
        assert_eq!(meta.params, vec![Param::new("title", "string")]);
        assert_eq!(meta.imports, vec![ImportSpec::new("strings")]);
    }

    #[test]
    fn test_parse_legacy_meta_empty() {
        let meta = parse_legacy_meta(RawMeta::default()).unwrap();
        assert!(meta.is_empty());
    }

    #[test]
    fn test_parse_legacy_meta_bad_name() {
        let err = parse_legacy_meta(RawMeta {
            name: "not a name".to_string(),
            ..RawMeta::default()
        })
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidIdentifier(_)));
    }

    #[test]
    fn test_resolve_meta_prefers_legacy() {
        let structured = TemplateMeta::default().with_name("Structured");
        let legacy = RawMeta {
            name: "Legacy".to_string(),
            ..RawMeta::default()
        };
        let meta = resolve_meta(structured.clone(), Some(legacy)).unwrap();
        assert_eq!(meta.name.as_deref(), Some("Legacy"));

        let meta = resolve_meta(structured, None).unwrap();
        assert_eq!(meta.name.as_deref(), Some("Structured"));
    }

    #[test]
    fn test_resolve_meta_validates_imports() {
        let meta = TemplateMeta::default().with_import(ImportSpec::new("has space"));
        assert!(resolve_meta(meta, None).is_err());
    }

    #[test]
    fn test_derive_seed() {
        assert_eq!(derive_seed("index.jade"), "index");
        assert_eq!(derive_seed("views/user-list.jade"), "user_list");
        assert_eq!(derive_seed("a.b.jade"), "a_b");
        assert_eq!(derive_seed(""), "_");
    }
}
