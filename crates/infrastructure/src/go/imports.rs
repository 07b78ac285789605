//! Import resolution for generated Go files.
//!
//! Unused imports are removed and packages referenced through a selector
//! such as `strings.ToUpper` are imported when their name is known. The
//! result is grouped (standard library first) and printed canonically.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use jadegen_domain::FormatOptions;
use thiserror::Error;
use tracing::{debug, warn};

use super::ast::{Decl, File, ImportDecl, ImportSpec, package_name_from_path};
use super::packages::known_packages;
use super::parser::{ParseError, matching, parse_go_src};
use super::printer::print_file;
use super::token::{Token, TokenKind};

/// Package clause added in front of fragments.
const FRAGMENT_PACKAGE: &str = "package main;";

/// Error type for import resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportsError {
    /// The source is not UTF-8.
    #[error("{0}: source is not valid UTF-8")]
    Encoding(String),

    /// The source does not parse.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Resolves package names to import paths and fixes import declarations.
#[derive(Debug, Clone)]
pub struct ImportResolver {
    known: BTreeMap<String, String>,
}

impl Default for ImportResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportResolver {
    /// Creates a resolver knowing the standard table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            known: known_packages(),
        }
    }

    /// Adds or overrides known packages.
    #[must_use]
    pub fn with_packages<I, K, V>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.known
            .extend(packages.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Import path of the package referenced as `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.known.get(name).map(String::as_str)
    }

    /// Fixes the imports of `src` and prints it.
    ///
    /// With `options.fragment` a source without a package clause is parsed
    /// as part of `package main` and printed without it.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is not UTF-8 or does not parse.
    pub fn process(
        &self,
        path: &str,
        src: &[u8],
        options: &FormatOptions,
    ) -> Result<Vec<u8>, ImportsError> {
        let source =
            std::str::from_utf8(src).map_err(|_| ImportsError::Encoding(path.to_string()))?;

        let (mut ast, fragment) = match parse_go_src(path, source) {
            Ok(ast) => (ast, false),
            Err(e) if options.fragment && e.is_missing_package() => {
                let wrapped = format!("{FRAGMENT_PACKAGE}{source}");
                (parse_go_src(path, &wrapped)?, true)
            }
            Err(e) => return Err(e.into()),
        };

        self.fix_imports(path, &mut ast.file);
        let printed = print_file(&ast.file, options);
        let printed = if fragment {
            printed
                .strip_prefix("package main\n")
                .unwrap_or(&printed)
                .trim_start_matches('\n')
                .to_string()
        } else {
            printed
        };
        Ok(printed.into_bytes())
    }

    /// Removes unused imports, adds missing known ones and merges all import
    /// declarations into one sorted declaration.
    pub fn fix_imports(&self, path: &str, file: &mut File) {
        let refs = references(file);
        let grouped = file.imports.iter().any(|decl| decl.grouped);
        let mut doc = Vec::new();
        let mut trailing = Vec::new();
        let mut specs: Vec<ImportSpec> = Vec::new();

        for decl in std::mem::take(&mut file.imports) {
            doc.extend(decl.doc);
            trailing.extend(decl.trailing);
            for spec in decl.specs {
                let name = spec.local_name();
                let used = matches!(name.as_str(), "_" | "." | "C") || refs.contains(&name);
                if !used {
                    warn!(file = path, import = %spec.path, "removing unused import");
                } else if !specs.iter().any(|s| s.path == spec.path && s.name == spec.name) {
                    specs.push(spec);
                }
            }
        }

        let present: HashSet<String> = specs.iter().map(ImportSpec::local_name).collect();
        for name in refs.iter().filter(|name| !present.contains(*name)) {
            let Some(import_path) = self.lookup(name) else {
                debug!(file = path, package = %name, "unresolved package reference");
                continue;
            };
            let alias = (package_name_from_path(import_path) != *name).then(|| name.clone());
            debug!(file = path, import = import_path, "adding import");
            specs.push(ImportSpec::new(alias, import_path));
        }

        if specs.is_empty() {
            return;
        }

        specs.sort_by(|a, b| b.is_std().cmp(&a.is_std()).then_with(|| a.path.cmp(&b.path)));
        let mut prev_std = None;
        for spec in &mut specs {
            let std = spec.is_std();
            spec.blank_before = prev_std == Some(true) && !std;
            prev_std = Some(std);
        }

        file.imports = vec![ImportDecl {
            doc,
            grouped: grouped || specs.len() > 1,
            specs,
            trailing,
        }];
    }
}

/// Fixes the imports of `src` with the default package table.
///
/// # Errors
///
/// Returns an error if the source is not UTF-8 or does not parse.
pub fn go_imports(path: &str, src: &[u8], options: &FormatOptions) -> Result<Vec<u8>, ImportsError> {
    ImportResolver::new().process(path, src, options)
}

/// Names used as selector receivers (`name.X`) that are not declared in the
/// file.
fn references(file: &File) -> BTreeSet<String> {
    let globals: HashSet<&str> = file
        .decls
        .iter()
        .flat_map(|decl| decl.names.iter().map(String::as_str))
        .collect();

    let mut refs = BTreeSet::new();
    for decl in &file.decls {
        let code = code_tokens(decl);
        let locals = local_names(&code);
        for (i, token) in code.iter().enumerate() {
            let selector = token.kind == TokenKind::Ident
                && code.get(i + 1).is_some_and(|t| t.is("."))
                && code.get(i + 2).is_some_and(|t| t.kind == TokenKind::Ident)
                && !(i > 0 && code[i - 1].is("."));
            if selector
                && !globals.contains(token.text.as_str())
                && !locals.contains(token.text.as_str())
            {
                refs.insert(token.text.clone());
            }
        }
    }
    refs
}

fn code_tokens(decl: &Decl) -> Vec<&Token> {
    decl.tokens.iter().filter(|t| !t.is_comment()).collect()
}

/// Names declared inside one declaration: parameters, results, receivers,
/// type parameters, `:=` targets and local `var`/`const`/`type` names.
fn local_names<'t>(code: &[&'t Token]) -> HashSet<&'t str> {
    let mut names = HashSet::new();
    for (i, token) in code.iter().enumerate() {
        if token.is("func") {
            signature_names(code, i, &mut names);
        } else if token.is(":=") {
            let mut j = i;
            while j > 0 && code[j - 1].kind == TokenKind::Ident {
                names.insert(code[j - 1].text.as_str());
                if j >= 2 && code[j - 2].is(",") {
                    j -= 2;
                } else {
                    break;
                }
            }
        } else if token.is("var") || token.is("const") || token.is("type") {
            spec_names(code, i + 1, &mut names);
        }
    }
    names
}

fn signature_names<'t>(code: &[&'t Token], func: usize, names: &mut HashSet<&'t str>) {
    let is = |i: usize, text: &str| code.get(i).is_some_and(|t| t.is(text));

    let mut i = func + 1;
    if is(i, "(") {
        group_entry_names(code, i, names);
        i = matching(code, i) + 1;
    }
    if code.get(i).is_some_and(|t| t.kind == TokenKind::Ident) {
        i += 1;
    }
    for open in ["[", "(", "("] {
        if is(i, open) {
            group_entry_names(code, i, names);
            i = matching(code, i) + 1;
        }
    }
}

/// Marks identifiers starting an entry of the group opened at `open`, unless
/// they are a package qualifier.
fn group_entry_names<'t>(code: &[&'t Token], open: usize, names: &mut HashSet<&'t str>) {
    let close = matching(code, open);
    let mut depth = 0usize;
    let mut entry_start = false;
    for i in open..close.min(code.len()) {
        let token = code[i];
        if token.is_opener() {
            depth += 1;
            entry_start = depth == 1;
            continue;
        }
        if token.is_closer() {
            depth = depth.saturating_sub(1);
        } else if depth == 1 && token.is(",") {
            entry_start = true;
            continue;
        } else if depth == 1
            && entry_start
            && token.kind == TokenKind::Ident
            && !code.get(i + 1).is_some_and(|t| t.is("."))
        {
            names.insert(token.text.as_str());
        }
        entry_start = false;
    }
}

fn spec_names<'t>(code: &[&'t Token], start: usize, names: &mut HashSet<&'t str>) {
    let Some(first) = code.get(start) else {
        return;
    };
    if first.kind == TokenKind::Ident {
        collect(code, start, names);
        return;
    }
    if !first.is("(") {
        return;
    }

    let close = matching(code, start);
    let mut entry_start = true;
    let mut depth = 0usize;
    for i in start + 1..close.min(code.len()) {
        let token = code[i];
        if token.is_opener() {
            depth += 1;
        } else if token.is_closer() {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && token.kind == TokenKind::Semicolon {
            entry_start = true;
            continue;
        } else if depth == 0 && entry_start && token.kind == TokenKind::Ident {
            collect(code, i, names);
        }
        entry_start = false;
    }
}

/// Marks the identifiers of an `a, b, c` list starting at `start`.
fn collect<'t>(code: &[&'t Token], start: usize, names: &mut HashSet<&'t str>) {
    let mut i = start;
    while let Some(&token) = code.get(i) {
        if token.kind != TokenKind::Ident {
            break;
        }
        names.insert(token.text.as_str());
        if !code.get(i + 1).is_some_and(|t| t.is(",")) {
            break;
        }
        i += 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn imports(src: &str) -> String {
        String::from_utf8(go_imports("test.go", src.as_bytes(), &FormatOptions::default()).unwrap())
            .unwrap()
    }

    #[test]
    fn test_removes_unused_and_adds_missing() {
        let src = "package p\n\nimport (\n\t\"fmt\"\n\t\"html\"\n)\n\nfunc f(s string) string {\n\tfmt.Println(s)\n\treturn strings.ToUpper(s)\n}\n";
        assert_eq!(
            imports(src),
            "package p\n\nimport (\n\t\"fmt\"\n\t\"strings\"\n)\n\nfunc f(s string) string {\n\tfmt.Println(s)\n\treturn strings.ToUpper(s)\n}\n"
        );
    }

    #[test]
    fn test_groups_std_and_third_party() {
        let src = "package p\n\nimport \"github.com/Joker/hpp\"\n\nfunc f(buffer *pool.ByteBuffer) {\n\tb := hpp.Print(bytes.NewReader(buffer.Bytes()))\n\tbuffer.Write(b)\n}\n";
        assert_eq!(
            imports(src),
            "package p\n\nimport (\n\t\"bytes\"\n\n\t\"github.com/Joker/hpp\"\n\tpool \"github.com/valyala/bytebufferpool\"\n)\n\nfunc f(buffer *pool.ByteBuffer) {\n\tb := hpp.Print(bytes.NewReader(buffer.Bytes()))\n\tbuffer.Write(b)\n}\n"
        );
    }

    #[test]
    fn test_single_import_form_is_kept() {
        let src = "package p\n\nimport \"os\"\n\nvar args = os.Args\n";
        assert_eq!(imports(src), src);
    }

    #[test]
    fn test_all_imports_removed() {
        let src = "package p\n\nimport (\n\t\"fmt\"\n)\n\nfunc f() {}\n";
        assert_eq!(imports(src), "package p\n\nfunc f() {}\n");
    }

    #[test]
    fn test_local_names_shadow_packages() {
        let src = "package p\n\ntype strings struct{ n int }\n\nfunc f(bytes *T, s strings) int {\n\thtml := s\n\treturn bytes.n + html.n + s.n\n}\n";
        assert_eq!(imports(src), src);
    }

    #[test]
    fn test_blank_and_dot_imports_are_kept() {
        let src = "package p\n\nimport (\n\t_ \"embed\"\n\t. \"fmt\"\n)\n";
        assert_eq!(imports(src), src);
    }

    #[test]
    fn test_extra_packages() {
        let resolver = ImportResolver::new().with_packages([("yaml", "gopkg.in/yaml.v3")]);
        assert_eq!(resolver.lookup("yaml"), Some("gopkg.in/yaml.v3"));
        let out = resolver
            .process(
                "test.go",
                b"package p\n\nvar m = yaml.Marshal\n",
                &FormatOptions::default(),
            )
            .unwrap();
        assert!(String::from_utf8(out).unwrap().contains("import \"gopkg.in/yaml.v3\"\n"));
    }

    #[test]
    fn test_fragment() {
        let out = imports("func f() {\n\tfmt.Println()\n}\n");
        assert_eq!(out, "import \"fmt\"\n\nfunc f() {\n\tfmt.Println()\n}\n");

        let options = FormatOptions {
            fragment: false,
            ..FormatOptions::default()
        };
        let err = go_imports("test.go", b"func f() {}", &options).unwrap_err();
        assert!(matches!(err, ImportsError::Parse(ref e) if e.is_missing_package()));
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            go_imports("test.go", &[0xff], &FormatOptions::default()).unwrap_err(),
            ImportsError::Encoding("test.go".to_string())
        );
        let err = go_imports("test.go", b"package p\nfunc f() {", &FormatOptions::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "test.go:2:11: expected '}', found 'EOF'");
    }
}
