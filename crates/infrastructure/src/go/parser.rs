//! File-level Go parser.
//!
//! Imports are parsed into specs. Every other top-level declaration is kept
//! as tokens after its grammar has been checked.

use thiserror::Error;
use tracing::debug;

use super::ast::{Decl, DeclKind, File, FileSet, GoAst, ImportDecl, ImportSpec, Position};
use super::lexer::tokenize;
use super::syntax::check_decl;
use super::token::{Token, TokenKind, closer_for};

/// A syntax error with its location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{file}:{position}: {message}")]
pub struct ParseError {
    /// File name.
    pub file: String,
    /// Location of the error.
    pub position: Position,
    /// Error message.
    pub message: String,
}

impl ParseError {
    pub(crate) fn at(fset: &FileSet, offset: usize, message: impl Into<String>) -> Self {
        Self {
            file: fset.name().to_string(),
            position: fset.position(offset),
            message: message.into(),
        }
    }

    /// Whether the source lacks a package clause.
    #[must_use]
    pub fn is_missing_package(&self) -> bool {
        self.message.starts_with("expected 'package'")
    }
}

/// Parses a Go source file, comments included.
///
/// # Errors
///
/// Returns the first lexical or syntax error.
pub fn parse_go_src(file_name: &str, source: &str) -> Result<GoAst, ParseError> {
    let fset = FileSet::new(file_name, source);
    let tokens = tokenize(source).map_err(|e| ParseError::at(&fset, e.offset, e.message))?;

    let file = Parser {
        fset: &fset,
        tokens,
        pos: 0,
    }
    .file()?;
    debug!(
        file = file_name,
        imports = file.imports.len(),
        decls = file.decls.len(),
        "parsed go source"
    );
    Ok(GoAst { fset, file })
}

struct Parser<'a> {
    fset: &'a FileSet,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn error(&self, token: &Token, message: impl Into<String>) -> ParseError {
        ParseError::at(self.fset, token.offset, message)
    }

    fn unexpected(&self, token: &Token, expected: &str) -> ParseError {
        self.error(token, format!("expected {expected}, found {}", token.describe()))
    }

    fn take_comments(&mut self) -> Vec<Token> {
        let mut comments = Vec::new();
        while self.peek().is_comment() {
            comments.push(self.bump());
        }
        comments
    }

    /// Comment on the same line as the previous token.
    fn line_comment(&mut self) -> Option<String> {
        let token = self.peek();
        (token.is_comment() && token.newlines_before == 0).then(|| self.bump().text)
    }

    fn expect_semi(&mut self) -> Result<(), ParseError> {
        self.take_comments();
        let token = self.peek();
        match token.kind {
            TokenKind::Semicolon => {
                self.bump();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ => Err(self.unexpected(token, "';'")),
        }
    }

    fn file(mut self) -> Result<File, ParseError> {
        let mut file = File {
            doc: self.take_comments(),
            ..File::default()
        };

        let token = self.peek();
        if !token.is("package") {
            return Err(self.unexpected(token, "'package'"));
        }
        file.doc_detached = !file.doc.is_empty() && token.newlines_before >= 2;
        self.bump();

        let name = self.bump();
        if name.kind != TokenKind::Ident {
            return Err(self.unexpected(&name, "'IDENT'"));
        }
        if name.text == "_" {
            return Err(self.error(&name, "invalid package name _"));
        }
        file.package = name.text;
        self.expect_semi()?;

        loop {
            let comments = self.take_comments();
            let token = self.peek().clone();
            match token.kind {
                TokenKind::Eof => {
                    file.trailing = comments;
                    break;
                }
                TokenKind::Keyword if token.text == "import" => {
                    if !file.decls.is_empty() {
                        return Err(
                            self.error(&token, "imports must appear before other declarations")
                        );
                    }
                    let decl = self.import_decl(comments)?;
                    file.imports.push(decl);
                }
                TokenKind::Keyword if DeclKind::from_keyword(&token.text).is_some() => {
                    let decl = self.decl(comments)?;
                    file.decls.push(decl);
                }
                _ => return Err(self.unexpected(&token, "declaration")),
            }
            self.expect_semi()?;
        }

        Ok(file)
    }

    fn import_decl(&mut self, doc: Vec<Token>) -> Result<ImportDecl, ParseError> {
        self.bump();
        let mut decl = ImportDecl {
            doc: doc.into_iter().map(|c| c.text).collect(),
            ..ImportDecl::default()
        };

        if !self.peek().is("(") {
            let mut spec = self.import_spec()?;
            spec.comment = self.line_comment();
            decl.specs.push(spec);
            return Ok(decl);
        }

        self.bump();
        decl.grouped = true;
        loop {
            let comments = self.take_comments();
            if self.peek().is(")") {
                decl.trailing = comments.into_iter().map(|c| c.text).collect();
                self.bump();
                break;
            }

            let blank = comments
                .first()
                .unwrap_or_else(|| self.peek())
                .newlines_before
                >= 2;
            let mut spec = self.import_spec()?;
            spec.blank_before = blank && !decl.specs.is_empty();
            spec.doc = comments.into_iter().map(|c| c.text).collect();
            spec.comment = self.line_comment();
            decl.specs.push(spec);

            let token = self.peek();
            if token.kind == TokenKind::Semicolon {
                self.bump();
            } else if !token.is(")") {
                return Err(self.unexpected(token, "')'"));
            }
        }
        Ok(decl)
    }

    fn import_spec(&mut self) -> Result<ImportSpec, ParseError> {
        let token = self.peek();
        let name = if token.kind == TokenKind::Ident || token.is(".") {
            Some(self.bump().text)
        } else {
            None
        };

        let token = self.peek();
        if token.kind != TokenKind::String {
            return Err(self.unexpected(token, "'STRING'"));
        }
        let path = unquote(&token.text);
        if path.is_empty() || path.contains(char::is_whitespace) {
            return Err(self.error(token, format!("invalid import path: {}", token.text)));
        }
        self.bump();
        Ok(ImportSpec::new(name, path))
    }

    fn decl(&mut self, comments: Vec<Token>) -> Result<Decl, ParseError> {
        let keyword = self.peek().clone();
        let kind = DeclKind::from_keyword(&keyword.text)
            .ok_or_else(|| self.unexpected(&keyword, "declaration"))?;

        let mut tokens = comments;
        let mut stack: Vec<Token> = Vec::new();
        loop {
            let token = self.peek().clone();
            match token.kind {
                TokenKind::Eof => {
                    if let Some(open) = stack.last() {
                        let closer = closer_for(&open.text);
                        return Err(self.unexpected(&token, &format!("'{closer}'")));
                    }
                    break;
                }
                TokenKind::Semicolon if stack.is_empty() => break,
                _ => {}
            }

            if token.is_opener() {
                stack.push(token.clone());
            } else if token.is_closer() {
                match stack.pop() {
                    Some(open) if closer_for(&open.text) == token.text => {}
                    Some(open) => {
                        let closer = closer_for(&open.text);
                        return Err(self.unexpected(&token, &format!("'{closer}'")));
                    }
                    None => return Err(self.unexpected(&token, "';'")),
                }
            }
            tokens.push(self.bump());
        }

        check_decl(self.fset, &mut tokens, self.peek())?;
        let names = self.declared_names(kind, &tokens)?;
        Ok(Decl {
            kind,
            names,
            tokens,
        })
    }

    fn declared_names(&self, kind: DeclKind, tokens: &[Token]) -> Result<Vec<String>, ParseError> {
        let sig: Vec<&Token> = tokens.iter().filter(|t| !t.is_comment()).collect();
        let at = |i: usize| sig.get(i).copied().unwrap_or_else(|| self.peek());

        if kind == DeclKind::Func {
            let mut i = 1;
            if at(i).is("(") {
                i = matching(&sig, i) + 1;
            }
            let name = at(i);
            if name.kind != TokenKind::Ident {
                return Err(self.unexpected(name, "'IDENT'"));
            }
            let next = at(i + 1);
            if !(next.is("(") || next.is("[")) {
                return Err(self.unexpected(next, "'('"));
            }
            return Ok(vec![name.text.clone()]);
        }

        let first = at(1);
        if first.kind == TokenKind::Ident {
            return Ok(identifier_list(&sig, 1));
        }
        if !first.is("(") {
            return Err(self.unexpected(first, "'IDENT'"));
        }

        let mut names = Vec::new();
        let mut depth = 0usize;
        let mut entry_start = false;
        for (i, token) in sig.iter().enumerate().skip(1) {
            if token.is_opener() {
                depth += 1;
                entry_start = depth == 1;
                continue;
            }
            if token.is_closer() {
                depth = depth.saturating_sub(1);
            } else if depth == 1 && token.kind == TokenKind::Semicolon {
                entry_start = true;
                continue;
            } else if depth == 1 && entry_start && token.kind == TokenKind::Ident {
                names.extend(identifier_list(&sig, i));
            }
            entry_start = false;
        }
        Ok(names)
    }
}

/// Index of the delimiter closing the opener at `open`.
pub(crate) fn matching(tokens: &[&Token], open: usize) -> usize {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        if token.is_opener() {
            depth += 1;
        } else if token.is_closer() {
            depth -= 1;
            if depth == 0 {
                return i;
            }
        }
    }
    tokens.len()
}

/// Identifiers of an `a, b, c` list starting at `start`.
pub(crate) fn identifier_list(tokens: &[&Token], start: usize) -> Vec<String> {
    let mut names = Vec::new();
    let mut i = start;
    while let Some(token) = tokens.get(i) {
        if token.kind != TokenKind::Ident {
            break;
        }
        names.push(token.text.clone());
        if !tokens.get(i + 1).is_some_and(|t| t.is(",")) {
            break;
        }
        i += 2;
    }
    names
}

fn unquote(literal: &str) -> String {
    literal
        .strip_prefix(['"', '`'])
        .and_then(|s| s.strip_suffix(['"', '`']))
        .unwrap_or(literal)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(src: &str) -> File {
        parse_go_src("test.go", src).unwrap().file
    }

    fn parse_err(src: &str) -> String {
        parse_go_src("test.go", src).unwrap_err().to_string()
    }

    #[test]
    fn test_parse_package_and_imports() {
        let file = parse(
            "// doc\n\npackage main\n\nimport \"fmt\"\n\nimport (\n\t\"bytes\"\n\tpool \"github.com/valyala/bytebufferpool\" // buffers\n\n\t_ \"embed\"\n)\n",
        );
        assert_eq!(file.package, "main");
        assert_eq!(file.doc.len(), 1);
        assert!(file.doc_detached);
        assert_eq!(file.imports.len(), 2);
        assert!(!file.imports[0].grouped);
        assert!(file.imports[1].grouped);

        let specs: Vec<_> = file.import_specs().collect();
        assert_eq!(specs.len(), 4);
        assert_eq!(specs[2].name.as_deref(), Some("pool"));
        assert_eq!(specs[2].comment.as_deref(), Some("// buffers"));
        assert!(specs[3].blank_before);
        assert_eq!(specs[3].local_name(), "_");
    }

    #[test]
    fn test_parse_decls() {
        let file = parse(
            "package p\n\nconst (\n\ta, b = 1, 2\n\tc = 3\n)\n\nvar x int\n\ntype T struct{ n int }\n\nfunc (t *T) Get() int { return t.n }\n\nfunc f[K comparable](k K) {}\n",
        );
        let names: Vec<_> = file.decls.iter().map(|d| d.names.clone()).collect();
        assert_eq!(
            names,
            vec![
                vec!["a".to_string(), "b".to_string(), "c".to_string()],
                vec!["x".to_string()],
                vec!["T".to_string()],
                vec!["Get".to_string()],
                vec!["f".to_string()],
            ]
        );
        assert_eq!(file.decls[3].kind, DeclKind::Func);
    }

    #[test]
    fn test_decl_keeps_comments() {
        let file = parse("package p\n\n// F does it.\nfunc F() {\n\t// inside\n}\n");
        let comments = file.decls[0].tokens.iter().filter(|t| t.is_comment()).count();
        assert_eq!(comments, 2);
    }

    #[test]
    fn test_missing_package() {
        let err = parse_go_src("test.go", "func f() {}").unwrap_err();
        assert!(err.is_missing_package());
        assert_eq!(err.to_string(), "test.go:1:1: expected 'package', found 'func'");
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(
            parse_err("package p\nfunc f() {\n\tx := (1}\n}\n"),
            "test.go:3:9: expected ')', found '}'"
        );
        assert_eq!(
            parse_err("package p\nx := 1\n"),
            "test.go:2:1: expected declaration, found 'IDENT' x"
        );
        assert_eq!(
            parse_err("package p\nvar x int\nimport \"fmt\"\n"),
            "test.go:3:1: imports must appear before other declarations"
        );
        assert_eq!(
            parse_err("package p\nfunc f() {\n"),
            "test.go:3:1: expected '}', found 'EOF'"
        );
        assert_eq!(
            parse_err("package p\nimport fmt\n"),
            "test.go:2:11: expected 'STRING', found newline"
        );
    }

    #[test]
    fn test_lex_error_position() {
        assert_eq!(
            parse_err("package p\n\nvar s = \"abc\n"),
            "test.go:3:13: newline in string"
        );
    }
}
