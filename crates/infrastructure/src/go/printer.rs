//! Canonical Go printer.
//!
//! File structure is printed from the syntax tree. Declarations are printed
//! from their tokens: line breaks follow the source and indentation is
//! rebuilt from delimiter nesting. Operators are spaced by the role the
//! grammar check gave them; other tokens are spaced by their neighbours.

use std::fmt::Write as _;

use jadegen_domain::FormatOptions;

use super::ast::{File, GoAst, ImportDecl, ImportSpec};
use super::token::{Role, Token, TokenKind};

impl GoAst {
    /// Prints the file with default options into `buf` and returns the
    /// buffer contents.
    pub fn bytes<'a>(&self, buf: &'a mut Vec<u8>) -> &'a [u8] {
        self.print(buf, &FormatOptions::default())
    }

    /// Prints the file with `options` into `buf` and returns the buffer
    /// contents.
    pub fn print<'a>(&self, buf: &'a mut Vec<u8>, options: &FormatOptions) -> &'a [u8] {
        buf.extend_from_slice(print_file(&self.file, options).as_bytes());
        buf.as_slice()
    }
}

/// Prints `file` as canonical Go source.
#[must_use]
pub fn print_file(file: &File, options: &FormatOptions) -> String {
    let mut p = Printer {
        out: String::new(),
        indent: options.indent(),
        comments: options.comments,
    };

    if p.comments && !file.doc.is_empty() {
        p.stream(&file.doc, false);
        p.out.push('\n');
        if file.doc_detached {
            p.out.push('\n');
        }
    }
    let _ = writeln!(p.out, "package {}", file.package);

    for decl in &file.imports {
        p.out.push('\n');
        p.import_decl(decl);
    }

    for (i, decl) in file.decls.iter().enumerate() {
        let detached = i == 0 || decl.tokens.first().is_some_and(|t| t.newlines_before >= 2);
        if detached {
            p.out.push('\n');
        }
        p.stream(&decl.tokens, true);
        p.out.push('\n');
    }

    if p.comments && !file.trailing.is_empty() {
        if file.trailing[0].newlines_before >= 2 {
            p.out.push('\n');
        }
        p.stream(&file.trailing, false);
        p.out.push('\n');
    }

    p.out
}

struct Printer {
    out: String,
    indent: String,
    comments: bool,
}

/// An opening delimiter still waiting for its closer.
struct Open {
    bracket: bool,
    line: usize,
    ended: bool,
}

/// The last printed token.
struct Prev<'t> {
    token: &'t Token,
    unary: bool,
}

impl Printer {
    fn import_decl(&mut self, decl: &ImportDecl) {
        if self.comments {
            for comment in &decl.doc {
                let _ = writeln!(self.out, "{comment}");
            }
        }

        if let [spec] = decl.specs.as_slice()
            && !decl.grouped
        {
            let _ = writeln!(self.out, "import {}", self.spec_line(spec));
            return;
        }

        if decl.specs.is_empty() && decl.trailing.is_empty() {
            self.out.push_str("import ()\n");
            return;
        }

        self.out.push_str("import (\n");
        for spec in &decl.specs {
            if spec.blank_before {
                self.out.push('\n');
            }
            if self.comments {
                for comment in &spec.doc {
                    let _ = writeln!(self.out, "{}{comment}", self.indent);
                }
            }
            let _ = writeln!(self.out, "{}{}", self.indent, self.spec_line(spec));
        }
        if self.comments {
            for comment in &decl.trailing {
                let _ = writeln!(self.out, "{}{comment}", self.indent);
            }
        }
        self.out.push_str(")\n");
    }

    fn spec_line(&self, spec: &ImportSpec) -> String {
        let mut line = String::new();
        if let Some(name) = &spec.name {
            line.push_str(name);
            line.push(' ');
        }
        let _ = write!(line, "\"{}\"", spec.path);
        if let Some(comment) = spec.comment.as_ref().filter(|_| self.comments) {
            line.push(' ');
            line.push_str(comment);
        }
        line
    }

    /// Prints `tokens` starting at the current position, which must be the
    /// start of a line. No newline is written after the last token.
    fn stream(&mut self, tokens: &[Token], decl: bool) {
        let mut stack: Vec<Open> = Vec::new();
        let mut prev: Option<Prev<'_>> = None;
        let mut last_code: Option<&Token> = None;
        let mut line = 0usize;
        let mut carry = 0usize;
        let mut significant = 0usize;

        for (i, token) in tokens.iter().enumerate() {
            if token.is_auto_semicolon() {
                continue;
            }
            if token.is_comment() && !self.comments {
                carry = carry.max(token.newlines_before);
                continue;
            }

            let mut newlines = token.newlines_before.max(std::mem::take(&mut carry));
            if prev.as_ref().is_some_and(|p| p.token.role == Role::LabelColon) {
                newlines = newlines.max(1);
            }
            let next_spaced = tokens.get(i + 1).is_none_or(|t| t.space_before);
            let unary = !token.is_comment() && is_unary(last_code, token, next_spaced);

            if let Some(p) = &prev {
                if newlines > 0 {
                    if let Some(top) = stack.last_mut()
                        && top.line == line
                    {
                        top.ended = true;
                    }
                    line += 1;

                    self.out.push('\n');
                    if newlines >= 2 && !p.token.is_opener() && !token.is_closer() {
                        self.out.push('\n');
                    }

                    let mut depth = stack.iter().filter(|o| o.ended).count();
                    if token.is_closer() && stack.last().is_some_and(|o| o.ended) {
                        depth -= 1;
                    }
                    if token.is("case") || token.is("default") || token.role == Role::Label {
                        depth = depth.saturating_sub(1);
                    }
                    self.out.push_str(&self.indent.repeat(depth));
                } else {
                    let in_brackets = stack.last().is_some_and(|o| o.bracket);
                    let method_head = decl && significant == 1 && p.token.is("func");
                    if space_between(p, token, unary, in_brackets, method_head)
                        || may_combine(p.token, token)
                    {
                        self.out.push(' ');
                    }
                }
            }

            self.out.push_str(&token.text);
            if token.is_opener() {
                stack.push(Open {
                    bracket: token.text == "[",
                    line,
                    ended: false,
                });
            } else if token.is_closer() {
                stack.pop();
            }
            if !token.is_comment() {
                significant += 1;
                last_code = Some(token);
            }
            prev = Some(Prev { token, unary });
        }
    }
}

/// Whether an operator is used as a prefix operator.
///
/// Tokens without a role are guessed from their neighbours: after an
/// operand, `a *T` (space before only) and `x[i]*y` (no space after a
/// closing bracket) are read as unary.
fn is_unary(last: Option<&Token>, token: &Token, next_spaced: bool) -> bool {
    match token.role {
        Role::Unary => return true,
        Role::Plain => {}
        _ => return false,
    }
    if token.kind != TokenKind::Operator {
        return false;
    }
    match token.text.as_str() {
        "!" | "~" => true,
        "+" | "-" | "*" | "&" | "^" | "<-" => match last {
            Some(p) if p.is_operand_end() => {
                if p.is("]") {
                    !next_spaced
                } else {
                    token.space_before && !next_spaced
                }
            }
            _ => true,
        },
        _ => false,
    }
}

fn space_between(
    prev: &Prev<'_>,
    token: &Token,
    unary: bool,
    in_brackets: bool,
    method_head: bool,
) -> bool {
    let p = prev.token;
    if token.is_comment() {
        return token.space_before || !p.is_opener();
    }
    if p.is_comment() {
        return token.space_before;
    }
    if p.is_opener() {
        return p.is("{") && token.space_before && !token.is("}");
    }
    match token.role {
        Role::Binary { blank } | Role::SliceColon { before: blank, .. } => return blank,
        Role::ChanDir => return false,
        _ => {}
    }
    match p.role {
        Role::Binary { blank } | Role::SliceColon { after: blank, .. } => return blank,
        Role::ChanDir => return true,
        Role::Unary => return false,
        _ => {}
    }
    if token.is(")") || token.is("]") {
        return false;
    }
    if token.is("}") {
        return token.space_before;
    }
    if token.kind == TokenKind::Semicolon || [",", ":", ".", "++", "--"].iter().any(|op| token.is(op))
    {
        return false;
    }
    if p.is(".") || p.is("...") {
        return false;
    }
    if p.is(",") || p.kind == TokenKind::Semicolon {
        return true;
    }
    if p.is(":") {
        return !in_brackets;
    }
    if token.is("...") {
        return token.space_before;
    }
    if token.is_opener() {
        return space_before_opener(prev, token, method_head);
    }
    if token.kind == TokenKind::Operator {
        return !unary || !(prev.unary || p.is("]"));
    }
    if p.kind == TokenKind::Operator && !p.is_closer() {
        return !prev.unary;
    }
    !p.is("]")
}

/// Whether two adjacent operators would lex as a different one, as `- -x`
/// would as `--x`.
fn may_combine(prev: &Token, next: &Token) -> bool {
    if prev.kind != TokenKind::Operator || next.kind != TokenKind::Operator {
        return false;
    }
    matches!(
        (prev.text.as_str(), next.text.chars().next()),
        ("+", Some('+'))
            | ("-", Some('-'))
            | ("/", Some('*'))
            | ("<", Some('-' | '<'))
            | ("&", Some('&' | '^'))
    )
}

fn space_before_opener(prev: &Prev<'_>, token: &Token, method_head: bool) -> bool {
    let p = prev.token;
    let after_operator = p.kind == TokenKind::Operator && !p.is_closer();
    match token.text.as_str() {
        "(" => match p.kind {
            TokenKind::Keyword => !p.is("func") || method_head,
            _ if p.is(")") => token.space_before,
            _ if after_operator => !prev.unary,
            _ => false,
        },
        "[" => match p.kind {
            TokenKind::Keyword => !p.is("map"),
            TokenKind::Ident => token.space_before,
            _ if p.is(")") => token.space_before,
            _ if after_operator => !prev.unary,
            _ => false,
        },
        _ => match p.kind {
            TokenKind::Keyword if p.is("struct") || p.is("interface") => token.space_before,
            TokenKind::Keyword => true,
            TokenKind::Ident => token.space_before,
            _ if p.is(")") => true,
            _ if after_operator => !prev.unary,
            _ => false,
        },
    }
}
