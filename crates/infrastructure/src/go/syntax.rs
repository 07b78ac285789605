//! Grammar check for top-level declarations.
//!
//! The file parser keeps every declaration as a token stream. [`check_decl`]
//! walks that stream with the statement, type and expression grammar of Go
//! and reports the first syntax error. The walk also gives a [`Role`] to the
//! tokens whose spacing depends on the syntax: binary operators are spaced
//! by precedence and nesting depth the way gofmt spaces them, prefix
//! operators stay tight and labels are outdented.

use super::ast::FileSet;
use super::parser::ParseError;
use super::token::{Role, Token, TokenKind};

const ASSIGN_OPERATORS: &[&str] = &[
    "=", ":=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<=", ">>=", "&^=",
];

const PREFIX_OPERATORS: &[&str] = &["+", "-", "!", "^", "&", "*", "~"];

/// Tokens that may start a simple statement, besides identifiers and
/// literals.
const EXPR_STARTS: &[&str] = &[
    "(", "[", "+", "-", "*", "&", "^", "<-", "!", "func", "map", "chan", "struct", "interface",
];

/// Binary precedence of `token`, zero if it is not a binary operator.
fn precedence(token: &Token) -> u8 {
    if token.kind != TokenKind::Operator {
        return 0;
    }
    match token.text.as_str() {
        "||" => 1,
        "&&" => 2,
        "==" | "!=" | "<" | "<=" | ">" | ">=" => 3,
        "+" | "-" | "|" | "^" => 4,
        "*" | "/" | "%" | "<<" | ">>" | "&" | "&^" => 5,
        _ => 0,
    }
}

/// Shape of a parsed expression. Operators are token indices.
#[derive(Debug)]
enum Expr {
    Binary {
        op: usize,
        prec: u8,
        left: Box<Self>,
        right: Box<Self>,
    },
    Unary {
        op: usize,
        operand: Box<Self>,
    },
    Paren(Box<Self>),
    Call {
        fun: Box<Self>,
        args: Vec<Self>,
    },
    Index {
        base: Box<Self>,
        indices: Vec<Self>,
    },
    Slice {
        base: Box<Self>,
        parts: Vec<Option<Self>>,
        colons: Vec<usize>,
    },
    /// Selector or type assertion.
    Selector(Box<Self>),
    Composite {
        ty: Option<Box<Self>>,
        elements: Vec<Self>,
    },
    KeyValue {
        key: Box<Self>,
        value: Box<Self>,
    },
    Leaf(Operand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand {
    Name,
    Literal,
    /// Array, slice, map or struct type, which may start a composite literal.
    LiteralType,
    Type,
    FuncLit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Basic,
    LabelOk,
    RangeOk,
}

/// What a simple statement turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Simple {
    Expr,
    Assign,
    Range,
    Labeled,
    Other,
}

/// Checks one top-level declaration and records the printing role of its
/// tokens. `end` is the token that follows the declaration.
///
/// # Errors
///
/// Returns the first syntax error.
pub(crate) fn check_decl(
    fset: &FileSet,
    tokens: &mut [Token],
    end: &Token,
) -> Result<(), ParseError> {
    let roles = {
        let mut checker = Checker::new(fset, tokens, end);
        checker.decl()?;
        checker.finish()?
    };
    for (index, role) in roles {
        tokens[index].role = role;
    }
    Ok(())
}

struct Checker<'a> {
    fset: &'a FileSet,
    tokens: &'a [Token],
    /// Indices of the non-comment tokens.
    code: Vec<usize>,
    end: &'a Token,
    pos: usize,
    /// Below zero inside control clauses, where `T {` opens a block.
    expr_lev: i32,
    roles: Vec<(usize, Role)>,
}

impl<'a> Checker<'a> {
    fn new(fset: &'a FileSet, tokens: &'a [Token], end: &'a Token) -> Self {
        let code = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_comment())
            .map(|(i, _)| i)
            .collect();
        Self {
            fset,
            tokens,
            code,
            end,
            pos: 0,
            expr_lev: 0,
            roles: Vec::new(),
        }
    }

    fn finish(self) -> Result<Vec<(usize, Role)>, ParseError> {
        if self.pos < self.code.len() {
            return Err(self.expected("';'"));
        }
        Ok(self.roles)
    }

    fn peek(&self) -> &'a Token {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> &'a Token {
        let tokens = self.tokens;
        self.code.get(self.pos + n).map_or(self.end, |&i| &tokens[i])
    }

    fn bump(&mut self) -> usize {
        let Some(&index) = self.code.get(self.pos) else {
            return self.tokens.len();
        };
        self.pos += 1;
        index
    }

    fn at(&self, text: &str) -> bool {
        self.peek().is(text)
    }

    fn at_semi(&self) -> bool {
        self.peek().kind == TokenKind::Semicolon
    }

    fn at_end(&self) -> bool {
        self.pos >= self.code.len()
    }

    fn eat(&mut self, text: &str) -> bool {
        let found = self.at(text);
        if found {
            self.bump();
        }
        found
    }

    fn text(&self, index: usize) -> &'a str {
        let tokens = self.tokens;
        tokens.get(index).map_or("", |t| t.text.as_str())
    }

    fn mark(&mut self, index: usize, role: Role) {
        if index < self.tokens.len() {
            self.roles.push((index, role));
        }
    }

    fn error(&self, token: &Token, message: impl Into<String>) -> ParseError {
        ParseError::at(self.fset, token.offset, message)
    }

    fn expected(&self, what: &str) -> ParseError {
        let token = self.peek();
        self.error(token, format!("expected {what}, found {}", token.describe()))
    }

    fn expect(&mut self, text: &str) -> Result<usize, ParseError> {
        if self.at(text) {
            Ok(self.bump())
        } else {
            Err(self.expected(&format!("'{text}'")))
        }
    }

    fn expect_closing(&mut self, text: &str, context: &str) -> Result<(), ParseError> {
        if self.at_semi() {
            let token = self.peek();
            return Err(self.error(token, format!("missing ',' before newline in {context}")));
        }
        self.expect(text).map(drop)
    }

    fn ident(&mut self) -> Result<usize, ParseError> {
        if self.peek().kind == TokenKind::Ident {
            Ok(self.bump())
        } else {
            Err(self.expected("'IDENT'"))
        }
    }

    fn ident_list(&mut self) -> Result<(), ParseError> {
        self.ident()?;
        while self.eat(",") {
            self.ident()?;
        }
        Ok(())
    }

    fn expect_semi(&mut self) -> Result<(), ParseError> {
        if self.at(")") || self.at("}") || self.at_end() {
            return Ok(());
        }
        if self.at_semi() {
            self.bump();
            return Ok(());
        }
        Err(self.expected("';'"))
    }

    /// Token after the `]` matching the `[` at lookahead `open`.
    fn after_brackets(&self, open: usize) -> &'a Token {
        let mut depth = 0usize;
        let mut n = open;
        loop {
            let token = self.peek_at(n);
            if token.kind == TokenKind::Eof || self.pos + n >= self.code.len() {
                return token;
            }
            if token.is_opener() {
                depth += 1;
            } else if token.is_closer() {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return self.peek_at(n + 1);
                }
            }
            n += 1;
        }
    }

    // Declarations.

    fn decl(&mut self) -> Result<(), ParseError> {
        if self.at("func") {
            return self.func_decl();
        }
        let spec: fn(&mut Self) -> Result<(), ParseError> = if self.at("type") {
            Self::type_spec
        } else if self.at("var") {
            Self::var_spec
        } else if self.at("const") {
            Self::const_spec
        } else {
            return Err(self.expected("declaration"));
        };
        self.bump();
        if !self.eat("(") {
            return spec(self);
        }
        while !self.at(")") {
            spec(self)?;
            self.expect_semi()?;
        }
        self.bump();
        Ok(())
    }

    fn var_spec(&mut self) -> Result<(), ParseError> {
        self.ident_list()?;
        if !self.at("=") {
            self.ty()?;
        }
        if self.eat("=") {
            let values = self.expr_list()?;
            self.layout_list(&values, 1);
        }
        Ok(())
    }

    fn const_spec(&mut self) -> Result<(), ParseError> {
        self.ident_list()?;
        if !(self.at("=") || self.at_semi() || self.at(")") || self.at_end()) {
            self.ty()?;
        }
        if self.eat("=") {
            let values = self.expr_list()?;
            self.layout_list(&values, 1);
        }
        Ok(())
    }

    fn type_spec(&mut self) -> Result<(), ParseError> {
        self.ident()?;
        if self.at("[") && self.type_params_follow() {
            self.type_params()?;
        }
        self.eat("=");
        self.ty()
    }

    /// Whether `[` after a type name opens type parameters rather than an
    /// array length.
    fn type_params_follow(&self) -> bool {
        let (name, next) = (self.peek_at(1), self.peek_at(2));
        name.kind == TokenKind::Ident
            && (matches!(next.kind, TokenKind::Ident | TokenKind::Keyword)
                || next.is(",")
                || next.is("~")
                || next.is("["))
    }

    fn type_params(&mut self) -> Result<(), ParseError> {
        self.bump();
        while !self.at("]") {
            self.ident_list()?;
            let constraint = self.type_elem()?;
            self.layout(&constraint, 1);
            if !self.eat(",") {
                break;
            }
        }
        self.expect("]").map(drop)
    }

    fn func_decl(&mut self) -> Result<(), ParseError> {
        self.bump();
        if self.at("(") {
            self.params()?;
        }
        self.ident()?;
        if self.at("[") {
            self.type_params()?;
        }
        self.signature()?;
        if self.at("{") {
            self.body()?;
        }
        Ok(())
    }

    fn body(&mut self) -> Result<(), ParseError> {
        let lev = std::mem::replace(&mut self.expr_lev, 0);
        self.block()?;
        self.expr_lev = lev;
        Ok(())
    }

    // Types.

    fn signature(&mut self) -> Result<(), ParseError> {
        self.params()?;
        if self.at("(") {
            self.params()
        } else if self.type_follows() {
            self.ty()
        } else {
            Ok(())
        }
    }

    fn type_follows(&self) -> bool {
        let token = self.peek();
        token.kind == TokenKind::Ident
            || ["*", "[", "<-", "func", "map", "chan", "struct", "interface"]
                .iter()
                .any(|t| token.is(t))
    }

    fn params(&mut self) -> Result<(), ParseError> {
        self.expect("(")?;
        while !self.at(")") {
            if self.peek().kind == TokenKind::Ident && self.name_follows() {
                self.bump();
            }
            self.eat("...");
            self.ty()?;
            if !self.eat(",") {
                break;
            }
        }
        self.expect_closing(")", "parameter list")
    }

    /// Whether the identifier at the cursor names a parameter or field,
    /// that is, whether a type follows it.
    fn name_follows(&self) -> bool {
        let next = self.peek_at(1);
        if next.is("[") {
            if self.peek_at(2).is("]") {
                return true;
            }
            let after = self.after_brackets(1);
            return after.kind == TokenKind::Ident
                || after.is("*")
                || after.is("[")
                || after.is("(")
                || after.kind == TokenKind::Keyword;
        }
        matches!(next.kind, TokenKind::Ident)
            || ["*", "...", "<-", "(", "func", "map", "chan", "struct", "interface"]
                .iter()
                .any(|t| next.is(t))
    }

    fn ty(&mut self) -> Result<(), ParseError> {
        let token = self.peek();
        match token.kind {
            TokenKind::Ident => {
                self.bump();
                if self.eat(".") {
                    self.ident()?;
                }
                if self.at("[") {
                    self.type_args()?;
                }
                Ok(())
            }
            TokenKind::Keyword => match token.text.as_str() {
                "func" => {
                    self.bump();
                    self.signature()
                }
                "map" => {
                    self.bump();
                    self.expect("[")?;
                    self.ty()?;
                    self.expect("]")?;
                    self.ty()
                }
                "chan" => {
                    self.bump();
                    if self.at("<-") {
                        let arrow = self.bump();
                        self.mark(arrow, Role::ChanDir);
                    }
                    self.ty()
                }
                "struct" => self.struct_type(),
                "interface" => self.interface_type(),
                _ => Err(self.expected("type")),
            },
            _ if token.is("*") => {
                let star = self.bump();
                self.mark(star, Role::Unary);
                self.ty()
            }
            _ if token.is("<-") => {
                let arrow = self.bump();
                self.mark(arrow, Role::Unary);
                self.expect("chan")?;
                self.ty()
            }
            _ if token.is("[") => self.array_type(),
            _ if token.is("(") => {
                self.bump();
                self.ty()?;
                self.expect(")").map(drop)
            }
            _ => Err(self.expected("type")),
        }
    }

    fn type_args(&mut self) -> Result<(), ParseError> {
        self.bump();
        loop {
            self.ty()?;
            if !self.eat(",") || self.at("]") {
                break;
            }
        }
        self.expect("]").map(drop)
    }

    fn array_type(&mut self) -> Result<(), ParseError> {
        self.bump();
        if !self.eat("]") {
            if !self.eat("...") {
                self.expr_lev += 1;
                let len = self.expr()?;
                self.expr_lev -= 1;
                self.layout(&len, 1);
            }
            self.expect("]")?;
        }
        self.ty()
    }

    fn struct_type(&mut self) -> Result<(), ParseError> {
        self.bump();
        self.expect("{")?;
        while !self.at("}") {
            self.field_decl()?;
            self.expect_semi()?;
        }
        self.bump();
        Ok(())
    }

    fn field_decl(&mut self) -> Result<(), ParseError> {
        if self.peek().kind == TokenKind::Ident && (self.peek_at(1).is(",") || self.name_follows()) {
            self.ident_list()?;
            self.ty()?;
        } else {
            if self.at("*") {
                let star = self.bump();
                self.mark(star, Role::Unary);
            }
            self.ty()?;
        }
        if self.peek().kind == TokenKind::String {
            self.bump();
        }
        Ok(())
    }

    fn interface_type(&mut self) -> Result<(), ParseError> {
        self.bump();
        self.expect("{")?;
        while !self.at("}") {
            if self.peek().kind == TokenKind::Ident && self.peek_at(1).is("(") {
                self.bump();
                self.signature()?;
            } else {
                let elem = self.type_elem()?;
                self.layout(&elem, 1);
            }
            self.expect_semi()?;
        }
        self.bump();
        Ok(())
    }

    /// A union of type terms, as in `~int | ~string`.
    fn type_elem(&mut self) -> Result<Expr, ParseError> {
        let mut x = self.type_term()?;
        while self.at("|") {
            let op = self.bump();
            let y = self.type_term()?;
            x = Expr::Binary {
                op,
                prec: 4,
                left: Box::new(x),
                right: Box::new(y),
            };
        }
        Ok(x)
    }

    fn type_term(&mut self) -> Result<Expr, ParseError> {
        let tilde = self.at("~").then(|| self.bump());
        self.ty()?;
        let term = Expr::Leaf(Operand::Type);
        Ok(match tilde {
            Some(op) => Expr::Unary {
                op,
                operand: Box::new(term),
            },
            None => term,
        })
    }

    // Statements.

    fn block(&mut self) -> Result<(), ParseError> {
        self.expect("{")?;
        self.stmt_list()?;
        self.expect("}").map(drop)
    }

    fn stmt_list(&mut self) -> Result<(), ParseError> {
        while !(self.at("}") || self.at("case") || self.at("default") || self.at_end()) {
            self.stmt()?;
        }
        Ok(())
    }

    fn stmt(&mut self) -> Result<(), ParseError> {
        let token = self.peek();
        match token.kind {
            TokenKind::Semicolon => {
                self.bump();
                return Ok(());
            }
            TokenKind::Keyword => match token.text.as_str() {
                "const" | "var" | "type" => self.decl()?,
                "go" | "defer" => {
                    self.bump();
                    let call = self.expr()?;
                    if !matches!(call, Expr::Call { .. }) {
                        return Err(self.error(
                            token,
                            format!("expression in {} must be function call", token.text),
                        ));
                    }
                    self.layout(&call, 1);
                }
                "return" => {
                    self.bump();
                    if !(self.at_semi() || self.at("}")) {
                        let results = self.expr_list()?;
                        self.layout_list(&results, 1);
                    }
                }
                "break" | "continue" => {
                    self.bump();
                    if self.peek().kind == TokenKind::Ident {
                        self.bump();
                    }
                }
                "goto" => {
                    self.bump();
                    self.ident()?;
                }
                "fallthrough" => {
                    self.bump();
                }
                "if" => self.if_stmt()?,
                "switch" => self.switch_stmt()?,
                "select" => self.select_stmt()?,
                "for" => self.for_stmt()?,
                _ if is_expr_start(token) => {
                    if self.simple_stmt(Mode::LabelOk)? == Simple::Labeled {
                        return Ok(());
                    }
                }
                _ => return Err(self.expected("statement")),
            },
            _ if token.is("{") => self.block()?,
            _ if is_expr_start(token) => {
                if self.simple_stmt(Mode::LabelOk)? == Simple::Labeled {
                    return Ok(());
                }
            }
            _ => return Err(self.expected("statement")),
        }
        self.expect_semi()
    }

    fn simple_stmt(&mut self, mode: Mode) -> Result<Simple, ParseError> {
        let first = self.peek();
        let start = self.pos;
        if mode == Mode::RangeOk && self.at("range") {
            self.bump();
            let x = self.expr()?;
            self.layout(&x, 1);
            return Ok(Simple::Range);
        }

        let lhs = self.expr_list()?;
        let token = self.peek();
        if token.kind == TokenKind::Operator && ASSIGN_OPERATORS.contains(&token.text.as_str()) {
            self.bump();
            if mode == Mode::RangeOk && self.at("range") && (token.is("=") || token.is(":=")) {
                self.bump();
                let x = self.expr()?;
                self.layout_list(&lhs, 1);
                self.layout(&x, 1);
                return Ok(Simple::Range);
            }
            let rhs = self.expr_list()?;
            let depth = if lhs.len() > 1 && rhs.len() > 1 { 2 } else { 1 };
            self.layout_list(&lhs, depth);
            self.layout_list(&rhs, depth);
            return Ok(Simple::Assign);
        }

        let [x] = lhs.as_slice() else {
            return Err(self.error(first, "expected 1 expression"));
        };
        if token.is(":")
            && mode == Mode::LabelOk
            && self.pos == start + 1
            && matches!(x, Expr::Leaf(Operand::Name))
        {
            let label = self.code[start];
            self.mark(label, Role::Label);
            let colon = self.bump();
            self.mark(colon, Role::LabelColon);
            if !self.at("}") {
                self.stmt()?;
            }
            return Ok(Simple::Labeled);
        }
        if token.is("<-") {
            let arrow = self.bump();
            self.mark(arrow, Role::Binary { blank: true });
            let value = self.expr()?;
            self.layout(x, 1);
            self.layout(&value, 1);
            return Ok(Simple::Other);
        }
        if token.is("++") || token.is("--") {
            self.bump();
            self.layout(x, 2);
            return Ok(Simple::Other);
        }
        self.layout(x, 1);
        Ok(Simple::Expr)
    }

    /// Runs `header` with composite literals of named types disabled.
    fn control_clause(
        &mut self,
        header: fn(&mut Self) -> Result<(), ParseError>,
    ) -> Result<(), ParseError> {
        let lev = std::mem::replace(&mut self.expr_lev, -1);
        let result = header(self);
        self.expr_lev = lev;
        result
    }

    fn if_stmt(&mut self) -> Result<(), ParseError> {
        self.bump();
        self.control_clause(Self::if_header)?;
        self.block()?;
        if self.eat("else") {
            if self.at("if") {
                self.if_stmt()?;
            } else if self.at("{") {
                self.block()?;
            } else {
                return Err(self.expected("if statement or block"));
            }
        }
        Ok(())
    }

    fn if_header(&mut self) -> Result<(), ParseError> {
        if self.at("{") {
            let token = self.peek();
            return Err(self.error(token, "missing condition in if statement"));
        }
        let start = self.peek();
        let mut cond = if self.at_semi() {
            None
        } else {
            Some(self.simple_stmt(Mode::Basic)?)
        };
        if self.at_semi() {
            self.bump();
            if self.at("{") {
                let token = self.peek();
                return Err(self.error(token, "missing condition in if statement"));
            }
            let x = self.expr()?;
            self.layout(&x, 1);
            cond = Some(Simple::Expr);
        }
        if cond != Some(Simple::Expr) {
            return Err(self.error(start, not_an_expression("boolean expression")));
        }
        Ok(())
    }

    fn switch_stmt(&mut self) -> Result<(), ParseError> {
        self.bump();
        if !self.at("{") {
            self.control_clause(Self::switch_header)?;
        }
        self.expect("{")?;
        while self.at("case") || self.at("default") {
            if self.eat("case") {
                let list = self.expr_list()?;
                self.layout_list(&list, 1);
            } else {
                self.bump();
            }
            self.expect(":")?;
            self.stmt_list()?;
        }
        self.expect("}").map(drop)
    }

    fn switch_header(&mut self) -> Result<(), ParseError> {
        if !self.at_semi() {
            self.simple_stmt(Mode::Basic)?;
        }
        if self.at_semi() {
            self.bump();
            if !self.at("{") {
                self.simple_stmt(Mode::Basic)?;
            }
        }
        Ok(())
    }

    fn select_stmt(&mut self) -> Result<(), ParseError> {
        self.bump();
        self.expect("{")?;
        while self.at("case") || self.at("default") {
            if self.eat("case") {
                self.simple_stmt(Mode::Basic)?;
            } else {
                self.bump();
            }
            self.expect(":")?;
            self.stmt_list()?;
        }
        self.expect("}").map(drop)
    }

    fn for_stmt(&mut self) -> Result<(), ParseError> {
        self.bump();
        if !self.at("{") {
            self.control_clause(Self::for_header)?;
        }
        self.block()
    }

    fn for_header(&mut self) -> Result<(), ParseError> {
        let start = self.peek();
        let init = if self.at_semi() {
            None
        } else {
            Some(self.simple_stmt(Mode::RangeOk)?)
        };
        if !self.at_semi() {
            return match init {
                Some(Simple::Expr | Simple::Range) => Ok(()),
                _ => Err(self.error(start, not_an_expression("boolean or range expression"))),
            };
        }
        self.bump();
        if !self.at_semi() {
            let cond = self.expr()?;
            self.layout(&cond, 1);
        }
        if !self.at_semi() {
            return Err(self.expected("';'"));
        }
        self.bump();
        if !self.at("{") {
            self.simple_stmt(Mode::Basic)?;
        }
        Ok(())
    }

    // Expressions.

    fn expr_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut list = vec![self.expr()?];
        while self.eat(",") {
            list.push(self.expr()?);
        }
        Ok(list)
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        self.binary_expr(1)
    }

    fn binary_expr(&mut self, prec1: u8) -> Result<Expr, ParseError> {
        let mut x = self.unary_expr()?;
        loop {
            let prec = precedence(self.peek());
            if prec < prec1 {
                return Ok(x);
            }
            let op = self.bump();
            let y = self.binary_expr(prec + 1)?;
            x = Expr::Binary {
                op,
                prec,
                left: Box::new(x),
                right: Box::new(y),
            };
        }
    }

    fn unary_expr(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek();
        if token.is("<-") {
            let op = self.bump();
            if self.eat("chan") {
                self.ty()?;
                return Ok(Expr::Unary {
                    op,
                    operand: Box::new(Expr::Leaf(Operand::Type)),
                });
            }
            let operand = self.unary_expr()?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }
        if token.kind == TokenKind::Operator && PREFIX_OPERATORS.contains(&token.text.as_str()) {
            let op = self.bump();
            let operand = self.unary_expr()?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }
        self.primary_expr()
    }

    fn primary_expr(&mut self) -> Result<Expr, ParseError> {
        let mut x = self.operand()?;
        loop {
            if self.eat(".") {
                if self.peek().kind == TokenKind::Ident {
                    self.bump();
                } else if self.eat("(") {
                    if !self.eat("type") {
                        self.ty()?;
                    }
                    self.expect(")")?;
                } else {
                    return Err(self.expected("selector or type assertion"));
                }
                x = Expr::Selector(Box::new(x));
            } else if self.at("[") {
                x = self.index_or_slice(x)?;
            } else if self.at("(") {
                x = self.call(x)?;
            } else if self.at("{") && self.is_literal_type(&x) {
                x = self.composite(Some(x))?;
            } else {
                return Ok(x);
            }
        }
    }

    fn is_literal_type(&self, x: &Expr) -> bool {
        match x {
            Expr::Leaf(Operand::LiteralType) => true,
            Expr::Leaf(Operand::Name) | Expr::Index { .. } => self.expr_lev >= 0,
            Expr::Selector(base) => {
                self.expr_lev >= 0 && matches!(**base, Expr::Leaf(Operand::Name))
            }
            _ => false,
        }
    }

    fn operand(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek();
        match token.kind {
            TokenKind::Ident => {
                self.bump();
                Ok(Expr::Leaf(Operand::Name))
            }
            TokenKind::Int
            | TokenKind::Float
            | TokenKind::Imag
            | TokenKind::Rune
            | TokenKind::String => {
                self.bump();
                Ok(Expr::Leaf(Operand::Literal))
            }
            TokenKind::Keyword => match token.text.as_str() {
                "func" => {
                    self.bump();
                    self.signature()?;
                    if !self.at("{") {
                        return Ok(Expr::Leaf(Operand::Type));
                    }
                    self.body()?;
                    Ok(Expr::Leaf(Operand::FuncLit))
                }
                "map" | "struct" => {
                    self.ty()?;
                    Ok(Expr::Leaf(Operand::LiteralType))
                }
                "chan" | "interface" => {
                    self.ty()?;
                    Ok(Expr::Leaf(Operand::Type))
                }
                _ => Err(self.expected("operand")),
            },
            _ if token.is("[") => {
                self.ty()?;
                Ok(Expr::Leaf(Operand::LiteralType))
            }
            _ if token.is("(") => {
                self.bump();
                self.expr_lev += 1;
                let inner = self.expr()?;
                self.expr_lev -= 1;
                self.expect(")")?;
                Ok(Expr::Paren(Box::new(inner)))
            }
            _ => Err(self.expected("operand")),
        }
    }

    fn index_or_slice(&mut self, base: Expr) -> Result<Expr, ParseError> {
        self.bump();
        self.expr_lev += 1;
        let first = if self.at(":") { None } else { Some(self.expr()?) };

        let mut colons = Vec::new();
        let mut parts = vec![first];
        while self.at(":") && colons.len() < 2 {
            colons.push(self.bump());
            parts.push(if self.at(":") || self.at("]") {
                None
            } else {
                Some(self.expr()?)
            });
        }

        let x = if colons.is_empty() {
            let mut indices: Vec<Expr> = parts.into_iter().flatten().collect();
            while self.eat(",") && !self.at("]") {
                indices.push(self.expr()?);
            }
            Expr::Index {
                base: Box::new(base),
                indices,
            }
        } else {
            Expr::Slice {
                base: Box::new(base),
                parts,
                colons,
            }
        };
        self.expr_lev -= 1;
        self.expect("]")?;
        Ok(x)
    }

    fn call(&mut self, fun: Expr) -> Result<Expr, ParseError> {
        self.bump();
        self.expr_lev += 1;
        let mut args = Vec::new();
        while !self.at(")") {
            args.push(self.expr()?);
            self.eat("...");
            if !self.eat(",") {
                break;
            }
        }
        self.expr_lev -= 1;
        self.expect_closing(")", "argument list")?;
        Ok(Expr::Call {
            fun: Box::new(fun),
            args,
        })
    }

    fn composite(&mut self, ty: Option<Expr>) -> Result<Expr, ParseError> {
        self.bump();
        self.expr_lev += 1;
        let mut elements = Vec::new();
        while !self.at("}") {
            elements.push(self.element()?);
            if !self.eat(",") {
                break;
            }
        }
        self.expr_lev -= 1;
        self.expect_closing("}", "composite literal")?;
        Ok(Expr::Composite {
            ty: ty.map(Box::new),
            elements,
        })
    }

    fn element(&mut self) -> Result<Expr, ParseError> {
        let key = self.element_value()?;
        if !self.eat(":") {
            return Ok(key);
        }
        let value = self.element_value()?;
        Ok(Expr::KeyValue {
            key: Box::new(key),
            value: Box::new(value),
        })
    }

    fn element_value(&mut self) -> Result<Expr, ParseError> {
        if self.at("{") {
            self.composite(None)
        } else {
            self.expr()
        }
    }

    // Spacing.

    fn layout_list(&mut self, list: &[Expr], depth: usize) {
        for x in list {
            self.layout(x, depth);
        }
    }

    /// Records operator roles for `x` printed at nesting `depth`.
    fn layout(&mut self, x: &Expr, depth: usize) {
        match x {
            Expr::Binary {
                op,
                prec,
                left,
                right,
            } => {
                let blank = *prec < self.cutoff(x, depth);
                self.mark(*op, Role::Binary { blank });
                self.layout(left, depth + diff_prec(left, *prec));
                self.layout(right, depth + 1);
            }
            Expr::Unary { op, operand } => {
                self.mark(*op, Role::Unary);
                self.layout(operand, depth);
            }
            Expr::Paren(inner) => self.layout(inner, depth.saturating_sub(1).max(1)),
            Expr::Call { fun, args } => {
                let depth = if args.len() > 1 { depth + 1 } else { depth };
                self.layout(fun, depth);
                self.layout_list(args, depth);
            }
            Expr::Index { base, indices } => {
                self.layout(base, 1);
                self.layout_list(indices, depth + 1);
            }
            Expr::Slice {
                base,
                parts,
                colons,
            } => {
                self.layout(base, 1);
                let blanks = depth <= 1
                    && parts.iter().flatten().count() > 1
                    && parts
                        .iter()
                        .flatten()
                        .any(|part| matches!(part, Expr::Binary { .. }));
                for (i, colon) in colons.iter().enumerate() {
                    let before = blanks && parts.get(i).is_some_and(Option::is_some);
                    let after = blanks && parts.get(i + 1).is_some_and(Option::is_some);
                    self.mark(*colon, Role::SliceColon { before, after });
                }
                for part in parts.iter().flatten() {
                    self.layout(part, depth + 1);
                }
            }
            Expr::Selector(base) => self.layout(base, depth),
            Expr::Composite { ty, elements } => {
                if let Some(ty) = ty {
                    self.layout(ty, depth);
                }
                self.layout_list(elements, 1);
            }
            Expr::KeyValue { key, value } => {
                self.layout(key, 1);
                self.layout(value, 1);
            }
            Expr::Leaf(_) => {}
        }
    }

    /// Lowest precedence printed without blanks around the operator.
    fn cutoff(&self, x: &Expr, depth: usize) -> u8 {
        let (has4, has5, problem) = self.walk_binary(x);
        if problem > 0 {
            return problem + 1;
        }
        match (has4 && has5, depth == 1) {
            (true, true) => 5,
            (false, true) => 6,
            _ => 4,
        }
    }

    /// Precedence levels 4 and 5 present in `x`, and the level needed to
    /// keep adjacent operators like `/ *` or `- -` apart.
    fn walk_binary(&self, x: &Expr) -> (bool, bool, u8) {
        let Expr::Binary {
            op,
            prec,
            left,
            right,
        } = x
        else {
            return (false, false, 0);
        };
        let (mut has4, mut has5, mut problem) = (*prec == 4, *prec == 5, 0);

        if let Expr::Binary { prec: inner, .. } = left.as_ref()
            && inner >= prec
        {
            let (h4, h5, p) = self.walk_binary(left);
            has4 |= h4;
            has5 |= h5;
            problem = problem.max(p);
        }

        match right.as_ref() {
            Expr::Binary { prec: inner, .. } if inner > prec => {
                let (h4, h5, p) = self.walk_binary(right);
                has4 |= h4;
                has5 |= h5;
                problem = problem.max(p);
            }
            Expr::Unary { op: unary, .. } => match (self.text(*op), self.text(*unary)) {
                ("/", "*") | ("&", "&" | "^") => problem = 5,
                ("+", "+") | ("-", "-") => problem = problem.max(4),
                _ => {}
            },
            _ => {}
        }
        (has4, has5, problem)
    }
}

fn diff_prec(x: &Expr, prec: u8) -> usize {
    match x {
        Expr::Binary { prec: inner, .. } if *inner == prec => 0,
        _ => 1,
    }
}

fn is_expr_start(token: &Token) -> bool {
    match token.kind {
        TokenKind::Ident
        | TokenKind::Int
        | TokenKind::Float
        | TokenKind::Imag
        | TokenKind::Rune
        | TokenKind::String => true,
        _ => EXPR_STARTS.iter().any(|t| token.is(t)),
    }
}

fn not_an_expression(want: &str) -> String {
    format!("expected {want}, found simple statement (missing parentheses around composite literal?)")
}
