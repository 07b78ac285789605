//! Go tokens.

/// Reserved words of the Go language.
pub const KEYWORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// Operators and delimiters, longest first so a greedy scan picks the
/// longest match.
pub const OPERATORS: &[&str] = &[
    "<<=", ">>=", "&^=", "...", "&&", "||", "<-", "++", "--", "==", "!=", "<=", ">=", ":=", "+=",
    "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<", ">>", "&^", "+", "-", "*", "/", "%", "&", "|",
    "^", "<", ">", "=", "!", "~", "(", ")", "[", "]", "{", "}", ",", ".", ":",
];

/// Token class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Identifier.
    Ident,
    /// Reserved word.
    Keyword,
    /// Integer literal.
    Int,
    /// Floating-point literal.
    Float,
    /// Imaginary literal.
    Imag,
    /// Rune literal.
    Rune,
    /// Interpreted or raw string literal.
    String,
    /// Line or block comment.
    Comment,
    /// Operator or delimiter.
    Operator,
    /// Explicit `;` or a semicolon inserted at a line end.
    Semicolon,
    /// End of input.
    Eof,
}

/// Printing role of a token, assigned by the declaration grammar check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    /// Spacing follows the neighbouring tokens.
    #[default]
    Plain,
    /// Binary operator.
    Binary {
        /// Whether the operator is surrounded by blanks.
        blank: bool,
    },
    /// Prefix operator, printed tight against its operand.
    Unary,
    /// Colon of a slice expression.
    SliceColon {
        /// Blank before the colon.
        before: bool,
        /// Blank after the colon.
        after: bool,
    },
    /// `<-` of a send-only channel type.
    ChanDir,
    /// Name of a labeled statement.
    Label,
    /// Colon ending a label.
    LabelColon,
}

/// A lexed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token class.
    pub kind: TokenKind,
    /// Source text. Inserted semicolons carry `"\n"`.
    pub text: String,
    /// Byte offset of the token in the source.
    pub offset: usize,
    /// Newlines between the previous token and this one.
    pub newlines_before: usize,
    /// Whitespace between the previous token and this one.
    pub space_before: bool,
    /// Printing role.
    pub role: Role,
}

impl Token {
    /// Creates a token.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>, offset: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            offset,
            newlines_before: 0,
            space_before: false,
            role: Role::Plain,
        }
    }

    /// Whether this is the operator or keyword `text`.
    #[must_use]
    pub fn is(&self, text: &str) -> bool {
        matches!(self.kind, TokenKind::Operator | TokenKind::Keyword) && self.text == text
    }

    /// Whether this semicolon was inserted at a line end.
    #[must_use]
    pub fn is_auto_semicolon(&self) -> bool {
        self.kind == TokenKind::Semicolon && self.text != ";"
    }

    /// Whether the token is skipped by the parser.
    #[must_use]
    pub fn is_comment(&self) -> bool {
        self.kind == TokenKind::Comment
    }

    /// Whether the token opens a delimiter pair.
    #[must_use]
    pub fn is_opener(&self) -> bool {
        self.kind == TokenKind::Operator && matches!(self.text.as_str(), "(" | "[" | "{")
    }

    /// Whether the token closes a delimiter pair.
    #[must_use]
    pub fn is_closer(&self) -> bool {
        self.kind == TokenKind::Operator && matches!(self.text.as_str(), ")" | "]" | "}")
    }

    /// Whether the token is an identifier, a literal or a closing delimiter.
    #[must_use]
    pub fn is_operand_end(&self) -> bool {
        match self.kind {
            TokenKind::Ident
            | TokenKind::Int
            | TokenKind::Float
            | TokenKind::Imag
            | TokenKind::Rune
            | TokenKind::String => true,
            _ => self.is_closer(),
        }
    }

    /// Whether a newline after this token inserts a semicolon.
    #[must_use]
    pub fn ends_statement(&self) -> bool {
        match self.kind {
            TokenKind::Keyword => matches!(
                self.text.as_str(),
                "break" | "continue" | "fallthrough" | "return"
            ),
            TokenKind::Operator => matches!(self.text.as_str(), "++" | "--") || self.is_closer(),
            _ => self.is_operand_end(),
        }
    }

    /// Token description used in parse errors.
    #[must_use]
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Ident => format!("'IDENT' {}", self.text),
            TokenKind::Int => format!("'INT' {}", self.text),
            TokenKind::Float => format!("'FLOAT' {}", self.text),
            TokenKind::Imag => format!("'IMAG' {}", self.text),
            TokenKind::Rune => format!("'CHAR' {}", self.text),
            TokenKind::String => format!("'STRING' {}", self.text),
            TokenKind::Semicolon if self.is_auto_semicolon() => "newline".to_string(),
            TokenKind::Eof => "'EOF'".to_string(),
            _ => format!("'{}'", self.text),
        }
    }
}

/// Closing delimiter matching an opener.
#[must_use]
pub fn closer_for(opener: &str) -> &'static str {
    match opener {
        "(" => ")",
        "[" => "]",
        _ => "}",
    }
}

/// Whether `word` is a Go keyword.
#[must_use]
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_operators_longest_first() {
        for (i, op) in OPERATORS.iter().enumerate() {
            for longer in &OPERATORS[i + 1..] {
                assert!(
                    !(longer.len() > op.len() && longer.starts_with(op)),
                    "{longer} is shadowed by {op}"
                );
            }
        }
    }

    #[test]
    fn test_describe() {
        assert_eq!(Token::new(TokenKind::Ident, "x", 0).describe(), "'IDENT' x");
        assert_eq!(Token::new(TokenKind::Operator, "}", 0).describe(), "'}'");
        assert_eq!(Token::new(TokenKind::Semicolon, "\n", 0).describe(), "newline");
        assert_eq!(Token::new(TokenKind::Semicolon, ";", 0).describe(), "';'");
        assert_eq!(Token::new(TokenKind::Eof, "", 0).describe(), "'EOF'");
    }

    #[test]
    fn test_ends_statement() {
        assert!(Token::new(TokenKind::Ident, "x", 0).ends_statement());
        assert!(Token::new(TokenKind::Keyword, "return", 0).ends_statement());
        assert!(Token::new(TokenKind::Operator, ")", 0).ends_statement());
        assert!(Token::new(TokenKind::Operator, "++", 0).ends_statement());
        assert!(!Token::new(TokenKind::Operator, "{", 0).ends_statement());
        assert!(!Token::new(TokenKind::Keyword, "func", 0).ends_statement());
    }
}
