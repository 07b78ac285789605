//! Go lexer with automatic semicolon insertion.

use super::token::{OPERATORS, Token, TokenKind, is_keyword};

const BOM: char = '\u{feff}';

/// A lexical error at a byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    /// Byte offset of the offending input.
    pub offset: usize,
    /// Error message.
    pub message: String,
}

impl LexError {
    fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

/// Splits Go source into tokens.
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    tokens: Vec<Token>,
    newlines: usize,
    space: bool,
    insert_semi: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer over `src`.
    #[must_use]
    pub const fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            tokens: Vec::new(),
            newlines: 0,
            space: false,
            insert_semi: false,
        }
    }

    /// Lexes the whole input. The last token is always [`TokenKind::Eof`].
    /// A byte order mark at the very start is skipped.
    ///
    /// # Errors
    ///
    /// Returns the first lexical error.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        if self.src.starts_with(BOM) {
            self.pos = BOM.len_utf8();
        }
        while let Some(c) = self.peek() {
            match c {
                '\n' => {
                    if self.insert_semi {
                        self.push_semicolon(self.pos);
                    }
                    self.newlines += 1;
                    self.space = true;
                    self.pos += 1;
                }
                ' ' | '\t' | '\r' => {
                    self.space = true;
                    self.pos += 1;
                }
                '/' if self.rest().starts_with("//") => self.line_comment(),
                '/' if self.rest().starts_with("/*") => self.block_comment()?,
                '"' => self.interpreted_string()?,
                '`' => self.raw_string()?,
                '\'' => self.rune()?,
                c if c.is_ascii_digit() => self.number(),
                '.' if self.rest()[1..].starts_with(|c: char| c.is_ascii_digit()) => {
                    self.number();
                }
                c if c == '_' || c.is_alphabetic() => self.word(),
                _ => self.operator(c)?,
            }
        }

        if self.insert_semi {
            self.push_semicolon(self.pos);
        }
        let eof = self.src.len();
        self.push(TokenKind::Eof, eof, eof);
        Ok(self.tokens)
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn push(&mut self, kind: TokenKind, start: usize, end: usize) {
        let mut token = Token::new(kind, &self.src[start..end], start);
        token.newlines_before = std::mem::take(&mut self.newlines);
        token.space_before = std::mem::take(&mut self.space);
        if kind != TokenKind::Comment {
            self.insert_semi = token.ends_statement();
        }
        self.tokens.push(token);
    }

    fn push_semicolon(&mut self, offset: usize) {
        self.tokens.push(Token::new(TokenKind::Semicolon, "\n", offset));
        self.insert_semi = false;
    }

    fn line_comment(&mut self) {
        let start = self.pos;
        let len = self.rest().find('\n').unwrap_or(self.rest().len());
        let end = start + self.src[start..start + len].trim_end().len();
        self.pos = start + len;
        self.push(TokenKind::Comment, start, end);
    }

    fn block_comment(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        let Some(close) = self.rest()[2..].find("*/") else {
            return Err(LexError::new(start, "comment not terminated"));
        };
        let end = start + 2 + close + 2;
        self.pos = end;
        let multiline = self.src[start..end].contains('\n');
        self.push(TokenKind::Comment, start, end);
        if multiline && self.insert_semi {
            self.push_semicolon(end);
        }
        Ok(())
    }

    fn interpreted_string(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        let mut chars = self.rest().char_indices().skip(1);
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => {
                    chars.next();
                }
                '\n' => return Err(LexError::new(start + i, "newline in string")),
                '"' => {
                    self.pos = start + i + 1;
                    self.push(TokenKind::String, start, self.pos);
                    return Ok(());
                }
                _ => {}
            }
        }
        Err(LexError::new(start, "string literal not terminated"))
    }

    fn raw_string(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        let Some(close) = self.rest()[1..].find('`') else {
            return Err(LexError::new(start, "raw string literal not terminated"));
        };
        self.pos = start + 1 + close + 1;
        self.push(TokenKind::String, start, self.pos);
        Ok(())
    }

    fn rune(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        let mut chars = self.rest().char_indices().skip(1);
        let mut count = 0usize;
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => {
                    let digits = match chars.next().map(|(_, e)| e) {
                        Some('x') => 2,
                        Some('u') => 4,
                        Some('U') => 8,
                        Some('0'..='7') => 2,
                        _ => 0,
                    };
                    for _ in 0..digits {
                        chars.next();
                    }
                    count += 1;
                }
                '\n' => break,
                '\'' => {
                    match count {
                        0 => {
                            return Err(LexError::new(
                                start,
                                "empty rune literal or unescaped ' in rune literal",
                            ));
                        }
                        1 => {}
                        _ => {
                            return Err(LexError::new(
                                start,
                                "more than one character in rune literal",
                            ));
                        }
                    }
                    self.pos = start + i + 1;
                    self.push(TokenKind::Rune, start, self.pos);
                    return Ok(());
                }
                _ => count += 1,
            }
        }
        Err(LexError::new(start, "rune literal not terminated"))
    }

    fn number(&mut self) {
        let start = self.pos;
        let bytes = self.src.as_bytes();
        let hex = self.rest().starts_with("0x") || self.rest().starts_with("0X");
        let mut end = start;
        while end < bytes.len() {
            let b = bytes[end];
            let exponent = if hex {
                matches!(b, b'p' | b'P')
            } else {
                matches!(b, b'e' | b'E')
            };
            if exponent && matches!(bytes.get(end + 1), Some(b'+' | b'-')) {
                end += 2;
            } else if b.is_ascii_alphanumeric() || b == b'_' || b == b'.' {
                end += 1;
            } else {
                break;
            }
        }

        let text = &self.src[start..end];
        let kind = if text.ends_with('i') {
            TokenKind::Imag
        } else if hex {
            if text.contains(['.', 'p', 'P']) {
                TokenKind::Float
            } else {
                TokenKind::Int
            }
        } else if text.contains(['.', 'e', 'E']) {
            TokenKind::Float
        } else {
            TokenKind::Int
        };
        self.pos = end;
        self.push(kind, start, end);
    }

    fn word(&mut self) {
        let start = self.pos;
        let len = self
            .rest()
            .find(|c: char| !(c == '_' || c.is_alphanumeric()))
            .unwrap_or(self.rest().len());
        self.pos = start + len;
        let kind = if is_keyword(&self.src[start..self.pos]) {
            TokenKind::Keyword
        } else {
            TokenKind::Ident
        };
        self.push(kind, start, self.pos);
    }

    fn operator(&mut self, c: char) -> Result<(), LexError> {
        let start = self.pos;
        if c == ';' {
            self.pos += 1;
            self.push(TokenKind::Semicolon, start, self.pos);
            return Ok(());
        }
        let Some(op) = OPERATORS.iter().find(|op| self.rest().starts_with(**op)) else {
            return Err(LexError::new(
                start,
                format!("invalid character U+{:04X} '{c}'", u32::from(c)),
            ));
        };
        self.pos += op.len();
        self.push(TokenKind::Operator, start, self.pos);
        Ok(())
    }
}

/// Lexes `src` into tokens.
///
/// # Errors
///
/// Returns the first lexical error.
pub fn tokenize(src: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(src).tokenize()
}
