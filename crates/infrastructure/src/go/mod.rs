//! Go front end: lexer, parser with a declaration grammar check, canonical
//! printer and import resolution.

pub mod ast;
pub mod imports;
pub mod lexer;
pub mod packages;
pub mod parser;
pub mod printer;
mod syntax;
pub mod token;

pub use ast::{Decl, DeclKind, File, FileSet, GoAst, ImportDecl, ImportSpec, Position};
pub use imports::{ImportResolver, ImportsError, go_imports};
pub use lexer::{LexError, Lexer, tokenize};
pub use parser::{ParseError, parse_go_src};
pub use printer::print_file;
pub use token::{Role, Token, TokenKind};
