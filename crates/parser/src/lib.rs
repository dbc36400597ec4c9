//! Go declaration front-end (Logos lexer + recursive-descent parser).
//!
//! - The lexer uses Logos and implements Go semicolon insertion.
//! - The parser builds an arena syntax tree of top-level declarations;
//!   function bodies and initialisers are skipped.
//! - The printer renders types and signatures the way gofmt does.

pub mod ast;
pub mod constraint;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod parser_support;
pub mod printer;

pub use lexer::Lexer;

use crate::ast::SourceFile;
use crate::error::ParseFailure;

/// Parse one Go source file.
///
/// Lexer diagnostics fail the file even when the token stream would still
/// parse; otherwise the first syntax error is reported.
pub fn parse_source(input: &str) -> Result<SourceFile, ParseFailure> {
    let (toks, diags) = lexer::tokenize(input);
    if !diags.is_empty() {
        return Err(ParseFailure { diags });
    }
    parser::Parser::new(input, toks)
        .parse_file()
        .map_err(|d| ParseFailure { diags: vec![d] })
}
