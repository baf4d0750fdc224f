//! Source text to IR: a lexer driven by the absorbed token patterns and
//! operator table, and a precedence-climbing parser.

pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod parser_error;
pub mod token;
pub mod token_dumper;

pub use grammar::Grammar;
pub use lexer::{Lexer, Spanned};
pub use parser::Parser;
pub use parser_error::{ParseError, Span};
pub use token::Token;

use crate::ir::node::IrTree;

/// Lexes and parses `source` in one step.
pub fn parse(
    source: &str,
    grammar: &Grammar,
    max_depth: usize,
    max_tokens: usize,
) -> Result<IrTree, ParseError> {
    let tokens = Lexer::new(source, grammar)
        .with_max_tokens(max_tokens)
        .tokenize()?;
    Parser::new(tokens, grammar).with_max_depth(max_depth).parse()
}
