use crate::frontend::grammar::Grammar;
use crate::frontend::lexer::Spanned;
use crate::frontend::parser_error::{ParseError, Span};
use crate::frontend::token::Token;
use crate::ir::node::{IrBuilder, IrTree, NodeId};

pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Precedence-climbing parser driven by the absorbed precedence table.
///
/// Grammar:
///
/// ```text
/// expr    := primary (op primary)*      -- climbed by table precedence
/// primary := number | "(" expr ")"
/// ```
///
/// A higher precedence value binds tighter; operators of equal precedence
/// associate to the left.
pub struct Parser<'g> {
    tokens: Vec<Spanned>,
    pos: usize,
    grammar: &'g Grammar,
    builder: IrBuilder,
    max_depth: usize,
}

impl<'g> Parser<'g> {
    pub fn new(tokens: Vec<Spanned>, grammar: &'g Grammar) -> Self {
        Parser {
            tokens,
            pos: 0,
            grammar,
            builder: IrBuilder::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Returns the current token, treating a missing tail as `Eof`.
    fn peek(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .map(|s| &s.token)
            .unwrap_or(&Token::Eof)
    }

    /// Span of the current token, or of the last one when past the end.
    fn span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|s| s.span)
            .unwrap_or_else(Span::start)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Parses the whole token stream into a single expression tree.
    pub fn parse(mut self) -> Result<IrTree, ParseError> {
        let root = self.parse_expr(i64::MIN, 0)?;

        if matches!(self.peek(), Token::Eof) {
            return Ok(self.builder.finish(root));
        }
        Err(ParseError::TrailingInput {
            found: self.peek().describe(),
            at: self.span(),
        })
    }

    fn parse_expr(&mut self, min_prec: i64, depth: usize) -> Result<NodeId, ParseError> {
        let mut lhs = self.parse_primary(depth)?;

        loop {
            let op = match self.peek() {
                Token::Op(op) => op.clone(),
                _ => break,
            };
            // The lexer only emits operators taken from the table.
            let Some(prec) = self.grammar.precedence(&op) else {
                break;
            };
            let prec = i64::from(prec);
            if prec < min_prec {
                break;
            }

            self.advance();
            let rhs = self.parse_expr(prec + 1, depth)?;
            lhs = self.builder.binary(op, lhs, rhs);
        }

        Ok(lhs)
    }

    fn parse_primary(&mut self, depth: usize) -> Result<NodeId, ParseError> {
        let at = self.span();

        match self.peek().clone() {
            Token::Number(value) => {
                self.advance();
                Ok(self.builder.literal(value))
            }
            Token::LParen => {
                if depth >= self.max_depth {
                    return Err(ParseError::TooDeep {
                        limit: self.max_depth,
                        at,
                    });
                }
                self.advance();
                let inner = self.parse_expr(i64::MIN, depth + 1)?;
                match self.peek().clone() {
                    Token::RParen => {
                        self.advance();
                        Ok(inner)
                    }
                    Token::Eof => Err(ParseError::UnclosedParen { at }),
                    other => Err(ParseError::Expected {
                        expected: "')'",
                        found: other.describe(),
                        at: self.span(),
                    }),
                }
            }
            Token::Eof => Err(ParseError::UnexpectedEof { at }),
            other => Err(ParseError::FactorExpected {
                found: other.describe(),
                at,
            }),
        }
    }
}
