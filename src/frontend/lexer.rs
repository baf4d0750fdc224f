use crate::frontend::grammar::Grammar;
use crate::frontend::parser_error::{ParseError, Span};
use crate::frontend::token::Token;

pub const DEFAULT_MAX_TOKENS: usize = 65_536;

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub span: Span,
}

/// Splits source text into numbers, parentheses and absorbed operators.
///
/// Where an operand is expected (at the start, after an operator or `(`) the
/// number pattern is tried before the operator table, so a pack whose number
/// pattern admits a sign can lex `-2` as a literal. Elsewhere operators win,
/// and `3-2` stays a subtraction.
pub struct Lexer<'a> {
    source: &'a str,
    grammar: &'a Grammar,
    pos: usize,
    line: usize,
    col: usize,
    max_tokens: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, grammar: &'a Grammar) -> Self {
        Lexer {
            source,
            grammar,
            pos: 0,
            line: 1,
            col: 1,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn current(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn span(&self) -> Span {
        Span {
            line: self.line,
            col: self.col,
        }
    }

    /// Consumes `len` bytes, keeping line/col in step.
    fn advance_by(&mut self, len: usize) {
        for ch in self.source[self.pos..self.pos + len].chars() {
            if ch == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
        self.pos += len;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current() {
            if ch.is_whitespace() {
                self.advance_by(ch.len_utf8());
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self) -> Result<Option<Token>, ParseError> {
        let Some(len) = self.grammar.match_number(self.rest()) else {
            return Ok(None);
        };
        let at = self.span();
        let text = &self.rest()[..len];
        let value = text.parse::<f64>().map_err(|_| ParseError::InvalidNumber {
            text: text.to_string(),
            at,
        })?;
        self.advance_by(len);
        Ok(Some(Token::Number(value)))
    }

    fn read_operator(&mut self) -> Option<Token> {
        let op = self.grammar.match_operator(self.rest())?.to_string();
        self.advance_by(op.len());
        Some(Token::Op(op))
    }

    pub fn tokenize(&mut self) -> Result<Vec<Spanned>, ParseError> {
        let mut tokens = Vec::new();
        let mut expect_operand = true;

        loop {
            self.skip_whitespace();
            let span = self.span();

            let Some(ch) = self.current() else {
                tokens.push(Spanned {
                    token: Token::Eof,
                    span,
                });
                return Ok(tokens);
            };

            if tokens.len() >= self.max_tokens {
                return Err(ParseError::TooManyTokens {
                    limit: self.max_tokens,
                });
            }

            let token = match ch {
                '(' => {
                    self.advance_by(1);
                    Token::LParen
                }
                ')' => {
                    self.advance_by(1);
                    Token::RParen
                }
                _ if expect_operand => match self.read_number()? {
                    Some(t) => t,
                    None => self
                        .read_operator()
                        .ok_or(ParseError::UnexpectedChar { ch, at: span })?,
                },
                _ => match self.read_operator() {
                    Some(t) => t,
                    None => self
                        .read_number()?
                        .ok_or(ParseError::UnexpectedChar { ch, at: span })?,
                },
            };

            expect_operand = matches!(token, Token::Op(_) | Token::LParen);
            tokens.push(Spanned { token, span });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn arithmetic() -> Grammar {
        let prec: IndexMap<String, i32> = [("+", 10), ("-", 10), ("*", 20), ("/", 20)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        Grammar::new(&IndexMap::new(), &prec)
    }

    fn tokens(source: &str) -> Vec<Token> {
        let grammar = arithmetic();
        Lexer::new(source, &grammar)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .filter(|t| !matches!(t, Token::Eof))
            .collect()
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(
            tokens("3 + 5 * 2"),
            vec![
                Token::Number(3.0),
                Token::Op("+".to_string()),
                Token::Number(5.0),
                Token::Op("*".to_string()),
                Token::Number(2.0)
            ]
        );
    }

    #[test]
    fn test_no_whitespace() {
        assert_eq!(tokens("10-2").len(), 3);
    }

    #[test]
    fn test_parens() {
        assert_eq!(
            tokens("(1)"),
            vec![Token::LParen, Token::Number(1.0), Token::RParen]
        );
    }

    #[test]
    fn test_spans() {
        let grammar = arithmetic();
        let spanned = Lexer::new("12 +\n 7", &grammar).tokenize().unwrap();
        assert_eq!(spanned[0].span, Span { line: 1, col: 1 });
        assert_eq!(spanned[1].span, Span { line: 1, col: 4 });
        assert_eq!(spanned[2].span, Span { line: 2, col: 2 });
        assert_eq!(spanned[3].token, Token::Eof);
    }

    #[test]
    fn test_unknown_character() {
        let grammar = arithmetic();
        let err = Lexer::new("1 % 2", &grammar).tokenize().unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedChar {
                ch: '%',
                at: Span { line: 1, col: 3 }
            }
        );
    }

    #[test]
    fn test_signed_literal_only_in_operand_position() {
        let tokens_map: IndexMap<String, String> =
            [("number".to_string(), "-?[0-9]+".to_string())].into();
        let prec: IndexMap<String, i32> = [("-".to_string(), 10)].into();
        let grammar = Grammar::new(&tokens_map, &prec);
        let got: Vec<_> = Lexer::new("-3-2", &grammar)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect();
        assert_eq!(
            got,
            vec![
                Token::Number(-3.0),
                Token::Op("-".to_string()),
                Token::Number(2.0),
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_token_limit() {
        let grammar = arithmetic();
        let err = Lexer::new("1 + 2 + 3", &grammar)
            .with_max_tokens(4)
            .tokenize()
            .unwrap_err();
        assert_eq!(err, ParseError::TooManyTokens { limit: 4 });
    }

    #[test]
    fn test_invalid_number_text() {
        let tokens_map: IndexMap<String, String> =
            [("number".to_string(), "[0-9]+x".to_string())].into();
        let grammar = Grammar::new(&tokens_map, &IndexMap::new());
        let err = Lexer::new("12x", &grammar).tokenize().unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { .. }));
    }
}
