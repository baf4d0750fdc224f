use std::fmt::Write;

use crate::frontend::lexer::Spanned;
use crate::frontend::token::Token;

pub struct TokenDumper {
    pub color: bool,
    pub show_debug_repr: bool, // if false, prints the token as it appears in source
}

impl Default for TokenDumper {
    fn default() -> Self {
        Self {
            color: true,
            show_debug_repr: true,
        }
    }
}

impl TokenDumper {
    // ANSI colors
    const RESET: &'static str = "\x1b[0m";
    const DIM: &'static str = "\x1b[2m";
    const GRN: &'static str = "\x1b[32m";
    const YEL: &'static str = "\x1b[33m";
    const CYN: &'static str = "\x1b[36m";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn pretty(mut self) -> Self {
        self.show_debug_repr = false;
        self
    }

    pub fn dump(&self, tokens: &[Spanned]) {
        print!("{}", self.render(tokens));
    }

    pub fn render(&self, tokens: &[Spanned]) -> String {
        let mut out = String::new();
        for s in tokens {
            self.render_one(&mut out, s);
        }
        out
    }

    fn render_one(&self, out: &mut String, s: &Spanned) {
        let kind = Self::kind(&s.token);
        let colr = if self.color { Self::color(&s.token) } else { "" };
        let reset = if self.color { Self::RESET } else { "" };

        let _ = if self.show_debug_repr {
            writeln!(
                out,
                "[{:02}:{:02}] {}{:<6} {:?}{}",
                s.span.line, s.span.col, colr, kind, s.token, reset
            )
        } else {
            writeln!(
                out,
                "[{:02}:{:02}] {}{:<6} {}{}",
                s.span.line,
                s.span.col,
                colr,
                kind,
                s.token.describe(),
                reset
            )
        };
    }

    fn kind(token: &Token) -> &'static str {
        match token {
            Token::Number(_) => "NUM",
            Token::Op(_) => "OP",
            Token::LParen | Token::RParen => "PAREN",
            Token::Eof => "EOF",
        }
    }

    fn color(token: &Token) -> &'static str {
        match token {
            Token::Number(_) => Self::GRN,
            Token::Op(_) => Self::YEL,
            Token::LParen | Token::RParen => Self::CYN,
            Token::Eof => Self::DIM,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parser_error::Span;

    #[test]
    fn test_plain_render() {
        let tokens = vec![
            Spanned {
                token: Token::Number(3.0),
                span: Span { line: 1, col: 1 },
            },
            Spanned {
                token: Token::Op("+".to_string()),
                span: Span { line: 1, col: 3 },
            },
        ];
        let out = TokenDumper::new().no_color().pretty().render(&tokens);
        assert_eq!(out, "[01:01] NUM    '3'\n[01:03] OP     '+'\n");
    }
}
