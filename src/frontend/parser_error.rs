use thiserror::Error;

/// 1-based source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub col: usize,
}

impl Span {
    pub fn start() -> Self {
        Span { line: 1, col: 1 }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A lexing or parsing error with source location.
///
/// Formats as `line:col: message` for CLI-friendly diagnostics.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("{at}: unexpected character '{ch}'")]
    UnexpectedChar { ch: char, at: Span },

    #[error("{at}: factor parse error: expected a number, found {found}")]
    FactorExpected { found: String, at: Span },

    #[error("{at}: unexpected end of input")]
    UnexpectedEof { at: Span },

    #[error("{at}: unclosed '('")]
    UnclosedParen { at: Span },

    #[error("{at}: expected {expected}, found {found}")]
    Expected {
        expected: &'static str,
        found: String,
        at: Span,
    },

    #[error("{at}: unexpected trailing input {found}")]
    TrailingInput { found: String, at: Span },

    #[error("{at}: invalid number literal '{text}'")]
    InvalidNumber { text: String, at: Span },

    #[error("{at}: nesting depth limit exceeded ({limit})")]
    TooDeep { limit: usize, at: Span },

    #[error("token limit exceeded ({limit})")]
    TooManyTokens { limit: usize },
}

impl ParseError {
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::UnexpectedChar { at, .. }
            | ParseError::FactorExpected { at, .. }
            | ParseError::UnexpectedEof { at }
            | ParseError::UnclosedParen { at }
            | ParseError::Expected { at, .. }
            | ParseError::TrailingInput { at, .. }
            | ParseError::InvalidNumber { at, .. }
            | ParseError::TooDeep { at, .. } => Some(*at),
            ParseError::TooManyTokens { .. } => None,
        }
    }
}
