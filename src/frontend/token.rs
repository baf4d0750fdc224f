#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Number(f64),

    // Operator symbol from the absorbed precedence table
    Op(String),

    // Grouping
    LParen,
    RParen,

    Eof,
}

impl Token {
    /// Source-like rendering used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("'{}'", n),
            Token::Op(op) => format!("'{}'", op),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}
