use serde::{Deserialize, Serialize};

/// Evaluation function bound to an operator symbol.
///
/// Packs describe evaluation as text (`"a + b"`); only the four forms below
/// are understood. `Zero` exists for the lenient loading mode, where an
/// unrecognized expression is kept as a function that always yields `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryFn {
    Add,
    Sub,
    Mul,
    Div,
    Zero,
}

impl BinaryFn {
    /// Parses an evaluation expression. Whitespace must match exactly.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "a + b" => Some(BinaryFn::Add),
            "a - b" => Some(BinaryFn::Sub),
            "a * b" => Some(BinaryFn::Mul),
            "a / b" => Some(BinaryFn::Div),
            _ => None,
        }
    }

    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryFn::Add => a + b,
            BinaryFn::Sub => a - b,
            BinaryFn::Mul => a * b,
            BinaryFn::Div => a / b,
            BinaryFn::Zero => 0.0,
        }
    }

    /// Expression text this function was parsed from.
    pub fn expression(self) -> &'static str {
        match self {
            BinaryFn::Add => "a + b",
            BinaryFn::Sub => "a - b",
            BinaryFn::Mul => "a * b",
            BinaryFn::Div => "a / b",
            BinaryFn::Zero => "0",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_forms() {
        assert_eq!(BinaryFn::parse("a + b"), Some(BinaryFn::Add));
        assert_eq!(BinaryFn::parse("a - b"), Some(BinaryFn::Sub));
        assert_eq!(BinaryFn::parse("a * b"), Some(BinaryFn::Mul));
        assert_eq!(BinaryFn::parse("a / b"), Some(BinaryFn::Div));
    }

    #[test]
    fn test_other_text_rejected() {
        assert_eq!(BinaryFn::parse("a+b"), None);
        assert_eq!(BinaryFn::parse("b - a"), None);
        assert_eq!(BinaryFn::parse("a % b"), None);
    }

    #[test]
    fn test_apply() {
        assert_eq!(BinaryFn::Sub.apply(10.0, 4.0), 6.0);
        assert_eq!(BinaryFn::Div.apply(1.0, 0.0), f64::INFINITY);
        assert_eq!(BinaryFn::Zero.apply(3.0, 4.0), 0.0);
    }
}
