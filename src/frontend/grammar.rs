use indexmap::IndexMap;
use regex::Regex;
use tracing::{debug, warn};

/// Lexical and precedence rules derived from the absorbed tables.
///
/// Rebuilt by the engine after every absorb. Only the `number` token pattern
/// is consulted by the lexer; operators are exactly the keys of the
/// precedence table.
#[derive(Debug, Clone)]
pub struct Grammar {
    number: Regex,
    /// Operator symbols, longest first, so lexing is longest-match.
    operators: Vec<String>,
    precedence: IndexMap<String, i32>,
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new(&IndexMap::new(), &IndexMap::new())
    }
}

impl Grammar {
    pub const NUMBER_TOKEN: &'static str = "number";
    pub const DEFAULT_NUMBER_PATTERN: &'static str = "[0-9]+";

    pub fn new(tokens: &IndexMap<String, String>, precedence: &IndexMap<String, i32>) -> Self {
        let number = tokens
            .get(Self::NUMBER_TOKEN)
            .and_then(|pattern| match anchored(pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!(pattern = %pattern, error = %e, "number pattern rejected, using default");
                    None
                }
            })
            .unwrap_or_else(default_number);

        let mut operators: Vec<String> = precedence
            .keys()
            .filter(|op| !op.is_empty())
            .cloned()
            .collect();
        operators.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        debug!(operators = operators.len(), number = %number.as_str(), "grammar rebuilt");

        Self {
            number,
            operators,
            precedence: precedence.clone(),
        }
    }

    /// Length in bytes of the number literal at the start of `input`.
    pub fn match_number(&self, input: &str) -> Option<usize> {
        self.number
            .find(input)
            .map(|m| m.end())
            .filter(|len| *len > 0)
    }

    /// Longest operator symbol that `input` starts with.
    pub fn match_operator(&self, input: &str) -> Option<&str> {
        self.operators
            .iter()
            .find(|op| input.starts_with(op.as_str()))
            .map(String::as_str)
    }

    pub fn precedence(&self, op: &str) -> Option<i32> {
        self.precedence.get(op).copied()
    }

    pub fn operators(&self) -> &[String] {
        &self.operators
    }
}

fn anchored(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"\A(?:{})", pattern))
}

fn default_number() -> Regex {
    match anchored(Grammar::DEFAULT_NUMBER_PATTERN) {
        Ok(re) => re,
        Err(e) => unreachable!("default number pattern is valid: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(pairs: &[(&str, i32)]) -> IndexMap<String, i32> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_longest_operator_wins() {
        let g = Grammar::new(&IndexMap::new(), &table(&[("*", 20), ("**", 30)]));
        assert_eq!(g.match_operator("**2"), Some("**"));
        assert_eq!(g.match_operator("*2"), Some("*"));
        assert_eq!(g.match_operator("+2"), None);
    }

    #[test]
    fn test_default_number() {
        let g = Grammar::default();
        assert_eq!(g.match_number("123+4"), Some(3));
        assert_eq!(g.match_number("x1"), None);
    }

    #[test]
    fn test_custom_number_pattern() {
        let tokens: IndexMap<String, String> =
            [("number".to_string(), r"[0-9]+(\.[0-9]+)?".to_string())].into();
        let g = Grammar::new(&tokens, &IndexMap::new());
        assert_eq!(g.match_number("2.75 "), Some(4));
    }

    #[test]
    fn test_bad_pattern_falls_back() {
        let tokens: IndexMap<String, String> =
            [("number".to_string(), "[0-9".to_string())].into();
        let g = Grammar::new(&tokens, &IndexMap::new());
        assert_eq!(g.match_number("42"), Some(2));
    }

    #[test]
    fn test_empty_match_rejected() {
        let tokens: IndexMap<String, String> =
            [("number".to_string(), "[0-9]*".to_string())].into();
        let g = Grammar::new(&tokens, &IndexMap::new());
        assert_eq!(g.match_number("abc"), None);
    }
}
