use crate::frontend::lexer::DEFAULT_MAX_TOKENS;
use crate::frontend::parser::DEFAULT_MAX_DEPTH;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum parenthesis nesting accepted by the parser. Operator chains
    /// are not limited by it; their length is bounded by `max_tokens`.
    pub max_depth: usize,
    pub max_tokens: usize,
    /// Reject evaluation expressions other than `a + b`, `a - b`, `a * b`,
    /// `a / b` when mounting a pack. When false they evaluate to zero.
    pub strict_eval_rules: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            max_tokens: DEFAULT_MAX_TOKENS,
            strict_eval_rules: true,
        }
    }
}
