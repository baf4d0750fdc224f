use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// The tree has no root, or the root id points outside the arena.
    #[error("IRNode null")]
    NullNode,

    #[error("unknown operator: {0}")]
    UnknownOperator(String),

    /// A child does not precede its parent, which would allow cycles.
    #[error("invalid IR node structure at node {0}")]
    InvalidStructure(usize),
}
