//! # Intermediate representation
//!
//! The parser lowers source text into an [`IrTree`]: an arena of literal and
//! binary nodes. The evaluator and the transpiler both consume it.

pub mod binary_fn;
pub mod eval;
pub mod eval_error;
pub mod node;

pub use binary_fn::BinaryFn;
pub use eval::Evaluator;
pub use eval_error::EvalError;
pub use node::{IrBuilder, IrNode, IrTree, NodeId};
