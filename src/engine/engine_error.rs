use thiserror::Error;

use crate::frontend::parser_error::ParseError;
use crate::ir::eval_error::EvalError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),
}
