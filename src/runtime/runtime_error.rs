use thiserror::Error;

use crate::bytecode::OpCode;

/// Failures of a single [`Vm::run`](crate::runtime::vm::Vm::run) call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VmError {
    #[error("stack underflow at ip={ip}: {op} needs {needed} values, stack has {depth}")]
    StackUnderflow {
        ip: usize,
        op: OpCode,
        needed: usize,
        depth: usize,
    },

    #[error("PUSH at ip={ip} has no operand: data table holds {len} entries")]
    MissingOperand { ip: usize, len: usize },

    #[error("program ended without HALT after {executed} instructions")]
    UnhaltedProgram { executed: usize },

    #[error("stack size limit exceeded ({limit})")]
    StackOverflow { limit: usize },

    #[error("execution step limit exceeded ({limit})")]
    StepLimit { limit: usize },
}
