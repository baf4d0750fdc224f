use thiserror::Error;

use crate::bytecode::{Bytecode, OpCode};

#[derive(Debug, Clone, PartialEq, Error)]
#[error("stack-check error: {message}")]
pub struct StackCheckError {
    pub message: String,
}

impl StackCheckError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Statically checks a program before it is run.
///
/// The instruction stream has no jumps, so a linear scan is exact: it
/// verifies stack depth at every op, that `data` holds exactly one entry per
/// `PUSH`, and that the first `HALT` leaves a single value.
pub fn check_program(bc: &Bytecode) -> Result<(), StackCheckError> {
    let mut h: usize = 0;
    let mut pushes: usize = 0;

    for (ip, op) in bc.ops.iter().enumerate() {
        let (pops, pushed) = op.effect();
        if h < pops {
            return Err(StackCheckError::new(format!(
                "stack underflow at ip={}, op={}, needed {} items, have {}",
                ip, op, pops, h
            )));
        }

        if *op == OpCode::Push {
            pushes += 1;
            if pushes > bc.data.len() {
                return Err(StackCheckError::new(format!(
                    "PUSH at ip={} has no operand (data holds {} entries)",
                    ip,
                    bc.data.len()
                )));
            }
        }

        if *op == OpCode::Halt {
            if h != 1 {
                return Err(StackCheckError::new(format!(
                    "HALT at ip={} leaves {} values, expected 1",
                    ip, h
                )));
            }
            if pushes != bc.data.len() {
                return Err(StackCheckError::new(format!(
                    "{} data entries unused",
                    bc.data.len() - pushes
                )));
            }
            return Ok(());
        }

        h = h - pops + pushed;
    }

    Err(StackCheckError::new("program does not end with HALT"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(ops: Vec<OpCode>, data: Vec<f64>) -> Bytecode {
        Bytecode { ops, data }
    }

    #[test]
    fn test_simple_ops() {
        let bc = program(
            vec![OpCode::Push, OpCode::Push, OpCode::Add, OpCode::Halt],
            vec![1.0, 2.0],
        );
        assert!(check_program(&bc).is_ok());
    }

    #[test]
    fn test_underflow() {
        let result = check_program(&program(vec![OpCode::Add, OpCode::Halt], vec![]));
        assert!(result.unwrap_err().message.contains("underflow"));
    }

    #[test]
    fn test_missing_operand() {
        let bc = program(vec![OpCode::Push, OpCode::Push, OpCode::Halt], vec![1.0]);
        assert!(check_program(&bc).unwrap_err().message.contains("no operand"));
    }

    #[test]
    fn test_missing_halt() {
        let bc = program(vec![OpCode::Push], vec![1.0]);
        assert!(check_program(&bc).unwrap_err().message.contains("HALT"));
    }

    #[test]
    fn test_leftover_values() {
        let bc = program(vec![OpCode::Push, OpCode::Push, OpCode::Halt], vec![1.0, 2.0]);
        assert!(check_program(&bc).unwrap_err().message.contains("leaves 2 values"));
    }

    #[test]
    fn test_unused_data() {
        let bc = program(vec![OpCode::Push, OpCode::Halt], vec![1.0, 2.0]);
        assert!(check_program(&bc).unwrap_err().message.contains("unused"));
    }
}
