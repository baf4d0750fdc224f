use tracing::{debug, trace};

use crate::bytecode::{Bytecode, OpCode};
use crate::runtime::runtime_error::VmError;

#[derive(Debug, Clone)]
pub struct VmConfig {
    pub max_steps: Option<usize>,
    pub max_stack_size: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig {
            max_steps: None,
            max_stack_size: 10_000,
        }
    }
}

/// Stack machine for [`Bytecode`] programs.
///
/// The operand stack is reset at the start of every run; after a run it
/// still holds whatever was left, which `stack()` exposes for inspection.
pub struct Vm {
    stack: Vec<f64>,
    config: VmConfig,
    steps: usize,
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl Vm {
    pub fn new() -> Self {
        Self::with_config(VmConfig::default())
    }

    pub fn with_config(config: VmConfig) -> Self {
        Self {
            stack: Vec::new(),
            config,
            steps: 0,
        }
    }

    pub fn stack(&self) -> &[f64] {
        &self.stack
    }

    pub fn reset_execution_state(&mut self) {
        self.stack.clear();
        self.steps = 0;
    }

    /// Executes `bc` until `HALT` and returns the top of the stack.
    pub fn run(&mut self, bc: &Bytecode) -> Result<f64, VmError> {
        self.reset_execution_state();
        let mut cursor: usize = 0;

        for (ip, op) in bc.ops.iter().copied().enumerate() {
            self.check_limits()?;
            trace!(ip, %op, depth = self.stack.len(), "step");

            match op {
                OpCode::Push => {
                    let value = *bc.data.get(cursor).ok_or(VmError::MissingOperand {
                        ip,
                        len: bc.data.len(),
                    })?;
                    cursor += 1;
                    self.push(value)?;
                }
                OpCode::Add => self.binary(ip, op, |a, b| a + b)?,
                OpCode::Sub => self.binary(ip, op, |a, b| a - b)?,
                OpCode::Mul => self.binary(ip, op, |a, b| a * b)?,
                OpCode::Div => self.binary(ip, op, |a, b| a / b)?,
                OpCode::Halt => {
                    let top = *self.stack.last().ok_or(VmError::StackUnderflow {
                        ip,
                        op,
                        needed: 1,
                        depth: 0,
                    })?;
                    if self.stack.len() > 1 {
                        debug!(ip, depth = self.stack.len(), "HALT with extra values on stack");
                    }
                    return Ok(top);
                }
            }
        }

        Err(VmError::UnhaltedProgram {
            executed: bc.ops.len(),
        })
    }

    // Execution

    fn check_limits(&mut self) -> Result<(), VmError> {
        self.steps += 1;

        if let Some(max) = self.config.max_steps {
            if self.steps > max {
                return Err(VmError::StepLimit { limit: max });
            }
        }

        Ok(())
    }

    fn push(&mut self, value: f64) -> Result<(), VmError> {
        if self.stack.len() >= self.config.max_stack_size {
            return Err(VmError::StackOverflow {
                limit: self.config.max_stack_size,
            });
        }
        self.stack.push(value);
        Ok(())
    }

    /// Pops the right operand, then the left, and pushes `f(left, right)`.
    fn binary(&mut self, ip: usize, op: OpCode, f: impl Fn(f64, f64) -> f64) -> Result<(), VmError> {
        let depth = self.stack.len();
        if depth < 2 {
            return Err(VmError::StackUnderflow {
                ip,
                op,
                needed: 2,
                depth,
            });
        }
        let b = self.stack.pop().unwrap_or_default();
        let a = self.stack.pop().unwrap_or_default();
        self.stack.push(f(a, b));
        Ok(())
    }
}
