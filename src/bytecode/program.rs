use serde::{Deserialize, Serialize};

use crate::bytecode::OpCode;

/// A flat stack-machine program.
///
/// Operands live in `data`, not in the instruction stream: each `PUSH`
/// consumes the next entry, left to right.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bytecode {
    pub ops: Vec<OpCode>,
    pub data: Vec<f64>,
}

impl Bytecode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `PUSH` together with its operand.
    pub fn push(&mut self, value: f64) -> &mut Self {
        self.ops.push(OpCode::Push);
        self.data.push(value);
        self
    }

    /// Appends an instruction that takes no operand.
    pub fn op(&mut self, op: OpCode) -> &mut Self {
        self.ops.push(op);
        self
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}
