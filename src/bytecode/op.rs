use serde::{Deserialize, Serialize};

// =============================================================================
// OPCODE - Stack machine instructions
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpCode {
    /// Push the next entry of the program's data table.
    ///
    /// Stack effect: `( -- x )`
    Push,

    /// Stack effect: `( a b -- a+b )`
    Add,
    /// Stack effect: `( a b -- a-b )`
    Sub,
    /// Stack effect: `( a b -- a*b )`
    Mul,
    /// Stack effect: `( a b -- a/b )`
    Div,

    /// Stop and return the top of the stack.
    ///
    /// Stack effect: `( x -- x )`
    Halt,
}

impl OpCode {
    pub const ALL: [OpCode; 6] = [
        OpCode::Push,
        OpCode::Add,
        OpCode::Sub,
        OpCode::Mul,
        OpCode::Div,
        OpCode::Halt,
    ];

    pub fn mnemonic(self) -> &'static str {
        match self {
            OpCode::Push => "PUSH",
            OpCode::Add => "ADD",
            OpCode::Sub => "SUB",
            OpCode::Mul => "MUL",
            OpCode::Div => "DIV",
            OpCode::Halt => "HALT",
        }
    }

    /// Case-insensitive mnemonic lookup.
    pub fn from_mnemonic(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(name))
    }

    /// Returns (pops, pushes).
    pub fn effect(self) -> (usize, usize) {
        match self {
            OpCode::Push => (0, 1),
            OpCode::Add | OpCode::Sub | OpCode::Mul | OpCode::Div => (2, 1),
            OpCode::Halt => (1, 1),
        }
    }

    pub fn is_binary(self) -> bool {
        matches!(self, OpCode::Add | OpCode::Sub | OpCode::Mul | OpCode::Div)
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mnemonic_lookup() {
        assert_eq!(OpCode::from_mnemonic("ADD"), Some(OpCode::Add));
        assert_eq!(OpCode::from_mnemonic("halt"), Some(OpCode::Halt));
        assert_eq!(OpCode::from_mnemonic("MOD"), None);
    }

    #[test]
    fn test_effects() {
        assert_eq!(OpCode::Push.effect(), (0, 1));
        assert_eq!(OpCode::Div.effect(), (2, 1));
        assert!(OpCode::Mul.is_binary());
        assert!(!OpCode::Halt.is_binary());
    }
}
