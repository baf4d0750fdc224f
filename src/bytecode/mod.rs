pub mod asm;
pub mod disasm;
pub mod op;
pub mod program;
pub mod stack_check;

pub use op::OpCode;
pub use program::Bytecode;
