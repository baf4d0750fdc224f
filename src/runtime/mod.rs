pub mod runtime_error;
pub mod vm;

pub use runtime_error::VmError;
pub use vm::{Vm, VmConfig};
