//! Absorbs declarative language packs into a generic arithmetic engine.
//!
//! A pack file names token patterns, operator precedences and evaluation
//! rules, plus optional IR and bytecode tables. [`Engine`] merges packs,
//! parses source under the resulting grammar, evaluates it, and lowers it
//! into Go, Rust or C++ programs. The stack [`Vm`] runs bytecode built by
//! hand or by the assembler.
//!
//! ```no_run
//! use sponge::{Engine, PackLoader};
//!
//! let pack = PackLoader::parse("packs/meta.meta", "packs/rust.meta")?;
//! let mut engine = Engine::new();
//! engine.mount(&pack)?;
//! assert_eq!(engine.run("3 + 5 * 2")?, 13.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod bytecode;
pub mod engine;
pub mod frontend;
pub mod ir;
pub mod meta;
pub mod runtime;
pub mod transpile;

pub use bytecode::{Bytecode, OpCode};
pub use engine::{Engine, EngineConfig, EngineError, SharedEngine};
pub use frontend::{Grammar, ParseError};
pub use ir::{BinaryFn, EvalError, IrTree};
pub use meta::{LangPack, MetaError, PackLoader, SchemaRegistry};
pub use runtime::{Vm, VmConfig, VmError};
pub use transpile::{Target, Transpiler};
