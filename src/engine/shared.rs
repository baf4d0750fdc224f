use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::engine::{Engine, EngineError};
use crate::frontend::ParseError;
use crate::ir::binary_fn::BinaryFn;
use crate::meta::meta_error::MetaError;
use crate::meta::pack::LangPack;
use crate::transpile::Target;

/// An [`Engine`] behind a reader/writer lock.
///
/// Absorption takes the write lock; `run` and `transpile` share the read
/// lock, so a reader never observes a half-merged set of tables.
#[derive(Clone, Default)]
pub struct SharedEngine {
    inner: Arc<RwLock<Engine>>,
}

impl SharedEngine {
    pub fn new(engine: Engine) -> Self {
        Self {
            inner: Arc::new(RwLock::new(engine)),
        }
    }

    pub fn absorb(
        &self,
        lang_name: &str,
        tokens: &IndexMap<String, String>,
        precedence: &IndexMap<String, i32>,
        eval_fns: &IndexMap<String, BinaryFn>,
    ) {
        self.inner
            .write()
            .absorb(lang_name, tokens, precedence, eval_fns);
    }

    pub fn absorb_extended(
        &self,
        lang_name: &str,
        tokens: &IndexMap<String, String>,
        precedence: &IndexMap<String, i32>,
        eval_fns: &IndexMap<String, BinaryFn>,
        ir_rules: &IndexMap<String, String>,
        bytecode_rules: &IndexMap<String, String>,
    ) {
        self.inner.write().absorb_extended(
            lang_name,
            tokens,
            precedence,
            eval_fns,
            ir_rules,
            bytecode_rules,
        );
    }

    pub fn mount(&self, pack: &LangPack) -> Result<(), MetaError> {
        self.inner.write().mount(pack)
    }

    pub fn run(&self, source: &str) -> Result<f64, EngineError> {
        self.inner.read().run(source)
    }

    pub fn transpile(&self, source: &str) -> Result<String, ParseError> {
        self.inner.read().transpile(source)
    }

    pub fn transpile_to(&self, source: &str, target: Target) -> Result<String, ParseError> {
        self.inner.read().transpile_to(source, target)
    }

    pub fn current_language(&self) -> String {
        self.inner.read().current_language().to_string()
    }

    /// Runs `f` with shared access to the engine.
    pub fn with<R>(&self, f: impl FnOnce(&Engine) -> R) -> R {
        f(&self.inner.read())
    }
}

impl From<Engine> for SharedEngine {
    fn from(engine: Engine) -> Self {
        Self::new(engine)
    }
}
