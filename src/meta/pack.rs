use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::ir::binary_fn::BinaryFn;
use crate::meta::meta_error::MetaError;

/// One parsed language description.
///
/// Maps keep the order in which entries appeared in the pack file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LangPack {
    pub name: String,
    /// token name -> regex pattern
    pub tokens: IndexMap<String, String>,
    /// operator symbol -> binding strength (higher binds tighter)
    pub precedence: IndexMap<String, i32>,
    /// operator symbol -> evaluation expression text, e.g. `"a + b"`
    pub eval_rules: IndexMap<String, String>,
    /// IR tag -> IR tag
    pub ir_rules: IndexMap<String, String>,
    /// operator symbol -> opcode mnemonic
    pub bytecode: IndexMap<String, String>,
}

impl LangPack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Converts the textual evaluation rules into functions.
    ///
    /// In strict mode an unrecognized expression is an error. Otherwise it
    /// becomes [`BinaryFn::Zero`] and a warning is logged.
    pub fn eval_fns(&self, strict: bool) -> Result<IndexMap<String, BinaryFn>, MetaError> {
        let mut fns = IndexMap::with_capacity(self.eval_rules.len());

        for (op, text) in &self.eval_rules {
            let f = match BinaryFn::parse(text) {
                Some(f) => f,
                None if strict => {
                    return Err(MetaError::UnsupportedExpression {
                        op: op.clone(),
                        text: text.clone(),
                    });
                }
                None => {
                    warn!(op = %op, expr = %text, "unsupported evaluation expression, using zero");
                    BinaryFn::Zero
                }
            };
            fns.insert(op.clone(), f);
        }

        Ok(fns)
    }

    /// Encodes the pack with postcard.
    pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}
