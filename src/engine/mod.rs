//! # Absorption engine
//!
//! [`Engine`] owns every table absorbed from language packs and exposes the
//! evaluation and emission surface. Absorbing needs `&mut Engine` while
//! `run`/`transpile` only need `&Engine`, so a single owner serializes
//! writers against readers. The engine is not internally synchronized; wrap
//! it in [`SharedEngine`] to use it from several threads.

pub mod config;
pub mod engine_error;
pub mod shared;

pub use config::EngineConfig;
pub use engine_error::EngineError;
pub use shared::SharedEngine;

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::bytecode::Bytecode;
use crate::bytecode::asm::{self, AsmError};
use crate::frontend::{self, Grammar, ParseError};
use crate::ir::binary_fn::BinaryFn;
use crate::ir::eval::Evaluator;
use crate::ir::eval_error::EvalError;
use crate::ir::node::IrTree;
use crate::meta::meta_error::MetaError;
use crate::meta::pack::LangPack;
use crate::transpile::{Target, Transpiler};

pub struct Engine {
    current_language: String,
    token_map: IndexMap<String, String>,
    precedence_map: IndexMap<String, i32>,
    eval_map: IndexMap<String, BinaryFn>,
    ir_map: IndexMap<String, String>,
    bytecode_map: IndexMap<String, String>,
    /// Derived from `token_map` and `precedence_map` on every absorb.
    grammar: Grammar,
    config: EngineConfig,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            current_language: String::new(),
            token_map: IndexMap::new(),
            precedence_map: IndexMap::new(),
            eval_map: IndexMap::new(),
            ir_map: IndexMap::new(),
            bytecode_map: IndexMap::new(),
            grammar: Grammar::default(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // Absorption

    /// Merges a language's token, precedence and evaluation tables.
    ///
    /// Entries with a key already present are overwritten; the last absorbed
    /// language wins per key. The parser grammar is rebuilt afterwards.
    pub fn absorb(
        &mut self,
        lang_name: &str,
        tokens: &IndexMap<String, String>,
        precedence: &IndexMap<String, i32>,
        eval_fns: &IndexMap<String, BinaryFn>,
    ) {
        self.current_language = lang_name.to_string();

        self.token_map
            .extend(tokens.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.precedence_map
            .extend(precedence.iter().map(|(k, v)| (k.clone(), *v)));
        self.eval_map
            .extend(eval_fns.iter().map(|(k, v)| (k.clone(), *v)));

        self.grammar = Grammar::new(&self.token_map, &self.precedence_map);

        info!(
            language = %lang_name,
            tokens = self.token_map.len(),
            operators = self.precedence_map.len(),
            eval_rules = self.eval_map.len(),
            "language absorbed"
        );
    }

    /// [`absorb`](Self::absorb), then merges the IR and bytecode tables.
    ///
    /// Neither table is read by the parser or the evaluator: the IR map
    /// feeds the transpiler and the bytecode map feeds the assembler.
    pub fn absorb_extended(
        &mut self,
        lang_name: &str,
        tokens: &IndexMap<String, String>,
        precedence: &IndexMap<String, i32>,
        eval_fns: &IndexMap<String, BinaryFn>,
        ir_rules: &IndexMap<String, String>,
        bytecode_rules: &IndexMap<String, String>,
    ) {
        self.absorb(lang_name, tokens, precedence, eval_fns);

        self.ir_map
            .extend(ir_rules.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.bytecode_map
            .extend(bytecode_rules.iter().map(|(k, v)| (k.clone(), v.clone())));

        debug!(
            ir_rules = self.ir_map.len(),
            bytecode_rules = self.bytecode_map.len(),
            "extended tables absorbed"
        );
    }

    /// Absorbs every table of a loaded pack.
    ///
    /// Evaluation expressions are converted first, so an unsupported one
    /// leaves the engine untouched when `strict_eval_rules` is set.
    pub fn mount(&mut self, pack: &LangPack) -> Result<(), MetaError> {
        let eval_fns = pack.eval_fns(self.config.strict_eval_rules)?;
        self.absorb_extended(
            &pack.name,
            &pack.tokens,
            &pack.precedence,
            &eval_fns,
            &pack.ir_rules,
            &pack.bytecode,
        );
        Ok(())
    }

    // Evaluation & emission

    pub fn parse(&self, source: &str) -> Result<IrTree, ParseError> {
        frontend::parse(
            source,
            &self.grammar,
            self.config.max_depth,
            self.config.max_tokens,
        )
    }

    pub fn evaluate(&self, tree: &IrTree) -> Result<f64, EvalError> {
        Evaluator::new(&self.eval_map).evaluate(tree)
    }

    /// Parses `source` under the absorbed grammar and evaluates it.
    pub fn run(&self, source: &str) -> Result<f64, EngineError> {
        let tree = self.parse(source)?;
        let value = self.evaluate(&tree)?;
        debug!(source = %source, value, "run");
        Ok(value)
    }

    /// Parses `source` and emits a Go program printing its value.
    pub fn transpile(&self, source: &str) -> Result<String, ParseError> {
        self.transpile_to(source, Target::Go)
    }

    pub fn transpile_to(&self, source: &str, target: Target) -> Result<String, ParseError> {
        let tree = self.parse(source)?;
        Ok(self.transpiler(target).emit(&tree, &self.ir_map))
    }

    /// Default backend for `target`; callers may register extra rules and
    /// call [`Transpiler::emit`] with [`Engine::ir_map`] themselves.
    pub fn transpiler(&self, target: Target) -> Transpiler {
        Transpiler::for_target(target)
    }

    /// Assembles a textual bytecode program, resolving operator symbols
    /// through the absorbed bytecode table.
    pub fn assemble(&self, text: &str) -> Result<Bytecode, AsmError> {
        asm::assemble(text, &self.bytecode_map)
    }

    // Accessors

    pub fn current_language(&self) -> &str {
        &self.current_language
    }

    pub fn token_map(&self) -> &IndexMap<String, String> {
        &self.token_map
    }

    pub fn precedence_map(&self) -> &IndexMap<String, i32> {
        &self.precedence_map
    }

    pub fn eval_map(&self) -> &IndexMap<String, BinaryFn> {
        &self.eval_map
    }

    pub fn ir_map(&self) -> &IndexMap<String, String> {
        &self.ir_map
    }

    pub fn bytecode_map(&self) -> &IndexMap<String, String> {
        &self.bytecode_map
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::OpCode;
    use crate::runtime::vm::Vm;

    fn strings(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn ints(pairs: &[(&str, i32)]) -> IndexMap<String, i32> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn fns(pairs: &[(&str, BinaryFn)]) -> IndexMap<String, BinaryFn> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn arithmetic_engine() -> Engine {
        let mut engine = Engine::new();
        engine.absorb(
            "rust",
            &strings(&[("number", "[0-9]+")]),
            &ints(&[("+", 10), ("-", 10), ("*", 20), ("/", 20)]),
            &fns(&[
                ("+", BinaryFn::Add),
                ("-", BinaryFn::Sub),
                ("*", BinaryFn::Mul),
                ("/", BinaryFn::Div),
            ]),
        );
        engine
    }

    #[test]
    fn test_run_precedence() {
        let engine = arithmetic_engine();
        assert_eq!(engine.run("3 + 5 * 2"), Ok(13.0));
        assert_eq!(engine.run("(3 + 5) * 2"), Ok(16.0));
    }

    #[test]
    fn test_run_left_associative() {
        let engine = arithmetic_engine();
        assert_eq!(engine.run("10 - 2 - 3"), Ok(5.0));
        assert_eq!(engine.run("64 / 4 / 2"), Ok(8.0));
    }

    #[test]
    fn test_division_by_zero() {
        let engine = arithmetic_engine();
        assert_eq!(engine.run("1 / 0"), Ok(f64::INFINITY));
        assert!(engine.run("0 / 0").unwrap().is_nan());
    }

    #[test]
    fn test_absorb_idempotent() {
        let mut engine = arithmetic_engine();
        let before = engine.run("7 * 6 - 2 / 4").unwrap();
        engine.absorb(
            "rust",
            &strings(&[("number", "[0-9]+")]),
            &ints(&[("+", 10), ("-", 10), ("*", 20), ("/", 20)]),
            &fns(&[
                ("+", BinaryFn::Add),
                ("-", BinaryFn::Sub),
                ("*", BinaryFn::Mul),
                ("/", BinaryFn::Div),
            ]),
        );
        assert_eq!(engine.run("7 * 6 - 2 / 4").unwrap(), before);
        assert_eq!(engine.precedence_map().len(), 4);
    }

    #[test]
    fn test_later_absorb_wins_per_key() {
        let mut engine = arithmetic_engine();
        engine.absorb(
            "weird",
            &IndexMap::new(),
            &ints(&[("+", 30)]),
            &fns(&[("-", BinaryFn::Add)]),
        );
        assert_eq!(engine.current_language(), "weird");
        // `+` now binds tighter than `*`, `-` now adds; `*` is untouched
        assert_eq!(engine.run("3 + 5 * 2"), Ok(16.0));
        assert_eq!(engine.run("3 - 1"), Ok(4.0));
        assert_eq!(engine.precedence_map()["*"], 20);
    }

    #[test]
    fn test_operator_without_eval_rule() {
        let mut engine = arithmetic_engine();
        engine.absorb("pow", &IndexMap::new(), &ints(&[("^", 30)]), &IndexMap::new());
        assert_eq!(
            engine.run("2 ^ 3"),
            Err(EngineError::Eval(EvalError::UnknownOperator("^".to_string())))
        );
    }

    #[test]
    fn test_parse_error_leaves_state() {
        let engine = arithmetic_engine();
        assert!(matches!(engine.run("3 + x"), Err(EngineError::Parse(_))));
        assert_eq!(engine.run("3 + 4"), Ok(7.0));
    }

    #[test]
    fn test_nothing_absorbed() {
        let engine = Engine::new();
        assert_eq!(engine.run("42"), Ok(42.0));
        assert!(matches!(
            engine.run("4 + 2"),
            Err(EngineError::Parse(ParseError::UnexpectedChar { ch: '+', .. }))
        ));
    }

    #[test]
    fn test_depth_config() {
        let engine = Engine::with_config(EngineConfig {
            max_depth: 3,
            ..EngineConfig::default()
        });
        assert!(matches!(
            engine.run("((((1))))"),
            Err(EngineError::Parse(ParseError::TooDeep { limit: 3, .. }))
        ));
    }

    #[test]
    fn test_long_chain_runs_past_depth_limit() {
        let engine = arithmetic_engine();
        let source = vec!["1"; 5_000].join(" + ");
        assert_eq!(engine.run(&source), Ok(5_000.0));

        let source = vec!["2"; 3_000].join(" * 1 - 1 + ");
        // each separator contributes `* 1 - 1`
        assert_eq!(engine.run(&source), Ok(3_001.0));
    }

    #[test]
    fn test_long_chain_transpiles() {
        let engine = arithmetic_engine();
        let go = engine.transpile(&vec!["1"; 30_000].join("+")).unwrap();
        assert!(go.starts_with("package main\n"));
        assert_eq!(go.matches(" + ").count(), 29_999);
        assert!(!go.contains("/* "));
    }

    #[test]
    fn test_mount_pack() {
        let mut pack = LangPack::new("go");
        pack.precedence.insert("+".to_string(), 1);
        pack.eval_rules.insert("+".to_string(), "a + b".to_string());
        pack.ir_rules.insert("+".to_string(), "+".to_string());
        pack.bytecode.insert("+".to_string(), "ADD".to_string());

        let mut engine = Engine::new();
        engine.mount(&pack).unwrap();
        assert_eq!(engine.current_language(), "go");
        assert_eq!(engine.run("1 + 2 + 3"), Ok(6.0));
        assert_eq!(engine.ir_map()["+"], "+");
        assert_eq!(engine.bytecode_map()["+"], "ADD");
    }

    #[test]
    fn test_mount_strict_rejects_unknown_expression() {
        let mut pack = LangPack::new("odd");
        pack.precedence.insert("%".to_string(), 20);
        pack.eval_rules.insert("%".to_string(), "a % b".to_string());

        let mut engine = Engine::new();
        assert!(matches!(
            engine.mount(&pack),
            Err(MetaError::UnsupportedExpression { .. })
        ));
        assert!(engine.precedence_map().is_empty());
        assert_eq!(engine.current_language(), "");
    }

    #[test]
    fn test_mount_lenient_zero_function() {
        let mut pack = LangPack::new("odd");
        pack.precedence.insert("%".to_string(), 20);
        pack.eval_rules.insert("%".to_string(), "a % b".to_string());

        let mut engine = Engine::with_config(EngineConfig {
            strict_eval_rules: false,
            ..EngineConfig::default()
        });
        engine.mount(&pack).unwrap();
        assert_eq!(engine.run("7 % 3"), Ok(0.0));
    }

    #[test]
    fn test_transpile_go() {
        let engine = arithmetic_engine();
        let go = engine.transpile("3 + 5 * 2").unwrap();
        assert!(go.starts_with("package main\n"));
        assert!(go.contains("fmt.Println((3.0 + (5.0 * 2.0)))"));
    }

    #[test]
    fn test_transpile_parse_error() {
        let engine = arithmetic_engine();
        assert!(engine.transpile("3 +").is_err());
    }

    #[test]
    fn test_assemble_with_absorbed_mnemonics() {
        let mut engine = arithmetic_engine();
        engine.absorb_extended(
            "rust",
            &IndexMap::new(),
            &IndexMap::new(),
            &IndexMap::new(),
            &IndexMap::new(),
            &strings(&[("+", "ADD"), ("*", "MUL")]),
        );
        let bc = engine.assemble("PUSH 3\nPUSH 4\n+\nPUSH 2\n*\nHALT").unwrap();
        assert_eq!(bc.ops[2], OpCode::Add);
        assert_eq!(Vm::new().run(&bc), Ok(14.0));
    }
}
