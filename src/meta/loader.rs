use std::path::Path;

use regex::Regex;
use tracing::{debug, trace};

use crate::bytecode::op::OpCode;
use crate::meta::meta_error::MetaError;
use crate::meta::pack::LangPack;
use crate::meta::schema::{EntryKind, SchemaRegistry};

/// Section cursor of the sectioned pack format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Tokens,
    Operators,
    Evaluate,
    Ir,
    Bytecode,
    /// A `name:` header this loader has no table for. Its entries are skipped.
    Unknown,
}

impl Section {
    fn from_header(name: &str) -> Option<Self> {
        match name {
            "tokens" => Some(Section::Tokens),
            "operators" => Some(Section::Operators),
            "evaluate" => Some(Section::Evaluate),
            "ir" => Some(Section::Ir),
            "bytecode" => Some(Section::Bytecode),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Section::None => "",
            Section::Tokens => "tokens",
            Section::Operators => "operators",
            Section::Evaluate => "evaluate",
            Section::Ir => "ir",
            Section::Bytecode => "bytecode",
            Section::Unknown => "?",
        }
    }

    fn is_known(self) -> bool {
        !matches!(self, Section::None | Section::Unknown)
    }
}

fn is_section_name(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Reads language packs.
///
/// The canonical format is sectioned:
///
/// ```text
/// language: rust
/// operators:
///   +: 10
///   *: 20
/// evaluate:
///   +: "a + b"
///   *: "a * b"
/// ```
///
/// When a schema is attached, every section header and the `language` key
/// must be declared in it with a matching shape.
#[derive(Debug, Clone, Default)]
pub struct PackLoader {
    schema: Option<SchemaRegistry>,
}

impl PackLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(schema: SchemaRegistry) -> Self {
        Self {
            schema: Some(schema),
        }
    }

    pub fn schema(&self) -> Option<&SchemaRegistry> {
        self.schema.as_ref()
    }

    /// Loads the schema at `schema_path`, then parses the pack at `pack_path`
    /// against it.
    pub fn parse(
        schema_path: impl AsRef<Path>,
        pack_path: impl AsRef<Path>,
    ) -> Result<LangPack, MetaError> {
        let schema = SchemaRegistry::load(schema_path)?;
        PackLoader::with_schema(schema).read_file(pack_path)
    }

    /// Parses a pack without schema checks.
    pub fn load(pack_path: impl AsRef<Path>) -> Result<LangPack, MetaError> {
        PackLoader::new().read_file(pack_path)
    }

    pub fn read_file(&self, pack_path: impl AsRef<Path>) -> Result<LangPack, MetaError> {
        let path = pack_path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| MetaError::io(path, e))?;
        let pack = self.parse_str(&text)?;
        debug!(
            path = %path.display(),
            language = %pack.name,
            tokens = pack.tokens.len(),
            operators = pack.precedence.len(),
            eval_rules = pack.eval_rules.len(),
            ir_rules = pack.ir_rules.len(),
            bytecode = pack.bytecode.len(),
            "pack loaded"
        );
        Ok(pack)
    }

    pub fn parse_str(&self, text: &str) -> Result<LangPack, MetaError> {
        let mut pack = LangPack::default();
        let mut section = Section::None;

        for (i, raw) in text.lines().enumerate() {
            let line_no = i + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                trace!(line = line_no, "line without ':' ignored");
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            if key == "language" {
                self.check_declared(line_no, key, EntryKind::Scalar)?;
                let name = unquote(value);
                if name.is_empty() {
                    return Err(MetaError::format(line_no, "empty language name"));
                }
                pack.name = name.to_string();
                continue;
            }

            if value.is_empty() {
                if let Some(s) = Section::from_header(key) {
                    self.check_declared(line_no, key, EntryKind::Mapping)?;
                    section = s;
                    continue;
                }
                // An unindented bare word opens a section this loader skips;
                // anything else under a known section is an entry with no value.
                let unknown_header = !raw.starts_with(char::is_whitespace) && is_section_name(key);
                if unknown_header || !section.is_known() {
                    trace!(line = line_no, header = %key, "unknown section");
                    section = Section::Unknown;
                    continue;
                }
                return Err(MetaError::format(
                    line_no,
                    format!("entry '{}' in section '{}' has no value", key, section.name()),
                ));
            }

            let value = unquote(value);
            match section {
                Section::Tokens => {
                    Regex::new(value).map_err(|e| {
                        MetaError::format(
                            line_no,
                            format!("token '{}' has invalid pattern: {}", key, e),
                        )
                    })?;
                    pack.tokens.insert(key.to_string(), value.to_string());
                }
                Section::Operators => {
                    let prec = value.parse::<i32>().map_err(|_| {
                        MetaError::format(
                            line_no,
                            format!("operator '{}' has non-numeric precedence '{}'", key, value),
                        )
                    })?;
                    pack.precedence.insert(key.to_string(), prec);
                }
                Section::Evaluate => {
                    pack.eval_rules.insert(key.to_string(), value.to_string());
                }
                Section::Ir => {
                    pack.ir_rules.insert(key.to_string(), value.to_string());
                }
                Section::Bytecode => {
                    if OpCode::from_mnemonic(value).is_none() {
                        return Err(MetaError::format(
                            line_no,
                            format!("operator '{}' maps to unknown opcode '{}'", key, value),
                        ));
                    }
                    pack.bytecode.insert(key.to_string(), value.to_string());
                }
                Section::None | Section::Unknown => {
                    trace!(line = line_no, key = %key, "entry outside a known section ignored");
                }
            }
        }

        Ok(pack)
    }

    fn check_declared(&self, line: usize, key: &str, kind: EntryKind) -> Result<(), MetaError> {
        let Some(schema) = &self.schema else {
            return Ok(());
        };
        match schema.get(key) {
            None => Err(MetaError::format(
                line,
                format!("schema mismatch: key '{}' is not declared", key),
            )),
            Some(entry) if entry.kind != kind => Err(MetaError::format(
                line,
                format!(
                    "schema mismatch: key '{}' is declared {:?} but used as {:?}",
                    key, entry.kind, kind
                ),
            )),
            Some(_) => Ok(()),
        }
    }

    /// Schema-matched loading kept for packs written against the first
    /// loader.
    ///
    /// Every line is tested against each schema key's `key:` prefix and fills
    /// one fixed slot. This is deliberately partial: `tokens` always yields
    /// `number = [0-9]+`, `operators` only knows `+` and `-` (precedence 10,
    /// detected by substring), `evaluate` always binds `+` to `a + b` and
    /// `bytecode` always binds `+` to `ADD`. Use [`PackLoader::parse`] for
    /// anything real.
    pub fn parse_legacy(
        schema_path: impl AsRef<Path>,
        pack_path: impl AsRef<Path>,
    ) -> Result<LangPack, MetaError> {
        let schema = SchemaRegistry::load(schema_path)?;
        let path = pack_path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| MetaError::io(path, e))?;
        Ok(Self::parse_legacy_str(&schema, &text))
    }

    pub fn parse_legacy_str(schema: &SchemaRegistry, text: &str) -> LangPack {
        let mut pack = LangPack::default();

        for line in text.lines() {
            for entry in schema.entries() {
                let Some(value) = line
                    .strip_prefix(entry.key.as_str())
                    .and_then(|rest| rest.strip_prefix(':'))
                else {
                    continue;
                };
                let value = value.trim();

                match (entry.key.as_str(), entry.kind) {
                    ("language", _) => pack.name = unquote(value).to_string(),
                    ("tokens", EntryKind::Mapping) => {
                        pack.tokens.insert("number".to_string(), "[0-9]+".to_string());
                    }
                    ("operators", EntryKind::Mapping) => {
                        if value.contains('+') {
                            pack.precedence.insert("+".to_string(), 10);
                        }
                        if value.contains('-') {
                            pack.precedence.insert("-".to_string(), 10);
                        }
                    }
                    ("evaluate", _) => {
                        pack.eval_rules.insert("+".to_string(), "a + b".to_string());
                    }
                    ("bytecode", _) => {
                        pack.bytecode.insert("+".to_string(), "ADD".to_string());
                    }
                    _ => {}
                }
            }
        }

        pack
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
