use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::meta::meta_error::MetaError;

/// Shape of a configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// `key: value` on a single line.
    Scalar,
    /// `key:` header followed by `name: value` lines.
    Mapping,
}

/// Expected type of a scalar value, or of every value in a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    String,
    Int,
    Expression,
}

impl ValueKind {
    fn parse(text: &str) -> Option<Self> {
        match text {
            "string" => Some(ValueKind::String),
            "int" => Some(ValueKind::Int),
            "expression" => Some(ValueKind::Expression),
            _ => None,
        }
    }
}

/// One recognized configuration key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaEntry {
    pub key: String,
    pub kind: EntryKind,
    pub value_kind: ValueKind,
}

/// Ordered list of keys a language pack may contain.
///
/// A schema file is a sequence of three-line records:
///
/// ```text
/// key: operators
/// type: map
/// value: int
/// ```
///
/// Blank lines, `#` comments and a leading `- ` list marker are tolerated.
/// Lines outside a record that do not start one are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRegistry {
    entries: Vec<SchemaEntry>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, MetaError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| MetaError::io(path, e))?;
        let registry = Self::parse_str(&text)?;
        debug!(path = %path.display(), entries = registry.entries.len(), "schema loaded");
        Ok(registry)
    }

    pub fn parse_str(text: &str) -> Result<Self, MetaError> {
        let mut registry = SchemaRegistry::new();
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, clean(l)))
            .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'));

        while let Some((line_no, line)) = lines.next() {
            let Some(key) = field(line, "key") else {
                continue;
            };
            if key.is_empty() {
                return Err(MetaError::format(line_no, "empty schema key"));
            }

            let (type_line, type_text) = expect_field(lines.next(), "type", line_no)?;
            let (value_line, value_text) = expect_field(lines.next(), "value", type_line)?;

            let (kind, scalar_kind) = match type_text {
                "map" | "mapping" => (EntryKind::Mapping, None),
                "scalar" => (EntryKind::Scalar, None),
                other => match ValueKind::parse(other) {
                    Some(vk) => (EntryKind::Scalar, Some(vk)),
                    None => {
                        return Err(MetaError::format(
                            type_line,
                            format!("unknown type '{}' for key '{}'", other, key),
                        ));
                    }
                },
            };

            let value_kind = ValueKind::parse(value_text).ok_or_else(|| {
                MetaError::format(
                    value_line,
                    format!("unknown value kind '{}' for key '{}'", value_text, key),
                )
            })?;

            if let Some(declared) = scalar_kind {
                if declared != value_kind {
                    return Err(MetaError::format(
                        value_line,
                        format!(
                            "scalar key '{}' declares type {:?} but value {:?}",
                            key, declared, value_kind
                        ),
                    ));
                }
            }

            if registry.contains(key) {
                return Err(MetaError::format(
                    line_no,
                    format!("duplicate schema key '{}'", key),
                ));
            }

            registry.entries.push(SchemaEntry {
                key: key.to_string(),
                kind,
                value_kind,
            });
        }

        Ok(registry)
    }

    pub fn entries(&self) -> &[SchemaEntry] {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&SchemaEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn clean(line: &str) -> &str {
    let line = line.trim();
    line.strip_prefix("- ").map(str::trim_start).unwrap_or(line)
}

/// Returns the trimmed text after `name:` when `line` is that field.
fn field<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    line.strip_prefix(name)
        .and_then(|rest| rest.strip_prefix(':'))
        .map(str::trim)
}

fn expect_field<'a>(
    next: Option<(usize, &'a str)>,
    name: &str,
    prev_line: usize,
) -> Result<(usize, &'a str), MetaError> {
    match next {
        Some((line_no, line)) => field(line, name).map(|v| (line_no, v)).ok_or_else(|| {
            MetaError::format(line_no, format!("expected '{}:' line, found '{}'", name, line))
        }),
        None => Err(MetaError::format(
            prev_line,
            format!("unexpected end of schema, expected '{}:' line", name),
        )),
    }
}
