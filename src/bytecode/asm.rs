use indexmap::IndexMap;
use thiserror::Error;

use crate::bytecode::{Bytecode, OpCode};

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{line}: {message}")]
pub struct AsmError {
    pub line: usize,
    pub message: String,
}

impl AsmError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Assembles a textual program, one instruction per line:
///
/// ```text
/// PUSH 3      ; operands go to the data table
/// PUSH 4
/// +           ; operator symbols resolve through `mnemonics`
/// HALT
/// ```
///
/// `mnemonics` is an operator -> mnemonic table such as the one a language
/// pack declares under `bytecode:`. Mnemonics are matched case-insensitively.
/// Text after `;` or `#` is a comment.
pub fn assemble(text: &str, mnemonics: &IndexMap<String, String>) -> Result<Bytecode, AsmError> {
    let mut bc = Bytecode::new();

    for (i, raw) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = raw
            .split(|c| c == ';' || c == '#')
            .next()
            .unwrap_or("")
            .trim();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.split_whitespace();
        let Some(head) = parts.next() else {
            continue;
        };
        let operand = parts.next();
        if let Some(extra) = parts.next() {
            return Err(AsmError::new(line_no, format!("unexpected '{}'", extra)));
        }

        let op = resolve(head, mnemonics)
            .ok_or_else(|| AsmError::new(line_no, format!("unknown instruction '{}'", head)))?;

        match (op, operand) {
            (OpCode::Push, Some(text)) => {
                let value = text.parse::<f64>().map_err(|_| {
                    AsmError::new(line_no, format!("invalid PUSH operand '{}'", text))
                })?;
                bc.push(value);
            }
            (OpCode::Push, None) => {
                return Err(AsmError::new(line_no, "PUSH needs an operand"));
            }
            (op, Some(text)) => {
                return Err(AsmError::new(
                    line_no,
                    format!("{} takes no operand, got '{}'", op, text),
                ));
            }
            (op, None) => {
                bc.op(op);
            }
        }
    }

    Ok(bc)
}

fn resolve(head: &str, mnemonics: &IndexMap<String, String>) -> Option<OpCode> {
    OpCode::from_mnemonic(head).or_else(|| {
        mnemonics
            .get(head)
            .and_then(|m| OpCode::from_mnemonic(m))
            .filter(|op| *op != OpCode::Push)
    })
}
