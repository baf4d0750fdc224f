use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading a schema or a language pack.
///
/// `line` values are 1-based and point into the file being read, so a
/// diagnostic can be printed as `path:line: message`.
#[derive(Debug, Error)]
pub enum MetaError {
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("format error at line {line}: {message}")]
    Format { line: usize, message: String },

    #[error("unsupported evaluation expression for '{op}': \"{text}\"")]
    UnsupportedExpression { op: String, text: String },
}

impl MetaError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MetaError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn format(line: usize, message: impl Into<String>) -> Self {
        MetaError::Format {
            line,
            message: message.into(),
        }
    }

    /// Line number for format errors, `None` for everything else.
    pub fn line(&self) -> Option<usize> {
        match self {
            MetaError::Format { line, .. } => Some(*line),
            _ => None,
        }
    }
}
