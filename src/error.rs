// error.rs

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Failure kinds surfaced by the calculator. Users only ever see "Error";
/// the kind is for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidCharacter,
    SyntaxError,
    MathError,
    StorageWriteFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidCharacter => "InvalidCharacter",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::MathError => "MathError",
            ErrorKind::StorageWriteFailure => "StorageWriteFailure",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("invalid character '{0}' in expression")]
    InvalidCharacter(char),
    #[error("syntax error: {0}")]
    SyntaxError(String),
    #[error("math error: result is {0}")]
    MathError(f64),
}

impl EvalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::InvalidCharacter(_) => ErrorKind::InvalidCharacter,
            EvalError::SyntaxError(_) => ErrorKind::SyntaxError,
            EvalError::MathError(_) => ErrorKind::MathError,
        }
    }

    pub(crate) fn syntax<S: Into<String>>(msg: S) -> Self {
        EvalError::SyntaxError(msg.into())
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },
    #[error("storage i/o on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("stored history is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("history write failed: {0}")]
    StorageWriteFailure(#[source] StorageError),
    #[error("history read failed: {0}")]
    StorageReadFailure(#[source] StorageError),
    #[error("cannot write export file {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HistoryError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            HistoryError::StorageWriteFailure(_) => Some(ErrorKind::StorageWriteFailure),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eval_errors_map_to_kinds() {
        assert_eq!(EvalError::InvalidCharacter('a').kind(), ErrorKind::InvalidCharacter);
        assert_eq!(EvalError::syntax("x").kind(), ErrorKind::SyntaxError);
        assert_eq!(EvalError::MathError(f64::INFINITY).kind(), ErrorKind::MathError);
    }

    #[test]
    fn write_failure_is_storage_kind() {
        let err = HistoryError::StorageWriteFailure(StorageError::QuotaExceeded { needed: 10, quota: 5 });
        assert_eq!(err.kind(), Some(ErrorKind::StorageWriteFailure));
        assert_eq!(err.kind().map(|k| k.to_string()).as_deref(), Some("StorageWriteFailure"));
    }
}
