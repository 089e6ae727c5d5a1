use std::path::PathBuf;

use thiserror::Error;

use super::read_spec::ColumnType;

pub type Result<T, E = SpectError> = std::result::Result<T, E>;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every failure the data layer can report. All of them are fail-fast: no
/// partial record or table is produced alongside an error.
#[derive(Debug, Error)]
pub enum SpectError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("experiment at index {index} was not loaded")]
    NotLoaded { index: usize },

    #[error("cannot compose a group with no experiments")]
    EmptyStore,

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("invalid argument: {0}")]
    Validation(String),

    #[error("invalid group definition {}: {source}", .path.display())]
    Definition {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SpectError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        SpectError::Validation(msg.into())
    }
}

// ---------------------------------------------------------------------------
// Load-time parse failures
// ---------------------------------------------------------------------------

/// Why a source file could not be turned into a record. Line numbers are
/// 1-based and count metadata lines too.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("header sentinel {sentinel:?} not found")]
    SentinelNotFound { sentinel: String },

    #[error("line {line}: expected 2 columns, found {found}")]
    RowShape { line: usize, found: usize },

    #[error("line {line}, column {column}: '{value}' is not a valid {ty}")]
    Cast {
        line: usize,
        column: usize,
        value: String,
        ty: ColumnType,
    },

    #[error("line {line}: {message}")]
    Csv { line: usize, message: String },

    #[error("line {line}: not valid UTF-8")]
    Encoding { line: usize },
}

// ---------------------------------------------------------------------------
// Subgroup index failures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("subgroup #{set}: index {index} is out of range for {len} experiments")]
    OutOfRange { set: usize, index: usize, len: usize },

    #[error("malformed index '{token}', expected an integer or a range like 2-5")]
    Malformed { token: String },
}
