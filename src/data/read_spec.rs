use std::fmt;

use serde::Deserialize;

use super::error::{ParseError, Result, SpectError};
use super::KEY_COLUMN;

/// Sentinel line written by OceanView before the data block.
pub const DEFAULT_SENTINEL: &str = ">>>>>Begin Spectral Data<<<<<";

/// Default name of the dependent-variable column.
pub const DEFAULT_VALUE_NAME: &str = "Measure";

// ---------------------------------------------------------------------------
// ColumnType – how a cell is cast before it is widened to f64
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    Float64,
    Float32,
    Int64,
}

impl ColumnType {
    /// Parse one trimmed cell. `line`/`column` only feed the error.
    pub fn cast(self, raw: &str, line: usize, column: usize) -> Result<f64, ParseError> {
        let cell = raw.trim();
        let parsed = match self {
            ColumnType::Float64 => cell.parse::<f64>().ok(),
            ColumnType::Float32 => cell.parse::<f32>().ok().map(f64::from),
            ColumnType::Int64 => cell.parse::<i64>().ok().map(|v| v as f64),
        };
        parsed.ok_or_else(|| ParseError::Cast {
            line,
            column,
            value: cell.to_string(),
            ty: self,
        })
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Float64 => write!(f, "float64"),
            ColumnType::Float32 => write!(f, "float32"),
            ColumnType::Int64 => write!(f, "int64"),
        }
    }
}

// ---------------------------------------------------------------------------
// ReadSpec – how a source file is read
// ---------------------------------------------------------------------------

/// Load parameters for a two-column experiment file.
///
/// Deserializes from the `readDict` object of a group definition; the
/// short keys `delim`, `begin_line` and `col_names` are accepted too.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReadSpec {
    #[serde(alias = "delim")]
    pub delimiter: char,
    #[serde(alias = "begin_line")]
    pub sentinel: Option<String>,
    pub column_types: Vec<ColumnType>,
    #[serde(alias = "col_names")]
    pub column_names: Vec<String>,
}

impl Default for ReadSpec {
    /// The OceanView 1.6 export layout.
    fn default() -> Self {
        Self {
            delimiter: '\t',
            sentinel: Some(DEFAULT_SENTINEL.to_string()),
            column_types: vec![ColumnType::Float64, ColumnType::Float64],
            column_names: vec![KEY_COLUMN.to_string(), DEFAULT_VALUE_NAME.to_string()],
        }
    }
}

impl ReadSpec {
    /// A plain delimited table with no metadata block.
    pub fn headerless(delimiter: char) -> Self {
        Self {
            delimiter,
            sentinel: None,
            ..Self::default()
        }
    }

    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = Some(sentinel.into());
        self
    }

    pub fn with_column_types(mut self, key: ColumnType, value: ColumnType) -> Self {
        self.column_types = vec![key, value];
        self
    }

    pub fn with_column_names(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.column_names = vec![key.into(), value.into()];
        self
    }

    /// Check arity and the delimiter, returning the delimiter as a byte.
    pub fn validate(&self) -> Result<u8> {
        if self.column_types.len() != 2 {
            return Err(SpectError::validation(format!(
                "expected 2 column types, got {}",
                self.column_types.len()
            )));
        }
        if self.column_names.len() != 2 {
            return Err(SpectError::validation(format!(
                "expected 2 column names, got {}",
                self.column_names.len()
            )));
        }
        if !self.delimiter.is_ascii() || self.delimiter == '\n' || self.delimiter == '\r' {
            return Err(SpectError::validation(format!(
                "delimiter {:?} must be a single ASCII character other than a line break",
                self.delimiter
            )));
        }
        Ok(self.delimiter as u8)
    }

    /// Sentinel with any trailing line terminator removed.
    pub fn normalized_sentinel(&self) -> Option<&str> {
        self.sentinel
            .as_deref()
            .map(|s| s.trim_end_matches(['\n', '\r']))
    }

    /// Name given to the value column; the key column is always
    /// [`KEY_COLUMN`].
    pub fn value_name(&self) -> &str {
        self.column_names
            .get(1)
            .map(String::as_str)
            .unwrap_or(DEFAULT_VALUE_NAME)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_oceanview_layout() {
        let spec = ReadSpec::default();
        assert_eq!(spec.delimiter, '\t');
        assert_eq!(spec.normalized_sentinel(), Some(DEFAULT_SENTINEL));
        assert_eq!(spec.validate().unwrap(), b'\t');
    }

    #[test]
    fn sentinel_trailing_newline_is_trimmed() {
        let spec = ReadSpec::default().with_sentinel("BEGIN\r\n");
        assert_eq!(spec.normalized_sentinel(), Some("BEGIN"));
    }

    #[test]
    fn wrong_arity_is_a_validation_error() {
        let mut spec = ReadSpec::default();
        spec.column_names.push("extra".into());
        assert!(matches!(spec.validate(), Err(SpectError::Validation(_))));

        let mut spec = ReadSpec::default();
        spec.column_types.clear();
        assert!(matches!(spec.validate(), Err(SpectError::Validation(_))));
    }

    #[test]
    fn non_ascii_delimiter_is_rejected() {
        let spec = ReadSpec::headerless('µ');
        assert!(matches!(spec.validate(), Err(SpectError::Validation(_))));
    }

    #[test]
    fn deserializes_legacy_read_dict_keys() {
        let spec: ReadSpec = serde_json::from_str(
            r#"{"delim": ",", "begin_line": "BEGIN\n", "col_names": ["wl", "abs"],
                "column_types": ["float64", "float32"]}"#,
        )
        .unwrap();
        assert_eq!(spec.delimiter, ',');
        assert_eq!(spec.normalized_sentinel(), Some("BEGIN"));
        assert_eq!(spec.value_name(), "abs");
        assert_eq!(spec.column_types[1], ColumnType::Float32);
    }

    #[test]
    fn cast_reports_position_and_type() {
        assert_eq!(ColumnType::Int64.cast(" 42 ", 3, 1).unwrap(), 42.0);
        let err = ColumnType::Int64.cast("4.5", 7, 2).unwrap_err();
        assert_eq!(
            err,
            ParseError::Cast {
                line: 7,
                column: 2,
                value: "4.5".into(),
                ty: ColumnType::Int64
            }
        );
    }
}
