use std::cell::RefCell;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::cache::{CacheHandle, Dependents};
use super::error::{ParseError, Result, SpectError};
use super::naming;
use super::read_spec::ReadSpec;

/// A record shared between a store and its subgroups.
pub type SharedRecord = Rc<RefCell<Record>>;

// ---------------------------------------------------------------------------
// RecordData – the two loaded columns
// ---------------------------------------------------------------------------

/// Key (wavelength) and value columns of a loaded record, equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordData {
    pub keys: Vec<f64>,
    pub values: Vec<f64>,
    /// Source name of the value column (the key is always `Wavelength`).
    pub value_name: String,
}

// ---------------------------------------------------------------------------
// Record – one experiment
// ---------------------------------------------------------------------------

/// One experiment: a two-column numeric table plus the metadata lines that
/// preceded it in the source file.
///
/// A record starts empty and becomes loaded through [`Record::load`],
/// [`Record::load_from_reader`] or [`Record::set_data`]. Every successful
/// (re)load invalidates the cached tables of all stores holding the record.
#[derive(Debug, Default)]
pub struct Record {
    name: Option<String>,
    source: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    data: Option<RecordData>,
    metadata_lines: Vec<String>,
    dependents: Dependents,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(source: impl Into<PathBuf>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::default()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Create and load a record from `source` in one step.
    pub fn from_file(source: impl Into<PathBuf>, spec: &ReadSpec) -> Result<Self> {
        let mut record = Self::with_source(source);
        record.load(spec)?;
        Ok(record)
    }

    /// Create a loaded record from in-memory columns.
    pub fn from_columns(keys: Vec<f64>, values: Vec<f64>) -> Result<Self> {
        let mut record = Self::new();
        record.set_data(keys, values)?;
        Ok(record)
    }

    pub fn into_shared(self) -> SharedRecord {
        Rc::new(RefCell::new(self))
    }

    // -- Loading --

    /// Read the record's source file according to `spec`.
    ///
    /// The file is opened, fully consumed and closed within this call. On
    /// failure the record keeps whatever it held before.
    pub fn load(&mut self, spec: &ReadSpec) -> Result<()> {
        let path = self
            .source
            .clone()
            .ok_or_else(|| SpectError::validation("record has no source file to load"))?;
        let file = File::open(&path).map_err(|source| SpectError::Io {
            path: path.clone(),
            source,
        })?;
        self.load_from_reader(BufReader::new(file), spec)
    }

    /// Parse an already opened source. Errors are labelled with the
    /// record's source path when it has one.
    pub fn load_from_reader<R: BufRead>(&mut self, reader: R, spec: &ReadSpec) -> Result<()> {
        let delimiter = spec.validate()?;
        let label = self
            .source
            .clone()
            .unwrap_or_else(|| PathBuf::from("<memory>"));

        let parsed = read_table(reader, spec, delimiter).map_err(|failure| match failure {
            ReadFailure::Io(source) => SpectError::Io {
                path: label.clone(),
                source,
            },
            ReadFailure::Parse(source) => SpectError::Parse {
                path: label.clone(),
                source,
            },
        })?;

        log::info!(
            "Loaded {} rows ({} metadata lines) from {}",
            parsed.data.keys.len(),
            parsed.metadata.len(),
            label.display()
        );

        self.metadata_lines = parsed.metadata;
        self.data = Some(parsed.data);
        self.invalidate_dependents();
        Ok(())
    }

    /// Replace the columns directly. Both must have the same length.
    pub fn set_data(&mut self, keys: Vec<f64>, values: Vec<f64>) -> Result<()> {
        if keys.len() != values.len() {
            return Err(SpectError::validation(format!(
                "key column has {} values but value column has {}",
                keys.len(),
                values.len()
            )));
        }
        self.data = Some(RecordData {
            keys,
            values,
            value_name: super::read_spec::DEFAULT_VALUE_NAME.to_string(),
        });
        self.invalidate_dependents();
        Ok(())
    }

    pub fn set_metadata_lines(&mut self, lines: Vec<String>) {
        self.metadata_lines = lines;
    }

    // -- Accessors --

    /// Whether both columns are populated.
    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }

    pub fn data(&self) -> Option<&RecordData> {
        self.data.as_ref()
    }

    pub fn keys(&self) -> Option<&[f64]> {
        self.data.as_ref().map(|d| d.keys.as_slice())
    }

    pub fn values(&self) -> Option<&[f64]> {
        self.data.as_ref().map(|d| d.values.as_slice())
    }

    /// Number of rows, zero while unloaded.
    pub fn len(&self) -> usize {
        self.data.as_ref().map_or(0, |d| d.keys.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn metadata_lines(&self) -> &[String] {
        &self.metadata_lines
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Point the record at a new source. The loaded data is kept until the
    /// next [`Record::load`].
    pub fn set_source(&mut self, source: impl Into<PathBuf>) {
        self.source = Some(source.into());
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    pub fn set_output_dir(&mut self, dir: Option<PathBuf>) {
        self.output_dir = dir;
    }

    /// Label for plot legends: the explicit name, else one derived from
    /// the source file name.
    pub fn legend_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        self.source
            .as_deref()
            .map(naming::legend_label)
            .unwrap_or_else(|| "unnamed".to_string())
    }

    /// File name used when this experiment's figure is written out.
    pub fn output_name(&self, format: &str) -> String {
        let stem = match (&self.name, &self.source) {
            (Some(name), _) => name.clone(),
            (None, Some(src)) => naming::file_stem(src),
            (None, None) => "unnamed".to_string(),
        };
        format!("{stem}.{format}")
    }

    // -- Dependent stores --

    pub(crate) fn attach(&mut self, cache: &CacheHandle) {
        self.dependents.attach(cache);
    }

    pub(crate) fn detach(&mut self, cache: &CacheHandle) {
        self.dependents.detach(cache);
    }

    /// Number of live stores that hold this record.
    pub fn dependent_count(&self) -> usize {
        self.dependents.len()
    }

    fn invalidate_dependents(&mut self) {
        let reached = self.dependents.invalidate_all();
        if reached > 0 {
            log::debug!("Record reload invalidated {reached} store cache(s)");
        }
    }
}

// ---------------------------------------------------------------------------
// Source parsing
// ---------------------------------------------------------------------------

struct ParsedTable {
    metadata: Vec<String>,
    data: RecordData,
}

enum ReadFailure {
    Io(std::io::Error),
    Parse(ParseError),
}

impl From<std::io::Error> for ReadFailure {
    fn from(err: std::io::Error) -> Self {
        ReadFailure::Io(err)
    }
}

impl From<ParseError> for ReadFailure {
    fn from(err: ParseError) -> Self {
        ReadFailure::Parse(err)
    }
}

/// Layout:
///
/// ```text
/// metadata line …        ┐ only when a sentinel is configured
/// >>>>>Begin Spectral Data<<<<<   ┘
/// 400.12<TAB>0.0312
/// …
/// ```
fn read_table<R: BufRead>(
    mut reader: R,
    spec: &ReadSpec,
    delimiter: u8,
) -> std::result::Result<ParsedTable, ReadFailure> {
    let mut metadata = Vec::new();
    let mut offset = 0usize;

    if let Some(sentinel) = spec.normalized_sentinel() {
        let mut found = false;
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            offset += 1;
            let raw = std::str::from_utf8(&buf)
                .map_err(|_| ParseError::Encoding { line: offset })?;
            if raw.trim_end_matches(['\n', '\r']) == sentinel {
                found = true;
                break;
            }
            metadata.push(raw.to_string());
        }
        if !found {
            return Err(ParseError::SentinelNotFound {
                sentinel: sentinel.to_string(),
            }
            .into());
        }
    }

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let (key_ty, value_ty) = (spec.column_types[0], spec.column_types[1]);
    let mut keys = Vec::new();
    let mut values = Vec::new();

    for result in csv_reader.records() {
        let row = result.map_err(|e| csv_failure(e, offset))?;
        let line = offset + row.position().map_or(0, |p| p.line() as usize);
        if row.len() != 2 {
            return Err(ParseError::RowShape {
                line,
                found: row.len(),
            }
            .into());
        }
        keys.push(key_ty.cast(&row[0], line, 1)?);
        values.push(value_ty.cast(&row[1], line, 2)?);
    }

    Ok(ParsedTable {
        metadata,
        data: RecordData {
            keys,
            values,
            value_name: spec.value_name().to_string(),
        },
    })
}

fn csv_failure(err: csv::Error, offset: usize) -> ReadFailure {
    let line = offset + err.position().map_or(0, |p| p.line() as usize);
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(io) => ReadFailure::Io(io),
        csv::ErrorKind::Utf8 { .. } => ReadFailure::Parse(ParseError::Encoding { line }),
        _ => ReadFailure::Parse(ParseError::Csv { line, message }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::read_spec::ColumnType;

    fn load_str(text: &str, spec: &ReadSpec) -> Result<Record> {
        let mut record = Record::new();
        record.load_from_reader(text.as_bytes(), spec)?;
        Ok(record)
    }

    #[test]
    fn metadata_is_split_from_data_at_the_sentinel() {
        let spec = ReadSpec::default().with_sentinel("BEGIN\n");
        let text = "Data from x.txt\nIntegration Time: 100\nBEGIN\n1.0\t0.5\n2.0\t0.6\n3.0\t0.7\n";
        let record = load_str(text, &spec).unwrap();

        assert_eq!(
            record.metadata_lines(),
            ["Data from x.txt\n", "Integration Time: 100\n"]
        );
        assert_eq!(record.len(), 3);
        assert_eq!(record.keys().unwrap(), [1.0, 2.0, 3.0]);
        assert_eq!(record.values().unwrap(), [0.5, 0.6, 0.7]);
    }

    #[test]
    fn crlf_line_endings_match_the_sentinel() {
        let spec = ReadSpec::default().with_sentinel("BEGIN");
        let record = load_str("meta\r\nBEGIN\r\n1\t2\r\n", &spec).unwrap();
        assert_eq!(record.metadata_lines(), ["meta\r\n"]);
        assert_eq!(record.metadata_lines().concat(), "meta\r\n");
        assert_eq!(record.values().unwrap(), [2.0]);
    }

    #[test]
    fn headerless_file_has_no_metadata() {
        let spec = ReadSpec::headerless(',');
        let record = load_str("1,10\n2,20\n", &spec).unwrap();
        assert!(record.metadata_lines().is_empty());
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn missing_sentinel_is_a_parse_error_and_leaves_record_unloaded() {
        let spec = ReadSpec::default().with_sentinel("BEGIN");
        let mut record = Record::new();
        let err = record
            .load_from_reader("meta\n1\t2\n".as_bytes(), &spec)
            .unwrap_err();
        assert!(matches!(
            err,
            SpectError::Parse {
                source: ParseError::SentinelNotFound { .. },
                ..
            }
        ));
        assert!(!record.is_loaded());
    }

    #[test]
    fn sentinel_with_no_rows_loads_empty() {
        let spec = ReadSpec::default().with_sentinel("BEGIN");
        let record = load_str("meta\nBEGIN\n", &spec).unwrap();
        assert!(record.is_loaded());
        assert!(record.is_empty());
    }

    #[test]
    fn wrong_column_count_reports_the_file_line() {
        let spec = ReadSpec::default().with_sentinel("BEGIN");
        let err = load_str("m1\nm2\nBEGIN\n1\t2\n3\t4\t5\n", &spec).unwrap_err();
        match err {
            SpectError::Parse {
                source: ParseError::RowShape { line, found },
                ..
            } => {
                assert_eq!(line, 5);
                assert_eq!(found, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_utf8_is_a_parse_error_with_its_line() {
        let spec = ReadSpec::default().with_sentinel("BEGIN");
        let mut record = Record::new();

        let err = record
            .load_from_reader(&b"ok\nbad \xff\nBEGIN\n1\t2\n"[..], &spec)
            .unwrap_err();
        assert!(matches!(
            err,
            SpectError::Parse {
                source: ParseError::Encoding { line: 2 },
                ..
            }
        ));

        let err = record
            .load_from_reader(&b"m\nBEGIN\n1\t2\n3\t\xff\n"[..], &spec)
            .unwrap_err();
        assert!(matches!(
            err,
            SpectError::Parse {
                source: ParseError::Encoding { line: 4 },
                ..
            }
        ));
        assert!(!record.is_loaded());
    }

    #[test]
    fn cast_failure_is_a_parse_error() {
        let spec = ReadSpec::headerless('\t').with_column_types(ColumnType::Int64, ColumnType::Float64);
        let err = load_str("1.5\t2\n", &spec).unwrap_err();
        assert!(matches!(
            err,
            SpectError::Parse {
                source: ParseError::Cast { column: 1, .. },
                ..
            }
        ));
    }

    #[test]
    fn failed_reload_keeps_previous_data() {
        let spec = ReadSpec::headerless('\t');
        let mut record = load_str("1\t2\n", &spec).unwrap();
        assert!(record.load_from_reader("oops\n".as_bytes(), &spec).is_err());
        assert_eq!(record.values().unwrap(), [2.0]);
    }

    #[test]
    fn value_column_keeps_its_source_name() {
        let spec = ReadSpec::headerless('\t').with_column_names("nm", "Absorbance");
        let record = load_str("1\t2\n", &spec).unwrap();
        assert_eq!(record.data().unwrap().value_name, "Absorbance");
    }

    #[test]
    fn set_data_rejects_mismatched_lengths() {
        let err = Record::from_columns(vec![1.0, 2.0], vec![1.0]).unwrap_err();
        assert!(matches!(err, SpectError::Validation(_)));
    }

    #[test]
    fn load_without_source_is_a_validation_error() {
        let err = Record::new().load(&ReadSpec::default()).unwrap_err();
        assert!(matches!(err, SpectError::Validation(_)));
    }

    #[test]
    fn names_prefer_explicit_name() {
        let record = Record::with_source("/data/Abs_S1_12-01-02-003.txt").named("Run 1");
        assert_eq!(record.legend_name(), "Run 1");
        assert_eq!(record.output_name("png"), "Run 1.png");

        let record = Record::with_source("/data/Abs_S1_12-01-02-003.txt");
        assert_eq!(record.legend_name(), "S1");
        assert_eq!(record.output_name("png"), "Abs_S1_12-01-02-003.png");
    }
}
