//! Legend labels from OceanView-style file names.
//!
//! Recognised layouts (extension stripped first):
//!
//! * `Type_Sample_HH-MM-SS-mmm`
//! * `Type_Sample_Background_HH-MM-SS-mmm`
//! * `Type_Sample_Background_Type2_Number`
//! * `Type_Sample_Type2_Number`

use std::path::Path;

/// Fields pulled out of a recognised file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNameParts {
    pub kind: String,
    pub sample: String,
    pub background: Option<String>,
    /// `HH-MM-SS-mmm` for timestamped exports.
    pub timestamp: Option<String>,
    pub kind2: Option<String>,
    pub number: Option<String>,
    pub extension: String,
}

impl FileNameParts {
    /// `Sample`, or `Sample | BK: Background` when a background is named.
    pub fn legend(&self) -> String {
        match &self.background {
            Some(bk) => format!("{} | BK: {bk}", self.sample),
            None => self.sample.clone(),
        }
    }
}

/// Parse a bare file name such as `Abs_S1_BK2_10-31-07-120.txt`.
pub fn parse_file_name(file_name: &str) -> Option<FileNameParts> {
    let (stem, extension) = file_name.rsplit_once('.')?;
    if extension.is_empty() {
        return None;
    }
    let fields: Vec<&str> = stem.split('_').collect();
    if fields.iter().any(|f| f.is_empty()) {
        return None;
    }

    let owned = |s: &str| s.to_string();
    let base = |kind: &str, sample: &str| FileNameParts {
        kind: owned(kind),
        sample: owned(sample),
        background: None,
        timestamp: None,
        kind2: None,
        number: None,
        extension: owned(extension),
    };

    match fields.as_slice() {
        &[kind, sample, ts] if is_timestamp(ts) => Some(FileNameParts {
            timestamp: Some(owned(ts)),
            ..base(kind, sample)
        }),
        &[kind, sample, bk, ts] if is_timestamp(ts) => Some(FileNameParts {
            background: Some(owned(bk)),
            timestamp: Some(owned(ts)),
            ..base(kind, sample)
        }),
        &[kind, sample, bk, kind2, number] => Some(FileNameParts {
            background: Some(owned(bk)),
            kind2: Some(owned(kind2)),
            number: Some(owned(number)),
            ..base(kind, sample)
        }),
        &[kind, sample, kind2, number] => Some(FileNameParts {
            kind2: Some(owned(kind2)),
            number: Some(owned(number)),
            ..base(kind, sample)
        }),
        _ => None,
    }
}

/// Legend label for `path`, falling back to the file stem.
pub fn legend_label(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(parse_file_name)
        .map(|parts| parts.legend())
        .unwrap_or_else(|| file_stem(path))
}

/// File name up to the first `.`.
pub fn file_stem(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.split('.').next().unwrap_or(n).to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn is_timestamp(field: &str) -> bool {
    let parts: Vec<&str> = field.split('-').collect();
    parts.len() == 4
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}
