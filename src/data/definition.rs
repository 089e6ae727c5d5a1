//! Declarative group definitions.
//!
//! ```json
//! {
//!   "readDict": { "delim": "\t", "begin_line": ">>>>>Begin Spectral Data<<<<<\n" },
//!   "baseline": { "sourceFile": "raw/base.txt", "outputPath": "out", "name": "Baseline" },
//!   "runs": {
//!     "sourceFile": "raw/run_{}.txt", "outputPath": "out", "name": "Run {}",
//!     "range": [1, 9, 2]
//!   }
//! }
//! ```
//!
//! Every key except `readDict` is one experiment, or a batch of them when a
//! `range` of `[start, end]` or `[start, end, step]` (end inclusive) is
//! given. Experiments keep document order.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::error::{Result, SpectError};
use super::read_spec::ReadSpec;

const READ_SPEC_KEY: &str = "readDict";
const MAX_FIELD_WIDTH: usize = 32;

// ---------------------------------------------------------------------------
// Raw entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentDef {
    pub source_file: String,
    pub output_path: String,
    pub name: String,
    #[serde(default)]
    pub range: Option<Vec<i64>>,
}

/// One concrete experiment after range expansion and path resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentSpec {
    /// Key of the entry it came from.
    pub key: String,
    pub source_file: PathBuf,
    pub output_path: PathBuf,
    pub name: String,
}

// ---------------------------------------------------------------------------
// GroupDefinition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct GroupDefinition {
    pub read_spec: ReadSpec,
    pub entries: Vec<(String, ExperimentDef)>,
    /// Relative paths in entries resolve against this directory.
    pub base_dir: PathBuf,
}

impl GroupDefinition {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| SpectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text, path)
    }

    /// Parse `text` as if it had been read from `origin`.
    pub fn from_json_str(text: &str, origin: &Path) -> Result<Self> {
        let root: JsonValue =
            serde_json::from_str(text).map_err(|source| SpectError::Definition {
                path: origin.to_path_buf(),
                source,
            })?;
        let JsonValue::Object(map) = root else {
            return Err(SpectError::validation(
                "group definition must be a JSON object",
            ));
        };

        let mut read_spec = ReadSpec::default();
        let mut entries = Vec::with_capacity(map.len());
        for (key, value) in map {
            if key == READ_SPEC_KEY {
                read_spec = serde_json::from_value(value).map_err(|e| {
                    SpectError::validation(format!("{READ_SPEC_KEY}: {e}"))
                })?;
                read_spec.validate()?;
                continue;
            }
            let def: ExperimentDef = serde_json::from_value(value)
                .map_err(|e| SpectError::validation(format!("experiment '{key}': {e}")))?;
            entries.push((key, def));
        }

        let base_dir = origin
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(Self {
            read_spec,
            entries,
            base_dir,
        })
    }

    /// Expand ranges and resolve paths, in document order.
    pub fn expand(&self) -> Result<Vec<ExperimentSpec>> {
        let mut out = Vec::new();
        for (key, def) in &self.entries {
            match &def.range {
                None => out.push(self.concrete(key, def, None)?),
                Some(range) => {
                    for num in expand_range(key, range)? {
                        out.push(self.concrete(key, def, Some(num))?);
                    }
                }
            }
        }
        Ok(out)
    }

    fn concrete(
        &self,
        key: &str,
        def: &ExperimentDef,
        num: Option<i64>,
    ) -> Result<ExperimentSpec> {
        let fill = |template: &str| match num {
            Some(n) => substitute(template, n).map_err(|msg| {
                SpectError::validation(format!("experiment '{key}': template {template:?}: {msg}"))
            }),
            None => Ok(template.to_string()),
        };
        Ok(ExperimentSpec {
            key: key.to_string(),
            source_file: self.resolve(&fill(&def.source_file)?),
            output_path: self.resolve(&fill(&def.output_path)?),
            name: fill(&def.name)?,
        })
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_relative() {
            self.base_dir.join(p)
        } else {
            p.to_path_buf()
        }
    }
}

/// `[start, end]` or `[start, end, step]`, end inclusive, step > 0.
fn expand_range(key: &str, range: &[i64]) -> Result<Vec<i64>> {
    let (start, end, step) = match *range {
        [start, end] => (start, end, 1),
        [start, end, step] => (start, end, step),
        _ => {
            return Err(SpectError::validation(format!(
                "experiment '{key}': range needs 2 or 3 integers, got {}",
                range.len()
            )))
        }
    };
    if step <= 0 {
        return Err(SpectError::validation(format!(
            "experiment '{key}': range step must be positive, got {step}"
        )));
    }
    let mut nums = Vec::new();
    let mut n = start;
    while n <= end {
        nums.push(n);
        match n.checked_add(step) {
            Some(next) => n = next,
            None => break,
        }
    }
    Ok(nums)
}

/// Fill `{}` / `{0}` placeholders with `num`. A placeholder may carry a
/// width, `{:4}` pads with spaces and `{:04}` with zeros, and a trailing
/// `d` (`{0:03d}`) is accepted. `{{` and `}}` are literal braces.
fn substitute(template: &str, num: i64) -> std::result::Result<String, String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars();
    while let Some(c) = chars.next() {
        match c {
            '{' => {
                let mut field = String::new();
                let mut closed = false;
                for next in chars.by_ref() {
                    if next == '}' {
                        closed = true;
                        break;
                    }
                    field.push(next);
                    if field == "{" {
                        break;
                    }
                }
                if field == "{" {
                    out.push('{');
                    continue;
                }
                if !closed {
                    return Err("unclosed '{'".to_string());
                }
                out.push_str(&render_field(&field, num)?);
            }
            '}' => match chars.next() {
                Some('}') => out.push('}'),
                _ => return Err("single '}' outside a placeholder".to_string()),
            },
            _ => out.push(c),
        }
    }
    Ok(out)
}

fn render_field(field: &str, num: i64) -> std::result::Result<String, String> {
    let (index, spec) = field.split_once(':').unwrap_or((field, ""));
    if !(index.is_empty() || index == "0") {
        return Err(format!("unsupported placeholder {{{field}}}"));
    }
    let digits = spec.strip_suffix('d').unwrap_or(spec);
    if digits.is_empty() {
        return Ok(num.to_string());
    }
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("unsupported placeholder {{{field}}}"));
    }
    let width = digits
        .parse::<usize>()
        .ok()
        .filter(|&w| w <= MAX_FIELD_WIDTH)
        .ok_or_else(|| format!("field width in {{{field}}} exceeds {MAX_FIELD_WIDTH}"))?;
    Ok(if digits.starts_with('0') {
        format!("{num:0width$}")
    } else {
        format!("{num:width$}")
    })
}
