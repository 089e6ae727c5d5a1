use std::path::PathBuf;

use serde::Deserialize;

use super::KEY_COLUMN;

/// Axis labels, ranges and title for a group's figure.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub title: Option<String>,
    pub axis_titles: [String; 2],
    /// `None` lets the plot fit its data on that axis.
    pub axis_ranges: [Option<(f64, f64)>; 2],
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            title: None,
            axis_titles: [format!("{KEY_COLUMN} (nm)"), "Intensity".to_string()],
            axis_ranges: [None, None],
        }
    }
}

impl PlotConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Where a group writes its output and how its figures look. Subgroups
/// inherit their parent's configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub output_dir: PathBuf,
    /// File extension for exported figures.
    pub format: String,
    pub plot: PlotConfig,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            format: "png".to_string(),
            plot: PlotConfig::default(),
        }
    }
}

impl OutputConfig {
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: dir.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: OutputConfig = serde_json::from_str(
            r#"{"output_dir": "out", "plot": {"title": "Run A", "axis_ranges": [[400.0, 800.0], null]}}"#,
        )
        .unwrap();
        assert_eq!(cfg.output_dir, PathBuf::from("out"));
        assert_eq!(cfg.format, "png");
        assert_eq!(cfg.plot.title.as_deref(), Some("Run A"));
        assert_eq!(cfg.plot.axis_ranges, [Some((400.0, 800.0)), None]);
        assert_eq!(cfg.plot.axis_titles[1], "Intensity");
    }
}
