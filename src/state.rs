use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use rusty_spectra::data::config::OutputConfig;
use rusty_spectra::data::group;
use rusty_spectra::data::read_spec::ReadSpec;
use rusty_spectra::data::{RecordStore, Result};

use crate::color::SeriesColors;

// ---------------------------------------------------------------------------
// Plot mode
// ---------------------------------------------------------------------------

/// How a group is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlotMode {
    /// Every experiment as its own line.
    #[default]
    Stack,
    /// Min–max band per wavelength.
    Range,
    /// Mean line with a ±1 standard deviation band.
    OneStd,
}

impl PlotMode {
    pub const ALL: [PlotMode; 3] = [PlotMode::Stack, PlotMode::Range, PlotMode::OneStd];
}

impl fmt::Display for PlotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlotMode::Stack => write!(f, "Stack"),
            PlotMode::Range => write!(f, "Range"),
            PlotMode::OneStd => write!(f, "Mean ± 1σ"),
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded group (None until the user opens something).
    pub group: Option<RecordStore>,

    /// Subgroups split off `group`, drawn on the same axes.
    pub subgroups: Vec<RecordStore>,

    /// Text of the subgroup definition field, e.g. `0-2; 3,4`.
    pub subgroup_text: String,

    /// Experiments of `group` hidden in stack mode (by index).
    pub hidden: BTreeSet<usize>,

    /// Whether the parent group is drawn next to its subgroups.
    pub show_parent: bool,

    pub mode: PlotMode,

    /// Colours for the experiments of `group`.
    pub experiment_colors: SeriesColors,

    /// Colours for parent + subgroups (index 0 is the parent).
    pub group_colors: SeriesColors,

    /// Which group's stats table is shown (0 = parent, n = subgroup n).
    pub table_group: usize,

    /// How plain experiment files are read.
    pub read_spec: ReadSpec,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Error of the previous frame's plot, to report each change once.
    plot_error: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            group: None,
            subgroups: Vec::new(),
            subgroup_text: String::new(),
            hidden: BTreeSet::new(),
            show_parent: true,
            mode: PlotMode::default(),
            experiment_colors: SeriesColors::default(),
            group_colors: SeriesColors::new(1),
            table_group: 0,
            read_spec: ReadSpec::default(),
            status_message: None,
            plot_error: None,
        }
    }
}

impl AppState {
    /// Ingest a newly built group and reset everything derived from it.
    pub fn set_group(&mut self, group: RecordStore) {
        self.experiment_colors = SeriesColors::new(group.len());
        self.group_colors = SeriesColors::new(1);
        self.subgroups.clear();
        self.hidden.clear();
        self.table_group = 0;
        self.group = Some(group);
        self.status_message = None;
        self.plot_error = None;
    }

    /// Build a group from a JSON definition file.
    pub fn open_definition(&mut self, path: &Path) -> Result<()> {
        let name = group_name(path);
        let store = RecordStore::from_definition(path, name, output_beside(path))?;
        self.set_group(store);
        Ok(())
    }

    /// Build a group from plain experiment files with the current read spec.
    pub fn open_files(&mut self, paths: &[PathBuf]) -> Result<()> {
        let files: Vec<(PathBuf, Option<String>)> =
            paths.iter().map(|p| (p.clone(), None)).collect();
        let name = paths
            .first()
            .and_then(|p| p.parent())
            .map(group_name)
            .unwrap_or_else(|| "Experiments".to_string());
        let output = paths
            .first()
            .map(|p| output_beside(p))
            .unwrap_or_default();
        let store = RecordStore::from_files(&files, &self.read_spec, name, output)?;
        self.set_group(store);
        Ok(())
    }

    /// Re-split the group according to `subgroup_text`.
    pub fn apply_subgroups(&mut self) -> Result<()> {
        let Some(parent) = &self.group else {
            return Ok(());
        };
        let subgroups = group::split(parent, &self.subgroup_text)?;
        log::info!("Split '{}' into {} subgroup(s)", parent.name(), subgroups.len());
        self.group_colors = SeriesColors::new(subgroups.len() + 1);
        self.subgroups = subgroups;
        self.table_group = 0;
        Ok(())
    }

    /// Take the outcome of this frame's plot. A new error is logged and
    /// shown once; when the plot recovers its message is cleared.
    pub fn report_plot_error(&mut self, error: Option<String>) {
        if error == self.plot_error {
            return;
        }
        match &error {
            Some(msg) => {
                log::error!("{msg}");
                self.status_message = Some(format!("Error: {msg}"));
            }
            None => {
                let stale = self.plot_error.as_ref().map(|msg| format!("Error: {msg}"));
                if self.status_message == stale {
                    self.status_message = None;
                }
            }
        }
        self.plot_error = error;
    }

    pub fn clear_subgroups(&mut self) {
        self.subgroups.clear();
        self.group_colors = SeriesColors::new(1);
        self.table_group = 0;
    }

    pub fn toggle_experiment(&mut self, index: usize) {
        if !self.hidden.remove(&index) {
            self.hidden.insert(index);
        }
    }

    /// Groups drawn on the plot, with their colour index.
    pub fn visible_groups(&self) -> Vec<(usize, &RecordStore)> {
        let mut out = Vec::new();
        if let Some(parent) = &self.group {
            if self.show_parent || self.subgroups.is_empty() {
                out.push((0, parent));
            }
        }
        out.extend(self.subgroups.iter().enumerate().map(|(i, g)| (i + 1, g)));
        out
    }

    /// Group selected for the stats table.
    pub fn table_store(&self) -> Option<&RecordStore> {
        match self.table_group {
            0 => self.group.as_ref(),
            n => self.subgroups.get(n - 1),
        }
    }
}

fn group_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Experiments")
        .to_string()
}

fn output_beside(path: &Path) -> OutputConfig {
    path.parent()
        .map(|dir| OutputConfig::in_dir(dir.join("output")))
        .unwrap_or_default()
}
