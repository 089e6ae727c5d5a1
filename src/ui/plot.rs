use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{Legend, Line, Plot, PlotUi, Polygon};

use rusty_spectra::data::{RecordStore, StatsTable};

use crate::state::{AppState, PlotMode};

// ---------------------------------------------------------------------------
// Spectral plot (central panel)
// ---------------------------------------------------------------------------

/// Render the group plot in the central panel. Returns the first error hit
/// while composing a group, if any. Called every frame, so it never logs.
pub fn group_plot(ui: &mut Ui, state: &AppState) -> Option<String> {
    let group = match &state.group {
        Some(g) => g,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a group to view spectra  (File → Open…)");
            });
            return None;
        }
    };

    let config = &group.output().plot;
    if let Some(title) = &config.title {
        ui.heading(title);
    }

    let mut plot = Plot::new("group_plot")
        .legend(Legend::default())
        .x_axis_label(config.axis_titles[0].clone())
        .y_axis_label(config.axis_titles[1].clone())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);
    if let Some((lo, hi)) = config.axis_ranges[0] {
        plot = plot.include_x(lo).include_x(hi);
    }
    if let Some((lo, hi)) = config.axis_ranges[1] {
        plot = plot.include_y(lo).include_y(hi);
    }

    let mut first_error = None;
    plot.show(ui, |plot_ui| {
        for (color_index, store) in state.visible_groups() {
            let result = match state.mode {
                PlotMode::Stack => {
                    stack(plot_ui, state, store, color_index);
                    Ok(())
                }
                PlotMode::Range => store.stats().map(|stats| {
                    let fill = state.group_colors.color_for(color_index).gamma_multiply(0.6);
                    let name = format!("{} RANGE", store.name());
                    band(plot_ui, &stats, &stats.min, &stats.max, fill, &name);
                }),
                PlotMode::OneStd => store.stats().map(|stats| {
                    let color = state.group_colors.color_for(color_index);
                    let (lower, upper): (Vec<f64>, Vec<f64>) = stats
                        .mean
                        .iter()
                        .zip(&stats.std)
                        .map(|(m, s)| (m - s, m + s))
                        .unzip();
                    let fill = state.group_colors.band_for(color_index);
                    let name = format!("{} ±1σ", store.name());
                    band(plot_ui, &stats, &lower, &upper, fill, &name);
                    plot_ui.line(
                        Line::new(series(&stats.keys, &stats.mean))
                            .name(format!("{} AVG", store.name()))
                            .color(color)
                            .width(2.0),
                    );
                }),
            };
            if let Err(e) = result {
                first_error.get_or_insert_with(|| format!("Cannot plot '{}': {e}", store.name()));
            }
        }
    });
    first_error
}

// ---------------------------------------------------------------------------
// Series builders
// ---------------------------------------------------------------------------

/// One line per experiment. Parent experiments get their own colours;
/// subgroup experiments share their subgroup's colour.
fn stack(plot_ui: &mut PlotUi, state: &AppState, store: &RecordStore, color_index: usize) {
    let is_parent = color_index == 0;
    for (index, record) in store.records().iter().enumerate() {
        if is_parent && state.hidden.contains(&index) {
            continue;
        }
        let record = record.borrow();
        let Some(data) = record.data() else {
            continue;
        };
        let color = if is_parent {
            state.experiment_colors.color_for(index)
        } else {
            state.group_colors.color_for(color_index)
        };
        plot_ui.line(
            Line::new(series(&data.keys, &data.values))
                .name(record.legend_name())
                .color(color)
                .width(1.5),
        );
    }
}

/// Fill between `lower` and `upper` with one quad per segment; each quad
/// stays convex while `lower <= upper`.
fn band(
    plot_ui: &mut PlotUi,
    stats: &StatsTable,
    lower: &[f64],
    upper: &[f64],
    fill: Color32,
    name: &str,
) {
    for i in 1..stats.len() {
        let (x0, x1) = (stats.keys[i - 1], stats.keys[i]);
        let quad = vec![
            [x0, lower[i - 1]],
            [x1, lower[i]],
            [x1, upper[i]],
            [x0, upper[i - 1]],
        ];
        if quad.iter().any(|p| !p[1].is_finite()) {
            continue;
        }
        plot_ui.polygon(
            Polygon::new(quad)
                .fill_color(fill)
                .stroke(Stroke::NONE)
                .name(name),
        );
    }
}

fn series(x: &[f64], y: &[f64]) -> Vec<[f64; 2]> {
    x.iter().zip(y).map(|(&xi, &yi)| [xi, yi]).collect()
}
