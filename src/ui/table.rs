use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use rusty_spectra::data::StatsTable;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Stats table (bottom panel)
// ---------------------------------------------------------------------------

/// Group selector plus the `[Wavelength, min, max, mean, std]` table.
pub fn stats_panel(ui: &mut Ui, state: &mut AppState) {
    if state.group.is_none() {
        return;
    }

    let names: Vec<String> = state
        .group
        .iter()
        .chain(state.subgroups.iter())
        .map(|g| g.name().to_string())
        .collect();

    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Statistics for");
        let current = names.get(state.table_group).cloned().unwrap_or_default();
        egui::ComboBox::from_id_salt("stats_group")
            .selected_text(current)
            .show_ui(ui, |ui: &mut Ui| {
                for (i, name) in names.iter().enumerate() {
                    ui.selectable_value(&mut state.table_group, i, name);
                }
            });
    });
    ui.separator();

    let Some(store) = state.table_store() else {
        return;
    };
    match store.stats() {
        Ok(stats) => stats_table(ui, &stats),
        Err(e) => {
            ui.label(format!("Statistics unavailable: {e}"));
        }
    }
}

fn stats_table(ui: &mut Ui, stats: &StatsTable) {
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(90.0))
        .columns(Column::remainder(), 4)
        .header(20.0, |mut header| {
            for name in StatsTable::COLUMNS {
                header.col(|ui: &mut Ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, stats.len(), |mut row| {
                let Some(r) = stats.row(row.index()) else {
                    return;
                };
                for value in [r.key, r.min, r.max, r.mean, r.std] {
                    row.col(|ui: &mut Ui| {
                        ui.monospace(format_cell(value));
                    });
                }
            });
        });
}

fn format_cell(v: f64) -> String {
    if v.is_nan() {
        "—".to_string()
    } else {
        format!("{v:.4}")
    }
}
