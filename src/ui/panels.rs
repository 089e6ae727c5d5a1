use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::{AppState, PlotMode};

// ---------------------------------------------------------------------------
// Left side panel – experiments and subgroups
// ---------------------------------------------------------------------------

/// Render the left panel: experiment list and subgroup editor.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Experiments");
    ui.separator();

    let Some(group) = &state.group else {
        ui.label("No group loaded.");
        return;
    };

    // Collect what we need so we can mutate state inside the loop.
    let entries: Vec<(String, usize)> = group
        .records()
        .iter()
        .map(|r| {
            let r = r.borrow();
            (r.legend_name(), r.len())
        })
        .collect();
    let group_name = group.name().to_string();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong(&group_name);
            for (index, (name, rows)) in entries.iter().enumerate() {
                let color = state.experiment_colors.color_for(index);
                let mut visible = !state.hidden.contains(&index);
                let text = RichText::new(format!("{index}: {name}")).color(color);
                if ui
                    .checkbox(&mut visible, text)
                    .on_hover_text(format!("{rows} rows"))
                    .changed()
                {
                    state.toggle_experiment(index);
                }
            }

            ui.separator();
            ui.strong("Subgroups");
            ui.label("Index sets, e.g. 0-2; 3,5");
            ui.text_edit_singleline(&mut state.subgroup_text);
            ui.horizontal(|ui: &mut Ui| {
                if ui.button("Apply").clicked() {
                    if let Err(e) = state.apply_subgroups() {
                        log::error!("Invalid subgroup definition: {e}");
                        state.status_message = Some(format!("Error: {e}"));
                    } else {
                        state.status_message = None;
                    }
                }
                if ui.button("Clear").clicked() {
                    state.clear_subgroups();
                }
            });

            if !state.subgroups.is_empty() {
                ui.checkbox(&mut state.show_parent, "Show parent group");
                for (i, sub) in state.subgroups.iter().enumerate() {
                    let color = state.group_colors.color_for(i + 1);
                    ui.label(
                        RichText::new(format!("{} ({} experiments)", sub.name(), sub.len()))
                            .color(color),
                    );
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open group definition…").clicked() {
                open_definition_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open experiment files…").clicked() {
                open_files_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        for mode in PlotMode::ALL {
            if ui
                .selectable_label(state.mode == mode, mode.to_string())
                .clicked()
            {
                state.mode = mode;
            }
        }

        ui.separator();

        if let Some(group) = &state.group {
            ui.label(format!(
                "{} experiments, {} subgroup(s)",
                group.len(),
                state.subgroups.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_definition_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open group definition")
        .add_filter("Group definition", &["json"])
        .pick_file();

    if let Some(path) = file {
        match state.open_definition(&path) {
            Ok(()) => log::info!("Opened group definition {}", path.display()),
            Err(e) => {
                log::error!("Failed to open group definition: {e}");
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

pub fn open_files_dialog(state: &mut AppState) {
    let files = rfd::FileDialog::new()
        .set_title("Open experiment files")
        .add_filter("Spectra", &["txt", "csv", "tsv"])
        .pick_files();

    if let Some(paths) = files {
        match state.open_files(&paths) {
            Ok(()) => log::info!("Opened {} experiment file(s)", paths.len()),
            Err(e) => {
                log::error!("Failed to load experiments: {e}");
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}
