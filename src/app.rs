use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RustySpectraApp {
    pub state: AppState,
}

impl eframe::App for RustySpectraApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: experiments and subgroups ----
        egui::SidePanel::left("experiment_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: statistics table ----
        egui::TopBottomPanel::bottom("stats_panel")
            .default_height(200.0)
            .resizable(true)
            .show(ctx, |ui| {
                table::stats_panel(ui, &mut self.state);
            });

        // ---- Central panel: plot ----
        let plot_error = egui::CentralPanel::default()
            .show(ctx, |ui| plot::group_plot(ui, &self.state))
            .inner;
        self.state.report_plot_error(plot_error);
    }
}
