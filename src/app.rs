use eframe::egui::{self, ScrollArea, Ui};

use crate::config::Aggregate;
use crate::data::aggregate;
use crate::state::AppState;
use crate::ui::{charts, map, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct MaternaApp {
    pub state: AppState,
}

impl Default for MaternaApp {
    fn default() -> Self {
        Self {
            state: AppState::startup(),
        }
    }
}

impl eframe::App for MaternaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: the visual sequence ----
        egui::CentralPanel::default().show(ctx, |ui| {
            dashboard(ui, &self.state);
        });
    }
}

/// The fixed top-to-bottom visual sequence. Each section derives its
/// own aggregate from the shared filtered view, so an empty result in
/// one never hides the others.
fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        ui.centered_and_justified(|ui: &mut Ui| {
            let message = state
                .status_message
                .as_deref()
                .unwrap_or("Open an indicator table to begin  (File → Open…)");
            ui.heading(message);
        });
        return;
    };

    // One warning for the whole pass when the selection matched nothing;
    // the filters in the sidebar stay adjustable.
    if state.selection_is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No data available for the selected filters.");
        });
        return;
    }

    let indices = &state.visible_indices;
    let indicator = state.indicator;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Maternal Health Surveillance");
            ui.label(indicator.label());
            ui.separator();

            ui.heading("Descriptive statistics");
            let stats = aggregate::descriptive_stats(dataset, indices, indicator);
            charts::stat_metrics(ui, stats.as_ref());
            ui.separator();

            ui.heading("Mean by macro-region");
            let distribution = aggregate::macro_distribution(dataset, indices, indicator);
            charts::macro_bar_chart(ui, &distribution);
            ui.separator();

            ui.heading("Regional by year");
            let pivot = aggregate::regional_year_pivot(dataset, indices, indicator);
            charts::pivot_heatmap(ui, &pivot);
            ui.separator();

            ui.heading("Municipality map");
            map::municipality_map(ui, dataset, indices, &state.region_colors);
            ui.separator();

            ui.heading("Indicator over time");
            let series = aggregate::time_series(dataset, indices, indicator);
            charts::timeline_chart(ui, &series);
            ui.separator();

            ui.heading("Proportion by regional");
            // Count-like indicators sum across rows; rate-like average.
            let parts = match indicator.proportion_aggregate() {
                Aggregate::Sum => aggregate::regional_sums(dataset, indices, indicator),
                Aggregate::Mean => aggregate::regional_means(dataset, indices, indicator),
            };
            charts::proportion_chart(ui, &parts);
            ui.separator();

            ui.heading("Value distribution");
            let histogram =
                aggregate::histogram(dataset, indices, indicator, state.histogram_bins);
            charts::histogram_chart(ui, histogram.as_ref());
        });
}
