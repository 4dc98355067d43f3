use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::config::Indicator;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the sidebar: year range, region selectors, indicator picker,
/// and the active-selection summary.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => ds.clone(),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    let (year_min, year_max) = dataset.year_range().unwrap_or((0, 0));
    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Year range ----
            ui.strong("Year range");
            changed |= ui
                .add(
                    egui::Slider::new(&mut state.criteria.year_start, year_min..=year_max)
                        .text("from"),
                )
                .changed();
            changed |= ui
                .add(
                    egui::Slider::new(&mut state.criteria.year_end, year_min..=year_max)
                        .text("to"),
                )
                .changed();
            ui.separator();

            // ---- Macro-region ----
            ui.strong("Macro-region");
            changed |= region_combo(
                ui,
                "macro_combo",
                &mut state.criteria.macro_region,
                &dataset.macro_regions,
            );
            ui.separator();

            // ---- Regional ----
            ui.strong("Regional");
            changed |= region_combo(
                ui,
                "regional_combo",
                &mut state.criteria.regional,
                &dataset.regionals,
            );
            ui.separator();

            // ---- Indicator ----
            ui.strong("Indicator");
            egui::ComboBox::from_id_salt("indicator_combo")
                .selected_text(state.indicator.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for ind in Indicator::ALL {
                        if ui
                            .selectable_label(state.indicator == ind, ind.label())
                            .clicked()
                        {
                            state.indicator = ind;
                        }
                    }
                });
            ui.separator();

            // ---- Histogram bins ----
            ui.strong("Histogram bins");
            ui.add(egui::Slider::new(&mut state.histogram_bins, 5..=60));
            ui.separator();

            selection_summary(ui, state);
        });

    if changed {
        state.refilter();
    }
}

/// "All" + one entry per region; selecting "All" clears the restriction.
fn region_combo(
    ui: &mut Ui,
    id: &str,
    selection: &mut Option<String>,
    options: &[String],
) -> bool {
    let mut changed = false;
    let selected_text = selection.as_deref().unwrap_or("All").to_string();
    egui::ComboBox::from_id_salt(id)
        .selected_text(selected_text)
        .show_ui(ui, |ui: &mut Ui| {
            if ui.selectable_label(selection.is_none(), "All").clicked() {
                changed |= selection.take().is_some();
            }
            for opt in options {
                let is_selected = selection.as_deref() == Some(opt.as_str());
                if ui.selectable_label(is_selected, opt).clicked() && !is_selected {
                    *selection = Some(opt.clone());
                    changed = true;
                }
            }
        });
    changed
}

/// Sidebar footer: the selection the visuals currently reflect.
fn selection_summary(ui: &mut Ui, state: &AppState) {
    ui.strong("Current selection");
    ui.label(state.indicator.label());
    ui.label(format!(
        "Period: {} – {}",
        state.criteria.year_start, state.criteria.year_end
    ));
    ui.label(format!(
        "Macro: {}",
        state.criteria.macro_region.as_deref().unwrap_or("All")
    ));
    ui.label(format!(
        "Regional: {}",
        state.criteria.regional.as_deref().unwrap_or("All")
    ));
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} rows loaded, {} in selection",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open indicator table")
        .add_filter("Supported files", &["parquet", "pq", "csv", "json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}
