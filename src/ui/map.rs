use std::collections::BTreeMap;

use eframe::egui::Ui;
use egui_plot::{Legend, Plot, PlotPoints, Points};

use crate::color::RegionColors;
use crate::config::CHART_HEIGHT;
use crate::data::model::HealthDataset;

use super::charts::no_data_notice;

// ---------------------------------------------------------------------------
// Municipality map (central panel)
// ---------------------------------------------------------------------------

/// Scatter the municipalities in the current selection by their
/// residence coordinates, one colored series per macro-region.
/// Repeat observations of the same municipality collapse to one point.
pub fn municipality_map(
    ui: &mut Ui,
    dataset: &HealthDataset,
    indices: &[usize],
    colors: &RegionColors,
) {
    // macro-region → municipality → (lon, lat)
    let mut by_region: BTreeMap<&str, BTreeMap<&str, [f64; 2]>> = BTreeMap::new();
    for &i in indices {
        let rec = &dataset.records[i];
        if !rec.latitude.is_finite() || !rec.longitude.is_finite() {
            continue;
        }
        by_region
            .entry(rec.macro_region.as_str())
            .or_default()
            .insert(rec.municipality.as_str(), [rec.longitude, rec.latitude]);
    }

    if by_region.is_empty() {
        no_data_notice(ui);
        return;
    }

    Plot::new("municipality_map")
        .height(CHART_HEIGHT * 1.4)
        .data_aspect(1.0)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            for (region, municipalities) in &by_region {
                let coords: PlotPoints = municipalities.values().copied().collect();
                plot_ui.points(
                    Points::new(coords)
                        .radius(4.0)
                        .color(colors.color_for(region))
                        .name(*region),
                );
            }
        });
}
