use std::collections::BTreeMap;

use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoints};

use crate::color::heat_color;
use crate::config::CHART_HEIGHT;
use crate::data::aggregate::{DescriptiveStats, Histogram, PivotTable};

// ---------------------------------------------------------------------------
// Page visuals
// ---------------------------------------------------------------------------
//
// Every function here takes an already-computed aggregation result and
// only paints it; nothing in this module touches the raw dataset. A
// missing/empty aggregate degrades to a localized "no data" notice so
// the other visuals on the page stay unaffected.

/// Localized placeholder for a visual whose aggregate came back empty.
pub fn no_data_notice(ui: &mut Ui) {
    ui.label(
        RichText::new("No data for this selection.")
            .italics()
            .color(Color32::LIGHT_YELLOW),
    );
}

// ---- Descriptive statistics ----

pub fn stat_metrics(ui: &mut Ui, stats: Option<&DescriptiveStats>) {
    let Some(stats) = stats else {
        no_data_notice(ui);
        return;
    };
    ui.columns(3, |cols| {
        metric(&mut cols[0], "Mean", format!("{:.2}", stats.mean));
        metric(&mut cols[1], "Median", format!("{:.2}", stats.median));
        let std = match stats.std_dev {
            Some(s) => format!("{s:.2}"),
            None => "—".to_string(),
        };
        metric(&mut cols[2], "Std deviation", std);
    });
    ui.label(
        RichText::new(format!("{} observations", stats.count))
            .small()
            .weak(),
    );
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(RichText::new(label).small().weak());
        ui.label(RichText::new(value).heading());
    });
}

// ---- Mean by macro-region (vertical bars) ----

pub fn macro_bar_chart(ui: &mut Ui, distribution: &BTreeMap<String, f64>) {
    if distribution.is_empty() {
        no_data_notice(ui);
        return;
    }

    let labels: Vec<String> = distribution.keys().cloned().collect();
    let bars: Vec<Bar> = distribution
        .values()
        .enumerate()
        .map(|(i, &mean)| Bar::new(i as f64, mean).width(0.6))
        .collect();

    let axis_labels = labels.clone();
    Plot::new("macro_distribution")
        .height(CHART_HEIGHT)
        .y_axis_label("Mean value")
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round() as isize;
            if (mark.value - idx as f64).abs() > 0.2 {
                return String::new();
            }
            axis_labels
                .get(usize::try_from(idx).unwrap_or(usize::MAX))
                .cloned()
                .unwrap_or_default()
        })
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .color(Color32::from_rgb(110, 170, 220))
                    .name("mean"),
            );
        });
}

// ---- Time series (line) ----

pub fn timeline_chart(ui: &mut Ui, series: &[(i32, f64)]) {
    if series.is_empty() {
        no_data_notice(ui);
        return;
    }

    let points: PlotPoints = series
        .iter()
        .map(|&(year, mean)| [f64::from(year), mean])
        .collect();

    Plot::new("timeline")
        .height(CHART_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label("Mean value")
        .x_axis_formatter(|mark, _range| {
            let year = mark.value.round();
            if (mark.value - year).abs() > 0.01 {
                String::new()
            } else {
                format!("{year:.0}")
            }
        })
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(points).color(Color32::LIGHT_BLUE).width(2.0));
        });
}

// ---- Part-to-whole by regional (horizontal bars) ----

pub fn proportion_chart(ui: &mut Ui, parts: &BTreeMap<String, f64>) {
    if parts.is_empty() {
        no_data_notice(ui);
        return;
    }

    let total: f64 = parts.values().sum();
    let labels: Vec<String> = parts.keys().cloned().collect();
    let bars: Vec<Bar> = parts
        .values()
        .enumerate()
        .map(|(i, &v)| {
            let share = if total.abs() > f64::EPSILON {
                100.0 * v / total
            } else {
                0.0
            };
            Bar::new(i as f64, share).width(0.6)
        })
        .collect();

    let axis_labels = labels.clone();
    Plot::new("regional_proportion")
        .height(CHART_HEIGHT)
        .x_axis_label("Share (%)")
        .y_axis_formatter(move |mark, _range| {
            let idx = mark.value.round() as isize;
            if (mark.value - idx as f64).abs() > 0.2 {
                return String::new();
            }
            axis_labels
                .get(usize::try_from(idx).unwrap_or(usize::MAX))
                .cloned()
                .unwrap_or_default()
        })
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .horizontal()
                    .color(Color32::from_rgb(220, 160, 90))
                    .name("share"),
            );
        });
}

// ---- Histogram ----

pub fn histogram_chart(ui: &mut Ui, histogram: Option<&Histogram>) {
    let Some(hist) = histogram else {
        no_data_notice(ui);
        return;
    };

    let width = hist.bin_width().max(f64::EPSILON);
    let bars: Vec<Bar> = hist
        .counts
        .iter()
        .enumerate()
        .map(|(i, &count)| {
            let center = hist.min + (i as f64 + 0.5) * width;
            Bar::new(center, count as f64).width(width * 0.95)
        })
        .collect();

    Plot::new("histogram")
        .height(CHART_HEIGHT)
        .x_axis_label("Value")
        .y_axis_label("Frequency")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .color(Color32::from_rgb(90, 120, 200))
                    .name("count"),
            );
        });
}

// ---- Regional × year heatmap ----

/// Pivot table rendered as a colored grid; unobserved pairs stay as
/// neutral gaps rather than zero-valued cells.
pub fn pivot_heatmap(ui: &mut Ui, pivot: &PivotTable) {
    if pivot.regionals.is_empty() || pivot.years.is_empty() {
        no_data_notice(ui);
        return;
    }

    let observed: Vec<f64> = pivot.cells.iter().flatten().filter_map(|c| *c).collect();
    let min = observed.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = observed.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = (max - min).max(f64::EPSILON);

    egui::Grid::new("pivot_heatmap")
        .spacing([4.0, 4.0])
        .striped(false)
        .show(ui, |ui: &mut Ui| {
            ui.label(RichText::new("Regional").strong());
            for year in &pivot.years {
                ui.label(RichText::new(year.to_string()).strong());
            }
            ui.end_row();

            for (row, regional) in pivot.regionals.iter().enumerate() {
                ui.label(regional);
                for cell in &pivot.cells[row] {
                    match cell {
                        Some(v) => {
                            let t = (v - min) / span;
                            ui.label(
                                RichText::new(format!(" {v:.1} "))
                                    .background_color(heat_color(t))
                                    .color(Color32::BLACK)
                                    .monospace(),
                            );
                        }
                        None => {
                            ui.label(RichText::new("  –  ").weak().monospace());
                        }
                    }
                }
                ui.end_row();
            }
        });
}
