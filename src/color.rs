use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            to_color32(hsl)
        })
        .collect()
}

/// Yellow→red sequential scale for heatmap cells; `t` is clamped to
/// `[0, 1]` with 0 = lowest observed value, 1 = highest.
pub fn heat_color(t: f64) -> Color32 {
    let t = t.clamp(0.0, 1.0) as f32;
    // Hue 55° (yellow) down to 0° (red), darkening slightly at the top.
    let hsl = Hsl::new(55.0 * (1.0 - t), 0.90, 0.60 - 0.15 * t);
    to_color32(hsl)
}

fn to_color32(hsl: Hsl) -> Color32 {
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Color mapping: macro-region → Color32
// ---------------------------------------------------------------------------

/// Maps each macro-region to a stable distinct colour for the map view.
#[derive(Debug, Clone, Default)]
pub struct RegionColors {
    mapping: BTreeMap<String, Color32>,
}

impl RegionColors {
    /// Build a colour map from the dataset's sorted macro-regions.
    pub fn new(macro_regions: &[String]) -> Self {
        let palette = generate_palette(macro_regions.len());
        let mapping = macro_regions
            .iter()
            .cloned()
            .zip(palette)
            .collect();
        RegionColors { mapping }
    }

    /// Look up the colour for a macro-region.
    pub fn color_for(&self, macro_region: &str) -> Color32 {
        self.mapping
            .get(macro_region)
            .copied()
            .unwrap_or(Color32::GRAY)
    }
}
