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
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: trace name → Color32
// ---------------------------------------------------------------------------

/// Maps every trace name the chart can produce to a distinct colour, so a
/// trace keeps its colour no matter which datasets are toggled alongside it.
#[derive(Debug, Clone)]
pub struct TraceColors {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl TraceColors {
    /// Build a colour map over the full set of possible trace names.
    pub fn new(trace_names: &[&str]) -> Self {
        let palette = generate_palette(trace_names.len());
        let mapping: BTreeMap<String, Color32> = trace_names
            .iter()
            .zip(palette)
            .map(|(name, color)| (name.to_string(), color))
            .collect();

        TraceColors {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a trace name.
    pub fn color_for(&self, name: &str) -> Color32 {
        self.mapping
            .get(name)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_trace_gets_a_distinct_colour() {
        let colors = TraceColors::new(&crate::chart::ALL_TRACE_NAMES);
        let assigned: std::collections::BTreeSet<_> = crate::chart::ALL_TRACE_NAMES
            .iter()
            .map(|name| {
                let c = colors.color_for(name);
                (c.r(), c.g(), c.b())
            })
            .collect();
        assert_eq!(assigned.len(), crate::chart::ALL_TRACE_NAMES.len());
    }

    #[test]
    fn unknown_names_fall_back_to_the_default() {
        let colors = TraceColors::new(&["a"]);
        assert_eq!(colors.color_for("b"), Color32::GRAY);
    }
}
