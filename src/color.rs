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
// Series colours: experiment or group index → Color32
// ---------------------------------------------------------------------------

/// Stable colours for an indexed series (experiments of a group, or the
/// groups drawn on one plot).
#[derive(Debug, Clone, Default)]
pub struct SeriesColors {
    palette: Vec<Color32>,
}

impl SeriesColors {
    pub fn new(n: usize) -> Self {
        Self {
            palette: generate_palette(n),
        }
    }

    /// Colour of series `index`, grey when out of range.
    pub fn color_for(&self, index: usize) -> Color32 {
        self.palette.get(index).copied().unwrap_or(Color32::GRAY)
    }

    /// Translucent variant for filled bands.
    pub fn band_for(&self, index: usize) -> Color32 {
        self.color_for(index).gamma_multiply(0.25)
    }
}
