use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::gender::Gender;

// ---------------------------------------------------------------------------
// Hex parsing
// ---------------------------------------------------------------------------

/// Parse `#rrggbb` (or `#rgb`) into an egui colour.
pub fn parse_hex(hex: &str) -> Option<Color32> {
    let rgb: Srgb<u8> = hex.trim().parse().ok()?;
    Some(Color32::from_rgb(rgb.red, rgb.green, rgb.blue))
}

/// Black or white, whichever reads better on `background`.
pub fn label_color_on(background: Color32) -> Color32 {
    let rgb = Srgb::new(background.r(), background.g(), background.b()).into_format::<f32>();
    let hsl: Hsl = rgb.into_color();
    if hsl.lightness > 0.6 {
        Color32::from_gray(40)
    } else {
        Color32::WHITE
    }
}

// ---------------------------------------------------------------------------
// Gender palette: category → Color32
// ---------------------------------------------------------------------------

/// Fixed colour per gender category, shared by every pie and legend.
#[derive(Debug, Clone)]
pub struct GenderPalette {
    mapping: BTreeMap<Gender, Color32>,
    default_color: Color32,
}

impl GenderPalette {
    pub fn new(colors: impl IntoIterator<Item = (Gender, Color32)>) -> Self {
        GenderPalette {
            mapping: colors.into_iter().collect(),
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a category.
    pub fn color_for(&self, gender: Gender) -> Color32 {
        self.mapping
            .get(&gender)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Legend entries in display order.
    pub fn legend_entries(&self) -> Vec<(Gender, Color32)> {
        Gender::ALL
            .iter()
            .map(|g| (*g, self.color_for(*g)))
            .collect()
    }
}
