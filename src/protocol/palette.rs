//! Colour palette announced by the speaker system on join.
//!
//! On the wire a palette is two parallel integer lists plus a name:
//!
//! ```json
//! { "bg_colors": [935022, 18479], "fg_colors": [1644825, 1644825], "name": "orthocolors" }
//! ```
//!
//! Remotes pick their colour by index into these lists (see `color_index` on
//! `group_join` and `client_set_color`).

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A 24-bit RGB colour packed as `0xRRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgb(pub u32);

impl Rgb {
    // ---
    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0 & 0x00ff_ffff)
    }
}

/// One palette entry: the foreground/background pair at a given index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaletteColor {
    pub foreground: Rgb,
    pub background: Rgb,
}

/// The foreground and background lists had different lengths.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("palette lists differ in length: {foreground} fg_colors, {background} bg_colors")]
pub struct PaletteMismatch {
    pub foreground: usize,
    pub background: usize,
}

/// Named colour palette.
///
/// The foreground and background lists always have the same length, so any
/// index valid for one is valid for the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WirePalette", into = "WirePalette")]
pub struct Palette {
    name: String,
    fg_colors: Vec<Rgb>,
    bg_colors: Vec<Rgb>,
}

#[derive(Serialize, Deserialize)]
struct WirePalette {
    bg_colors: Vec<Rgb>,
    fg_colors: Vec<Rgb>,
    name: String,
}

impl Palette {
    // ---

    /// Build a palette from two parallel lists.
    ///
    /// # Errors
    ///
    /// Returns [`PaletteMismatch`] if the lists differ in length.
    pub fn try_new(
        name: impl Into<String>,
        fg_colors: Vec<Rgb>,
        bg_colors: Vec<Rgb>,
    ) -> Result<Self, PaletteMismatch> {
        // ---
        if fg_colors.len() != bg_colors.len() {
            return Err(PaletteMismatch {
                foreground: fg_colors.len(),
                background: bg_colors.len(),
            });
        }

        Ok(Self {
            name: name.into(),
            fg_colors,
            bg_colors,
        })
    }

    /// Build a palette from foreground/background pairs.
    pub fn from_colors(name: impl Into<String>, colors: impl IntoIterator<Item = PaletteColor>) -> Self {
        // ---
        let (fg_colors, bg_colors) = colors
            .into_iter()
            .map(|color| (color.foreground, color.background))
            .unzip();

        Self {
            name: name.into(),
            fg_colors,
            bg_colors,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of entries (the length of either list).
    pub fn len(&self) -> usize {
        self.fg_colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fg_colors.is_empty()
    }

    pub fn fg_colors(&self) -> &[Rgb] {
        &self.fg_colors
    }

    pub fn bg_colors(&self) -> &[Rgb] {
        &self.bg_colors
    }

    /// The entry a `color_index` refers to, if it is in range.
    pub fn get(&self, index: usize) -> Option<PaletteColor> {
        // ---
        Some(PaletteColor {
            foreground: *self.fg_colors.get(index)?,
            background: *self.bg_colors.get(index)?,
        })
    }

    /// Iterate over all entries in index order.
    pub fn colors(&self) -> impl Iterator<Item = PaletteColor> + '_ {
        // ---
        self.fg_colors
            .iter()
            .zip(&self.bg_colors)
            .map(|(&foreground, &background)| PaletteColor {
                foreground,
                background,
            })
    }
}

impl TryFrom<WirePalette> for Palette {
    type Error = PaletteMismatch;

    fn try_from(wire: WirePalette) -> Result<Self, Self::Error> {
        Palette::try_new(wire.name, wire.fg_colors, wire.bg_colors)
    }
}

impl From<Palette> for WirePalette {
    fn from(palette: Palette) -> Self {
        Self {
            bg_colors: palette.bg_colors,
            fg_colors: palette.fg_colors,
            name: palette.name,
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    const ORTHOCOLORS: &str = r#"{
        "bg_colors": [935022, 18479, 15158809, 11414311, 1117971, 5000268, 16427286, 16448250],
        "fg_colors": [1644825, 1644825, 1644825, 1644825, 13224393, 16427286, 1644825, 1644825],
        "name": "orthocolors"
    }"#;

    #[test]
    fn test_decode_palette() {
        // ---
        let palette: Palette = serde_json::from_str(ORTHOCOLORS).unwrap();

        assert_eq!(palette.len(), 8);
        assert_eq!(palette.fg_colors().len(), 8);
        assert_eq!(palette.bg_colors().len(), 8);
        assert_eq!(palette.name(), "orthocolors");
        assert_eq!(palette.colors().count(), 8);
    }

    #[test]
    fn test_index_lookup() {
        // ---
        let palette: Palette = serde_json::from_str(ORTHOCOLORS).unwrap();

        let first = palette.get(0).unwrap();
        assert_eq!(first.background, Rgb(935022));
        assert_eq!(first.foreground, Rgb(1644825));

        let fourth = palette.get(4).unwrap();
        assert_eq!(fourth.foreground, Rgb(13224393));

        assert!(palette.get(8).is_none());
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        // ---
        let raw = r#"{"bg_colors": [1, 2, 3], "fg_colors": [1, 2], "name": "broken"}"#;
        let err = serde_json::from_str::<Palette>(raw).unwrap_err();
        assert!(err.to_string().contains("differ in length"));

        let err = Palette::try_new("x", vec![Rgb(1)], vec![]).unwrap_err();
        assert_eq!(
            err,
            PaletteMismatch {
                foreground: 1,
                background: 0
            }
        );
    }

    #[test]
    fn test_encode_uses_wire_names() {
        // ---
        let palette = Palette::from_colors(
            "colors",
            [PaletteColor {
                foreground: Rgb(1644825),
                background: Rgb(935022),
            }],
        );

        let value = serde_json::to_value(&palette).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"bg_colors": [935022], "fg_colors": [1644825], "name": "colors"})
        );
    }

    #[test]
    fn test_rgb_channels() {
        // ---
        let color = Rgb(0x0e446e);
        assert_eq!(color.red(), 0x0e);
        assert_eq!(color.green(), 0x44);
        assert_eq!(color.blue(), 0x6e);
        assert_eq!(color.to_string(), "#0e446e");
    }
}
