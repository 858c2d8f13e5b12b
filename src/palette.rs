// Color palette module
// The fixed, ordered list of paint colors the swatch cycles through

use image::Rgba;
use thiserror::Error;

/// Default palette, in swatch order
pub const DEFAULT_COLORS: &[&str] = &["red", "green", "blue", "yellow", "white"];

/// Errors raised while building a palette
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaletteError {
    #[error("unknown color name: {0}")]
    UnknownColor(String),
    #[error("palette must contain at least one color")]
    Empty,
}

/// A palette entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedColor {
    pub name: &'static str,
    pub rgba: Rgba<u8>,
}

/// CSS named colors accepted on the command line
const KNOWN_COLORS: &[(&str, [u8; 3])] = &[
    ("red", [255, 0, 0]),
    ("green", [0, 128, 0]),
    ("lime", [0, 255, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("white", [255, 255, 255]),
    ("black", [0, 0, 0]),
    ("orange", [255, 165, 0]),
    ("purple", [128, 0, 128]),
    ("magenta", [255, 0, 255]),
    ("cyan", [0, 255, 255]),
    ("pink", [255, 192, 203]),
    ("brown", [165, 42, 42]),
    ("gray", [128, 128, 128]),
];

impl NamedColor {
    /// Look up a CSS color name (case-insensitive)
    pub fn from_name(name: &str) -> Result<Self, PaletteError> {
        let wanted = name.trim().to_ascii_lowercase();
        KNOWN_COLORS
            .iter()
            .find(|(known, _)| *known == wanted)
            .map(|&(known, [r, g, b])| NamedColor {
                name: known,
                rgba: Rgba([r, g, b, 255]),
            })
            .ok_or_else(|| PaletteError::UnknownColor(name.trim().to_string()))
    }
}

/// Ordered, non-empty sequence of colors. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<NamedColor>,
}

impl Palette {
    /// Build a palette from color names
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, PaletteError> {
        let colors = names
            .iter()
            .map(|n| NamedColor::from_name(n.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        if colors.is_empty() {
            return Err(PaletteError::Empty);
        }
        Ok(Self { colors })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Color at `index`, wrapping out-of-range indices
    pub fn get(&self, index: usize) -> NamedColor {
        self.colors[index % self.colors.len()]
    }

    /// Index following `index`, back to 0 after the last entry
    pub fn next_index(&self, index: usize) -> usize {
        if index + 1 < self.colors.len() {
            index + 1
        } else {
            0
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        // Built from the static table, every name is known
        Self {
            colors: DEFAULT_COLORS
                .iter()
                .filter_map(|n| NamedColor::from_name(n).ok())
                .collect(),
        }
    }
}
