//! Colors and chart themes.
//!
//! [`Rgba`] is the only color representation the renderer understands. Themes
//! bundle the background, axis and grid colors with a palette indexed by
//! category position.

use serde::{Deserialize, Serialize};

/// RGBA color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(C)]
pub struct Rgba {
    /// Red component (0-255).
    pub r: u8,
    /// Green component (0-255).
    pub g: u8,
    /// Blue component (0-255).
    pub b: u8,
    /// Alpha component (0-255, 255 = fully opaque).
    pub a: u8,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    /// Create a new RGBA color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color (alpha = 255).
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Create a color with modified alpha.
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Create a color with a fractional opacity in `[0, 1]`.
    #[must_use]
    pub fn with_opacity(self, opacity: f64) -> Self {
        self.with_alpha((opacity.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    /// Parse `#rrggbb` or `#rrggbbaa`. Returns `None` for anything else.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if !(digits.len() == 6 || digits.len() == 8) || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        let a = if digits.len() == 8 { channel(6)? } else { 255 };
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?, a))
    }

    /// Convert to array representation.
    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Create from array representation.
    #[must_use]
    pub const fn from_array(arr: [u8; 4]) -> Self {
        Self::new(arr[0], arr[1], arr[2], arr[3])
    }

    /// Linear interpolation between two colors.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let inv_t = 1.0 - t;

        Self::new(
            (f32::from(self.r) * inv_t + f32::from(other.r) * t).round() as u8,
            (f32::from(self.g) * inv_t + f32::from(other.g) * t).round() as u8,
            (f32::from(self.b) * inv_t + f32::from(other.b) * t).round() as u8,
            (f32::from(self.a) * inv_t + f32::from(other.a) * t).round() as u8,
        )
    }

    /// Black or white, whichever reads better on top of `self`.
    #[must_use]
    pub fn contrast(self) -> Self {
        let luminance =
            (0.299 * f32::from(self.r) + 0.587 * f32::from(self.g) + 0.114 * f32::from(self.b))
                / 255.0;
        if luminance > 0.5 {
            Self::BLACK
        } else {
            Self::WHITE
        }
    }
}

/// Colors used to paint one chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartTheme {
    /// Surface clear color.
    pub background: Rgba,
    /// Axis line color.
    pub axis: Rgba,
    /// Grid line color.
    pub grid: Rgba,
    /// Foreground color. The renderer draws no text labels, so this is only
    /// used as the series color when `palette` is empty.
    pub text: Rgba,
    /// Series colors, indexed by category position and cycled.
    pub palette: Vec<Rgba>,
}

impl ChartTheme {
    /// Look up a built-in theme by name. Unknown names fall back to the default.
    #[must_use]
    pub fn named(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            _ => Self::default(),
        }
    }

    /// Dark-on-light variant.
    #[must_use]
    pub fn light() -> Self {
        Self {
            background: Rgba::WHITE,
            axis: Rgba::BLACK.with_opacity(0.7),
            grid: Rgba::BLACK.with_opacity(0.1),
            text: Rgba::BLACK,
            palette: Self::default().palette,
        }
    }

    /// Color for the series at `index`. Falls back to `text` for an empty palette.
    #[must_use]
    pub fn series_color(&self, index: usize) -> Rgba {
        if self.palette.is_empty() {
            return self.text;
        }
        self.palette[index % self.palette.len()]
    }
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self {
            background: Rgba::rgb(18, 18, 24),
            axis: Rgba::WHITE.with_opacity(0.7),
            grid: Rgba::WHITE.with_opacity(0.1),
            text: Rgba::WHITE,
            palette: vec![
                Rgba::rgb(0xFF, 0x6B, 0x6B), // coral red
                Rgba::rgb(0x4E, 0xCD, 0xC4), // turquoise
                Rgba::rgb(0xFF, 0xE6, 0x6D), // yellow
                Rgba::rgb(0x95, 0xE1, 0xD3), // mint
                Rgba::rgb(0xA8, 0xE6, 0xCF), // soft green
                Rgba::rgb(0xFF, 0xAA, 0xA5), // salmon
            ],
        }
    }
}
