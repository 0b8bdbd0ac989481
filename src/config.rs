//! YAML configuration for a live chart.
//!
//! Every key is optional; missing keys take the defaults below.
//!
//! ```yaml
//! stream:
//!   update_ms: 100
//!   max_points: 10000
//!   categories: [Alpha, Beta, Gamma, Delta]
//!   seed: 42
//! viewport:
//!   min_zoom: 0.1
//!   max_zoom: 10.0
//!   padding: 0.05
//!   margin: 0.1
//! render:
//!   width: 800
//!   height: 400
//!   pixel_ratio: 1.0
//!   x_ticks: 10
//!   y_ticks: 5
//!   frame_interval_ms: 16.667
//! theme: dark
//! ```

use crate::error::{Error, Result};
use crate::surface::{device_pixels, MAX_DEVICE_PIXELS};
use crate::viewport::ZoomLimits;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Built-in theme names accepted by [`Config::validate`].
pub const THEMES: [&str; 3] = ["default", "dark", "light"];

/// Producer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Interval between producer steps in milliseconds.
    #[serde(default = "default_update_ms")]
    pub update_ms: u64,

    /// Points retained per category.
    #[serde(default = "default_max_points")]
    pub max_points: usize,

    /// Category names, in series order.
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    /// Generator seed; OS entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_update_ms() -> u64 {
    100
}
fn default_max_points() -> usize {
    10_000
}
fn default_categories() -> Vec<String> {
    ["Alpha", "Beta", "Gamma", "Delta"].map(String::from).to_vec()
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            update_ms: default_update_ms(),
            max_points: default_max_points(),
            categories: default_categories(),
            seed: None,
        }
    }
}

/// Zoom and layout settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportSettings {
    /// Smallest zoom level.
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f64,

    /// Largest zoom level.
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f64,

    /// Fraction of the surface reserved on each side.
    #[serde(default = "default_padding")]
    pub padding: f64,

    /// Value-span fraction added above and below when fitting to data.
    #[serde(default = "default_margin")]
    pub margin: f64,
}

fn default_min_zoom() -> f64 {
    0.1
}
fn default_max_zoom() -> f64 {
    10.0
}
fn default_padding() -> f64 {
    0.05
}
fn default_margin() -> f64 {
    0.1
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
            padding: default_padding(),
            margin: default_margin(),
        }
    }
}

impl ViewportSettings {
    /// Zoom limits described by these settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidViewport`] for limits that do not bracket 1.
    pub fn zoom_limits(&self) -> Result<ZoomLimits> {
        ZoomLimits::new(self.min_zoom, self.max_zoom)
    }
}

/// Surface and frame settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Logical width.
    #[serde(default = "default_width")]
    pub width: f64,

    /// Logical height.
    #[serde(default = "default_height")]
    pub height: f64,

    /// Device pixels per logical pixel.
    #[serde(default = "default_pixel_ratio")]
    pub pixel_ratio: f64,

    /// Target vertical grid lines.
    #[serde(default = "default_x_ticks")]
    pub x_ticks: usize,

    /// Target horizontal grid lines.
    #[serde(default = "default_y_ticks")]
    pub y_ticks: usize,

    /// Frame interval of the headless scheduler in milliseconds.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: f64,
}

fn default_width() -> f64 {
    800.0
}
fn default_height() -> f64 {
    400.0
}
fn default_pixel_ratio() -> f64 {
    1.0
}
fn default_x_ticks() -> usize {
    10
}
fn default_y_ticks() -> usize {
    5
}
fn default_frame_interval_ms() -> f64 {
    16.667
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            pixel_ratio: default_pixel_ratio(),
            x_ticks: default_x_ticks(),
            y_ticks: default_y_ticks(),
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}

impl RenderSettings {
    /// Frame interval as a Duration.
    ///
    /// Values [`Config::validate`] would reject fall back to the 60 Hz default.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        let ms = self.frame_interval_ms;
        if !(ms.is_finite() && ms > 0.0) {
            return Duration::from_secs_f64(default_frame_interval_ms() / 1_000.0);
        }
        Duration::try_from_secs_f64(ms / 1_000.0).unwrap_or(Duration::MAX)
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Producer settings.
    #[serde(default)]
    pub stream: StreamConfig,

    /// Zoom and layout settings.
    #[serde(default)]
    pub viewport: ViewportSettings,

    /// Surface and frame settings.
    #[serde(default)]
    pub render: RenderSettings,

    /// Built-in theme name.
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_theme() -> String {
    "default".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stream: StreamConfig::default(),
            viewport: ViewportSettings::default(),
            render: RenderSettings::default(),
            theme: default_theme(),
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|_| Error::ConfigNotFound(path.display().to_string()))?;

        Self::parse(&content)
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error with line number if parsing fails.
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map(|l| l.line()).unwrap_or(0);
            Error::ConfigParse {
                line,
                message: e.to_string(),
            }
        })
    }

    /// Loads configuration with fallback to defaults.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::debug!("using default configuration: {e}");
                Self::default()
            }
        }
    }

    /// `<config dir>/trueno-live/config.yaml`, if the platform has a config dir.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("trueno-live").join("config.yaml"))
    }

    /// Returns the producer interval as a Duration.
    #[must_use]
    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.stream.update_ms)
    }

    /// Check value ranges that the YAML types cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigInvalid`] naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        let invalid = |key: &str, message: String| {
            Err(Error::ConfigInvalid { key: key.to_string(), message })
        };

        if self.stream.update_ms == 0 {
            return invalid("stream.update_ms", "must be greater than 0".into());
        }
        if self.stream.max_points == 0 {
            return invalid("stream.max_points", "must be greater than 0".into());
        }
        if self.stream.categories.is_empty() {
            return invalid("stream.categories", "at least one category is required".into());
        }
        if let Err(e) = self.viewport.zoom_limits() {
            return invalid("viewport.min_zoom", e.to_string());
        }
        let padding = self.viewport.padding;
        if !(padding.is_finite() && (0.0..0.5).contains(&padding)) {
            return invalid("viewport.padding", format!("{padding} outside [0, 0.5)"));
        }
        let margin = self.viewport.margin;
        if !(margin.is_finite() && margin >= 0.0) {
            return invalid("viewport.margin", format!("{margin} must be >= 0"));
        }
        for (key, value) in [
            ("render.width", self.render.width),
            ("render.height", self.render.height),
            ("render.pixel_ratio", self.render.pixel_ratio),
            ("render.frame_interval_ms", self.render.frame_interval_ms),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return invalid(key, format!("{value} must be a positive number"));
            }
        }
        let render = &self.render;
        if device_pixels(render.width, render.height, render.pixel_ratio) > MAX_DEVICE_PIXELS {
            return invalid(
                "render.width",
                format!(
                    "{}x{} at pixel ratio {} exceeds {MAX_DEVICE_PIXELS} device pixels",
                    render.width, render.height, render.pixel_ratio
                ),
            );
        }
        for (key, value) in [("render.x_ticks", self.render.x_ticks), ("render.y_ticks", self.render.y_ticks)] {
            if value < 2 {
                return invalid(key, format!("{value} must be at least 2"));
            }
        }
        if !THEMES.contains(&self.theme.as_str()) {
            return invalid("theme", format!("unknown theme '{}'", self.theme));
        }
        Ok(())
    }
}
