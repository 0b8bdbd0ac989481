//! Coordinate transforms from data space to logical pixel space.
//!
//! Everything here is pure: scales are immutable values, and a
//! [`ChartDimensions`] snapshot is rebuilt rather than mutated whenever the
//! surface size or the viewport changes.

use crate::error::{Error, Result};
use crate::geometry::{Point, Rect};
use crate::viewport::ViewportConfig;

/// Upper bound on generated ticks per axis.
pub const MAX_TICKS: usize = 1_000;

/// Affine map from a numeric domain onto a pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_min: f64,
    domain_max: f64,
    range_min: f64,
    range_max: f64,
}

impl LinearScale {
    /// Create a new linear scale.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScaleDomain`] if the domain is degenerate
    /// (`domain.0 == domain.1`) or any bound is not finite.
    #[allow(clippy::float_cmp)]
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Result<Self> {
        let all_finite = [domain.0, domain.1, range.0, range.1].iter().all(|v| v.is_finite());
        if !all_finite {
            return Err(Error::ScaleDomain(format!(
                "non-finite scale bounds: domain {domain:?}, range {range:?}"
            )));
        }
        if domain.0 == domain.1 {
            return Err(Error::ScaleDomain("Domain min and max cannot be equal".to_string()));
        }

        Ok(Self {
            domain_min: domain.0,
            domain_max: domain.1,
            range_min: range.0,
            range_max: range.1,
        })
    }

    /// Transform a domain value to a range value.
    ///
    /// The domain endpoints map exactly onto the range endpoints.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn scale(&self, value: f64) -> f64 {
        if value == self.domain_min {
            return self.range_min;
        }
        if value == self.domain_max {
            return self.range_max;
        }
        let t = (value - self.domain_min) / (self.domain_max - self.domain_min);
        self.range_min + t * (self.range_max - self.range_min)
    }

    /// Invert the scale (range to domain).
    ///
    /// A collapsed pixel range maps everything onto `domain_min`.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn invert(&self, value: f64) -> f64 {
        let span = self.range_max - self.range_min;
        if span == 0.0 {
            return self.domain_min;
        }
        let t = (value - self.range_min) / span;
        self.domain_min + t * (self.domain_max - self.domain_min)
    }

    /// Get the domain extent.
    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        (self.domain_min, self.domain_max)
    }

    /// Get the range extent.
    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        (self.range_min, self.range_max)
    }
}

/// Build a [`LinearScale`] from four bounds.
///
/// # Errors
///
/// Returns [`Error::ScaleDomain`] when `domain_min == domain_max`.
pub fn create_scale(
    domain_min: f64,
    domain_max: f64,
    range_min: f64,
    range_max: f64,
) -> Result<LinearScale> {
    LinearScale::new((domain_min, domain_max), (range_min, range_max))
}

/// Scales and size for one rendered frame.
///
/// Valid only for the frame it was produced in: the viewport may move between
/// frames, so callers rebuild it instead of caching it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartDimensions {
    /// Logical width of the surface.
    pub width: f64,
    /// Logical height of the surface.
    pub height: f64,
    /// Padding fraction the plot area was inset by.
    pub padding: f64,
    /// Timestamp → x pixel.
    pub x_scale: LinearScale,
    /// Value → y pixel (inverted: larger values sit higher).
    pub y_scale: LinearScale,
}

impl ChartDimensions {
    /// Map a data-space point to logical pixels.
    #[must_use]
    pub fn to_pixel(&self, timestamp: f64, value: f64) -> Point {
        Point::new(self.x_scale.scale(timestamp), self.y_scale.scale(value))
    }

    /// Map a logical pixel position back to `(timestamp, value)`.
    #[must_use]
    pub fn to_data(&self, pixel: Point) -> (f64, f64) {
        (self.x_scale.invert(pixel.x), self.y_scale.invert(pixel.y))
    }

    /// The padded rectangle data is drawn into.
    #[must_use]
    pub fn plot_area(&self) -> Rect {
        let (left, right) = self.x_scale.range();
        let (bottom, top) = self.y_scale.range();
        Rect::new(left, top, right - left, bottom - top)
    }
}

/// Derive the padded plot rectangle and both scales for a surface size.
///
/// # Errors
///
/// Returns [`Error::InvalidDimensions`] when width or height is not a positive
/// finite number, and [`Error::ScaleDomain`] for a degenerate viewport.
pub fn calculate_chart_dimensions(
    width: f64,
    height: f64,
    viewport: &ViewportConfig,
) -> Result<ChartDimensions> {
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(Error::InvalidDimensions { width, height });
    }

    let padding = viewport.padding;
    let plot_width = width * (1.0 - 2.0 * padding);
    let plot_height = height * (1.0 - 2.0 * padding);

    let x_scale = create_scale(
        viewport.x_min,
        viewport.x_max,
        padding * width,
        padding * width + plot_width,
    )?;
    let y_scale = create_scale(
        viewport.y_min,
        viewport.y_max,
        padding * height + plot_height,
        padding * height,
    )?;

    Ok(ChartDimensions { width, height, padding, x_scale, y_scale })
}

/// Round a raw step to 1, 2, 5 or 10 times a power of ten.
fn nice_step(rough_step: f64) -> f64 {
    let magnitude = 10f64.powf(rough_step.log10().floor());
    let normalized = rough_step / magnitude;

    let nice = if normalized < 1.5 {
        1.0
    } else if normalized < 3.0 {
        2.0
    } else if normalized < 7.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Axis tick positions at "nice" round values within `[min, max]`.
///
/// Degenerate input never loops or divides by zero:
///
/// - `min == max` yields `[min]`
/// - `max < min`, non-finite bounds or `target_count < 2` yield no ticks
///
/// `target_count` is capped at [`MAX_TICKS`].
#[must_use]
#[allow(clippy::float_cmp)]
pub fn calculate_ticks(min: f64, max: f64, target_count: usize) -> Vec<f64> {
    if !min.is_finite() || !max.is_finite() || target_count < 2 || max < min {
        return Vec::new();
    }
    if min == max {
        return vec![min];
    }

    let target_count = target_count.min(MAX_TICKS);
    let step = nice_step((max - min) / (target_count - 1) as f64);
    if !(step.is_finite() && step > 0.0) {
        return Vec::new();
    }

    let start = ((min / step).ceil() * step).max(min);
    let steps = ((max - start) / step + 1e-9).floor();
    if !steps.is_finite() || steps < 0.0 {
        return Vec::new();
    }

    // Generated by index so rounding error cannot accumulate.
    let count = (steps as usize).min(MAX_TICKS * 10);
    (0..=count).map(|i| (start + i as f64 * step).min(max)).collect()
}

/// Linear interpolation between two values.
#[must_use]
pub fn lerp(start: f64, end: f64, t: f64) -> f64 {
    start * (1.0 - t) + end * t
}

/// Trailing moving average; the output has `len - window + 1` entries.
///
/// A zero window or a window longer than the input yields nothing.
#[must_use]
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || window > values.len() {
        return Vec::new();
    }

    let mut result = Vec::with_capacity(values.len() - window + 1);
    let mut sum = 0.0;
    for (i, &v) in values.iter().enumerate() {
        sum += v;
        if i >= window {
            sum -= values[i - window];
        }
        if i + 1 >= window {
            result.push(sum / window as f64);
        }
    }
    result
}
