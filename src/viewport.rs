//! Viewport controller: the visible data-space window plus zoom and pan.
//!
//! The controller owns a [`ViewportConfig`] and replaces it wholesale on every
//! zoom, pan, reset or fit, so a reader never observes a half-updated window.
//! Interaction methods never fail: out-of-range zoom is clamped, non-finite
//! input is ignored, and a drag without an active session does nothing.
//!
//! Change notification is by polling [`Viewport::revision`], which increments
//! each time the window is replaced.

use crate::data::DataExtent;
use crate::error::{Error, Result};
use crate::geometry::Point;

/// Half-width used when fitting to an extent with zero time span, in ms.
const DEGENERATE_TIME_HALF_SPAN: f64 = 500.0;

/// Half-height used when fitting to an extent with zero value span.
const DEGENERATE_VALUE_HALF_SPAN: f64 = 1.0;

/// Visible rectangle in data space.
///
/// Timestamp bounds are milliseconds since the epoch, held as `f64` so that
/// zooming about a cursor keeps sub-millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportConfig {
    /// Earliest visible timestamp.
    pub x_min: f64,
    /// Latest visible timestamp.
    pub x_max: f64,
    /// Smallest visible value.
    pub y_min: f64,
    /// Largest visible value.
    pub y_max: f64,
    /// Fraction of the surface reserved on each side, in `[0, 0.5)`.
    pub padding: f64,
}

impl ViewportConfig {
    /// Create a validated viewport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidViewport`] unless `x_min < x_max`,
    /// `y_min < y_max`, every bound is finite and `0 <= padding < 0.5`.
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64, padding: f64) -> Result<Self> {
        let config = Self { x_min, x_max, y_min, y_max, padding };
        config.validate()?;
        Ok(config)
    }

    /// Check a config that may have been built from its public fields.
    ///
    /// # Errors
    ///
    /// Same conditions as [`ViewportConfig::new`].
    pub fn validate(&self) -> Result<()> {
        if !self.bounds_valid() {
            return Err(Error::InvalidViewport(format!(
                "bounds must satisfy min < max: x [{}, {}], y [{}, {}]",
                self.x_min, self.x_max, self.y_min, self.y_max
            )));
        }
        let padding = self.padding;
        if !(padding.is_finite() && (0.0..0.5).contains(&padding)) {
            return Err(Error::InvalidViewport(format!("padding {padding} outside [0, 0.5)")));
        }
        Ok(())
    }

    /// Viewport covering `extent`, with `margin` of the value span added above
    /// and below. Zero-width spans are widened so the result stays valid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidViewport`] for an invalid padding or margin.
    pub fn from_extent(extent: &DataExtent, padding: f64, margin: f64) -> Result<Self> {
        if !(margin.is_finite() && margin >= 0.0) {
            return Err(Error::InvalidViewport(format!("margin {margin} must be >= 0")));
        }

        let (mut x_min, mut x_max) = (extent.t_min as f64, extent.t_max as f64);
        if x_max <= x_min {
            x_min -= DEGENERATE_TIME_HALF_SPAN;
            x_max += DEGENERATE_TIME_HALF_SPAN;
        }

        let span = extent.v_max - extent.v_min;
        let (y_min, y_max) = if span > 0.0 {
            (extent.v_min - span * margin, extent.v_max + span * margin)
        } else {
            (extent.v_min - DEGENERATE_VALUE_HALF_SPAN, extent.v_max + DEGENERATE_VALUE_HALF_SPAN)
        };

        Self::new(x_min, x_max, y_min, y_max, padding)
    }

    /// Width and height of the window in data units.
    #[must_use]
    pub fn range(&self) -> ViewportRange {
        ViewportRange { x: self.x_max - self.x_min, y: self.y_max - self.y_min }
    }

    fn bounds_valid(&self) -> bool {
        [self.x_min, self.x_max, self.y_min, self.y_max].iter().all(|v| v.is_finite())
            && self.x_min < self.x_max
            && self.y_min < self.y_max
    }
}

/// Span of a viewport, recomputed on every access.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportRange {
    /// Time span in ms.
    pub x: f64,
    /// Value span.
    pub y: f64,
}

/// Bounds on the accumulated zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLimits {
    /// Smallest allowed zoom level.
    pub min_zoom: f64,
    /// Largest allowed zoom level.
    pub max_zoom: f64,
}

impl ZoomLimits {
    /// Create validated limits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidViewport`] unless `0 < min_zoom <= 1 <= max_zoom`.
    pub fn new(min_zoom: f64, max_zoom: f64) -> Result<Self> {
        if !(min_zoom.is_finite() && max_zoom.is_finite())
            || min_zoom <= 0.0
            || min_zoom > 1.0
            || max_zoom < 1.0
        {
            return Err(Error::InvalidViewport(format!(
                "zoom limits must satisfy 0 < min <= 1 <= max, got [{min_zoom}, {max_zoom}]"
            )));
        }
        Ok(Self { min_zoom, max_zoom })
    }

    fn clamp(self, level: f64) -> f64 {
        level.clamp(self.min_zoom, self.max_zoom)
    }
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self { min_zoom: 0.1, max_zoom: 10.0 }
    }
}

/// Multiplicative zoom accumulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomState {
    /// Current level; 1 is the initial window.
    pub zoom_level: f64,
}

impl Default for ZoomState {
    fn default() -> Self {
        Self { zoom_level: 1.0 }
    }
}

/// Transient pan gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DragState {
    /// True between `start_drag` and `end_drag`.
    pub is_dragging: bool,
    /// Last pointer position in normalized `[0, 1]` space.
    pub anchor: Point,
}

/// Owner of the visible window and its interaction state.
#[derive(Debug, Clone)]
pub struct Viewport {
    initial: ViewportConfig,
    current: ViewportConfig,
    limits: ZoomLimits,
    zoom: ZoomState,
    drag: DragState,
    revision: u64,
}

impl Viewport {
    /// Create a controller showing `initial`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidViewport`] if `initial` fails
    /// [`ViewportConfig::validate`]. Reset restores `initial`, so it must be
    /// a usable window.
    pub fn new(initial: ViewportConfig, limits: ZoomLimits) -> Result<Self> {
        initial.validate()?;
        Ok(Self {
            initial,
            current: initial,
            limits,
            zoom: ZoomState::default(),
            drag: DragState::default(),
            revision: 0,
        })
    }

    /// Current window.
    #[must_use]
    pub fn config(&self) -> ViewportConfig {
        self.current
    }

    /// Window restored by [`Viewport::reset`].
    #[must_use]
    pub fn initial(&self) -> ViewportConfig {
        self.initial
    }

    /// Accumulated zoom level.
    #[must_use]
    pub fn zoom_level(&self) -> f64 {
        self.zoom.zoom_level
    }

    /// Configured zoom limits.
    #[must_use]
    pub fn limits(&self) -> ZoomLimits {
        self.limits
    }

    /// True while a drag gesture is active.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging
    }

    /// Drag gesture state.
    #[must_use]
    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    /// Increments every time the window is replaced.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Span of the current window.
    #[must_use]
    pub fn range(&self) -> ViewportRange {
        self.current.range()
    }

    /// Zoom about the data-space point `(center_x, center_y)`.
    ///
    /// The accumulated level is clamped to the limits, and each bound moves
    /// by `(center - bound) * (1 - zoom_factor)` where `zoom_factor` is the
    /// clamped level ratio. The center stays fixed and the span is multiplied
    /// by `zoom_factor`.
    #[allow(clippy::float_cmp)]
    pub fn zoom(&mut self, factor: f64, center_x: f64, center_y: f64) {
        if !(factor.is_finite() && factor > 0.0 && center_x.is_finite() && center_y.is_finite()) {
            return;
        }

        let old_level = self.zoom.zoom_level;
        let new_level = self.limits.clamp(old_level * factor);
        let zoom_factor = new_level / old_level;
        if zoom_factor == 1.0 {
            return;
        }

        let shift = |bound: f64, center: f64| bound + (center - bound) * (1.0 - zoom_factor);
        let c = self.current;
        let next = ViewportConfig {
            x_min: shift(c.x_min, center_x),
            x_max: shift(c.x_max, center_x),
            y_min: shift(c.y_min, center_y),
            y_max: shift(c.y_max, center_y),
            padding: c.padding,
        };

        if self.replace(next) {
            self.zoom.zoom_level = new_level;
        }
    }

    /// Begin a pan gesture at a normalized position.
    pub fn start_drag(&mut self, x: f64, y: f64) {
        self.drag = DragState { is_dragging: true, anchor: Point::new(x, y) };
    }

    /// Continue a pan gesture. No-op without an active drag.
    ///
    /// `x` and `y` are normalized `[0, 1]` positions; the window moves by the
    /// pointer delta times the visible span, then the anchor advances to the
    /// current position.
    pub fn drag(&mut self, x: f64, y: f64) {
        if !self.drag.is_dragging || !(x.is_finite() && y.is_finite()) {
            return;
        }

        let range = self.range();
        let dx = (x - self.drag.anchor.x) * range.x;
        let dy = (y - self.drag.anchor.y) * range.y;

        let c = self.current;
        let next = ViewportConfig {
            x_min: c.x_min - dx,
            x_max: c.x_max - dx,
            y_min: c.y_min - dy,
            y_max: c.y_max - dy,
            padding: c.padding,
        };
        self.replace(next);
        self.drag.anchor = Point::new(x, y);
    }

    /// Finish the pan gesture.
    pub fn end_drag(&mut self) {
        self.drag = DragState::default();
    }

    /// Restore the initial window and zoom level 1.
    #[allow(clippy::float_cmp)]
    pub fn reset(&mut self) {
        if self.current == self.initial && self.zoom.zoom_level == 1.0 {
            return;
        }
        self.zoom = ZoomState::default();
        self.current = self.initial;
        self.revision += 1;
    }

    /// Show all of `extent`, keeping the current padding and zoom level.
    ///
    /// `margin` is the fraction of the value span added above and below.
    pub fn fit_to(&mut self, extent: &DataExtent, margin: f64) {
        match ViewportConfig::from_extent(extent, self.current.padding, margin) {
            Ok(next) => {
                self.replace(next);
            }
            Err(e) => log::debug!("fit_to skipped: {e}"),
        }
    }

    /// Swap in a new window if it is valid.
    fn replace(&mut self, next: ViewportConfig) -> bool {
        if !next.bounds_valid() {
            log::debug!("viewport update rejected: {next:?}");
            return false;
        }
        if next != self.current {
            self.current = next;
            self.revision += 1;
        }
        true
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        /// Zoom followed by the inverse zoom about the same point restores the window.
        #[test]
        fn prop_zoom_inverse_round_trip(
            factor in 0.2f64..5.0,
            cx in 0.0f64..1.0,
            cy in 0.0f64..1.0,
        ) {
            let initial = ViewportConfig::new(0.0, 3_600_000.0, 0.0, 100.0, 0.1).unwrap();
            let mut vp = Viewport::new(initial, ZoomLimits::default()).unwrap();
            let (cx, cy) = (cx * 3_600_000.0, cy * 100.0);

            vp.zoom(factor, cx, cy);
            vp.zoom(1.0 / factor, cx, cy);

            let c = vp.config();
            prop_assert!((c.x_min - initial.x_min).abs() < 1e-3);
            prop_assert!((c.x_max - initial.x_max).abs() < 1e-3);
            prop_assert!((c.y_min - initial.y_min).abs() < 1e-9);
            prop_assert!((c.y_max - initial.y_max).abs() < 1e-9);
        }

        /// Any sequence of interactions keeps `min < max` and ends bit-exact after reset.
        #[test]
        fn prop_interactions_keep_bounds_valid(
            ops in prop::collection::vec((0u8..3, 0.05f64..20.0, 0.0f64..1.0, 0.0f64..1.0), 1..40)
        ) {
            let initial = ViewportConfig::new(-50.0, 50.0, -1.0, 1.0, 0.05).unwrap();
            let mut vp = Viewport::new(initial, ZoomLimits::default()).unwrap();

            for (kind, factor, x, y) in ops {
                match kind {
                    0 => {
                        let c = vp.config();
                        vp.zoom(factor, c.x_min + x * (c.x_max - c.x_min), c.y_min + y * (c.y_max - c.y_min));
                    }
                    1 => vp.start_drag(x, y),
                    _ => vp.drag(x, y),
                }
                let c = vp.config();
                prop_assert!(c.x_min < c.x_max);
                prop_assert!(c.y_min < c.y_max);
                prop_assert!(vp.zoom_level() >= 0.1 && vp.zoom_level() <= 10.0);
            }

            vp.reset();
            prop_assert_eq!(vp.config(), initial);
            prop_assert_eq!(vp.zoom_level(), 1.0);
        }
    }
}
