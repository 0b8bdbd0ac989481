//! Per-frame chart drawing.
//!
//! A frame is: clear, derive [`ChartDimensions`] from the surface's logical
//! size and the viewport snapshot, draw the grid at tick positions, then draw
//! every category as a polyline. Dimensions are rebuilt every frame because
//! the viewport can change between frames.

use crate::buffer::StreamBuffer;
use crate::color::ChartTheme;
use crate::error::Result;
use crate::geometry::Point;
use crate::scale::{calculate_chart_dimensions, calculate_ticks, ChartDimensions};
use crate::surface::{StrokeStyle, Surface};
use crate::viewport::ViewportConfig;
use batuta_common::display::WithDimensions;

/// Tunables for chart drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Target number of vertical grid lines.
    pub x_ticks: usize,
    /// Target number of horizontal grid lines.
    pub y_ticks: usize,
    /// Series stroke width in logical pixels.
    pub line_width: f64,
    /// Grid stroke width in logical pixels.
    pub grid_width: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { x_ticks: 10, y_ticks: 5, line_width: 1.5, grid_width: 1.0 }
    }
}

/// What one call to [`ChartRenderer::render_frame`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameReport {
    /// The frame was abandoned after clearing.
    pub skipped: bool,
    /// Grid and axis lines drawn.
    pub grid_lines: usize,
    /// Categories with at least one visible point.
    pub series_drawn: usize,
    /// Points turned into path vertices.
    pub points_drawn: usize,
    /// Points whose pixel position was not finite.
    pub points_skipped: usize,
}

/// Draws a live chart onto a [`Surface`].
#[derive(Debug)]
pub struct ChartRenderer<S: Surface> {
    surface: S,
    theme: ChartTheme,
    options: RenderOptions,
    dimensions: Option<ChartDimensions>,
    frames_rendered: u64,
    frames_skipped: u64,
}

impl<S: Surface> ChartRenderer<S> {
    /// Initialize `surface` at `width × height` logical pixels and the given
    /// device pixel ratio.
    pub fn new(
        mut surface: S,
        theme: ChartTheme,
        width: f64,
        height: f64,
        pixel_ratio: f64,
    ) -> Result<Self> {
        surface.initialize(width, height, pixel_ratio)?;
        Ok(Self {
            surface,
            theme,
            options: RenderOptions::default(),
            dimensions: None,
            frames_rendered: 0,
            frames_skipped: 0,
        })
    }

    /// Replace the drawing options.
    #[must_use]
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Re-initialize the surface at a new size. Dimensions are rebuilt on the
    /// next frame.
    pub fn resize(&mut self, width: f64, height: f64, pixel_ratio: f64) -> Result<()> {
        self.surface.initialize(width, height, pixel_ratio)?;
        self.dimensions = None;
        log::debug!("surface resized to {width}x{height} @{pixel_ratio}x");
        Ok(())
    }

    /// Recompute scales for the current surface size and `viewport`.
    pub fn update_dimensions(&mut self, viewport: &ViewportConfig) -> Result<ChartDimensions> {
        let size = self.surface.logical_size();
        let dims = calculate_chart_dimensions(size.width, size.height, viewport)?;
        self.dimensions = Some(dims);
        Ok(dims)
    }

    /// Scales used by the most recent frame.
    #[must_use]
    pub fn dimensions(&self) -> Option<&ChartDimensions> {
        self.dimensions.as_ref()
    }

    /// Draw one complete frame. Never fails: problems are logged and the
    /// frame is skipped.
    pub fn render_frame(&mut self, viewport: &ViewportConfig, buffer: &StreamBuffer) -> FrameReport {
        self.surface.clear(self.theme.background);

        if let Err(e) = self.update_dimensions(viewport) {
            log::warn!("skipping frame: {e}");
            self.frames_skipped += 1;
            return FrameReport { skipped: true, ..FrameReport::default() };
        }

        let grid_lines = self.draw_grid(self.options.x_ticks, self.options.y_ticks);
        let mut report = self.draw_series(buffer);
        report.grid_lines = grid_lines;
        self.frames_rendered += 1;
        report
    }

    /// Draw grid lines at nice tick positions plus the left and bottom axes.
    /// Returns the number of lines drawn, zero before the first
    /// [`update_dimensions`](Self::update_dimensions).
    pub fn draw_grid(&mut self, x_ticks: usize, y_ticks: usize) -> usize {
        let Some(dims) = self.dimensions else {
            return 0;
        };
        let area = dims.plot_area();
        let (x_min, x_max) = dims.x_scale.domain();
        let (y_min, y_max) = dims.y_scale.domain();
        let mut lines = 0;

        self.surface.set_stroke(StrokeStyle::new(self.theme.grid, self.options.grid_width));
        for t in calculate_ticks(x_min, x_max, x_ticks) {
            let x = dims.x_scale.scale(t);
            self.surface.move_to(Point::new(x, area.y));
            self.surface.line_to(Point::new(x, area.bottom()));
            lines += 1;
        }
        for v in calculate_ticks(y_min, y_max, y_ticks) {
            let y = dims.y_scale.scale(v);
            self.surface.move_to(Point::new(area.x, y));
            self.surface.line_to(Point::new(area.right(), y));
            lines += 1;
        }
        self.surface.stroke();

        self.surface.set_stroke(StrokeStyle::new(self.theme.axis, self.options.grid_width));
        self.surface.move_to(Point::new(area.x, area.y));
        self.surface.line_to(Point::new(area.x, area.bottom()));
        self.surface.line_to(Point::new(area.right(), area.bottom()));
        self.surface.stroke();
        lines + 2
    }

    /// Draw every category that has points inside the visible time range.
    ///
    /// One point on either side of the window is included so lines run to the
    /// plot edge. Relies on timestamps being non-decreasing per category.
    fn draw_series(&mut self, buffer: &StreamBuffer) -> FrameReport {
        let mut report = FrameReport::default();
        let Some(dims) = self.dimensions else {
            return report;
        };
        let (x_min, x_max) = dims.x_scale.domain();

        for (index, (_, series)) in buffer.iter_series().enumerate() {
            let start = series.partition_point(|p| (p.timestamp as f64) < x_min).saturating_sub(1);
            let end = (series.partition_point(|p| (p.timestamp as f64) <= x_max) + 1).min(series.len());
            if start >= end {
                continue;
            }

            let color = self.theme.series_color(index);
            self.surface.set_stroke(StrokeStyle::new(color, self.options.line_width));
            let mut pen_down = false;
            let mut vertices = 0;

            for point in series.iter_range(start..end) {
                let pixel = dims.to_pixel(point.timestamp as f64, point.value);
                if !pixel.is_finite() {
                    report.points_skipped += 1;
                    pen_down = false;
                    continue;
                }
                if pen_down {
                    self.surface.line_to(pixel);
                } else {
                    self.surface.move_to(pixel);
                    pen_down = true;
                }
                vertices += 1;
            }

            if vertices > 0 {
                self.surface.stroke();
                report.series_drawn += 1;
                report.points_drawn += vertices;
            }
        }
        report
    }

    /// The drawing surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the drawing surface.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Active theme.
    #[must_use]
    pub fn theme(&self) -> &ChartTheme {
        &self.theme
    }

    /// Switch theme from the next frame on.
    pub fn set_theme(&mut self, theme: ChartTheme) {
        self.theme = theme;
    }

    /// Drawing options.
    #[must_use]
    pub fn options(&self) -> RenderOptions {
        self.options
    }

    /// Frames drawn to completion.
    #[must_use]
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Frames abandoned because dimensions could not be derived.
    #[must_use]
    pub fn frames_skipped(&self) -> u64 {
        self.frames_skipped
    }
}

impl<S: Surface> WithDimensions for ChartRenderer<S> {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        let ratio = self.surface.pixel_ratio();
        if let Err(e) = self.resize(f64::from(width), f64::from(height), ratio) {
            log::warn!("ignoring resize to {width}x{height}: {e}");
        }
    }
}
