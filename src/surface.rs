//! Drawing surfaces.
//!
//! A [`Surface`] is the canvas-like target the chart renderer paints on. It is
//! addressed in logical pixels; the backing store has `logical × pixel_ratio`
//! device pixels and every drawing call is scaled by the ratio, so a chart looks
//! identical on high-density displays.
//!
//! Two implementations ship:
//!
//! - [`RasterSurface`]: software rasterizer over a [`Framebuffer`], with PNG
//!   snapshots.
//! - [`RecordingSurface`]: keeps a log of [`DrawCommand`]s for inspection.

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::framebuffer::{Framebuffer, LuminanceStats};
use crate::geometry::{Point, Size};
use crate::output::PngEncoder;
use crate::render::draw_wide_line;
use batuta_common::display::WithDimensions;
use std::path::Path;

/// Line appearance for subsequent strokes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    /// Stroke color.
    pub color: Rgba,
    /// Width in logical pixels.
    pub width: f64,
    /// Anti-alias the stroke.
    pub antialias: bool,
}

impl StrokeStyle {
    /// Anti-aliased stroke of the given color and width.
    #[must_use]
    pub const fn new(color: Rgba, width: f64) -> Self {
        Self { color, width, antialias: true }
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self::new(Rgba::BLACK, 1.0)
    }
}

/// Canvas-like 2D drawing target.
///
/// Paths are built with [`move_to`](Surface::move_to) and
/// [`line_to`](Surface::line_to) and painted by [`stroke`](Surface::stroke),
/// which also starts a fresh path.
pub trait Surface {
    /// (Re)size the surface. The backing store becomes
    /// `width × ratio` by `height × ratio` device pixels.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] for a non-drawable size or ratio.
    fn initialize(&mut self, width: f64, height: f64, pixel_ratio: f64) -> Result<()>;

    /// Size in logical pixels.
    fn logical_size(&self) -> Size;

    /// Device pixels per logical pixel.
    fn pixel_ratio(&self) -> f64;

    /// Paint the whole surface with `color` and drop the current path.
    fn clear(&mut self, color: Rgba);

    /// Style used by subsequent strokes.
    fn set_stroke(&mut self, style: StrokeStyle);

    /// Begin a new sub-path at `point`.
    fn move_to(&mut self, point: Point);

    /// Extend the current sub-path to `point`.
    fn line_to(&mut self, point: Point);

    /// Paint the current path with the current stroke style.
    fn stroke(&mut self);
}

/// Largest backing store a surface will allocate, in device pixels (256 MiB of RGBA).
pub const MAX_DEVICE_PIXELS: f64 = 67_108_864.0;

/// Device pixel count for a logical size and ratio, before any validation.
#[must_use]
pub fn device_pixels(width: f64, height: f64, pixel_ratio: f64) -> f64 {
    (width * pixel_ratio).round() * (height * pixel_ratio).round()
}

/// Validate a logical size and ratio, returning the backing store size.
fn backing_size(width: f64, height: f64, pixel_ratio: f64) -> Result<(u32, u32)> {
    let drawable = Size::new(width, height).is_drawable();
    if !drawable || !(pixel_ratio.is_finite() && pixel_ratio > 0.0) {
        return Err(Error::InvalidDimensions { width, height });
    }
    let device_w = (width * pixel_ratio).round();
    let device_h = (height * pixel_ratio).round();
    if device_w < 1.0 || device_h < 1.0 || device_w * device_h > MAX_DEVICE_PIXELS {
        log::warn!("refusing {device_w}x{device_h} device pixel backing store");
        return Err(Error::InvalidDimensions { width, height });
    }
    Ok((device_w as u32, device_h as u32))
}

// ============================================================================
// Raster
// ============================================================================

/// Software surface backed by a [`Framebuffer`].
#[derive(Debug, Clone)]
pub struct RasterSurface {
    framebuffer: Framebuffer,
    logical: Size,
    pixel_ratio: f64,
    style: StrokeStyle,
    /// Sub-paths in logical coordinates.
    path: Vec<Vec<Point>>,
}

impl RasterSurface {
    /// Create and initialize a surface.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] for a non-drawable size or ratio.
    pub fn new(width: f64, height: f64, pixel_ratio: f64) -> Result<Self> {
        let (device_w, device_h) = backing_size(width, height, pixel_ratio)?;
        log::debug!(
            "raster surface {device_w}x{device_h} device px, {:?} luminance backend",
            Framebuffer::backend()
        );
        Ok(Self {
            framebuffer: Framebuffer::new(device_w, device_h)?,
            logical: Size::new(width, height),
            pixel_ratio,
            style: StrokeStyle::default(),
            path: Vec::new(),
        })
    }

    /// The device-pixel backing store.
    #[must_use]
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Luma statistics of the current frame.
    #[must_use]
    pub fn luminance(&self) -> LuminanceStats {
        self.framebuffer.luminance_stats()
    }

    /// Whether the frame is a single flat luma, i.e. nothing visible was drawn.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        let stats = self.luminance();
        stats.max - stats.min < 0.5
    }

    /// Encode the current frame as PNG bytes.
    pub fn snapshot_png(&self) -> Result<Vec<u8>> {
        PngEncoder::to_bytes(&self.framebuffer)
    }

    /// Write the current frame to a PNG file.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        PngEncoder::write_to_file(&self.framebuffer, path)
    }

    fn to_device(&self, p: Point) -> (f32, f32) {
        let d = p.scaled(self.pixel_ratio);
        (d.x as f32, d.y as f32)
    }
}

impl Surface for RasterSurface {
    fn initialize(&mut self, width: f64, height: f64, pixel_ratio: f64) -> Result<()> {
        let (device_w, device_h) = backing_size(width, height, pixel_ratio)?;
        self.framebuffer = Framebuffer::new(device_w, device_h)?;
        self.logical = Size::new(width, height);
        self.pixel_ratio = pixel_ratio;
        self.path.clear();
        Ok(())
    }

    fn logical_size(&self) -> Size {
        self.logical
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn clear(&mut self, color: Rgba) {
        self.framebuffer.clear(color);
        self.path.clear();
    }

    fn set_stroke(&mut self, style: StrokeStyle) {
        self.style = style;
    }

    fn move_to(&mut self, point: Point) {
        self.path.push(vec![point]);
    }

    fn line_to(&mut self, point: Point) {
        match self.path.last_mut() {
            Some(sub) => sub.push(point),
            // Canvas semantics: line_to without a current point acts as move_to.
            None => self.path.push(vec![point]),
        }
    }

    fn stroke(&mut self) {
        let width = (self.style.width * self.pixel_ratio) as f32;
        let path = std::mem::take(&mut self.path);
        for sub in &path {
            for pair in sub.windows(2) {
                let a = self.to_device(pair[0]);
                let b = self.to_device(pair[1]);
                draw_wide_line(
                    &mut self.framebuffer,
                    a,
                    b,
                    width,
                    self.style.color,
                    self.style.antialias,
                );
            }
        }
    }
}

impl WithDimensions for RasterSurface {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        if let Err(e) = self.initialize(f64::from(width), f64::from(height), self.pixel_ratio) {
            log::warn!("ignoring resize to {width}x{height}: {e}");
        }
    }
}

// ============================================================================
// Recording
// ============================================================================

/// One call made against a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// `initialize(width, height, ratio)`.
    Initialize {
        /// Logical width.
        width: f64,
        /// Logical height.
        height: f64,
        /// Device pixel ratio.
        pixel_ratio: f64,
    },
    /// `clear(color)`.
    Clear(Rgba),
    /// `set_stroke(style)`.
    SetStroke(StrokeStyle),
    /// `move_to(point)`.
    MoveTo(Point),
    /// `line_to(point)`.
    LineTo(Point),
    /// `stroke()`.
    Stroke,
}

/// Surface that records calls instead of drawing.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    logical: Size,
    pixel_ratio: f64,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    /// Create an uninitialized recorder reporting the given logical size.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { logical: Size::new(width, height), pixel_ratio: 1.0, commands: Vec::new() }
    }

    /// Everything recorded so far.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drain the command log.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of `stroke()` calls recorded.
    #[must_use]
    pub fn stroke_count(&self) -> usize {
        self.commands.iter().filter(|c| matches!(c, DrawCommand::Stroke)).count()
    }
}

impl Surface for RecordingSurface {
    fn initialize(&mut self, width: f64, height: f64, pixel_ratio: f64) -> Result<()> {
        backing_size(width, height, pixel_ratio)?;
        self.logical = Size::new(width, height);
        self.pixel_ratio = pixel_ratio;
        self.commands.push(DrawCommand::Initialize { width, height, pixel_ratio });
        Ok(())
    }

    fn logical_size(&self) -> Size {
        self.logical
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn clear(&mut self, color: Rgba) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn set_stroke(&mut self, style: StrokeStyle) {
        self.commands.push(DrawCommand::SetStroke(style));
    }

    fn move_to(&mut self, point: Point) {
        self.commands.push(DrawCommand::MoveTo(point));
    }

    fn line_to(&mut self, point: Point) {
        self.commands.push(DrawCommand::LineTo(point));
    }

    fn stroke(&mut self) {
        self.commands.push(DrawCommand::Stroke);
    }
}

impl WithDimensions for RecordingSurface {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.logical = Size::new(f64::from(width), f64::from(height));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backing_store_scales_with_ratio() {
        let surface = RasterSurface::new(200.0, 100.0, 2.0).unwrap();
        assert_eq!(surface.framebuffer().width(), 400);
        assert_eq!(surface.framebuffer().height(), 200);
        assert_eq!(surface.logical_size(), Size::new(200.0, 100.0));
        assert_eq!(surface.pixel_ratio(), 2.0);
    }

    #[test]
    fn test_invalid_sizes_rejected() {
        assert!(RasterSurface::new(0.0, 100.0, 1.0).is_err());
        assert!(RasterSurface::new(100.0, f64::NAN, 1.0).is_err());
        assert!(RasterSurface::new(100.0, 100.0, 0.0).is_err());
        assert!(RasterSurface::new(100.0, 100.0, -1.0).is_err());
    }

    #[test]
    fn test_oversized_backing_store_rejected() {
        assert!(device_pixels(200_000.0, 200_000.0, 4.0) > MAX_DEVICE_PIXELS);
        assert!(matches!(
            RasterSurface::new(200_000.0, 200_000.0, 4.0),
            Err(Error::InvalidDimensions { .. })
        ));
        assert!(RecordingSurface::new(1.0, 1.0).initialize(200_000.0, 200_000.0, 4.0).is_err());

        // 8192 x 8192 device pixels is exactly the budget.
        assert_eq!(device_pixels(4096.0, 4096.0, 2.0), MAX_DEVICE_PIXELS);
        assert!(RecordingSurface::new(1.0, 1.0).initialize(4096.0, 4096.0, 2.0).is_ok());
        assert!(RecordingSurface::new(1.0, 1.0).initialize(4097.0, 4096.0, 2.0).is_err());
    }

    #[test]
    fn test_blank_until_stroked() {
        let mut surface = RasterSurface::new(20.0, 20.0, 1.0).unwrap();
        surface.clear(Rgba::WHITE);
        assert!(surface.is_blank());
        assert_eq!(surface.luminance().min, surface.luminance().max);

        surface.set_stroke(StrokeStyle::new(Rgba::BLACK, 2.0));
        surface.move_to(Point::new(2.0, 10.0));
        surface.line_to(Point::new(18.0, 10.0));
        surface.stroke();
        assert!(!surface.is_blank());
        assert!(surface.luminance().min < 128.0);
    }

    #[test]
    fn test_initialize_resizes() {
        let mut surface = RasterSurface::new(10.0, 10.0, 1.0).unwrap();
        surface.initialize(30.0, 20.0, 1.5).unwrap();
        assert_eq!(surface.framebuffer().width(), 45);
        assert_eq!(surface.framebuffer().height(), 30);
    }

    #[test]
    fn test_failed_initialize_keeps_previous_store() {
        let mut surface = RasterSurface::new(10.0, 10.0, 1.0).unwrap();
        assert!(surface.initialize(-5.0, 10.0, 1.0).is_err());
        assert_eq!(surface.framebuffer().width(), 10);
    }

    #[test]
    fn test_stroke_is_scaled_by_ratio() {
        let mut surface = RasterSurface::new(50.0, 50.0, 2.0).unwrap();
        surface.clear(Rgba::WHITE);
        surface.set_stroke(StrokeStyle { color: Rgba::BLACK, width: 0.5, antialias: false });
        surface.move_to(Point::new(10.0, 25.0));
        surface.line_to(Point::new(40.0, 25.0));
        surface.stroke();

        let fb = surface.framebuffer();
        assert_eq!(fb.get_pixel(20, 50), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(80, 50), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(50, 25), Some(Rgba::WHITE));
    }

    #[test]
    fn test_stroke_consumes_path() {
        let mut surface = RasterSurface::new(20.0, 20.0, 1.0).unwrap();
        surface.clear(Rgba::WHITE);
        surface.set_stroke(StrokeStyle { color: Rgba::BLACK, width: 1.0, antialias: false });
        surface.move_to(Point::new(2.0, 2.0));
        surface.line_to(Point::new(2.0, 10.0));
        surface.stroke();
        let painted = surface.framebuffer().count_differing(Rgba::WHITE);

        surface.stroke();
        assert_eq!(surface.framebuffer().count_differing(Rgba::WHITE), painted);
    }

    #[test]
    fn test_with_dimensions_keeps_ratio() {
        let mut surface = RasterSurface::new(10.0, 10.0, 2.0).unwrap();
        surface.set_dimensions(40, 30);
        assert_eq!(surface.logical_size(), Size::new(40.0, 30.0));
        assert_eq!(surface.framebuffer().width(), 80);
    }

    #[test]
    fn test_png_snapshot() {
        let mut surface = RasterSurface::new(8.0, 8.0, 1.0).unwrap();
        surface.clear(Rgba::WHITE);
        let bytes = surface.snapshot_png().unwrap();
        assert_eq!(&bytes[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
    }

    #[test]
    fn test_recording_surface_log() {
        let mut surface = RecordingSurface::new(100.0, 50.0);
        surface.initialize(100.0, 50.0, 2.0).unwrap();
        surface.clear(Rgba::BLACK);
        surface.move_to(Point::ORIGIN);
        surface.line_to(Point::new(1.0, 1.0));
        surface.stroke();

        assert_eq!(surface.stroke_count(), 1);
        assert_eq!(surface.pixel_ratio(), 2.0);
        assert!(matches!(surface.commands()[0], DrawCommand::Initialize { pixel_ratio, .. } if pixel_ratio == 2.0));
        assert_eq!(surface.take_commands().len(), 5);
        assert!(surface.commands().is_empty());
    }
}
