//! Live chart host.
//!
//! [`LiveChart`] wires the pieces of a streaming chart together on one
//! scheduler:
//!
//! - a [`DataStream`] appending producer output to a shared [`StreamBuffer`]
//! - a shared [`Viewport`] mutated by zoom and drag input
//! - an [`AnimationLoop`] that renders one frame per tick through a
//!   [`ChartRenderer`]
//! - a [`PerformanceMonitor`] on its own frame loop
//!
//! Everything is single-threaded. Each activity reads shared state only
//! inside its own callback, so a frame never observes a half-applied update.

use crate::animation::AnimationLoop;
use crate::buffer::StreamBuffer;
use crate::color::ChartTheme;
use crate::config::Config;
use crate::error::Result;
use crate::generator::{DataProducer, GeneratorConfig, SyntheticGenerator};
use crate::perf::{MemoryProbe, PerformanceMetrics, PerformanceMonitor, ProcMemoryProbe};
use crate::render::{ChartRenderer, FrameReport, RenderOptions};
use crate::schedule::Scheduler;
use crate::stream::{DataStream, SharedBuffer};
use crate::framebuffer::LuminanceStats;
use crate::surface::{RasterSurface, Surface};
use crate::viewport::{Viewport, ViewportConfig};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

/// Fit margin used when following incoming data.
const FOLLOW_MARGIN: f64 = 0.1;

/// A streaming chart bound to a scheduler and a surface.
pub struct LiveChart<S: Surface + 'static> {
    viewport: Rc<RefCell<Viewport>>,
    buffer: SharedBuffer,
    renderer: Rc<RefCell<ChartRenderer<S>>>,
    stream: DataStream,
    animation: AnimationLoop,
    monitor: PerformanceMonitor,
    follow: Rc<Cell<bool>>,
    last_report: Rc<Cell<FrameReport>>,
}

impl<S: Surface + 'static> LiveChart<S> {
    /// Assemble a chart from its parts. Nothing runs until [`start`](Self::start).
    pub fn new<P, M>(
        scheduler: Rc<dyn Scheduler>,
        renderer: ChartRenderer<S>,
        buffer: StreamBuffer,
        viewport: Viewport,
        producer: P,
        update_interval: Duration,
        probe: M,
    ) -> Self
    where
        P: DataProducer + 'static,
        M: MemoryProbe + 'static,
    {
        let buffer = Rc::new(RefCell::new(buffer));
        Self {
            viewport: Rc::new(RefCell::new(viewport)),
            stream: DataStream::new(Rc::clone(&scheduler), Rc::clone(&buffer), producer, update_interval),
            buffer,
            renderer: Rc::new(RefCell::new(renderer)),
            animation: AnimationLoop::new(Rc::clone(&scheduler)),
            monitor: PerformanceMonitor::new(scheduler, probe),
            follow: Rc::new(Cell::new(false)),
            last_report: Rc::new(Cell::new(FrameReport::default())),
        }
    }

    /// Build a chart with a synthetic producer as described by `config`.
    ///
    /// The buffer is backfilled with `max_points` samples per category ending
    /// now, and the initial viewport fits that backfill.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid configuration or if the surface
    /// cannot be initialized.
    pub fn from_config(config: &Config, scheduler: Rc<dyn Scheduler>, surface: S) -> Result<Self> {
        config.validate()?;

        let gen_config = GeneratorConfig {
            categories: config.stream.categories.clone(),
            interval_ms: config.stream.update_ms as i64,
            ..GeneratorConfig::default()
        };
        let mut generator = match config.stream.seed {
            Some(seed) => SyntheticGenerator::with_config(gen_config, seed),
            None => SyntheticGenerator::from_entropy(gen_config),
        };

        let count = config.stream.max_points;
        let now_ms = chrono::Utc::now().timestamp_millis();
        let start_ms = now_ms - count as i64 * config.stream.update_ms as i64;
        let mut buffer = StreamBuffer::new(config.stream.categories.iter().cloned(), count)?;
        buffer.backfill(generator.initial_data(count, start_ms));

        let padding = config.viewport.padding;
        let initial = match buffer.extent() {
            Some(extent) => ViewportConfig::from_extent(&extent, padding, config.viewport.margin)?,
            None => ViewportConfig::new(start_ms as f64, now_ms as f64, 0.0, 100.0, padding)?,
        };
        let viewport = Viewport::new(initial, config.viewport.zoom_limits()?)?;

        let render = &config.render;
        let options = RenderOptions {
            x_ticks: render.x_ticks,
            y_ticks: render.y_ticks,
            ..RenderOptions::default()
        };
        let renderer = ChartRenderer::new(
            surface,
            ChartTheme::named(&config.theme),
            render.width,
            render.height,
            render.pixel_ratio,
        )?
        .with_options(options);

        log::info!(
            "live chart: {} categories, {} points each, {} ms updates",
            config.stream.categories.len(),
            count,
            config.stream.update_ms
        );

        Ok(Self::new(
            scheduler,
            renderer,
            buffer,
            viewport,
            generator,
            config.update_interval(),
            ProcMemoryProbe,
        ))
    }

    /// Start streaming, rendering and monitoring. Returns false if already
    /// running.
    pub fn start(&self) -> bool {
        if self.animation.is_running() {
            return false;
        }

        self.stream.start_stream();
        self.monitor.start();

        let viewport = Rc::clone(&self.viewport);
        let buffer = Rc::clone(&self.buffer);
        let renderer = Rc::clone(&self.renderer);
        let follow = Rc::clone(&self.follow);
        let last_report = Rc::clone(&self.last_report);
        self.animation.start(move |_| {
            let report = draw(&viewport, &buffer, &renderer, follow.get());
            last_report.set(report);
        })
    }

    /// Stop every activity. Idempotent.
    pub fn stop(&self) {
        self.animation.stop();
        self.stream.stop_stream();
        self.monitor.stop();
    }

    /// True while frames are being rendered.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.animation.is_running()
    }

    /// Render one frame immediately, outside the frame loop.
    pub fn render_now(&self) -> FrameReport {
        let report = draw(&self.viewport, &self.buffer, &self.renderer, self.follow.get());
        self.last_report.set(report);
        report
    }

    /// Report of the most recent frame.
    #[must_use]
    pub fn last_report(&self) -> FrameReport {
        self.last_report.get()
    }

    /// Refit the viewport to the data on every frame while not dragging.
    pub fn set_follow(&self, follow: bool) {
        self.follow.set(follow);
    }

    /// Whether the viewport follows incoming data.
    #[must_use]
    pub fn is_following(&self) -> bool {
        self.follow.get()
    }

    /// Zoom about a data-space point.
    pub fn zoom(&self, factor: f64, center_x: f64, center_y: f64) {
        self.viewport.borrow_mut().zoom(factor, center_x, center_y);
    }

    /// Begin a drag at normalized coordinates.
    pub fn start_drag(&self, x: f64, y: f64) {
        self.viewport.borrow_mut().start_drag(x, y);
    }

    /// Continue a drag at normalized coordinates.
    pub fn drag(&self, x: f64, y: f64) {
        self.viewport.borrow_mut().drag(x, y);
    }

    /// Finish the current drag.
    pub fn end_drag(&self) {
        self.viewport.borrow_mut().end_drag();
    }

    /// Restore the initial viewport.
    pub fn reset_view(&self) {
        self.viewport.borrow_mut().reset();
    }

    /// Fit the viewport to everything currently buffered.
    pub fn fit_to_data(&self) {
        if let Some(extent) = self.buffer.borrow().extent() {
            self.viewport.borrow_mut().fit_to(&extent, FOLLOW_MARGIN);
        }
    }

    /// Snapshot of the current viewport window.
    #[must_use]
    pub fn viewport_config(&self) -> ViewportConfig {
        self.viewport.borrow().config()
    }

    /// Shared viewport handle.
    #[must_use]
    pub fn viewport(&self) -> &Rc<RefCell<Viewport>> {
        &self.viewport
    }

    /// Shared buffer handle.
    #[must_use]
    pub fn buffer(&self) -> &SharedBuffer {
        &self.buffer
    }

    /// Shared renderer handle.
    #[must_use]
    pub fn renderer(&self) -> &Rc<RefCell<ChartRenderer<S>>> {
        &self.renderer
    }

    /// The producer stream.
    #[must_use]
    pub fn stream(&self) -> &DataStream {
        &self.stream
    }

    /// Latest frame-rate and memory figures.
    #[must_use]
    pub fn metrics(&self) -> PerformanceMetrics {
        self.monitor.metrics()
    }

    /// The performance monitor.
    #[must_use]
    pub fn monitor(&self) -> &PerformanceMonitor {
        &self.monitor
    }
}

impl LiveChart<RasterSurface> {
    /// Luma statistics of the last rendered frame.
    #[must_use]
    pub fn frame_luminance(&self) -> LuminanceStats {
        self.renderer.borrow().surface().luminance()
    }

    /// Whether the last rendered frame is a flat fill.
    #[must_use]
    pub fn frame_is_blank(&self) -> bool {
        self.renderer.borrow().surface().is_blank()
    }
}

impl<S: Surface + 'static> Drop for LiveChart<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn draw<S: Surface>(
    viewport: &RefCell<Viewport>,
    buffer: &SharedBuffer,
    renderer: &RefCell<ChartRenderer<S>>,
    follow: bool,
) -> FrameReport {
    let buffer = buffer.borrow();
    if follow && !viewport.borrow().is_dragging() {
        if let Some(extent) = buffer.extent() {
            viewport.borrow_mut().fit_to(&extent, FOLLOW_MARGIN);
        }
    }
    let config = viewport.borrow().config();
    renderer.borrow_mut().render_frame(&config, &buffer)
}
