//! # Trueno-Live
//!
//! Real-time streaming time-series charts.
//!
//! trueno-live keeps a bounded rolling window of data per category, maps it
//! through a pannable and zoomable viewport, and renders a grid plus one
//! polyline per category at animation-frame cadence onto a device-pixel-ratio
//! aware surface. It measures its own frame rate and memory use while doing so.
//!
//! ## Features
//!
//! - **Bounded streaming**: per-category FIFO buffers with strict eviction
//! - **Viewport engine**: zoom about a point, drag pan, reset, fit-to-data
//! - **Frame-paced rendering**: one outstanding frame per loop, stop is final
//! - **Deterministic scheduling**: a headless virtual-clock scheduler for tests
//!   and offline rendering
//! - **Pure Rust output**: software rasterizer with PNG snapshots
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use std::time::Duration;
//! use trueno_live::prelude::*;
//!
//! let config = Config::default();
//! let scheduler = Rc::new(HeadlessScheduler::from_config(&config.render));
//! let surface = RasterSurface::new(800.0, 400.0, 2.0)?;
//! let chart = LiveChart::from_config(&config, scheduler.clone(), surface)?;
//!
//! chart.start();
//! scheduler.advance(Duration::from_secs(2));
//! chart.stop();
//!
//! chart.renderer().borrow().surface().save_png("chart.png")?;
//! ```
//!
//! ## References
//!
//! - Bresenham, J. E. (1965). "Algorithm for computer control of a digital plotter."
//! - Wu, X. (1991). "An Efficient Antialiasing Technique." SIGGRAPH '91.
//! - Liang, Y. D., & Barsky, B. A. (1984). "A new concept and method for line clipping."
//! - Heckbert, P. (1990). "Nice numbers for graph labels." Graphics Gems.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow common patterns in graphics/visualization code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Color types and chart themes.
pub mod color;

/// Time-series points and their bounding boxes.
pub mod data;

/// Geometric primitives (points, sizes, rectangles).
pub mod geometry;

/// Linear scales, chart dimensions and tick generation.
pub mod scale;

/// Zoomable, pannable data-space window.
pub mod viewport;

// ============================================================================
// Streaming Modules
// ============================================================================

/// Fixed-capacity FIFO buffer.
pub mod ring_buffer;

/// Per-category bounded point buffers.
pub mod buffer;

/// Data producers and the synthetic generator.
pub mod generator;

/// CSV point loader.
pub mod csv_loader;

/// Recurring producer task feeding a buffer.
pub mod stream;

// ============================================================================
// Scheduling Modules
// ============================================================================

/// Frame and timer scheduling.
pub mod schedule;

/// Animation loops and interval tasks.
pub mod animation;

/// Frame-rate and memory diagnostics.
pub mod perf;

// ============================================================================
// Rendering Modules
// ============================================================================

/// Core framebuffer for pixel rendering.
pub mod framebuffer;

/// Drawing surfaces.
pub mod surface;

/// Rasterization primitives and the chart renderer.
pub mod render;

/// Output encoders (PNG).
pub mod output;

/// Composed live chart.
pub mod chart;

// ============================================================================
// Configuration & Errors
// ============================================================================

/// YAML configuration.
pub mod config;

/// Error types for trueno-live operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust,ignore
/// use trueno_live::prelude::*;
/// ```
pub mod prelude {
    pub use batuta_common::display::WithDimensions;
    pub use crate::animation::{AnimationLoop, IntervalTask};
    pub use crate::buffer::{AppendStats, StreamBuffer};
    pub use crate::chart::LiveChart;
    pub use crate::color::{ChartTheme, Rgba};
    pub use crate::config::Config;
    pub use crate::data::{DataExtent, DataPoint};
    pub use crate::error::{Error, Result};
    pub use crate::generator::{DataProducer, SyntheticGenerator};
    pub use crate::perf::{PerformanceMetrics, PerformanceMonitor};
    pub use crate::render::{ChartRenderer, FrameReport, RenderOptions};
    pub use crate::scale::{calculate_chart_dimensions, calculate_ticks, create_scale, ChartDimensions, LinearScale};
    pub use crate::schedule::{HeadlessScheduler, Scheduler};
    pub use crate::stream::DataStream;
    pub use crate::surface::{RasterSurface, RecordingSurface, Surface};
    pub use crate::viewport::{Viewport, ViewportConfig, ZoomLimits};
}

// ============================================================================
// Re-exports
// ============================================================================

/// Re-export trueno for direct access to SIMD operations.
pub use trueno;
