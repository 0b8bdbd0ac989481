//! Rasterization and chart drawing.
//!
//! - [`draw_line`], [`draw_line_aa`], [`draw_wide_line`]: Bresenham and Wu
//!   (anti-aliased) lines on a framebuffer, with segment clipping
//! - [`ChartRenderer`]: grid and series drawing against any [`Surface`](crate::surface::Surface)
//!
//! # References
//!
//! - Wu, X. (1991). "An Efficient Antialiasing Technique." SIGGRAPH '91.
//! - Bresenham, J. E. (1965). "Algorithm for computer control of a digital plotter."

mod chart;
mod primitives;

pub use chart::{ChartRenderer, FrameReport, RenderOptions};
pub use primitives::{draw_line, draw_line_aa, draw_wide_line};
