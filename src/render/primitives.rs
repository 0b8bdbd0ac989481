//! Line rasterization onto a [`Framebuffer`].
//!
//! Coordinates are device pixels. Segments partly or wholly outside the
//! buffer are clipped per pixel.

use crate::color::Rgba;
use crate::framebuffer::Framebuffer;

/// Longest segment, in pixels along the major axis, that is rasterized.
///
/// A zoomed-in viewport can map off-screen points to huge coordinates; past
/// this length the segment is clipped to the buffer first.
const MAX_SEGMENT_SPAN: f64 = 16_384.0;

// ============================================================================
// Bresenham
// ============================================================================

/// Draw a one-pixel line using Bresenham's algorithm.
pub fn draw_line(fb: &mut Framebuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);

    loop {
        if x >= 0 && y >= 0 {
            fb.blend_pixel(x as u32, y as u32, color);
        }
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

// ============================================================================
// Wu
// ============================================================================

/// Draw an anti-aliased line using Xiaolin Wu's algorithm.
///
/// Two pixels are plotted per step along the major axis, weighted by the
/// fractional distance to the ideal line.
pub fn draw_line_aa(fb: &mut Framebuffer, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgba) {
    let Some((x0, y0, x1, y1)) = clip_segment(fb, x0, y0, x1, y1) else {
        return;
    };

    let steep = (y1 - y0).abs() > (x1 - x0).abs();
    let (x0, y0, x1, y1) = if steep { (y0, x0, y1, x1) } else { (x0, y0, x1, y1) };
    let (x0, y0, x1, y1) = if x0 > x1 { (x1, y1, x0, y0) } else { (x0, y0, x1, y1) };

    let dx = x1 - x0;
    let gradient = if dx.abs() < f32::EPSILON { 1.0 } else { (y1 - y0) / dx };

    let mut put = |major: i32, minor: i32, weight: f32| {
        if steep {
            plot(fb, minor, major, color, weight);
        } else {
            plot(fb, major, minor, color, weight);
        }
    };

    // First endpoint
    let xend = x0.round();
    let yend = y0 + gradient * (xend - x0);
    let xgap = rfpart(x0 + 0.5);
    let xpxl1 = xend as i32;
    put(xpxl1, yend.floor() as i32, rfpart(yend) * xgap);
    put(xpxl1, yend.floor() as i32 + 1, fpart(yend) * xgap);
    let mut intery = yend + gradient;

    // Second endpoint
    let xend = x1.round();
    let yend = y1 + gradient * (xend - x1);
    let xgap = fpart(x1 + 0.5);
    let xpxl2 = xend as i32;
    put(xpxl2, yend.floor() as i32, rfpart(yend) * xgap);
    put(xpxl2, yend.floor() as i32 + 1, fpart(yend) * xgap);

    for x in (xpxl1 + 1)..xpxl2 {
        let ipart = intery.floor() as i32;
        put(x, ipart, rfpart(intery));
        put(x, ipart + 1, fpart(intery));
        intery += gradient;
    }
}

/// Draw a line `width` device pixels thick by stacking parallel passes.
///
/// Widths at or below one pixel fall through to a single pass.
pub fn draw_wide_line(
    fb: &mut Framebuffer,
    (x0, y0): (f32, f32),
    (x1, y1): (f32, f32),
    width: f32,
    color: Rgba,
    antialias: bool,
) {
    let passes = width.round().max(1.0) as i32;
    let steep = (y1 - y0).abs() > (x1 - x0).abs();
    let first = -(passes - 1) as f32 / 2.0;

    for i in 0..passes {
        let offset = first + i as f32;
        let (ox, oy) = if steep { (offset, 0.0) } else { (0.0, offset) };
        if antialias {
            draw_line_aa(fb, x0 + ox, y0 + oy, x1 + ox, y1 + oy, color);
        } else if let Some((ax, ay, bx, by)) = clip_segment(fb, x0 + ox, y0 + oy, x1 + ox, y1 + oy)
        {
            draw_line(
                fb,
                ax.round() as i32,
                ay.round() as i32,
                bx.round() as i32,
                by.round() as i32,
                color,
            );
        }
    }
}

/// Liang–Barsky clip of a segment to the buffer, expanded by one pixel.
///
/// Returns `None` when the segment misses the buffer or has a non-finite
/// endpoint.
fn clip_segment(
    fb: &Framebuffer,
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
) -> Option<(f32, f32, f32, f32)> {
    if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
        return None;
    }
    let inside = |x: f32, y: f32| {
        (-1.0..=fb.width() as f32 + 1.0).contains(&x)
            && (-1.0..=fb.height() as f32 + 1.0).contains(&y)
    };
    if inside(x0, y0) && inside(x1, y1) {
        return Some((x0, y0, x1, y1));
    }

    // Solve in f64: far off-screen endpoints lose the visible part in f32.
    let (x0, y0, x1, y1) = (f64::from(x0), f64::from(y0), f64::from(x1), f64::from(y1));
    let (dx, dy) = (x1 - x0, y1 - y0);
    let (xmin, xmax) = (-1.0, f64::from(fb.width()) + 1.0);
    let (ymin, ymax) = (-1.0, f64::from(fb.height()) + 1.0);
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;

    for (p, q) in [(-dx, x0 - xmin), (dx, xmax - x0), (-dy, y0 - ymin), (dy, ymax - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }

    let (ax, ay, bx, by) = (x0 + t0 * dx, y0 + t0 * dy, x0 + t1 * dx, y0 + t1 * dy);
    let span = (bx - ax).abs().max((by - ay).abs());
    (span <= MAX_SEGMENT_SPAN).then_some((ax as f32, ay as f32, bx as f32, by as f32))
}

/// Plot a pixel at `intensity` of the color's alpha.
#[inline]
fn plot(fb: &mut Framebuffer, x: i32, y: i32, color: Rgba, intensity: f32) {
    if x < 0 || y < 0 || intensity <= 0.0 {
        return;
    }
    let alpha = (f32::from(color.a) * intensity.min(1.0)) as u8;
    fb.blend_pixel(x as u32, y as u32, color.with_alpha(alpha));
}

#[inline]
fn fpart(x: f32) -> f32 {
    x - x.floor()
}

#[inline]
fn rfpart(x: f32) -> f32 {
    1.0 - fpart(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> Framebuffer {
        let mut fb = Framebuffer::new(100, 100).expect("framebuffer creation should succeed");
        fb.clear(Rgba::WHITE);
        fb
    }

    #[test]
    fn test_draw_line_horizontal() {
        let mut fb = canvas();
        draw_line(&mut fb, 10, 50, 90, 50, Rgba::BLACK);
        assert_eq!(fb.get_pixel(10, 50), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(50, 50), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(90, 50), Some(Rgba::BLACK));
        assert_eq!(fb.count_differing(Rgba::WHITE), 81);
    }

    #[test]
    fn test_draw_line_diagonal() {
        let mut fb = canvas();
        draw_line(&mut fb, 10, 10, 90, 90, Rgba::BLACK);
        assert_eq!(fb.get_pixel(50, 50), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(90, 90), Some(Rgba::BLACK));
    }

    #[test]
    fn test_draw_line_out_of_bounds() {
        let mut fb = canvas();
        draw_line(&mut fb, -10, -10, 110, 110, Rgba::BLACK);
        assert_eq!(fb.get_pixel(50, 50), Some(Rgba::BLACK));
    }

    #[test]
    fn test_draw_line_aa_touches_path() {
        let mut fb = canvas();
        draw_line_aa(&mut fb, 10.0, 10.0, 90.0, 50.0, Rgba::BLACK);
        let px = fb.get_pixel(50, 30).unwrap();
        assert!(px.r < 255, "pixel on the ideal line should be darkened");
        assert_eq!(fb.get_pixel(50, 80), Some(Rgba::WHITE));
    }

    #[test]
    fn test_draw_line_aa_ignores_non_finite() {
        let mut fb = canvas();
        draw_line_aa(&mut fb, f32::NAN, 0.0, 50.0, 50.0, Rgba::BLACK);
        draw_line_aa(&mut fb, 0.0, 0.0, f32::INFINITY, 50.0, Rgba::BLACK);
        assert_eq!(fb.count_differing(Rgba::WHITE), 0);
    }

    #[test]
    fn test_far_offscreen_segment_is_clipped() {
        let mut fb = canvas();
        draw_line_aa(&mut fb, -1.0e9, 50.0, 1.0e9, 50.0, Rgba::BLACK);
        let px = fb.get_pixel(50, 50).unwrap();
        assert!(px.r < 255);
    }

    #[test]
    fn test_segment_missing_buffer_draws_nothing() {
        let mut fb = canvas();
        draw_line_aa(&mut fb, -50.0, -50.0, -10.0, -20.0, Rgba::BLACK);
        assert_eq!(fb.count_differing(Rgba::WHITE), 0);
    }

    #[test]
    fn test_wide_line_covers_more_pixels() {
        let mut thin = canvas();
        let mut wide = canvas();
        draw_wide_line(&mut thin, (10.0, 50.0), (90.0, 50.0), 1.0, Rgba::BLACK, false);
        draw_wide_line(&mut wide, (10.0, 50.0), (90.0, 50.0), 3.0, Rgba::BLACK, false);
        assert_eq!(wide.count_differing(Rgba::WHITE), 3 * thin.count_differing(Rgba::WHITE));
    }
}
