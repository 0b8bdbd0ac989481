//! Falsification Tests - Core Invariants
//!
//! Each test states a claim about the scale, viewport or buffer engines that
//! a counterexample would refute. Property tests search for one.
//!
//! Run: cargo test --test falsification_test

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use proptest::prelude::*;
use trueno_live::prelude::*;

// ============================================================================
// COORDINATE TRANSFORM
// ============================================================================

proptest! {
    /// Claim 1: endpoints map exactly and the scale is monotonic in the
    /// direction of the range.
    #[test]
    fn claim_01_scale_endpoints_and_monotonic(
        d0 in -1e6..1e6_f64,
        span in 1e-3..1e6_f64,
        r0 in -1e4..1e4_f64,
        r1 in -1e4..1e4_f64,
        a in 0.0..1.0_f64,
        b in 0.0..1.0_f64,
    ) {
        let d1 = d0 + span;
        let scale = create_scale(d0, d1, r0, r1).unwrap();
        prop_assert_eq!(scale.scale(d0), r0);
        prop_assert_eq!(scale.scale(d1), r1);

        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let (p, q) = (scale.scale(d0 + lo * span), scale.scale(d0 + hi * span));
        if r1 >= r0 {
            prop_assert!(p <= q + 1e-9);
        } else {
            prop_assert!(p + 1e-9 >= q);
        }
    }

    /// Claim 2: the chart y axis is inverted.
    #[test]
    fn claim_02_y_axis_inverted(
        width in 1.0..4000.0_f64,
        height in 1.0..4000.0_f64,
        y_min in -1e3..1e3_f64,
        y_span in 1e-2..1e3_f64,
        padding in 0.0..0.45_f64,
    ) {
        let viewport = ViewportConfig::new(0.0, 1.0, y_min, y_min + y_span, padding).unwrap();
        let dims = calculate_chart_dimensions(width, height, &viewport).unwrap();
        prop_assert!(dims.y_scale.scale(viewport.y_max) < dims.y_scale.scale(viewport.y_min));
    }
}

/// Claim 3: ticks for 0..100 are nice multiples inside the range.
#[test]
fn claim_03_ticks_are_nice() {
    let ticks = calculate_ticks(0.0, 100.0, 5);
    assert_eq!(ticks, vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
    assert!(ticks.windows(2).all(|w| w[0] <= w[1]));
    assert!(ticks.iter().all(|t| (0.0..=100.0).contains(t)));
}

// ============================================================================
// STREAMING BUFFER
// ============================================================================

proptest! {
    /// Claim 4: appending more than capacity keeps exactly the newest
    /// `max_points`, oldest first.
    #[test]
    fn claim_04_buffer_keeps_newest(max_points in 1_usize..64, extra in 1_usize..128) {
        let mut buffer = StreamBuffer::new(["A"], max_points).unwrap();
        let total = max_points + extra;
        for i in 0..total {
            buffer.append([DataPoint::categorized(i as i64, i as f64, "A")]);
        }

        let kept: Vec<i64> = buffer.series("A").unwrap().iter().map(|p| p.timestamp).collect();
        let expected: Vec<i64> = ((total - max_points) as i64..total as i64).collect();
        prop_assert_eq!(kept, expected);
    }
}

/// Claim 5: the chronological merge interleaves categories.
#[test]
fn claim_05_sorted_merge() {
    let mut buffer = StreamBuffer::new(["A", "B"], 10).unwrap();
    buffer.append([
        DataPoint::categorized(1, 0.0, "A"),
        DataPoint::categorized(3, 0.0, "A"),
        DataPoint::categorized(2, 0.0, "B"),
        DataPoint::categorized(4, 0.0, "B"),
    ]);
    let order: Vec<i64> = buffer.all_points_sorted().iter().map(|p| p.timestamp).collect();
    assert_eq!(order, vec![1, 2, 3, 4]);
}

// ============================================================================
// VIEWPORT
// ============================================================================

fn viewport() -> Viewport {
    Viewport::new(
        ViewportConfig::new(1_700_000_000_000.0, 1_700_000_060_000.0, 0.0, 100.0, 0.05).unwrap(),
        ZoomLimits::default(),
    )
    .unwrap()
}

proptest! {
    /// Claim 6: zooming by f then 1/f about the same point restores the
    /// window.
    #[test]
    fn claim_06_zoom_inverse(factor in 0.2..5.0_f64, cx in 0.0..1.0_f64, cy in 0.0..1.0_f64) {
        let mut vp = viewport();
        let before = vp.config();
        let center_x = before.x_min + cx * (before.x_max - before.x_min);
        let center_y = before.y_min + cy * (before.y_max - before.y_min);

        vp.zoom(factor, center_x, center_y);
        vp.zoom(1.0 / factor, center_x, center_y);

        let after = vp.config();
        prop_assert!((after.x_min - before.x_min).abs() < 1e-2);
        prop_assert!((after.x_max - before.x_max).abs() < 1e-2);
        prop_assert!((after.y_min - before.y_min).abs() < 1e-9);
        prop_assert!((after.y_max - before.y_max).abs() < 1e-9);
    }

    /// Claim 7: reset restores the initial window bit for bit after any
    /// sequence of gestures.
    #[test]
    fn claim_07_reset_is_exact(
        ops in prop::collection::vec((0.1..10.0_f64, 0.0..1.0_f64, 0.0..1.0_f64), 0..20)
    ) {
        let mut vp = viewport();
        let initial = vp.initial();
        for (factor, x, y) in ops {
            vp.zoom(factor, initial.x_min + x * 60_000.0, y * 100.0);
            vp.start_drag(x, y);
            vp.drag(y, x);
            vp.end_drag();
        }
        vp.reset();
        prop_assert_eq!(vp.config(), initial);
        prop_assert_eq!(vp.zoom_level(), 1.0);
    }
}

/// Claim 8: dragging without a drag session changes nothing.
#[test]
fn claim_08_drag_without_session() {
    let mut vp = viewport();
    let before = vp.config();
    vp.drag(0.9, 0.1);
    assert_eq!(vp.config(), before);
    assert_eq!(vp.revision(), 0);
}
