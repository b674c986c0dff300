//! Float comparisons shared by the integration tests.

#![allow(dead_code)]

pub fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * a.abs().max(b.abs()).max(1.0)
}

/// Rounding crossings to the fixed-point grid leaves slivers of area at
/// most a few units of `1 / 256^2` each, so two tessellations of the same
/// crossing edges can differ by a little more than float error.
pub fn close_with_crossings(a: f64, b: f64) -> bool {
    (a - b).abs() <= 0.05 + 1e-6 * a.abs().max(b.abs())
}
