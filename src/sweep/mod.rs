//! The sweep-line tessellators.
//!
//! [`general`] handles arbitrary edges, finding their intersections as it
//! goes. [`vertical`] only accepts vertical edges (from rectilinear polygons
//! or boxes) and skips all the intersection machinery.
//!
//! Both emit their output as soon as it is final, through the
//! [`TrapSink`](crate::TrapSink) and [`BoxSink`](crate::BoxSink) traits.

pub mod general;
pub mod vertical;

/// Counters describing one run of a sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    /// The number of events processed (including stale ones).
    pub events: usize,
    /// The number of intersections that swapped two edges.
    pub intersections: usize,
    /// The number of trapezoids or boxes emitted.
    pub output: usize,
}
