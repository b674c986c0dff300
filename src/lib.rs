#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

#[macro_use]
mod typed_vec;

mod active;
#[cfg(any(test, feature = "arbitrary"))]
pub mod arbitrary;
pub mod fixed;
mod geom;
mod intersect;
pub mod output;
mod polygon;
mod pqueue;
mod sort;
pub mod sweep;

#[cfg(feature = "generators")]
pub mod generators;

pub use fixed::Fixed;
pub use geom::{Edge, Line, Point};
pub use output::{BoxSink, Boxes, FixedBox, TrapSink, Trapezoid, Traps};
pub use polygon::Polygon;

/// A fill rule tells us how to decide whether a point is "inside" a polygon.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FillRule {
    /// The point is "inside" if its winding number is odd.
    EvenOdd,
    /// The point is "inside" if its winding number is non-zero.
    NonZero,
}

impl FillRule {
    /// The mask applied to a running winding sum: a span is outside when the
    /// masked sum is zero.
    pub(crate) fn winding_mask(self) -> i32 {
        match self {
            FillRule::EvenOdd => 1,
            FillRule::NonZero => !0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Tessellation failed.
pub enum Error {
    /// An allocation failed.
    NoMemory,
    /// An output sink refused to accept another trapezoid or box.
    Rejected,
    /// A rectilinear entry point was given a non-vertical edge.
    NotRectilinear,
    /// A rectangular entry point was given a trapezoid with a slanted side.
    NotRectangular,
    /// A coordinate was not a number.
    NaN,
    /// A coordinate was infinite, or too large for the fixed-point range.
    OutOfRange,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NoMemory => write!(f, "out of memory"),
            Error::Rejected => write!(f, "the output sink rejected a result"),
            Error::NotRectilinear => write!(f, "an edge was not vertical"),
            Error::NotRectangular => write!(f, "a trapezoid was not a rectangle"),
            Error::NaN => write!(f, "one of the inputs had a NaN"),
            Error::OutOfRange => write!(f, "one of the inputs was out of range"),
        }
    }
}

impl std::error::Error for Error {}

/// Tessellates an arbitrary polygon into trapezoids.
///
/// Self-intersections are resolved exactly; the output trapezoids are
/// disjoint and cover exactly the region that is inside according to
/// `fill_rule`.
pub fn tessellate_polygon(polygon: &Polygon, fill_rule: FillRule) -> Result<Traps, Error> {
    let _span = tracing::debug_span!("tessellate_polygon", edges = polygon.len()).entered();
    let mut traps = Traps::new();
    sweep::general::tessellate(polygon.edges(), fill_rule, &mut traps)?;
    Ok(traps)
}

/// Tessellates a polygon whose edges are all vertical into trapezoids.
///
/// Returns [`Error::NotRectilinear`] if some edge is slanted.
pub fn tessellate_rectilinear_polygon(
    polygon: &Polygon,
    fill_rule: FillRule,
) -> Result<Traps, Error> {
    let _span =
        tracing::debug_span!("tessellate_rectilinear_polygon", edges = polygon.len()).entered();
    let mut traps = Traps::new();
    sweep::vertical::tessellate_rectilinear(polygon.edges(), fill_rule, &mut traps)?;
    Ok(traps)
}

/// Tessellates a polygon whose edges are all vertical into boxes.
///
/// Returns [`Error::NotRectilinear`] if some edge is slanted.
pub fn tessellate_rectilinear_polygon_to_boxes(
    polygon: &Polygon,
    fill_rule: FillRule,
) -> Result<Boxes, Error> {
    let _span = tracing::debug_span!(
        "tessellate_rectilinear_polygon_to_boxes",
        edges = polygon.len()
    )
    .entered();
    let mut boxes = Boxes::new();
    sweep::vertical::tessellate_rectilinear(polygon.edges(), fill_rule, &mut boxes)?;
    Ok(boxes)
}

/// Computes the union of a set of boxes, as a set of disjoint boxes.
///
/// A box whose `p1.x` is larger than its `p2.x` winds the other way, which
/// matters for [`FillRule::NonZero`] when it overlaps other boxes.
pub fn tessellate_boxes(boxes: &[FixedBox], fill_rule: FillRule) -> Result<Boxes, Error> {
    let _span = tracing::debug_span!("tessellate_boxes", boxes = boxes.len()).entered();
    let mut out = Boxes::new();
    sweep::vertical::tessellate_boxes(boxes, fill_rule, &mut out)?;
    Ok(out)
}

/// Computes the intersection of two box sets, each taken with the non-zero
/// fill rule.
pub fn intersect_boxes(a: &[FixedBox], b: &[FixedBox]) -> Result<Boxes, Error> {
    let _span = tracing::debug_span!("intersect_boxes", a = a.len(), b = b.len()).entered();
    let mut out = Boxes::new();
    sweep::vertical::intersect_boxes(a, b, &mut out)?;
    Ok(out)
}

/// Re-tessellates a set of possibly overlapping trapezoids.
///
/// Each trapezoid contributes its left side with winding `+1` and its right
/// side with winding `-1`.
pub fn tessellate_traps(traps: &[Trapezoid], fill_rule: FillRule) -> Result<Traps, Error> {
    let _span = tracing::debug_span!("tessellate_traps", traps = traps.len()).entered();
    let polygon = Polygon::from_traps(traps)?;
    let mut out = Traps::new();
    sweep::general::tessellate(polygon.edges(), fill_rule, &mut out)?;
    Ok(out)
}

/// Re-tessellates trapezoids whose sides are all vertical.
///
/// Returns [`Error::NotRectilinear`] if some side is slanted.
pub fn tessellate_rectilinear_traps(
    traps: &[Trapezoid],
    fill_rule: FillRule,
) -> Result<Traps, Error> {
    let _span =
        tracing::debug_span!("tessellate_rectilinear_traps", traps = traps.len()).entered();
    if traps.iter().any(|t| !t.is_rectangular()) {
        return Err(Error::NotRectilinear);
    }
    let polygon = Polygon::from_traps(traps)?;
    let mut out = Traps::new();
    sweep::vertical::tessellate_rectilinear(polygon.edges(), fill_rule, &mut out)?;
    Ok(out)
}

/// Re-tessellates trapezoids that are all rectangles, using the box sweep.
///
/// Returns [`Error::NotRectangular`] if some trapezoid has a slanted side.
pub fn tessellate_rectangular_traps(
    traps: &[Trapezoid],
    fill_rule: FillRule,
) -> Result<Traps, Error> {
    let _span =
        tracing::debug_span!("tessellate_rectangular_traps", traps = traps.len()).entered();
    let boxes = traps
        .iter()
        .map(|t| t.to_box().ok_or(Error::NotRectangular))
        .collect::<Result<Vec<_>, _>>()?;
    let mut out = Traps::new();
    sweep::vertical::tessellate_boxes(&boxes, fill_rule, &mut out)?;
    Ok(out)
}
