//! Tessellation output: trapezoids and boxes, and the sinks that collect them.
//!
//! The sweeps never read their output back, so they write it through the
//! [`TrapSink`] and [`BoxSink`] traits as soon as each piece is final.
//! [`Traps`] and [`Boxes`] are the owned accumulators used by the top-level
//! functions, but callers can stream into anything that implements the
//! traits.

use crate::fixed::{self, Fixed};
use crate::geom::{Line, Point};
use crate::Error;

/// An axis-aligned box, from its top-left corner `p1` to its bottom-right
/// corner `p2`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
pub struct FixedBox {
    /// The top-left corner.
    pub p1: Point,
    /// The bottom-right corner.
    pub p2: Point,
}

impl FixedBox {
    /// Creates a box from two corners.
    pub const fn new(p1: Point, p2: Point) -> Self {
        FixedBox { p1, p2 }
    }

    /// Does this box have no interior?
    pub fn is_empty(&self) -> bool {
        self.p1.x >= self.p2.x || self.p1.y >= self.p2.y
    }

    /// The area, in user units. Empty boxes have zero area.
    pub fn area(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let w = i64::from(self.p2.x) - i64::from(self.p1.x);
        let h = i64::from(self.p2.y) - i64::from(self.p1.y);
        (w * h) as f64 / f64::from(fixed::ONE * fixed::ONE)
    }

    /// Rounds a float rectangle to fixed point, keeping its orientation.
    pub fn from_rect(r: kurbo::Rect) -> Result<Self, Error> {
        Ok(FixedBox {
            p1: Point::from_kurbo(r.origin())?,
            p2: Point::from_kurbo(kurbo::Point::new(r.x1, r.y1))?,
        })
    }

    /// Converts to a float rectangle. This is exact.
    pub fn to_rect(&self) -> kurbo::Rect {
        kurbo::Rect::from_points(self.p1.to_kurbo(), self.p2.to_kurbo())
    }

    fn union(self, other: FixedBox) -> FixedBox {
        FixedBox {
            p1: Point::new(self.p1.x.min(other.p1.x), self.p1.y.min(other.p1.y)),
            p2: Point::new(self.p2.x.max(other.p2.x), self.p2.y.max(other.p2.y)),
        }
    }
}

/// A trapezoid with horizontal top and bottom.
///
/// The slanted sides are given by (infinite) lines; the trapezoid is the part
/// between them with `top <= y < bottom`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
pub struct Trapezoid {
    /// The height of the top side.
    pub top: Fixed,
    /// The height of the bottom side.
    pub bottom: Fixed,
    /// The line containing the left side.
    pub left: Line,
    /// The line containing the right side.
    pub right: Line,
}

fn x_at(line: &Line, y: Fixed) -> f64 {
    let line = line.sorted();
    if y == line.p1.y || line.is_horizontal() {
        return f64::from(line.p1.x);
    }
    if y == line.p2.y {
        return f64::from(line.p2.x);
    }
    f64::from(line.p1.x)
        + (f64::from(y) - f64::from(line.p1.y)) * line.dx() as f64 / line.dy() as f64
}

// Which side of `line` is `p` on? Negative means left, zero means on it.
fn side(line: &Line, p: Point) -> i128 {
    let line = line.sorted();
    let px = i128::from(p.x) - i128::from(line.p1.x);
    let py = i128::from(p.y) - i128::from(line.p1.y);
    px * i128::from(line.dy()) - py * i128::from(line.dx())
}

impl Trapezoid {
    /// The area, in user units.
    pub fn area(&self) -> f64 {
        let top_w = x_at(&self.right, self.top) - x_at(&self.left, self.top);
        let bot_w = x_at(&self.right, self.bottom) - x_at(&self.left, self.bottom);
        let h = f64::from(self.bottom) - f64::from(self.top);
        h * (top_w + bot_w) / 2.0 / f64::from(fixed::ONE * fixed::ONE)
    }

    /// Is `p` inside this trapezoid? The top and left boundaries are
    /// inside, the bottom and right ones are not.
    pub fn contains(&self, p: Point) -> bool {
        self.top <= p.y
            && p.y < self.bottom
            && side(&self.left, p) >= 0
            && side(&self.right, p) < 0
    }

    /// Are both sides vertical?
    pub fn is_rectangular(&self) -> bool {
        self.left.is_vertical() && self.right.is_vertical()
    }

    /// Converts a rectangular trapezoid to a box.
    ///
    /// If the left side is to the right of the right side, so is the box's
    /// `p1` to the right of its `p2`.
    pub fn to_box(&self) -> Option<FixedBox> {
        self.is_rectangular().then(|| {
            FixedBox::new(
                Point::new(self.left.p1.x, self.top),
                Point::new(self.right.p1.x, self.bottom),
            )
        })
    }

    /// The four corners of this trapezoid as a closed path.
    pub fn to_path(&self) -> kurbo::BezPath {
        let pt = |x: f64, y: Fixed| {
            kurbo::Point::new(x / f64::from(fixed::ONE), fixed::to_f64(y))
        };
        let mut path = kurbo::BezPath::new();
        path.move_to(pt(x_at(&self.left, self.top), self.top));
        path.line_to(pt(x_at(&self.right, self.top), self.top));
        path.line_to(pt(x_at(&self.right, self.bottom), self.bottom));
        path.line_to(pt(x_at(&self.left, self.bottom), self.bottom));
        path.close_path();
        path
    }

    fn bounds(&self) -> FixedBox {
        let xs = [
            self.left.x_for_y(self.top),
            self.left.x_for_y(self.bottom),
            self.right.x_for_y(self.top),
            self.right.x_for_y(self.bottom),
        ];
        FixedBox::new(
            Point::new(xs.into_iter().min().unwrap_or(0), self.top),
            Point::new(xs.into_iter().max().unwrap_or(0), self.bottom),
        )
    }
}

/// Receives trapezoids from a sweep.
pub trait TrapSink {
    /// Appends the trapezoid between `left` and `right` with `top <= y <
    /// bottom`.
    ///
    /// Returning an error aborts the sweep, which passes the error on.
    fn add_trap(
        &mut self,
        top: Fixed,
        bottom: Fixed,
        left: &Line,
        right: &Line,
    ) -> Result<(), Error>;
}

/// Receives boxes from a sweep.
pub trait BoxSink {
    /// Appends a non-empty box.
    ///
    /// Returning an error aborts the sweep, which passes the error on.
    fn add_box(&mut self, b: &FixedBox) -> Result<(), Error>;
}

fn try_push<T>(v: &mut Vec<T>, elt: T) -> Result<(), Error> {
    v.try_reserve(1).map_err(|_| Error::NoMemory)?;
    v.push(elt);
    Ok(())
}

/// A growable collection of trapezoids.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Traps {
    traps: Vec<Trapezoid>,
}

impl Traps {
    /// An empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of trapezoids.
    pub fn len(&self) -> usize {
        self.traps.len()
    }

    /// Are there no trapezoids?
    pub fn is_empty(&self) -> bool {
        self.traps.is_empty()
    }

    /// Iterates over the trapezoids, in the order they were added.
    pub fn iter(&self) -> std::slice::Iter<'_, Trapezoid> {
        self.traps.iter()
    }

    /// The trapezoids, as a slice.
    pub fn as_slice(&self) -> &[Trapezoid] {
        &self.traps
    }

    /// The trapezoids, as a vector.
    pub fn into_vec(self) -> Vec<Trapezoid> {
        self.traps
    }

    /// The total area, in user units.
    pub fn area(&self) -> f64 {
        self.traps.iter().map(Trapezoid::area).sum()
    }

    /// The smallest box containing every trapezoid, if there are any.
    pub fn extents(&self) -> Option<FixedBox> {
        self.traps.iter().map(Trapezoid::bounds).reduce(FixedBox::union)
    }
}

impl TrapSink for Traps {
    fn add_trap(
        &mut self,
        top: Fixed,
        bottom: Fixed,
        left: &Line,
        right: &Line,
    ) -> Result<(), Error> {
        try_push(
            &mut self.traps,
            Trapezoid {
                top,
                bottom,
                left: *left,
                right: *right,
            },
        )
    }
}

impl BoxSink for Traps {
    fn add_box(&mut self, b: &FixedBox) -> Result<(), Error> {
        let side = |x| Line::new(Point::new(x, b.p1.y), Point::new(x, b.p2.y));
        self.add_trap(b.p1.y, b.p2.y, &side(b.p1.x), &side(b.p2.x))
    }
}

impl<'a> IntoIterator for &'a Traps {
    type Item = &'a Trapezoid;
    type IntoIter = std::slice::Iter<'a, Trapezoid>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A growable collection of boxes.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Boxes {
    boxes: Vec<FixedBox>,
}

impl Boxes {
    /// An empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of boxes.
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Are there no boxes?
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Iterates over the boxes, in the order they were added.
    pub fn iter(&self) -> std::slice::Iter<'_, FixedBox> {
        self.boxes.iter()
    }

    /// The boxes, as a slice.
    pub fn as_slice(&self) -> &[FixedBox] {
        &self.boxes
    }

    /// The boxes, as a vector.
    pub fn into_vec(self) -> Vec<FixedBox> {
        self.boxes
    }

    /// The total area, in user units.
    pub fn area(&self) -> f64 {
        self.boxes.iter().map(FixedBox::area).sum()
    }

    /// The smallest box containing every box, if there are any.
    pub fn extents(&self) -> Option<FixedBox> {
        self.boxes.iter().copied().reduce(FixedBox::union)
    }
}

impl BoxSink for Boxes {
    fn add_box(&mut self, b: &FixedBox) -> Result<(), Error> {
        try_push(&mut self.boxes, *b)
    }
}

impl<'a> IntoIterator for &'a Boxes {
    type Item = &'a FixedBox;
    type IntoIter = std::slice::Iter<'a, FixedBox>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
