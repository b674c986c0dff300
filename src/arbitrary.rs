//! Utilities for fuzz and/or property testing using `arbitrary`.
//!
//! Random inputs are mostly boring: edges in general position, crossing at
//! points that round cleanly. These generators are biased towards the
//! inputs that exercise the hard cases, like shared vertices, coincident
//! and colinear edges, and crossings a single fixed-point unit apart.

use arbitrary::Unstructured;

use crate::fixed::{self, Fixed};
use crate::{FillRule, FixedBox, Point, Polygon};

/// The largest coordinate we generate, in user units.
///
/// Keeping well inside the fixed-point range means that the sweep's exact
/// arithmetic is exercised without every input being rejected.
pub const RANGE: i32 = 1 << 12;

/// Generate an arbitrary fixed-point coordinate in `-range..=range` (user
/// units), biased towards integers.
pub fn coordinate_in_range(range: i32, u: &mut Unstructured<'_>) -> arbitrary::Result<Fixed> {
    let limit = fixed::from_int(range);
    let c = u.int_in_range(-limit..=limit)?;
    Ok(if u.arbitrary()? {
        c & !(fixed::ONE - 1)
    } else {
        c
    })
}

fn coordinate(u: &mut Unstructured<'_>) -> arbitrary::Result<Fixed> {
    coordinate_in_range(RANGE, u)
}

/// Generate a coordinate that has a chance to be very close to `orig`.
fn another_coordinate(orig: Fixed, u: &mut Unstructured<'_>) -> arbitrary::Result<Fixed> {
    if u.arbitrary()? {
        let limit = fixed::from_int(RANGE);
        let nudge: i32 = u.int_in_range(-2..=2)?;
        Ok((orig + nudge).clamp(-limit, limit))
    } else {
        coordinate(u)
    }
}

/// Generate an arbitrary point.
pub fn point(u: &mut Unstructured<'_>) -> arbitrary::Result<Point> {
    Ok(Point::new(coordinate(u)?, coordinate(u)?))
}

/// Generate a point that has a chance of sharing a coordinate with (or
/// being right next to) `orig`.
pub fn another_point(orig: Point, u: &mut Unstructured<'_>) -> arbitrary::Result<Point> {
    Ok(Point::new(
        another_coordinate(orig.x, u)?,
        another_coordinate(orig.y, u)?,
    ))
}

/// Generate a fill rule.
pub fn fill_rule(u: &mut Unstructured<'_>) -> arbitrary::Result<FillRule> {
    Ok(if u.arbitrary()? {
        FillRule::EvenOdd
    } else {
        FillRule::NonZero
    })
}

/// Generate a polygon made of a few closed contours.
///
/// Vertices are often reused, either from the same contour or from an
/// earlier one, so that there are plenty of shared vertices and overlapping
/// edges.
pub fn polygon(u: &mut Unstructured<'_>) -> arbitrary::Result<Polygon> {
    let mut ret = Polygon::new();
    let mut seen: Vec<Point> = Vec::new();
    let contours = u.int_in_range(1..=4)?;
    for _ in 0..contours {
        let len = u.int_in_range(3..=8)?;
        let mut contour = Vec::with_capacity(len);
        for _ in 0..len {
            let p = match u.int_in_range(0..=3)? {
                0 if !seen.is_empty() => *u.choose(&seen)?,
                1 if !seen.is_empty() => another_point(*u.choose(&seen)?, u)?,
                _ => point(u)?,
            };
            contour.push(p);
            seen.push(p);
        }
        ret.add_contour(&contour)
            .map_err(|_| arbitrary::Error::IncorrectFormat)?;
    }
    Ok(ret)
}

/// Generate a polygon whose edges are all vertical.
///
/// Each contour is a staircase that alternates horizontal and vertical
/// steps, closed by returning to its first point along both axes.
pub fn rectilinear_polygon(u: &mut Unstructured<'_>) -> arbitrary::Result<Polygon> {
    let mut ret = Polygon::new();
    let contours = u.int_in_range(1..=4)?;
    for _ in 0..contours {
        let start = point(u)?;
        let mut contour = vec![start];
        let mut current = start;
        let steps = u.int_in_range(1..=4)?;
        for _ in 0..steps {
            current = Point::new(another_coordinate(current.x, u)?, current.y);
            contour.push(current);
            current = Point::new(current.x, another_coordinate(current.y, u)?);
            contour.push(current);
        }
        contour.push(Point::new(start.x, current.y));
        ret.add_contour(&contour)
            .map_err(|_| arbitrary::Error::IncorrectFormat)?;
    }
    Ok(ret)
}

/// Generate a box, sometimes inside out or empty.
pub fn fixed_box(u: &mut Unstructured<'_>) -> arbitrary::Result<FixedBox> {
    let p1 = point(u)?;
    let p2 = another_point(p1, u)?;
    if u.arbitrary()? {
        // Empty boxes aren't very interesting, so often normalize.
        Ok(FixedBox::new(
            Point::new(p1.x.min(p2.x), p1.y.min(p2.y)),
            Point::new(p1.x.max(p2.x), p1.y.max(p2.y)),
        ))
    } else {
        Ok(FixedBox::new(p1, p2))
    }
}

/// Generate a list of boxes, some of them sharing sides.
pub fn boxes(u: &mut Unstructured<'_>) -> arbitrary::Result<Vec<FixedBox>> {
    let len = u.int_in_range(0..=16)?;
    let mut ret: Vec<FixedBox> = Vec::with_capacity(len);
    for _ in 0..len {
        let b = match ret.last() {
            Some(prev) if u.arbitrary()? => {
                // Share the previous box's right side.
                let mut b = fixed_box(u)?;
                b.p1.x = prev.p2.x;
                b
            }
            _ => fixed_box(u)?,
        };
        ret.push(b);
    }
    Ok(ret)
}
