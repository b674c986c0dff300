//! Exact line intersection, rounded to the fixed-point grid.

use std::cmp::Ordering;

use crate::fixed::Fixed;
use crate::geom::{Edge, Line, Point};

/// How a rounded ordinate relates to the true one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Exactness {
    Exact,
    /// The true value is larger than the ordinate.
    RoundedDown,
    /// The true value is smaller than the ordinate.
    RoundedUp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct IntersectOrdinate {
    pub ordinate: Fixed,
    pub exactness: Exactness,
}

impl IntersectOrdinate {
    /// Compares the true (unrounded) value with a grid value.
    pub fn cmp_fixed(&self, b: Fixed) -> Ordering {
        self.ordinate.cmp(&b).then(match self.exactness {
            Exactness::Exact => Ordering::Equal,
            Exactness::RoundedDown => Ordering::Greater,
            Exactness::RoundedUp => Ordering::Less,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct IntersectPoint {
    pub x: IntersectOrdinate,
    pub y: IntersectOrdinate,
}

impl IntersectPoint {
    pub fn point(&self) -> Point {
        Point::new(self.x.ordinate, self.y.ordinate)
    }
}

fn det(a: i128, b: i128, c: i128, d: i128) -> i128 {
    a * d - b * c
}

/// Divides, rounding to the nearest integer with ties away from zero.
fn round_div(num: i128, den: i128) -> Option<IntersectOrdinate> {
    let mut quo = num / den;
    let rem = num % den;
    let exactness = if rem == 0 {
        Exactness::Exact
    } else {
        let frac_positive = (rem < 0) == (den < 0);
        if 2 * rem.abs() >= den.abs() {
            if frac_positive {
                quo += 1;
                Exactness::RoundedUp
            } else {
                quo -= 1;
                Exactness::RoundedDown
            }
        } else if frac_positive {
            Exactness::RoundedDown
        } else {
            Exactness::RoundedUp
        }
    };
    Some(IntersectOrdinate {
        ordinate: Fixed::try_from(quo).ok()?,
        exactness,
    })
}

/// Intersects the lines through two edges.
///
/// Returns `None` for parallel lines, and also when the crossing is
/// certainly not strictly before the end of both lines; the cheap range
/// tests run before any division.
pub(crate) fn intersect_lines(a: &Line, b: &Line) -> Option<IntersectPoint> {
    let dx1 = i128::from(a.p1.x) - i128::from(a.p2.x);
    let dy1 = i128::from(a.p1.y) - i128::from(a.p2.y);
    let dx2 = i128::from(b.p1.x) - i128::from(b.p2.x);
    let dy2 = i128::from(b.p1.y) - i128::from(b.p2.y);

    let den = det(dx1, dy1, dx2, dy2);
    if den == 0 {
        return None;
    }

    let out_of_range = |r: i128| if den < 0 { den >= r } else { den <= r };
    let r = det(
        dx2,
        dy2,
        i128::from(b.p1.x) - i128::from(a.p1.x),
        i128::from(b.p1.y) - i128::from(a.p1.y),
    );
    if out_of_range(r) {
        return None;
    }
    let r = det(
        dy1,
        dx1,
        i128::from(a.p1.y) - i128::from(b.p1.y),
        i128::from(a.p1.x) - i128::from(b.p1.x),
    );
    if out_of_range(r) {
        return None;
    }

    let a_det = det(
        a.p1.x.into(),
        a.p1.y.into(),
        a.p2.x.into(),
        a.p2.y.into(),
    );
    let b_det = det(
        b.p1.x.into(),
        b.p1.y.into(),
        b.p2.x.into(),
        b.p2.y.into(),
    );

    Some(IntersectPoint {
        x: round_div(det(a_det, dx1, b_det, dx2), den)?,
        y: round_div(det(a_det, dy1, b_det, dy2), den)?,
    })
}

/// Will the sweep line see `point` after `edge` starts and before it stops?
///
/// The point must lie on the edge's line. At the edge's top it only counts
/// when strictly to the right of the top point, and at the bottom only when
/// strictly to the left of the bottom point.
pub(crate) fn edge_contains_point(edge: &Edge, point: &IntersectPoint) -> bool {
    let cmp_top = point.y.cmp_fixed(edge.top);
    let cmp_bottom = point.y.cmp_fixed(edge.bottom);

    if cmp_top.is_lt() || cmp_bottom.is_gt() {
        return false;
    }
    if cmp_top.is_gt() && cmp_bottom.is_lt() {
        return true;
    }
    if cmp_top.is_eq() {
        point.x.cmp_fixed(edge.line.x_for_y(edge.top)).is_gt()
    } else {
        point.x.cmp_fixed(edge.line.x_for_y(edge.bottom)).is_lt()
    }
}

/// Finds where two edges cross, if they cross inside both of them.
pub(crate) fn edge_intersect(a: &Edge, b: &Edge) -> Option<Point> {
    let p = intersect_lines(&a.line, &b.line)?;
    (edge_contains_point(a, &p) && edge_contains_point(b, &p)).then(|| p.point())
}
