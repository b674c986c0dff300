//! Geometric primitives, and the exact predicates the sweeps order them by.

use std::cmp::Ordering;

use crate::fixed::{self, Fixed};
use crate::Error;

/// A two-dimensional point in fixed-point coordinates.
///
/// Points are sorted by `y` and then by `x`, for the convenience of our
/// sweep-line algorithms (which move in increasing `y`).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct Point {
    /// Vertical coordinate.
    ///
    /// Although it isn't important for functionality, the documentation and
    /// method naming assumes that larger values are down.
    pub y: Fixed,
    /// Horizontal coordinate.
    pub x: Fixed,
}

impl std::fmt::Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", fixed::to_f64(self.x), fixed::to_f64(self.y))
    }
}

impl Point {
    /// Creates a point from raw fixed-point coordinates.
    ///
    /// Note that the `x` coordinate comes first, even though points sort by
    /// `y` first.
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Point { x, y }
    }

    /// Creates a point at integer coordinates.
    pub const fn from_int(x: i32, y: i32) -> Self {
        Point {
            x: fixed::from_int(x),
            y: fixed::from_int(y),
        }
    }

    /// Rounds a float point to the nearest fixed-point one.
    pub fn from_kurbo(p: kurbo::Point) -> Result<Self, Error> {
        Ok(Point {
            x: fixed::from_f64(p.x)?,
            y: fixed::from_f64(p.y)?,
        })
    }

    /// Converts to a float point. This is exact.
    pub fn to_kurbo(self) -> kurbo::Point {
        kurbo::Point::new(fixed::to_f64(self.x), fixed::to_f64(self.y))
    }

    pub(crate) fn check(self) -> Result<Self, Error> {
        fixed::check(self.x)?;
        fixed::check(self.y)?;
        Ok(self)
    }
}

/// An infinite line, given by two points on it.
///
/// Lines belonging to edges always have `p1.y <= p2.y`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
pub struct Line {
    /// The first point.
    pub p1: Point,
    /// The second point.
    pub p2: Point,
}

impl Line {
    /// Creates a line through two points.
    pub const fn new(p1: Point, p2: Point) -> Self {
        Line { p1, p2 }
    }

    /// The horizontal extent, `p2.x - p1.x`.
    pub fn dx(&self) -> i64 {
        i64::from(self.p2.x) - i64::from(self.p1.x)
    }

    /// The vertical extent, `p2.y - p1.y`.
    pub fn dy(&self) -> i64 {
        i64::from(self.p2.y) - i64::from(self.p1.y)
    }

    /// Is this line vertical?
    pub fn is_vertical(&self) -> bool {
        self.p1.x == self.p2.x
    }

    /// Is this line horizontal?
    pub fn is_horizontal(&self) -> bool {
        self.p1.y == self.p2.y
    }

    /// The smaller of the endpoints' x coordinates.
    pub fn min_x(&self) -> Fixed {
        self.p1.x.min(self.p2.x)
    }

    /// The larger of the endpoints' x coordinates.
    pub fn max_x(&self) -> Fixed {
        self.p1.x.max(self.p2.x)
    }

    /// The x coordinate where this line crosses height `y`.
    ///
    /// This is exact at the endpoints; elsewhere the division truncates
    /// toward zero. The line must not be horizontal unless `y` is one of
    /// its endpoints.
    pub fn x_for_y(&self, y: Fixed) -> Fixed {
        if y == self.p1.y {
            return self.p1.x;
        }
        if y == self.p2.y {
            return self.p2.x;
        }
        let dy = self.dy();
        if dy == 0 {
            return self.p1.x;
        }
        let x = i64::from(self.p1.x)
            + fixed::mul_div(i64::from(y) - i64::from(self.p1.y), self.dx(), dy);
        x.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as Fixed
    }

    /// Returns the same line with its points ordered from top to bottom.
    pub(crate) fn sorted(self) -> Line {
        if self.p1.y > self.p2.y {
            Line {
                p1: self.p2,
                p2: self.p1,
            }
        } else {
            self
        }
    }

    /// Returns the same line, sorted, with endpoints reaching at least from
    /// height `top` to height `bottom`.
    ///
    /// The endpoints move by whole steps of the reduced direction vector, so
    /// the result passes through exactly the same points. If that would leave
    /// the coordinate range, the chord between `top` and `bottom` is returned
    /// instead.
    pub(crate) fn extended_to(self, top: Fixed, bottom: Fixed) -> Line {
        let line = self.sorted();
        if line.is_horizontal() || (line.p1.y <= top && bottom <= line.p2.y) {
            return line;
        }

        let (dx, dy) = (line.dx(), line.dy());
        let g = gcd(dx.unsigned_abs(), dy.unsigned_abs()) as i64;
        let (step_x, step_y) = (dx / g, dy / g);
        let steps = |gap: i64| (gap.max(0) + step_y - 1) / step_y;
        let before = steps(i64::from(line.p1.y) - i64::from(top));
        let after = steps(i64::from(bottom) - i64::from(line.p2.y));

        let point = |p: Point, k: i64| {
            let x = Fixed::try_from(i64::from(p.x) + k * step_x).ok()?;
            let y = Fixed::try_from(i64::from(p.y) + k * step_y).ok()?;
            Point::new(x, y).check().ok()
        };
        match (point(line.p1, -before), point(line.p2, after)) {
            (Some(p1), Some(p2)) => Line::new(p1, p2),
            _ => Line::new(
                Point::new(line.x_for_y(top), top),
                Point::new(line.x_for_y(bottom), bottom),
            ),
        }
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// A directed polygon edge.
///
/// The edge covers the part of `line` between the heights `top` and
/// `bottom`. Its winding direction `dir` is `+1` if the polygon boundary runs
/// downward along it and `-1` if it runs upward.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
pub struct Edge {
    /// The supporting line, with `line.p1.y <= top < bottom <= line.p2.y`.
    pub line: Line,
    /// The height where this edge starts.
    pub top: Fixed,
    /// The height where this edge ends.
    pub bottom: Fixed,
    /// The winding direction.
    pub dir: i32,
}

impl Edge {
    /// Builds an edge along `line` between `top` and `bottom`.
    ///
    /// The line's points are put in top to bottom order and the vertical
    /// range is clamped to the line. Returns `None` if the line is horizontal
    /// or nothing of the range remains.
    pub fn normalized(line: Line, top: Fixed, bottom: Fixed, dir: i32) -> Option<Edge> {
        let line = line.sorted();
        if line.is_horizontal() {
            return None;
        }
        let top = top.max(line.p1.y);
        let bottom = bottom.min(line.p2.y);
        (top < bottom).then_some(Edge {
            line,
            top,
            bottom,
            dir,
        })
    }

    /// The point where this edge starts.
    pub fn top_point(&self) -> Point {
        Point::new(self.line.x_for_y(self.top), self.top)
    }

    /// The point where this edge ends.
    pub fn bottom_point(&self) -> Point {
        Point::new(self.line.x_for_y(self.bottom), self.bottom)
    }
}

fn wide(a: i64, b: i64) -> i128 {
    i128::from(a) * i128::from(b)
}

/// Compares the inverse slopes `dx/dy` of two downward lines.
///
/// `Greater` means that `a` leans further right than `b` as y increases.
pub(crate) fn slope_compare(a: &Line, b: &Line) -> Ordering {
    let adx = a.dx();
    let bdx = b.dx();

    if adx == 0 {
        return 0.cmp(&bdx);
    }
    if bdx == 0 {
        return adx.cmp(&0);
    }
    if (adx < 0) != (bdx < 0) {
        return adx.cmp(&0);
    }
    wide(adx, b.dy()).cmp(&wide(bdx, a.dy()))
}

/// Compares the x coordinate of `a` at height `y` with `x`.
fn line_compare_for_y_against_x(a: &Line, y: Fixed, x: Fixed) -> Ordering {
    if x < a.p1.x && x < a.p2.x {
        return Ordering::Greater;
    }
    if x > a.p1.x && x > a.p2.x {
        return Ordering::Less;
    }

    let adx = a.dx();
    let dx = i64::from(x) - i64::from(a.p1.x);
    if adx == 0 {
        return 0.cmp(&dx);
    }
    if dx == 0 || (adx < 0) != (dx < 0) {
        return adx.cmp(&0);
    }

    let dy = i64::from(y) - i64::from(a.p1.y);
    wide(dy, adx).cmp(&wide(dx, a.dy()))
}

/// Compares the x coordinates of two lines at height `y`, when neither of
/// them has an endpoint there.
///
/// Writing `x_a(y) = a.p1.x + (y - a.p1.y) * adx / ady`, and similarly for
/// `b`, we multiply through by the positive `ady * bdy` and only fall back to
/// the full 128-bit comparison when none of the deltas vanish.
fn lines_compare_x_for_y_general(a: &Line, b: &Line, y: Fixed) -> Ordering {
    let (adx, ady) = (a.dx(), a.dy());
    let (bdx, bdy) = (b.dx(), b.dy());
    let dx = i64::from(a.p1.x) - i64::from(b.p1.x);
    let ya = i64::from(y) - i64::from(a.p1.y);
    let yb = i64::from(y) - i64::from(b.p1.y);

    match (dx != 0, adx != 0, bdx != 0) {
        (false, false, false) => Ordering::Equal,
        (true, false, false) => dx.cmp(&0),
        (false, true, false) => adx.cmp(&0),
        (false, false, true) => 0.cmp(&bdx),
        (false, true, true) => {
            if (adx < 0) != (bdx < 0) {
                adx.cmp(&0)
            } else if a.p1.y == b.p1.y {
                wide(adx, bdy).cmp(&wide(bdx, ady))
            } else {
                (wide(adx, bdy) * i128::from(ya)).cmp(&(wide(bdx, ady) * i128::from(yb)))
            }
        }
        (true, true, false) => {
            if (adx > 0) != (dx < 0) {
                dx.cmp(&0)
            } else {
                wide(ady, dx).cmp(&wide(-ya, adx))
            }
        }
        (true, false, true) => {
            if (bdx < 0) != (dx < 0) {
                dx.cmp(&0)
            } else {
                wide(bdy, dx).cmp(&wide(yb, bdx))
            }
        }
        (true, true, true) => {
            let l = wide(ady, bdy) * i128::from(dx);
            let a_term = wide(adx, bdy) * i128::from(ya);
            let b_term = wide(bdx, ady) * i128::from(yb);
            l.cmp(&(b_term - a_term))
        }
    }
}

fn known_x(line: &Line, y: Fixed) -> Option<Fixed> {
    if y == line.p1.y {
        Some(line.p1.x)
    } else if y == line.p2.y {
        Some(line.p2.x)
    } else {
        None
    }
}

fn lines_compare_x_for_y(a: &Line, b: &Line, y: Fixed) -> Ordering {
    match (known_x(a, y), known_x(b, y)) {
        (Some(ax), Some(bx)) => ax.cmp(&bx),
        (Some(ax), None) => line_compare_for_y_against_x(b, y, ax).reverse(),
        (None, Some(bx)) => line_compare_for_y_against_x(a, y, bx),
        (None, None) => lines_compare_x_for_y_general(a, b, y),
    }
}

fn bbox_compare(a: &Line, b: &Line) -> Ordering {
    if a.max_x() < b.min_x() {
        Ordering::Less
    } else if a.min_x() > b.max_x() {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

/// Orders two downward lines at height `y`, left to right.
///
/// Lines that cross at `y` are ordered by slope, so that the order is the
/// one just below `y`. Only identical lines compare equal.
pub(crate) fn lines_compare_at_y(a: &Line, b: &Line, y: Fixed) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    bbox_compare(a, b)
        .then_with(|| lines_compare_x_for_y(a, b, y))
        .then_with(|| slope_compare(a, b))
}

/// Do two downward lines lie on the same infinite line?
pub(crate) fn lines_colinear(a: &Line, b: &Line) -> bool {
    if a == b {
        return true;
    }
    if slope_compare(a, b) != Ordering::Equal {
        return false;
    }
    let ox = i64::from(b.p1.x) - i64::from(a.p1.x);
    let oy = i64::from(b.p1.y) - i64::from(a.p1.y);
    wide(ox, a.dy()) == wide(oy, a.dx())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    pub fn line(x0: i32, y0: i32, x1: i32, y1: i32) -> Line {
        Line::new(Point::from_int(x0, y0), Point::from_int(x1, y1))
    }

    #[test]
    fn point_order() {
        assert!(Point::from_int(5, 0) < Point::from_int(0, 1));
        assert!(Point::from_int(0, 1) < Point::from_int(1, 1));
        assert_eq!(format!("{:?}", Point::new(384, -256)), "(1.5, -1)");
    }

    #[test]
    fn normalization() {
        let up = line(0, 10, 5, 0);
        let e = Edge::normalized(up, fixed::from_int(-3), fixed::from_int(20), -1).unwrap();
        assert_eq!(e.line, line(5, 0, 0, 10));
        assert_eq!(e.top, 0);
        assert_eq!(e.bottom, fixed::from_int(10));
        assert_eq!(e.dir, -1);
        assert_eq!(e.top_point(), Point::from_int(5, 0));

        assert!(Edge::normalized(line(0, 3, 5, 3), 0, fixed::from_int(10), 1).is_none());
        assert!(Edge::normalized(line(0, 0, 0, 3), fixed::from_int(3), fixed::from_int(5), 1)
            .is_none());
    }

    #[test]
    fn x_for_y() {
        let l = line(0, 0, 3, 3);
        assert_eq!(l.x_for_y(fixed::from_int(2)), fixed::from_int(2));
        // 3 * 256 * 1 / 768 rounds toward zero.
        let l = Line::new(Point::new(0, 0), Point::new(1, 768));
        assert_eq!(l.x_for_y(256), 0);
        assert_eq!(l.x_for_y(768), 1);
        let l = Line::new(Point::new(0, 0), Point::new(-1, 768));
        assert_eq!(l.x_for_y(767), 0);
    }

    #[test]
    fn extended_lines() {
        let ten = fixed::from_int(10);
        assert_eq!(line(0, 5, 0, 10).extended_to(0, ten), line(0, 0, 0, 10));
        assert_eq!(line(4, 6, 2, 2).extended_to(0, ten), line(1, 0, 6, 10));
        // Lines that already cover the range only get sorted.
        assert_eq!(line(3, 12, 0, -1).extended_to(0, ten), line(0, -1, 3, 12));

        // The extension overshoots to the next point on the line's grid.
        let l = Line::new(Point::new(0, 0), Point::new(3, 7)).extended_to(0, 10);
        assert_eq!(l, Line::new(Point::new(0, 0), Point::new(6, 14)));
    }

    #[test]
    fn slopes() {
        let vertical = line(0, 0, 0, 10);
        let right = line(0, 0, 10, 10);
        let steep_right = line(0, 0, 5, 10);
        let left = line(0, 0, -10, 10);

        assert_eq!(slope_compare(&vertical, &vertical), Ordering::Equal);
        assert_eq!(slope_compare(&vertical, &right), Ordering::Less);
        assert_eq!(slope_compare(&vertical, &left), Ordering::Greater);
        assert_eq!(slope_compare(&right, &left), Ordering::Greater);
        assert_eq!(slope_compare(&right, &steep_right), Ordering::Greater);
        assert_eq!(slope_compare(&steep_right, &right), Ordering::Less);
        assert_eq!(slope_compare(&right, &line(3, 1, 8, 6)), Ordering::Equal);
    }

    #[test]
    fn compare_at_y() {
        let a = line(0, 0, 10, 10);
        let b = line(10, 0, 0, 10);
        let y = fixed::from_int;
        assert_eq!(lines_compare_at_y(&a, &b, y(2)), Ordering::Less);
        assert_eq!(lines_compare_at_y(&a, &b, y(8)), Ordering::Greater);
        // At the crossing the order is the one just below.
        assert_eq!(lines_compare_at_y(&a, &b, y(5)), Ordering::Greater);
        assert_eq!(lines_compare_at_y(&a, &a, y(5)), Ordering::Equal);

        // Disjoint bounding boxes.
        assert_eq!(
            lines_compare_at_y(&line(0, 0, 1, 10), &line(2, 0, 3, 10), y(5)),
            Ordering::Less
        );

        // Shared top point, decided by slope.
        let c = line(0, 0, 0, 10);
        let d = line(0, 0, 4, 10);
        assert_eq!(lines_compare_at_y(&c, &d, 0), Ordering::Less);
        assert_eq!(lines_compare_at_y(&d, &c, 0), Ordering::Greater);

        // Vertical against slanted, away from endpoints.
        let v = line(3, -10, 3, 20);
        assert_eq!(lines_compare_at_y(&v, &a, y(2)), Ordering::Greater);
        assert_eq!(lines_compare_at_y(&v, &a, y(4)), Ordering::Less);
    }

    #[test]
    fn colinear() {
        assert!(lines_colinear(&line(0, 0, 2, 4), &line(1, 2, 3, 6)));
        assert!(lines_colinear(&line(0, 0, 0, 4), &line(0, 7, 0, 9)));
        assert!(!lines_colinear(&line(0, 0, 0, 4), &line(1, 0, 1, 4)));
        assert!(!lines_colinear(&line(0, 0, 2, 4), &line(1, 0, 3, 4)));
        assert!(!lines_colinear(&line(0, 0, 2, 4), &line(0, 0, 3, 4)));
    }

    // The x coordinate of `l` at `y`, as an exact fraction with
    // denominator `l.dy()`.
    fn x_numerator(l: &Line, y: Fixed) -> i128 {
        i128::from(l.p1.x) * i128::from(l.dy())
            + i128::from(i64::from(y) - i64::from(l.p1.y)) * i128::from(l.dx())
    }

    fn reference_compare(a: &Line, b: &Line, y: Fixed) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        (x_numerator(a, y) * i128::from(b.dy()))
            .cmp(&(x_numerator(b, y) * i128::from(a.dy())))
            .then_with(|| slope_compare(a, b))
    }

    fn spanning_line() -> impl Strategy<Value = Line> {
        (-4000..4000i32, 0..=10i32, -4000..4000i32, 20..=30i32).prop_map(|(x0, y0, x1, y1)| {
            Line::new(Point::new(x0, y0 * 64), Point::new(x1, y1 * 64))
        })
    }

    proptest! {
        #[test]
        fn compare_matches_exact_fractions(
            a in spanning_line(),
            b in spanning_line(),
            y in (10 * 64)..=(20 * 64),
        ) {
            prop_assert_eq!(lines_compare_at_y(&a, &b, y), reference_compare(&a, &b, y));
            prop_assert_eq!(lines_compare_at_y(&b, &a, y), reference_compare(&b, &a, y));
        }

        #[test]
        fn against_x_matches_exact_fractions(
            a in spanning_line(),
            y in (10 * 64)..=(20 * 64),
            x in -4000..4000i32,
        ) {
            // Callers read endpoint heights off directly.
            prop_assume!(y != a.p1.y && y != a.p2.y);
            let expected = x_numerator(&a, y).cmp(&(i128::from(x) * i128::from(a.dy())));
            prop_assert_eq!(line_compare_for_y_against_x(&a, y, x), expected);
        }
    }
}
