//! Slow, obviously-correct reference computations for testing tessellators.
//!
//! Everything here works on plain `kurbo` floats, so it shares no code with
//! the exact arithmetic it's checking. The conversions at the bottom turn
//! `trapsweep`'s inputs and outputs into these float types.

use kurbo::{Line, ParamCurveNearest as _, Point, Rect};
use trapsweep::{fixed, FillRule, FixedBox, Polygon, Trapezoid};

/// A directed edge: `dir` is added to the winding number of every point to
/// its right.
#[derive(Clone, Copy, Debug)]
pub struct RefEdge {
    pub line: Line,
    pub dir: i32,
}

impl RefEdge {
    /// The edge from `p0` to `p1`, winding `+1` if it points down and `-1`
    /// if it points up.
    pub fn new(p0: Point, p1: Point) -> Self {
        if p0.y <= p1.y {
            RefEdge {
                line: Line::new(p0, p1),
                dir: 1,
            }
        } else {
            RefEdge {
                line: Line::new(p1, p0),
                dir: -1,
            }
        }
    }
}

/// The edges of a closed polygon through `points`.
pub fn contour_edges(points: &[Point]) -> Vec<RefEdge> {
    (0..points.len())
        .map(|i| RefEdge::new(points[i], points[(i + 1) % points.len()]))
        .collect()
}

/// The edges of a box, winding `+1` inside (or `-1` if `x0 > x1`).
pub fn box_edges(r: Rect) -> Vec<RefEdge> {
    if r.y0 >= r.y1 {
        return Vec::new();
    }
    vec![
        RefEdge {
            line: Line::new((r.x0, r.y0), (r.x0, r.y1)),
            dir: 1,
        },
        RefEdge {
            line: Line::new((r.x1, r.y0), (r.x1, r.y1)),
            dir: -1,
        },
    ]
}

/// The x coordinate at which the (infinite) line through `line` has height
/// `y`.
pub fn x_at(line: &Line, y: f64) -> f64 {
    let dy = line.p1.y - line.p0.y;
    if dy == 0.0 {
        return line.p0.x.min(line.p1.x);
    }
    line.p0.x + (y - line.p0.y) * (line.p1.x - line.p0.x) / dy
}

/// The winding number at `p`: the sum of the directions of the edges that
/// pass strictly to the left of it.
pub fn winding_at(edges: &[RefEdge], p: Point) -> i32 {
    edges
        .iter()
        .filter(|e| {
            let (top, bottom) = (e.line.p0.y, e.line.p1.y);
            top <= p.y && p.y < bottom && x_at(&e.line, p.y) < p.x
        })
        .map(|e| e.dir)
        .sum()
}

/// The distance from `p` to the nearest edge.
pub fn distance_to_edges(edges: &[RefEdge], p: Point) -> f64 {
    edges
        .iter()
        .map(|e| e.line.nearest(p, 1e-9).distance_sq)
        .fold(f64::INFINITY, f64::min)
        .sqrt()
}

/// A grid of roughly `n * n` sample points covering `bounds`.
///
/// The grid is offset by an irrational-looking fraction of a cell, so that
/// samples tend to avoid the integer and half-integer coordinates that test
/// inputs are made of.
pub fn sample_points(bounds: Rect, n: usize) -> Vec<Point> {
    let n = n.max(1);
    let w = bounds.width() / n as f64;
    let h = bounds.height() / n as f64;
    let mut ret = Vec::with_capacity(n * n);
    for j in 0..n {
        for i in 0..n {
            ret.push(Point::new(
                bounds.x0 + (i as f64 + 0.3819) * w,
                bounds.y0 + (j as f64 + 0.6180) * h,
            ));
        }
    }
    ret
}

/// A trapezoid in floating point.
#[derive(Clone, Copy, Debug)]
pub struct RefTrap {
    pub top: f64,
    pub bottom: f64,
    pub left: Line,
    pub right: Line,
}

impl RefTrap {
    pub fn contains(&self, p: Point) -> bool {
        self.top <= p.y
            && p.y < self.bottom
            && x_at(&self.left, p.y) <= p.x
            && p.x < x_at(&self.right, p.y)
    }

    pub fn area(&self) -> f64 {
        let w = |y| x_at(&self.right, y) - x_at(&self.left, y);
        (self.bottom - self.top) * (w(self.top) + w(self.bottom)) / 2.0
    }

    /// Is `p` within `tol` of the boundary?
    fn near_boundary(&self, p: Point, tol: f64) -> bool {
        let near_line = |l: &Line| {
            let dy = l.p1.y - l.p0.y;
            let dx = l.p1.x - l.p0.x;
            let len = dx.hypot(dy);
            len > 0.0 && ((p.x - l.p0.x) * dy - (p.y - l.p0.y) * dx).abs() / len < tol
        };
        (p.y - self.top).abs() < tol
            || (p.y - self.bottom).abs() < tol
            || near_line(&self.left)
            || near_line(&self.right)
    }
}

/// Checks that `traps` cover exactly the points that are inside `edges`.
///
/// Every sample point that isn't within `tol` of an edge or of a trapezoid
/// boundary must be covered by exactly one trapezoid if
/// `inside(winding_number)` holds, and by none otherwise.
pub fn check_partition(
    edges: &[RefEdge],
    traps: &[RefTrap],
    inside: impl Fn(i32) -> bool,
    samples: &[Point],
    tol: f64,
) -> Result<(), String> {
    for &p in samples {
        if distance_to_edges(edges, p) < tol || traps.iter().any(|t| t.near_boundary(p, tol)) {
            continue;
        }
        let winding = winding_at(edges, p);
        let covering = traps.iter().filter(|t| t.contains(p)).count();
        let expected = usize::from(inside(winding));
        if covering != expected {
            return Err(format!(
                "{p:?} has winding number {winding} and is covered {covering} times"
            ));
        }
    }
    Ok(())
}

/// The smallest rectangle containing all the edges.
pub fn edge_bounds(edges: &[RefEdge]) -> Rect {
    edges
        .iter()
        .map(|e| Rect::from_points(e.line.p0, e.line.p1))
        .reduce(|a, b| a.union(b))
        .unwrap_or(Rect::ZERO)
}

/// The edges of a polygon, cut to their tops and bottoms.
pub fn ref_edges(polygon: &Polygon) -> Vec<RefEdge> {
    polygon
        .edges()
        .iter()
        .map(|e| RefEdge {
            line: Line::new(e.top_point().to_kurbo(), e.bottom_point().to_kurbo()),
            dir: e.dir,
        })
        .collect()
}

pub fn ref_trap(t: &Trapezoid) -> RefTrap {
    RefTrap {
        top: fixed::to_f64(t.top),
        bottom: fixed::to_f64(t.bottom),
        left: Line::new(t.left.p1.to_kurbo(), t.left.p2.to_kurbo()),
        right: Line::new(t.right.p1.to_kurbo(), t.right.p2.to_kurbo()),
    }
}

pub fn box_trap(b: &FixedBox) -> RefTrap {
    let r = b.to_rect();
    RefTrap {
        top: r.y0,
        bottom: r.y1,
        left: Line::new((r.x0, r.y0), (r.x0, r.y1)),
        right: Line::new((r.x1, r.y0), (r.x1, r.y1)),
    }
}

/// Which winding numbers are inside under `fill_rule`.
pub fn inside(fill_rule: FillRule) -> impl Fn(i32) -> bool {
    move |w| match fill_rule {
        FillRule::EvenOdd => w % 2 != 0,
        FillRule::NonZero => w != 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square() {
        let edges = contour_edges(&[
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]);
        assert_eq!(winding_at(&edges, Point::new(5.0, 5.0)).abs(), 1);
        assert_eq!(winding_at(&edges, Point::new(15.0, 5.0)), 0);
        assert_eq!(winding_at(&edges, Point::new(5.0, 15.0)), 0);
        assert!((distance_to_edges(&edges, Point::new(5.0, 5.0)) - 5.0).abs() < 1e-9);

        let trap = RefTrap {
            top: 0.0,
            bottom: 10.0,
            left: Line::new((0.0, 0.0), (0.0, 10.0)),
            right: Line::new((10.0, 0.0), (10.0, 10.0)),
        };
        assert_eq!(trap.area(), 100.0);
        let samples = sample_points(edge_bounds(&edges), 10);
        assert_eq!(samples.len(), 100);
        assert!(check_partition(&edges, &[trap], |w| w != 0, &samples, 1e-3).is_ok());
        assert!(check_partition(&edges, &[], |w| w != 0, &samples, 1e-3).is_err());
    }

    #[test]
    fn conversions() {
        let mut polygon = Polygon::new();
        polygon
            .add_contour(&[
                trapsweep::Point::from_int(0, 0),
                trapsweep::Point::from_int(4, 8),
                trapsweep::Point::from_int(0, 8),
            ])
            .unwrap();
        let edges = ref_edges(&polygon);
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].line, Line::new((0.0, 0.0), (4.0, 8.0)));

        let traps = trapsweep::tessellate_polygon(&polygon, FillRule::NonZero).unwrap();
        let area: f64 = traps.iter().map(|t| ref_trap(t).area()).sum();
        assert_eq!(area, 16.0);

        let b = FixedBox::new(
            trapsweep::Point::from_int(1, 2),
            trapsweep::Point::from_int(3, 5),
        );
        assert_eq!(box_trap(&b).area(), 6.0);
        assert!(inside(FillRule::EvenOdd)(-3));
        assert!(!inside(FillRule::EvenOdd)(2));
        assert!(inside(FillRule::NonZero)(2));
    }
}
