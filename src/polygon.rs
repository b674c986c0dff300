//! Building up the edges of a polygon.

use crate::fixed::Fixed;
use crate::geom::{Edge, Line, Point};
use crate::output::{FixedBox, Trapezoid};
use crate::Error;

/// A collection of directed edges, ready for tessellation.
///
/// Edges don't need to be connected or closed: the tessellators only look at
/// the winding number they induce at each point. Horizontal edges don't
/// change any winding numbers, so they are dropped as they are added.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Polygon {
    edges: Vec<Edge>,
    extents: Option<FixedBox>,
    rectilinear: bool,
}

impl Default for Polygon {
    fn default() -> Self {
        Polygon {
            edges: Vec::new(),
            extents: None,
            rectilinear: true,
        }
    }
}

impl Polygon {
    /// An empty polygon.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a polygon out of the sides of some boxes.
    ///
    /// Each box winds `+1` inside, unless its `p1` is to the right of its
    /// `p2`, in which case it winds `-1`. Boxes with `p1.y >= p2.y` are
    /// empty.
    pub fn from_boxes(boxes: &[FixedBox]) -> Result<Self, Error> {
        let mut ret = Polygon::new();
        for b in boxes {
            let side = |x| Line::new(Point::new(x, b.p1.y), Point::new(x, b.p2.y));
            ret.add_line(side(b.p1.x), b.p1.y, b.p2.y, 1)?;
            ret.add_line(side(b.p2.x), b.p1.y, b.p2.y, -1)?;
        }
        Ok(ret)
    }

    /// Builds a polygon out of the sides of some trapezoids, each winding
    /// `+1` inside.
    ///
    /// A trapezoid's sides are infinite lines, and their defining points
    /// need not reach its top and bottom.
    pub fn from_traps(traps: &[Trapezoid]) -> Result<Self, Error> {
        let mut ret = Polygon::new();
        for t in traps {
            for (side, dir) in [(t.left, 1), (t.right, -1)] {
                side.p1.check()?;
                side.p2.check()?;
                ret.add_line(side.extended_to(t.top, t.bottom), t.top, t.bottom, dir)?;
            }
        }
        Ok(ret)
    }

    /// The (non-horizontal) edges added so far.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// The number of edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Are there no edges?
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// The smallest box containing every edge.
    pub fn extents(&self) -> Option<FixedBox> {
        self.extents
    }

    /// Is every edge vertical?
    pub fn is_rectilinear(&self) -> bool {
        self.rectilinear
    }

    fn push(&mut self, edge: Edge) -> Result<(), Error> {
        self.edges
            .try_reserve(1)
            .map_err(|_| Error::NoMemory)?;
        self.edges.push(edge);

        let top = edge.top_point();
        let bottom = edge.bottom_point();
        let bounds = FixedBox::new(
            Point::new(top.x.min(bottom.x), edge.top),
            Point::new(top.x.max(bottom.x), edge.bottom),
        );
        self.extents = Some(match self.extents {
            Some(e) => FixedBox::new(
                Point::new(e.p1.x.min(bounds.p1.x), e.p1.y.min(bounds.p1.y)),
                Point::new(e.p2.x.max(bounds.p2.x), e.p2.y.max(bounds.p2.y)),
            ),
            None => bounds,
        });
        self.rectilinear &= edge.line.is_vertical();
        Ok(())
    }

    /// Adds the segment from `p1` to `p2`.
    ///
    /// The edge winds `+1` if it points down and `-1` if it points up.
    pub fn add_edge(&mut self, p1: Point, p2: Point) -> Result<(), Error> {
        let (p1, p2) = (p1.check()?, p2.check()?);
        let (line, dir) = if p1.y <= p2.y {
            (Line::new(p1, p2), 1)
        } else {
            (Line::new(p2, p1), -1)
        };
        if line.is_horizontal() {
            return Ok(());
        }
        self.push(Edge {
            line,
            top: line.p1.y,
            bottom: line.p2.y,
            dir,
        })
    }

    /// Adds the part of `line` between the heights `top` and `bottom`, with
    /// winding direction `dir`.
    pub fn add_line(
        &mut self,
        line: Line,
        top: Fixed,
        bottom: Fixed,
        dir: i32,
    ) -> Result<(), Error> {
        line.p1.check()?;
        line.p2.check()?;
        match Edge::normalized(line, top, bottom, dir) {
            Some(edge) => self.push(edge),
            None => Ok(()),
        }
    }

    /// Adds a closed polygon through the given points.
    pub fn add_contour(&mut self, points: &[Point]) -> Result<(), Error> {
        for (i, &p) in points.iter().enumerate() {
            let q = points[(i + 1) % points.len()];
            self.add_edge(p, q)?;
        }
        Ok(())
    }

    /// Adds a path, flattening its curves to within `tolerance`.
    ///
    /// Every subpath is closed, whether or not it ends with a `ClosePath`.
    pub fn add_path(&mut self, path: &kurbo::BezPath, tolerance: f64) -> Result<(), Error> {
        let mut subpath = Subpath::default();
        let mut result = Ok(());
        kurbo::flatten(path.iter(), tolerance, |el| {
            if result.is_ok() {
                result = subpath.add(self, el);
            }
        });
        result?;
        subpath.close(self)
    }
}

/// The state of a path being flattened into edges.
#[derive(Default)]
struct Subpath {
    start: Option<Point>,
    current: Option<Point>,
}

impl Subpath {
    fn add(&mut self, polygon: &mut Polygon, el: kurbo::PathEl) -> Result<(), Error> {
        match el {
            kurbo::PathEl::MoveTo(p) => {
                self.close(polygon)?;
                let p = Point::from_kurbo(p)?;
                self.start = Some(p);
                self.current = Some(p);
            }
            kurbo::PathEl::LineTo(p) => {
                let p = Point::from_kurbo(p)?;
                match self.current {
                    Some(c) => polygon.add_edge(c, p)?,
                    None => self.start = Some(p),
                }
                self.current = Some(p);
            }
            kurbo::PathEl::ClosePath => {
                self.close(polygon)?;
                self.current = self.start;
            }
            // `flatten` only produces lines.
            kurbo::PathEl::QuadTo(..) | kurbo::PathEl::CurveTo(..) => {}
        }
        Ok(())
    }

    fn close(&self, polygon: &mut Polygon) -> Result<(), Error> {
        if let (Some(s), Some(c)) = (self.start, self.current) {
            polygon.add_edge(c, s)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::{self, MAX_COORD};
    use assert_matches::assert_matches;

    #[test]
    fn directions() {
        let mut p = Polygon::new();
        p.add_edge(Point::from_int(0, 0), Point::from_int(1, 4)).unwrap();
        p.add_edge(Point::from_int(1, 4), Point::from_int(0, 0)).unwrap();
        p.add_edge(Point::from_int(0, 4), Point::from_int(7, 4)).unwrap();
        assert_eq!(p.len(), 2);
        assert_eq!(p.edges()[0].dir, 1);
        assert_eq!(p.edges()[1].dir, -1);
        assert_eq!(p.edges()[0].line, p.edges()[1].line);
        assert!(!p.is_rectilinear());
        assert_eq!(
            p.extents(),
            Some(FixedBox::new(Point::from_int(0, 0), Point::from_int(1, 4)))
        );
    }

    #[test]
    fn contour() {
        let mut p = Polygon::new();
        p.add_contour(&[
            Point::from_int(0, 0),
            Point::from_int(4, 0),
            Point::from_int(4, 3),
            Point::from_int(0, 3),
        ])
        .unwrap();
        // The two horizontal sides are dropped.
        assert_eq!(p.len(), 2);
        assert!(p.is_rectilinear());
        assert_eq!(p.edges().iter().map(|e| e.dir).sum::<i32>(), 0);
        assert!(Polygon::new().is_rectilinear());
        assert_eq!(Polygon::new().extents(), None);
    }

    #[test]
    fn lines_are_clipped() {
        let mut p = Polygon::new();
        let line = Line::new(Point::from_int(0, 0), Point::from_int(8, 8));
        p.add_line(line, fixed::from_int(2), fixed::from_int(20), -1)
            .unwrap();
        p.add_line(line, fixed::from_int(9), fixed::from_int(20), -1)
            .unwrap();
        assert_eq!(p.len(), 1);
        assert_eq!(p.edges()[0].top, fixed::from_int(2));
        assert_eq!(p.edges()[0].bottom, fixed::from_int(8));
        assert_eq!(
            p.extents(),
            Some(FixedBox::new(Point::from_int(2, 2), Point::from_int(8, 8)))
        );
    }

    #[test]
    fn trap_sides_reach_top_and_bottom() {
        let trap = Trapezoid {
            top: fixed::from_int(0),
            bottom: fixed::from_int(10),
            left: Line::new(Point::from_int(0, 5), Point::from_int(0, 10)),
            right: Line::new(Point::from_int(8, 8), Point::from_int(6, 4)),
        };
        let p = Polygon::from_traps(&[trap]).unwrap();
        assert_eq!(p.len(), 2);
        for e in p.edges() {
            assert_eq!((e.top, e.bottom), (trap.top, trap.bottom));
        }
        assert_eq!(p.edges()[0].top_point(), Point::from_int(0, 0));
        assert_eq!(p.edges()[1].top_point(), Point::from_int(4, 0));
        assert_eq!(p.edges()[1].bottom_point(), Point::from_int(9, 10));
        assert_eq!(p.edges()[1].dir, -1);
    }

    #[test]
    fn from_boxes() {
        let p = Polygon::from_boxes(&[
            FixedBox::new(Point::from_int(0, 0), Point::from_int(2, 2)),
            FixedBox::new(Point::from_int(5, 0), Point::from_int(3, 2)),
            FixedBox::new(Point::from_int(0, 5), Point::from_int(2, 3)),
        ])
        .unwrap();
        let dirs: Vec<_> = p.edges().iter().map(|e| (e.line.p1.x, e.dir)).collect();
        assert_eq!(
            dirs,
            vec![
                (fixed::from_int(0), 1),
                (fixed::from_int(2), -1),
                (fixed::from_int(5), 1),
                (fixed::from_int(3), -1),
            ]
        );
    }

    #[test]
    fn paths() {
        let mut p = Polygon::new();
        p.add_path(
            &kurbo::Shape::to_path(&kurbo::Circle::new((0.0, 0.0), 10.0), 0.1),
            0.1,
        )
        .unwrap();
        assert!(p.len() > 8);
        let e = p.extents().unwrap();
        assert!(e.p1.y >= fixed::from_int(-11) && e.p2.y <= fixed::from_int(11));
        assert_eq!(p.edges().iter().map(|e| e.dir).sum::<i32>(), 0);

        // An open triangle gets closed.
        let mut p = Polygon::new();
        let mut path = kurbo::BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((2.0, 2.0));
        path.line_to((0.0, 2.0));
        p.add_path(&path, 0.1).unwrap();
        assert_eq!(p.len(), 2);

        // Each subpath is closed on its own.
        let mut p = Polygon::new();
        let mut path = kurbo::BezPath::new();
        for x in [0.0, 10.0] {
            path.move_to((x, 0.0));
            path.line_to((x + 2.0, 0.0));
            path.line_to((x + 2.0, 2.0));
            path.line_to((x, 2.0));
        }
        p.add_path(&path, 0.1).unwrap();
        assert_eq!(p.len(), 4);
        assert!(p.is_rectilinear());
        assert_eq!(p.edges().iter().map(|e| e.dir).sum::<i32>(), 0);
    }

    #[test]
    fn bad_input() {
        let mut p = Polygon::new();
        let far = Point::new(MAX_COORD + 1, 0);
        assert_matches!(
            p.add_edge(Point::from_int(0, 0), far),
            Err(Error::OutOfRange)
        );

        let mut path = kurbo::BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((f64::NAN, 2.0));
        assert_matches!(p.add_path(&path, 0.1), Err(Error::NaN));

        let mut path = kurbo::BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((1e12, 2.0));
        assert_matches!(p.add_path(&path, 0.1), Err(Error::OutOfRange));
    }
}
