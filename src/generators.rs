//! Utilities for generating examples, benchmarks, and test cases.

use crate::{Error, FixedBox, Point, Polygon};

/// Generate a bunch of boxes, arranged in a grid.
///
/// The top-left of the first box is at (x0, y0). Each box has size `size x
/// size`, and the distance between boxes (both horizontally and vertically)
/// is `offset`. All measurements are in user units.
fn grid((x0, y0): (i32, i32), size: i32, offset: i32, count: usize) -> Vec<FixedBox> {
    let mut ret = Vec::with_capacity(count * count);
    for i in 0..count as i32 {
        let x = x0 + i * offset;
        for j in 0..count as i32 {
            let y = y0 + j * offset;
            ret.push(FixedBox::new(
                Point::from_int(x, y),
                Point::from_int(x + size, y + size),
            ));
        }
    }
    ret
}

/// Generate an `n` by `n` checkerboard-like pattern with overlapping boxes.
/// For `n = 2`, it looks like:
///
/// ```text
/// +----+ +----+
/// |    | |    |
/// |  +-+-+-+  |
/// +--+-+ +-+--+
/// +--+-+ +-+--+
/// |  +-+-+-+  |
/// |    | |    |
/// +----+ +----+
/// ```
///
/// We return the pattern in two parts: the outer collection of `n x n`
/// non-overlapping boxes, and the inner collection of `(n - 1) x (n - 1)`
/// non-overlapping boxes.
pub fn checkerboard(n: usize) -> (Vec<FixedBox>, Vec<FixedBox>) {
    (
        grid((0, 0), 30, 40, n),
        grid((20, 20), 30, 40, n.saturating_sub(1)),
    )
}

/// Like [`checkerboard`], but as a polygon whose boxes are sheared into
/// parallelograms, so that there are no vertical edges and the general
/// sweep has crossings to find.
pub fn slanted_checkerboard(n: usize) -> Result<Polygon, Error> {
    let (outer, inner) = checkerboard(n);
    let mut ret = Polygon::new();
    for b in outer.iter().chain(&inner) {
        let shear = |p: Point| Point::new(p.x + (p.y - b.p1.y) / 8, p.y);
        let corners = [
            b.p1,
            Point::new(b.p2.x, b.p1.y),
            b.p2,
            Point::new(b.p1.x, b.p2.y),
        ];
        ret.add_contour(&corners.map(shear))?;
    }
    Ok(ret)
}

/// Long, skinny parallelograms: `n` going from top-left to bottom-right,
/// and `n` going from top-right to bottom-left, so that every one of the
/// first kind crosses every one of the second.
pub fn slanties(n: usize) -> Result<Polygon, Error> {
    let n = n as i32;
    let h = 20 * n;
    let mut ret = Polygon::new();
    for i in 0..n {
        let x_off = 20 * i;
        let even = [(x_off, 0), (x_off + 10, 0), (x_off + h + 10, h), (x_off + h, h)];
        let odd = [(x_off + h, 0), (x_off + h + 10, 0), (x_off + 10, h), (x_off, h)];
        for contour in [even, odd] {
            ret.add_contour(&contour.map(|(x, y)| Point::from_int(x, y)))?;
        }
    }
    Ok(ret)
}

/// A star polygon with `n` points (`n` odd), which winds around its center
/// several times.
///
/// Every vertex is connected to the ones `(n - 1) / 2` steps away, so the
/// edges cross a lot and the winding number in the middle is `(n - 1) / 2`.
pub fn star(n: usize, radius: f64) -> Result<Polygon, Error> {
    let step = (n.max(3) - 1) / 2;
    let points: Vec<Point> = (0..n)
        .map(|i| {
            let angle = std::f64::consts::TAU * (i * step % n) as f64 / n as f64;
            kurbo::Point::new(radius * angle.sin(), -radius * angle.cos())
        })
        .map(Point::from_kurbo)
        .collect::<Result<_, _>>()?;
    let mut ret = Polygon::new();
    ret.add_contour(&points)?;
    Ok(ret)
}
