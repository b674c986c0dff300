//! The sweep for axis-aligned input.
//!
//! When every edge is vertical, edges never cross and the active list only
//! needs ordering by `x`. This sweep handles rectilinear polygons, boxes,
//! and the intersection of two box sets, and it produces boxes.
//!
//! Edges that start at the same height are collected in a chain and merged
//! into the active list in one go. Stops are kept in a heap keyed by bottom.
//! Whenever the sweep line moves past a height at which something changed,
//! the active list is walked to find the filled spans, exactly as in the
//! general sweep except that coincident edges are grouped together.

use crate::active::{ActiveList, Linked, Links, NodeIdx, NodeVec};
use crate::fixed::Fixed;
use crate::geom::{Edge, Point};
use crate::output::{BoxSink, FixedBox};
use crate::pqueue::PriorityQueue;
use crate::sort;
use crate::{Error, FillRule};

use super::Stats;

/// Decides, from the running winding numbers, whether we're inside.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Coverage {
    /// A single set of edges, filled by the fill rule.
    Fill(FillRule),
    /// Two sets of edges; inside means a non-zero winding number in both.
    Intersect,
}

impl Coverage {
    fn inside(self, winding: [i32; 2]) -> bool {
        match self {
            Coverage::Fill(rule) => winding[0] & rule.winding_mask() != 0,
            Coverage::Intersect => winding[0] != 0 && winding[1] != 0,
        }
    }
}

/// A box whose left side is known but whose bottom isn't yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct DeferredBox {
    top: Fixed,
    right: NodeIdx,
}

#[derive(Debug)]
struct VEdge {
    x: Fixed,
    top: Fixed,
    bottom: Fixed,
    dir: i32,
    /// Which of the two input sets this came from (always 0 when filling).
    set: usize,
    links: Links,
    deferred: Option<DeferredBox>,
}

impl VEdge {
    fn new(x: Fixed, top: Fixed, bottom: Fixed, dir: i32, set: usize) -> Self {
        VEdge {
            x,
            top,
            bottom,
            dir,
            set,
            links: Links::default(),
            deferred: None,
        }
    }
}

impl Linked for VEdge {
    fn links(&self) -> &Links {
        &self.links
    }

    fn links_mut(&mut self) -> &mut Links {
        &mut self.links
    }
}

/// The two sides of a non-empty box, ordered so that `left.x < right.x`.
///
/// A box given right-to-left winds the other way.
struct Rectangle {
    left: VEdge,
    right: VEdge,
}

impl Rectangle {
    fn from_box(b: &FixedBox, set: usize) -> Option<Rectangle> {
        let (top, bottom) = (b.p1.y, b.p2.y);
        if top >= bottom || b.p1.x == b.p2.x {
            return None;
        }
        let (left, right, dir) = if b.p1.x < b.p2.x {
            (b.p1.x, b.p2.x, 1)
        } else {
            (b.p2.x, b.p1.x, -1)
        };
        Some(Rectangle {
            left: VEdge::new(left, top, bottom, dir, set),
            right: VEdge::new(right, top, bottom, -dir, set),
        })
    }
}

fn normalized_box(b: &FixedBox) -> FixedBox {
    FixedBox::new(
        Point::new(b.p1.x.min(b.p2.x), b.p1.y),
        Point::new(b.p1.x.max(b.p2.x), b.p2.y),
    )
}

fn push_rectangles(
    nodes: &mut NodeVec<VEdge>,
    boxes: &[FixedBox],
    set: usize,
) -> Result<(), Error> {
    for r in boxes.iter().filter_map(|b| Rectangle::from_box(b, set)) {
        nodes.try_push(r.left)?;
        nodes.try_push(r.right)?;
    }
    Ok(())
}

/// The state of one run of the vertical sweep.
struct Sweep<'s, S> {
    edges: NodeVec<VEdge>,
    /// All edges, sorted by top.
    starts: Vec<NodeIdx>,
    next_start: usize,
    stops: PriorityQueue<(Fixed, NodeIdx)>,
    active: ActiveList,
    current_y: Fixed,
    /// Has the active list changed since the last walk?
    dirty: bool,
    coverage: Coverage,
    sink: &'s mut S,
    stats: Stats,
}

impl<'s, S: BoxSink> Sweep<'s, S> {
    /// Boxes usually come in large numbers with many shared tops, so they
    /// are bucketed by row before sorting.
    fn new(
        edges: NodeVec<VEdge>,
        coverage: Coverage,
        bucket: bool,
        sink: &'s mut S,
    ) -> Result<Self, Error> {
        let mut starts = Vec::new();
        starts
            .try_reserve_exact(edges.len())
            .map_err(|_| Error::NoMemory)?;
        starts.extend(edges.indices());
        let by_top = |a: &NodeIdx, b: &NodeIdx| edges[*a].top.cmp(&edges[*b].top).then(a.cmp(b));
        if bucket {
            sort::bucket_by_row(&mut starts, |i| edges[*i].top, by_top)?;
        } else {
            sort::combsort_by(&mut starts, by_top);
        }

        Ok(Sweep {
            edges,
            starts,
            next_start: 0,
            stops: PriorityQueue::new(),
            active: ActiveList::new(),
            current_y: Fixed::MIN,
            dirty: false,
            coverage,
            sink,
            stats: Stats::default(),
        })
    }

    fn next_height(&self) -> Option<Fixed> {
        let start = self.starts.get(self.next_start).map(|&i| self.edges[i].top);
        let stop = self.stops.peek().map(|&(y, _)| y);
        match (start, stop) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn run(mut self) -> Result<Stats, Error> {
        while let Some(y) = self.next_height() {
            if y != self.current_y {
                if self.dirty {
                    self.active_edges_to_boxes(self.current_y)?;
                    self.dirty = false;
                }
                self.current_y = y;
            }
            tracing::trace!(y, "vertical sweep step");

            // Starts go in first, so that a box ending here can be handed on
            // to a coincident edge that starts here.
            let mut pending: Option<NodeIdx> = None;
            let mut tail: Option<NodeIdx> = None;
            while let Some(&idx) = self.starts.get(self.next_start) {
                if self.edges[idx].top != y {
                    break;
                }
                self.next_start += 1;
                self.stats.events += 1;
                self.stops.push((self.edges[idx].bottom, idx))?;
                self.edges[idx].links = Links::default();
                match tail {
                    Some(t) => self.edges[t].links.next = Some(idx),
                    None => pending = Some(idx),
                }
                tail = Some(idx);
            }
            if pending.is_some() {
                self.active
                    .merge_pending(&mut self.edges, pending, |a, b| a.x <= b.x);
                self.dirty = true;
            }

            while let Some(&(bottom, idx)) = self.stops.peek() {
                if bottom != y {
                    break;
                }
                self.stops.pop();
                self.stats.events += 1;
                self.delete(idx)?;
            }
            self.check_invariants();
        }

        tracing::debug!(
            edges = self.edges.len(),
            events = self.stats.events,
            boxes = self.stats.output,
            "vertical sweep finished"
        );
        Ok(self.stats)
    }

    fn delete(&mut self, idx: NodeIdx) -> Result<(), Error> {
        if self.edges[idx].deferred.is_some() {
            let x = self.edges[idx].x;
            match self.edges[idx].links.next {
                Some(n) if self.edges[n].x == x && self.edges[n].deferred.is_none() => {
                    self.edges[n].deferred = self.edges[idx].deferred.take();
                }
                _ => self.end_box(idx, self.current_y)?,
            }
        }
        self.active.remove(&mut self.edges, idx);
        self.dirty = true;
        Ok(())
    }

    /// Emits the deferred box of `left`, if it has positive height.
    fn end_box(&mut self, left: NodeIdx, bottom: Fixed) -> Result<(), Error> {
        if let Some(d) = self.edges[left].deferred.take() {
            if d.top < bottom {
                let b = FixedBox::new(
                    Point::new(self.edges[left].x, d.top),
                    Point::new(self.edges[d.right].x, bottom),
                );
                self.sink.add_box(&b)?;
                self.stats.output += 1;
            }
        }
        Ok(())
    }

    fn start_or_continue_box(
        &mut self,
        left: NodeIdx,
        right: NodeIdx,
        top: Fixed,
    ) -> Result<(), Error> {
        if let Some(d) = self.edges[left].deferred {
            if d.right == right {
                return Ok(());
            }
            if self.edges[d.right].x == self.edges[right].x {
                self.edges[left].deferred = Some(DeferredBox { right, ..d });
                return Ok(());
            }
            self.end_box(left, top)?;
        }
        if self.edges[left].x != self.edges[right].x {
            self.edges[left].deferred = Some(DeferredBox { top, right });
        }
        Ok(())
    }

    fn wind(&self, winding: &mut [i32; 2], idx: NodeIdx) {
        let e = &self.edges[idx];
        winding[e.set] = winding[e.set].wrapping_add(e.dir);
    }

    fn same_x_as_next(&self, idx: NodeIdx) -> Option<NodeIdx> {
        self.edges[idx]
            .links
            .next
            .filter(|&n| self.edges[n].x == self.edges[idx].x)
    }

    /// Walks the active list at height `top`, pairing up the edges that
    /// bound filled spans.
    fn active_edges_to_boxes(&mut self, top: Fixed) -> Result<(), Error> {
        let mut winding = [0i32; 2];
        let mut pos = self.active.head();

        'walk: while let Some(mut left) = pos {
            // Find the edge that takes us inside.
            loop {
                self.wind(&mut winding, left);
                if self.coverage.inside(winding) {
                    break;
                }
                match self.same_x_as_next(left) {
                    Some(n) if self.edges[n].deferred.is_none() => {
                        self.edges[n].deferred = self.edges[left].deferred.take();
                    }
                    _ => self.end_box(left, top)?,
                }
                match self.edges[left].links.next {
                    Some(n) => left = n,
                    None => break 'walk,
                }
            }

            // Find the edge that takes us back out, skipping over groups
            // that only pass through the outside.
            let mut right = left;
            loop {
                let Some(n) = self.edges[right].links.next else {
                    // Only unclosed input gets here.
                    self.end_box(left, top)?;
                    break 'walk;
                };
                right = n;
                if self.edges[right].deferred.is_some() {
                    if self.edges[right].x == self.edges[left].x
                        && self.edges[left].deferred.is_none()
                    {
                        self.edges[left].deferred = self.edges[right].deferred.take();
                    } else {
                        self.end_box(right, top)?;
                    }
                }
                self.wind(&mut winding, right);
                if !self.coverage.inside(winding) && self.same_x_as_next(right).is_none() {
                    break;
                }
            }

            self.start_or_continue_box(left, right, top)?;
            pos = self.edges[right].links.next;
        }
        Ok(())
    }

    #[cfg(feature = "slow-asserts")]
    fn check_invariants(&self) {
        self.active.check_invariants(&self.edges);
        let mut last_x = Fixed::MIN;
        for idx in self.active.iter(&self.edges) {
            let e = &self.edges[idx];
            assert!(last_x <= e.x, "active list out of order at {idx:?}");
            assert!(e.top <= self.current_y && self.current_y < e.bottom);
            if let Some(d) = e.deferred {
                assert!(e.x < self.edges[d.right].x);
            }
            last_x = e.x;
        }
    }

    #[cfg(not(feature = "slow-asserts"))]
    fn check_invariants(&self) {}
}

/// Tessellates edges that are all vertical into boxes, sending them to
/// `sink`.
///
/// Returns [`Error::NotRectilinear`], without emitting anything, if some
/// edge is slanted.
pub fn tessellate_rectilinear<S: BoxSink>(
    edges: &[Edge],
    fill_rule: FillRule,
    sink: &mut S,
) -> Result<Stats, Error> {
    if edges.iter().any(|e| !e.line.is_vertical()) {
        return Err(Error::NotRectilinear);
    }
    let mut nodes = NodeVec::try_with_capacity(edges.len())?;
    for e in edges {
        if let Some(e) = Edge::normalized(e.line, e.top, e.bottom, e.dir) {
            nodes.try_push(VEdge::new(e.line.p1.x, e.top, e.bottom, e.dir, 0))?;
        }
    }
    if nodes.is_empty() {
        return Ok(Stats::default());
    }
    Sweep::new(nodes, Coverage::Fill(fill_rule), false, sink)?.run()
}

/// Computes the union of some boxes under `fill_rule`, sending disjoint
/// boxes to `sink`.
///
/// A box with `p1.x > p2.x` winds `-1`; boxes with `p1.y >= p2.y` are
/// empty.
pub fn tessellate_boxes<S: BoxSink>(
    boxes: &[FixedBox],
    fill_rule: FillRule,
    sink: &mut S,
) -> Result<Stats, Error> {
    match boxes {
        [] => Ok(Stats::default()),
        [b] => {
            let b = normalized_box(b);
            if b.is_empty() {
                return Ok(Stats::default());
            }
            sink.add_box(&b)?;
            Ok(Stats {
                events: 0,
                intersections: 0,
                output: 1,
            })
        }
        _ => {
            let mut nodes = NodeVec::try_with_capacity(2 * boxes.len())?;
            push_rectangles(&mut nodes, boxes, 0)?;
            if nodes.is_empty() {
                return Ok(Stats::default());
            }
            Sweep::new(nodes, Coverage::Fill(fill_rule), true, sink)?.run()
        }
    }
}

fn clip(boxes: &[FixedBox], clip: &FixedBox, sink: &mut impl BoxSink) -> Result<Stats, Error> {
    let clip = normalized_box(clip);
    let mut stats = Stats::default();
    for b in boxes {
        let b = normalized_box(b);
        let out = FixedBox::new(
            Point::new(b.p1.x.max(clip.p1.x), b.p1.y.max(clip.p1.y)),
            Point::new(b.p2.x.min(clip.p2.x), b.p2.y.min(clip.p2.y)),
        );
        if !out.is_empty() {
            sink.add_box(&out)?;
            stats.output += 1;
        }
    }
    Ok(stats)
}

/// Computes the intersection of two box sets, each filled with the
/// non-zero rule, sending the result to `sink`.
///
/// When one side is a single box the other side is clipped to it box by
/// box, so any overlaps within the other side are kept.
pub fn intersect_boxes<S: BoxSink>(
    a: &[FixedBox],
    b: &[FixedBox],
    sink: &mut S,
) -> Result<Stats, Error> {
    match (a, b) {
        ([], _) | (_, []) => Ok(Stats::default()),
        ([single], others) | (others, [single]) => clip(others, single, sink),
        _ => {
            let mut nodes = NodeVec::try_with_capacity(2 * (a.len() + b.len()))?;
            push_rectangles(&mut nodes, a, 0)?;
            push_rectangles(&mut nodes, b, 1)?;
            if nodes.is_empty() {
                return Ok(Stats::default());
            }
            Sweep::new(nodes, Coverage::Intersect, true, sink)?.run()
        }
    }
}
