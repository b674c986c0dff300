//! The general Bentley-Ottmann sweep.
//!
//! Events are processed in order of increasing `y` (then `x`). Edges enter
//! the active list at their start events and leave it at their stop events;
//! whenever two edges become neighbours we check whether they cross further
//! down, and if so we queue an intersection event that swaps them.
//!
//! Each time the sweep line moves down we walk the active list and, using
//! the fill rule, pair up the edges that bound filled spans. The pairing of a
//! left edge with its right edge is remembered as a *deferred* trapezoid,
//! which is only emitted once the pairing changes (or the edge stops). This
//! is what makes the output trapezoids maximal.

use std::cmp::Ordering;

use arrayvec::ArrayVec;

use crate::active::{ActiveList, Linked, Links, NodeIdx, NodeVec};
use crate::fixed::Fixed;
use crate::geom::{lines_colinear, lines_compare_at_y, slope_compare, Edge, Point};
use crate::intersect::edge_intersect;
use crate::output::TrapSink;
use crate::pqueue::PriorityQueue;
use crate::sort;
use crate::{Error, FillRule};

use super::Stats;

/// A trapezoid whose left side is known but whose bottom isn't yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Deferred {
    top: Fixed,
    right: NodeIdx,
}

/// The last colinearity test an edge took part in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Colinear {
    other: NodeIdx,
    is_colinear: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Pending,
    Active,
    Stopped,
}

#[derive(Debug)]
struct SweepEdge {
    edge: Edge,
    links: Links,
    deferred: Option<Deferred>,
    colinear: Option<Colinear>,
    state: State,
}

impl Linked for SweepEdge {
    fn links(&self) -> &Links {
        &self.links
    }

    fn links_mut(&mut self) -> &mut Links {
        &mut self.links
    }
}

/// The order of edges in the active list at height `y`.
///
/// Colinear edges are ordered so that the one ending later comes first.
fn compare_edges(a: &SweepEdge, b: &SweepEdge, y: Fixed) -> Ordering {
    lines_compare_at_y(&a.edge.line, &b.edge.line, y).then(b.edge.bottom.cmp(&a.edge.bottom))
}

/// Event kinds, in the order they are processed at a single point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum EventKind {
    Stop,
    Intersection,
    Start,
}

/// Sorted by position, then kind, then sequence number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Event {
    point: Point,
    kind: EventKind,
    seq: usize,
    e1: NodeIdx,
    e2: Option<NodeIdx>,
}

/// Start events are all known in advance, so they're sorted once and
/// merged with a heap holding the stop and intersection events.
struct EventQueue {
    starts: Vec<Event>,
    next_start: usize,
    heap: PriorityQueue<Event>,
    seq: usize,
}

impl EventQueue {
    fn new(edges: &NodeVec<SweepEdge>) -> Result<Self, Error> {
        let mut starts = Vec::new();
        starts
            .try_reserve_exact(edges.len())
            .map_err(|_| Error::NoMemory)?;
        starts.extend(edges.iter().map(|(idx, e)| Event {
            point: e.edge.top_point(),
            kind: EventKind::Start,
            seq: idx.0,
            e1: idx,
            e2: None,
        }));
        sort::bucket_by_row(&mut starts, |ev| ev.point.y, Event::cmp)?;

        Ok(EventQueue {
            starts,
            next_start: 0,
            heap: PriorityQueue::new(),
            seq: edges.len(),
        })
    }

    fn push(
        &mut self,
        point: Point,
        kind: EventKind,
        e1: NodeIdx,
        e2: Option<NodeIdx>,
    ) -> Result<(), Error> {
        let seq = self.seq;
        self.seq += 1;
        self.heap.push(Event {
            point,
            kind,
            seq,
            e1,
            e2,
        })
    }

    fn pop(&mut self) -> Option<Event> {
        let start = self.starts.get(self.next_start).copied();
        let take_start = match (start, self.heap.peek()) {
            (Some(s), Some(h)) => s < *h,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if take_start {
            self.next_start += 1;
            start
        } else {
            self.heap.pop()
        }
    }
}

/// The state of one run of the general sweep.
pub(crate) struct Tessellator<'s, S> {
    edges: NodeVec<SweepEdge>,
    queue: EventQueue,
    active: ActiveList,
    /// Edges that stopped at the current `y` with a trapezoid still open.
    stopped: Vec<NodeIdx>,
    current_y: Fixed,
    mask: i32,
    sink: &'s mut S,
    stats: Stats,
}

impl<'s, S: TrapSink> Tessellator<'s, S> {
    pub fn new(edges: &[Edge], fill_rule: FillRule, sink: &'s mut S) -> Result<Self, Error> {
        let mut nodes = NodeVec::try_with_capacity(edges.len())?;
        for e in edges {
            // Re-normalize, in case the caller built an edge by hand.
            if let Some(edge) = Edge::normalized(e.line, e.top, e.bottom, e.dir) {
                nodes.try_push(SweepEdge {
                    edge,
                    links: Links::default(),
                    deferred: None,
                    colinear: None,
                    state: State::Pending,
                })?;
            }
        }
        let queue = EventQueue::new(&nodes)?;

        Ok(Tessellator {
            edges: nodes,
            queue,
            active: ActiveList::new(),
            stopped: Vec::new(),
            current_y: Fixed::MIN,
            mask: fill_rule.winding_mask(),
            sink,
            stats: Stats::default(),
        })
    }

    /// Runs the sweep to completion.
    pub fn run(mut self) -> Result<Stats, Error> {
        while self.step()? {}
        tracing::debug!(
            edges = self.edges.len(),
            events = self.stats.events,
            intersections = self.stats.intersections,
            traps = self.stats.output,
            "general sweep finished"
        );
        Ok(self.stats)
    }

    /// Processes a single event, returning `false` once there are none left.
    pub fn step(&mut self) -> Result<bool, Error> {
        let Some(event) = self.queue.pop() else {
            self.close_stopped()?;
            return Ok(false);
        };
        self.stats.events += 1;
        tracing::trace!(?event, "event");

        // Rounding can put an intersection slightly above the sweep line;
        // it is handled at the current height instead.
        let y = event.point.y.max(self.current_y);
        if y != self.current_y {
            self.close_stopped()?;
            self.active_edges_to_traps(self.current_y)?;
            self.current_y = y;
        }

        match event.kind {
            EventKind::Start => self.start(event.e1)?,
            EventKind::Stop => self.stop(event.e1)?,
            EventKind::Intersection => {
                if let Some(e2) = event.e2 {
                    self.intersect(event.e1, e2)?;
                }
            }
        }
        self.check_invariants();
        Ok(true)
    }

    fn start(&mut self, e1: NodeIdx) -> Result<(), Error> {
        self.edges[e1].state = State::Active;
        let y = self.current_y;
        self.active
            .insert(&mut self.edges, e1, |a, b| compare_edges(a, b, y));

        let edge = self.edges[e1].edge;
        self.queue
            .push(edge.bottom_point(), EventKind::Stop, e1, None)?;

        // A colinear edge that stopped right here might have left a
        // trapezoid for us to carry on.
        for i in 0..self.stopped.len() {
            let s = self.stopped[i];
            if edge.top <= self.edges[s].edge.bottom && self.edges_colinear(e1, s) {
                self.stopped.remove(i);
                self.edges[e1].deferred = self.edges[s].deferred.take();
                break;
            }
        }

        let Links { prev, next } = self.edges[e1].links;
        let mut pairs = ArrayVec::<(NodeIdx, NodeIdx), 2>::new();
        if let Some(left) = prev {
            pairs.push((left, e1));
        }
        if let Some(right) = next {
            pairs.push((e1, right));
        }
        for (left, right) in pairs {
            self.check_pair(left, right)?;
        }
        Ok(())
    }

    fn stop(&mut self, e1: NodeIdx) -> Result<(), Error> {
        let Links { prev, next } = self.edges[e1].links;
        self.active.remove(&mut self.edges, e1);
        self.edges[e1].state = State::Stopped;

        if self.edges[e1].deferred.is_some() {
            self.stopped
                .try_reserve(1)
                .map_err(|_| Error::NoMemory)?;
            self.stopped.push(e1);
        }

        if let (Some(left), Some(right)) = (prev, next) {
            self.check_pair(left, right)?;
        }
        Ok(())
    }

    fn intersect(&mut self, e1: NodeIdx, e2: NodeIdx) -> Result<(), Error> {
        let adjacent = self.edges[e1].state == State::Active
            && self.edges[e2].state == State::Active
            && self.edges[e1].links.next == Some(e2);
        if !adjacent {
            tracing::trace!(?e1, ?e2, "skipping stale intersection");
            return Ok(());
        }
        self.stats.intersections += 1;

        let left = self.edges[e1].links.prev;
        let right = self.edges[e2].links.next;
        self.active.swap(&mut self.edges, e1, e2);

        // Now e2 is to the left of e1.
        let mut pairs = ArrayVec::<(NodeIdx, NodeIdx), 2>::new();
        if let Some(left) = left {
            pairs.push((left, e2));
        }
        if let Some(right) = right {
            pairs.push((e1, right));
        }
        for (left, right) in pairs {
            self.check_pair(left, right)?;
        }
        Ok(())
    }

    /// Queues an intersection event if two newly adjacent edges cross below
    /// the sweep line.
    fn check_pair(&mut self, left: NodeIdx, right: NodeIdx) -> Result<(), Error> {
        let a = &self.edges[left].edge;
        let b = &self.edges[right].edge;

        if a.line.max_x() <= b.line.min_x() || a.line == b.line {
            return Ok(());
        }
        // If the left edge isn't heading right faster than the right edge,
        // any crossing is already behind us.
        if slope_compare(&a.line, &b.line) != Ordering::Greater {
            return Ok(());
        }
        if let Some(point) = edge_intersect(a, b) {
            self.queue
                .push(point, EventKind::Intersection, left, Some(right))?;
        }
        Ok(())
    }

    fn edges_colinear(&mut self, a: NodeIdx, b: NodeIdx) -> bool {
        if let Some(c) = self.edges[a].colinear {
            if c.other == b {
                return c.is_colinear;
            }
        }
        let is_colinear = match self.edges[b].colinear {
            Some(c) if c.other == a => c.is_colinear,
            _ => lines_colinear(&self.edges[a].edge.line, &self.edges[b].edge.line),
        };
        self.edges[a].colinear = Some(Colinear {
            other: b,
            is_colinear,
        });
        is_colinear
    }

    fn close_stopped(&mut self) -> Result<(), Error> {
        let mut stopped = std::mem::take(&mut self.stopped);
        for &idx in &stopped {
            let bottom = self.edges[idx].edge.bottom;
            self.end_trap(idx, bottom)?;
        }
        stopped.clear();
        self.stopped = stopped;
        Ok(())
    }

    /// Emits the deferred trapezoid of `left`, if it has positive height.
    fn end_trap(&mut self, left: NodeIdx, bottom: Fixed) -> Result<(), Error> {
        if let Some(d) = self.edges[left].deferred.take() {
            if d.top < bottom {
                let left_line = self.edges[left].edge.line;
                let right_line = self.edges[d.right].edge.line;
                self.sink
                    .add_trap(d.top, bottom, &left_line, &right_line)?;
                self.stats.output += 1;
            }
        }
        Ok(())
    }

    /// Makes `left` and `right` the sides of a trapezoid starting at `top`,
    /// continuing the existing one if the sides haven't really changed.
    fn start_or_continue_trap(
        &mut self,
        left: NodeIdx,
        right: NodeIdx,
        top: Fixed,
    ) -> Result<(), Error> {
        if let Some(d) = self.edges[left].deferred {
            if d.right == right {
                return Ok(());
            }
            if self.edges_colinear(d.right, right) {
                self.edges[left].deferred = Some(Deferred { right, ..d });
                return Ok(());
            }
            self.end_trap(left, top)?;
        }

        if !self.edges_colinear(left, right) {
            self.edges[left].deferred = Some(Deferred { top, right });
        }
        Ok(())
    }

    /// Walks the active list at height `top`, pairing up the edges that
    /// bound filled spans.
    fn active_edges_to_traps(&mut self, top: Fixed) -> Result<(), Error> {
        let mut in_out = 0i32;
        let mut left = self.active.head();
        let mut pos = left;

        while let Some(p) = pos {
            let l = left.unwrap_or(p);
            if p != l && self.edges[p].deferred.is_some() {
                if self.edges[l].deferred.is_none() && self.edges_colinear(l, p) {
                    // The span's left side carries on along a colinear edge.
                    self.edges[l].deferred = self.edges[p].deferred.take();
                } else {
                    self.end_trap(p, top)?;
                }
            }

            in_out = in_out.wrapping_add(self.edges[p].edge.dir);
            let next = self.edges[p].links.next;
            if in_out & self.mask == 0 {
                // Don't end a span between colinear edges.
                let split = match next {
                    Some(n) => !self.edges_colinear(p, n),
                    None => true,
                };
                if split {
                    self.start_or_continue_trap(l, p, top)?;
                    left = next;
                }
            }
            pos = next;
        }

        // Only unclosed input leaves a span open at the right.
        if let Some(l) = left {
            self.end_trap(l, top)?;
        }
        Ok(())
    }

    #[cfg(feature = "slow-asserts")]
    fn check_invariants(&self) {
        self.active.check_invariants(&self.edges);
        for idx in self.active.iter(&self.edges) {
            let e = &self.edges[idx];
            assert_eq!(e.state, State::Active);
            assert!(e.edge.top <= self.current_y && self.current_y <= e.edge.bottom);
        }
        for &idx in &self.stopped {
            assert_eq!(self.edges[idx].state, State::Stopped);
            assert!(self.edges[idx].deferred.is_some());
        }
    }

    #[cfg(not(feature = "slow-asserts"))]
    fn check_invariants(&self) {}
}

/// Tessellates a set of edges into trapezoids, sending them to `sink`.
///
/// The edges should form closed polygons (so that the winding number is
/// zero far enough to the left and right). They may cross each other and
/// themselves arbitrarily.
pub fn tessellate<S: TrapSink>(
    edges: &[Edge],
    fill_rule: FillRule,
    sink: &mut S,
) -> Result<Stats, Error> {
    if edges.is_empty() {
        return Ok(Stats::default());
    }
    Tessellator::new(edges, fill_rule, sink)?.run()
}
