//! The list of edges crossing the sweep line, ordered left to right.
//!
//! Nodes live in a [`NodeVec`] arena owned by the sweep, and the list threads
//! through them by index. Nothing is removed from the arena until the sweep
//! finishes, so a stale index is never dangling.

use std::cmp::Ordering;

/// An index into a [`NodeVec`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NodeIdx(pub(crate) usize);

/// The arena of sweep nodes.
pub(crate) struct NodeVec<T> {
    inner: Vec<T>,
}

impl_typed_vec!(NodeVec, NodeIdx, "n");

/// The neighbours of a node in the active list.
///
/// While a node is waiting to be merged into the list, `next` chains it to
/// the other waiting nodes and `prev` is unused.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Links {
    pub prev: Option<NodeIdx>,
    pub next: Option<NodeIdx>,
}

pub(crate) trait Linked {
    fn links(&self) -> &Links;
    fn links_mut(&mut self) -> &mut Links;
}

fn next<N: Linked>(nodes: &NodeVec<N>, idx: NodeIdx) -> Option<NodeIdx> {
    nodes[idx].links().next
}

fn prev<N: Linked>(nodes: &NodeVec<N>, idx: NodeIdx) -> Option<NodeIdx> {
    nodes[idx].links().prev
}

/// A doubly linked list with a cursor at the most recently inserted node.
///
/// Insertions usually land close to the previous one, so they search
/// outward from the cursor instead of from the head.
#[derive(Debug, Default)]
pub(crate) struct ActiveList {
    head: Option<NodeIdx>,
    cursor: Option<NodeIdx>,
}

impl ActiveList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn head(&self) -> Option<NodeIdx> {
        self.head
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn iter<'a, N: Linked>(
        &self,
        nodes: &'a NodeVec<N>,
    ) -> impl Iterator<Item = NodeIdx> + 'a {
        std::iter::successors(self.head, move |&idx| next(nodes, idx))
    }

    /// Links `idx` in between `before` and whatever currently follows it.
    /// A `before` of `None` means the front of the list.
    fn link_after<N: Linked>(
        &mut self,
        nodes: &mut NodeVec<N>,
        before: Option<NodeIdx>,
        idx: NodeIdx,
    ) {
        let after = match before {
            Some(b) => next(nodes, b),
            None => self.head,
        };
        *nodes[idx].links_mut() = Links {
            prev: before,
            next: after,
        };
        match before {
            Some(b) => nodes[b].links_mut().next = Some(idx),
            None => self.head = Some(idx),
        }
        if let Some(a) = after {
            nodes[a].links_mut().prev = Some(idx);
        }
    }

    /// Inserts a node at its place in the `cmp` order.
    ///
    /// A node comparing equal to the cursor goes right after it.
    pub fn insert<N: Linked>(
        &mut self,
        nodes: &mut NodeVec<N>,
        idx: NodeIdx,
        mut cmp: impl FnMut(&N, &N) -> Ordering,
    ) {
        let before = match self.cursor {
            None => None,
            Some(cursor) => match cmp(&nodes[idx], &nodes[cursor]) {
                Ordering::Equal => Some(cursor),
                Ordering::Greater => {
                    let mut at = cursor;
                    while let Some(n) = next(nodes, at) {
                        if cmp(&nodes[n], &nodes[idx]).is_lt() {
                            at = n;
                        } else {
                            break;
                        }
                    }
                    Some(at)
                }
                Ordering::Less => {
                    let mut at = prev(nodes, cursor);
                    while let Some(p) = at {
                        if cmp(&nodes[p], &nodes[idx]).is_gt() {
                            at = prev(nodes, p);
                        } else {
                            break;
                        }
                    }
                    at
                }
            },
        };
        self.link_after(nodes, before, idx);
        self.cursor = Some(idx);
    }

    pub fn remove<N: Linked>(&mut self, nodes: &mut NodeVec<N>, idx: NodeIdx) {
        let Links { prev, next } = *nodes[idx].links();
        match prev {
            Some(p) => nodes[p].links_mut().next = next,
            None => self.head = next,
        }
        if let Some(n) = next {
            nodes[n].links_mut().prev = prev;
        }
        if self.cursor == Some(idx) {
            self.cursor = prev.or(next);
        }
        *nodes[idx].links_mut() = Links::default();
    }

    /// Exchanges two adjacent nodes; `a` must immediately precede `b`.
    pub fn swap<N: Linked>(&mut self, nodes: &mut NodeVec<N>, a: NodeIdx, b: NodeIdx) {
        debug_assert_eq!(next(nodes, a), Some(b));
        let before = prev(nodes, a);
        let after = next(nodes, b);

        match before {
            Some(p) => nodes[p].links_mut().next = Some(b),
            None => self.head = Some(b),
        }
        if let Some(n) = after {
            nodes[n].links_mut().prev = Some(a);
        }
        *nodes[b].links_mut() = Links {
            prev: before,
            next: Some(a),
        };
        *nodes[a].links_mut() = Links {
            prev: Some(b),
            next: after,
        };
    }

    /// Merges a chain of waiting nodes (linked through `next`) into the list.
    ///
    /// `le` must be a total preorder. The merge is stable: waiting nodes go
    /// after list nodes they tie with, and keep their chain order among
    /// themselves.
    pub fn merge_pending<N: Linked>(
        &mut self,
        nodes: &mut NodeVec<N>,
        pending: Option<NodeIdx>,
        mut le: impl FnMut(&N, &N) -> bool,
    ) {
        let Some(first) = sort_chain(nodes, pending, &mut le) else {
            return;
        };

        let mut before = match self.cursor {
            None => None,
            Some(cursor) if le(&nodes[cursor], &nodes[first]) => {
                let mut at = cursor;
                while let Some(n) = next(nodes, at) {
                    if le(&nodes[n], &nodes[first]) {
                        at = n;
                    } else {
                        break;
                    }
                }
                Some(at)
            }
            Some(cursor) => {
                let mut at = prev(nodes, cursor);
                while let Some(p) = at {
                    if le(&nodes[p], &nodes[first]) {
                        break;
                    }
                    at = prev(nodes, p);
                }
                at
            }
        };

        let mut waiting = Some(first);
        while let Some(e) = waiting {
            waiting = next(nodes, e);
            loop {
                let after = match before {
                    Some(b) => next(nodes, b),
                    None => self.head,
                };
                match after {
                    Some(a) if le(&nodes[a], &nodes[e]) => before = Some(a),
                    _ => break,
                }
            }
            self.link_after(nodes, before, e);
            before = Some(e);
        }
        self.cursor = Some(first);
    }

    #[cfg(any(test, feature = "slow-asserts"))]
    pub fn check_invariants<N: Linked>(&self, nodes: &NodeVec<N>) {
        let mut prev_idx = None;
        let mut saw_cursor = self.cursor.is_none();
        for idx in self.iter(nodes) {
            assert_eq!(prev(nodes, idx), prev_idx, "bad back link at {idx:?}");
            saw_cursor |= self.cursor == Some(idx);
            prev_idx = Some(idx);
        }
        assert!(saw_cursor, "cursor {:?} is not in the list", self.cursor);
        assert_eq!(self.head.is_none(), self.cursor.is_none());
    }
}

/// Sorts a `next`-linked chain with a bottom-up merge sort, returning the
/// new head.
///
/// Runs of length 1, 2, 4, ... are merged pairwise until a single run
/// remains, so no recursion or scratch space is needed.
fn sort_chain<N: Linked>(
    nodes: &mut NodeVec<N>,
    mut list: Option<NodeIdx>,
    le: &mut impl FnMut(&N, &N) -> bool,
) -> Option<NodeIdx> {
    let mut run = 1;
    loop {
        let mut p = list;
        list = None;
        let mut tail: Option<NodeIdx> = None;
        let mut merges = 0;

        while let Some(p_start) = p {
            merges += 1;
            let mut q = Some(p_start);
            let mut p_len = 0;
            while p_len < run {
                let Some(qq) = q else { break };
                p_len += 1;
                q = next(nodes, qq);
            }
            let mut q_len = run;

            loop {
                let p_head = if p_len > 0 { p } else { None };
                let q_head = if q_len > 0 { q } else { None };
                let (e, from_p) = match (p_head, q_head) {
                    (None, None) => break,
                    (Some(pp), None) => (pp, true),
                    (None, Some(qq)) => (qq, false),
                    (Some(pp), Some(qq)) => {
                        if le(&nodes[pp], &nodes[qq]) {
                            (pp, true)
                        } else {
                            (qq, false)
                        }
                    }
                };
                if from_p {
                    p = next(nodes, e);
                    p_len -= 1;
                } else {
                    q = next(nodes, e);
                    q_len -= 1;
                }
                match tail {
                    Some(t) => nodes[t].links_mut().next = Some(e),
                    None => list = Some(e),
                }
                tail = Some(e);
            }
            p = q;
        }
        if let Some(t) = tail {
            nodes[t].links_mut().next = None;
        }
        if merges <= 1 {
            return list;
        }
        run *= 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug)]
    struct Node {
        key: i32,
        tag: usize,
        links: Links,
    }

    impl Linked for Node {
        fn links(&self) -> &Links {
            &self.links
        }

        fn links_mut(&mut self) -> &mut Links {
            &mut self.links
        }
    }

    fn arena(keys: &[i32]) -> NodeVec<Node> {
        let mut nodes = NodeVec::try_with_capacity(keys.len()).unwrap();
        for (tag, &key) in keys.iter().enumerate() {
            nodes
                .try_push(Node {
                    key,
                    tag,
                    links: Links::default(),
                })
                .unwrap();
        }
        nodes
    }

    fn keys(list: &ActiveList, nodes: &NodeVec<Node>) -> Vec<i32> {
        list.iter(nodes).map(|i| nodes[i].key).collect()
    }

    fn by_key(a: &Node, b: &Node) -> Ordering {
        a.key.cmp(&b.key)
    }

    #[test]
    fn insert_remove_swap() {
        let mut nodes = arena(&[5, 1, 9, 3, 7]);
        let mut list = ActiveList::new();
        for idx in nodes.indices().collect::<Vec<_>>() {
            list.insert(&mut nodes, idx, by_key);
            list.check_invariants(&nodes);
        }
        assert_eq!(keys(&list, &nodes), vec![1, 3, 5, 7, 9]);

        list.remove(&mut nodes, NodeIdx(1));
        list.check_invariants(&nodes);
        assert_eq!(keys(&list, &nodes), vec![3, 5, 7, 9]);
        assert_eq!(nodes[NodeIdx(1)].links, Links::default());

        list.swap(&mut nodes, NodeIdx(3), NodeIdx(0));
        list.check_invariants(&nodes);
        assert_eq!(keys(&list, &nodes), vec![5, 3, 7, 9]);
        assert_eq!(list.head(), Some(NodeIdx(0)));

        for idx in [NodeIdx(4), NodeIdx(0), NodeIdx(2), NodeIdx(3)] {
            list.remove(&mut nodes, idx);
            list.check_invariants(&nodes);
        }
        assert!(list.is_empty());
    }

    #[test]
    fn ties_go_after_the_cursor() {
        let mut nodes = arena(&[2, 2, 2]);
        let mut list = ActiveList::new();
        for idx in nodes.indices().collect::<Vec<_>>() {
            list.insert(&mut nodes, idx, by_key);
        }
        let tags: Vec<_> = list.iter(&nodes).map(|i| nodes[i].tag).collect();
        assert_eq!(tags, vec![0, 1, 2]);
    }

    #[test]
    fn merge_into_empty_and_existing() {
        let mut nodes = arena(&[4, 2, 8, 6, 2, 5, 1, 9]);
        let mut list = ActiveList::new();

        // Chain 0 -> 1 -> 2 -> 3.
        for i in 0..3 {
            nodes[NodeIdx(i)].links.next = Some(NodeIdx(i + 1));
        }
        list.merge_pending(&mut nodes, Some(NodeIdx(0)), |a, b| a.key <= b.key);
        list.check_invariants(&nodes);
        assert_eq!(keys(&list, &nodes), vec![2, 4, 6, 8]);

        // Chain 4 -> 5 -> 6 -> 7.
        for i in 4..7 {
            nodes[NodeIdx(i)].links.next = Some(NodeIdx(i + 1));
        }
        list.merge_pending(&mut nodes, Some(NodeIdx(4)), |a, b| a.key <= b.key);
        list.check_invariants(&nodes);
        assert_eq!(keys(&list, &nodes), vec![1, 2, 2, 4, 5, 6, 8, 9]);

        // The newly merged 2 goes after the old one.
        let tags: Vec<_> = list.iter(&nodes).map(|i| nodes[i].tag).collect();
        assert_eq!(&tags[1..3], &[1, 4]);
    }

    proptest! {
        #[test]
        fn merge_is_a_stable_sort(
            batches in prop::collection::vec(prop::collection::vec(-20..20i32, 0..20), 0..6),
            removals in prop::collection::vec(any::<prop::sample::Index>(), 0..10),
        ) {
            let all: Vec<i32> = batches.iter().flatten().copied().collect();
            let mut nodes = arena(&all);
            let mut list = ActiveList::new();
            let mut live: Vec<usize> = Vec::new();

            let mut start = 0;
            for batch in &batches {
                let end = start + batch.len();
                for i in start..end.saturating_sub(1) {
                    nodes[NodeIdx(i)].links.next = Some(NodeIdx(i + 1));
                }
                let head = (start < end).then_some(NodeIdx(start));
                list.merge_pending(&mut nodes, head, |a, b| a.key <= b.key);
                list.check_invariants(&nodes);
                live.extend(start..end);
                start = end;

                // Remove a few, so that the cursor moves around.
                for r in &removals {
                    if live.len() > 2 {
                        let victim = live.remove(r.index(live.len()));
                        list.remove(&mut nodes, NodeIdx(victim));
                        list.check_invariants(&nodes);
                    }
                }
            }

            // Stable by key: ties are in insertion (tag) order.
            let mut expected: Vec<(i32, usize)> = live.iter().map(|&i| (nodes[NodeIdx(i)].key, i)).collect();
            expected.sort();
            let actual: Vec<(i32, usize)> = list.iter(&nodes).map(|i| (nodes[i].key, nodes[i].tag)).collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
