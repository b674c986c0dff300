//! A binary min-heap for sweep events.

use crate::Error;

/// A min-heap whose storage grows fallibly.
///
/// Elements compare with `Ord`; ties come out in no particular order, so
/// callers that care include a sequence number in the key.
#[derive(Debug)]
pub(crate) struct PriorityQueue<T> {
    elements: Vec<T>,
}

impl<T: Ord> PriorityQueue<T> {
    pub fn new() -> Self {
        PriorityQueue {
            elements: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The smallest element.
    pub fn peek(&self) -> Option<&T> {
        self.elements.first()
    }

    pub fn push(&mut self, elt: T) -> Result<(), Error> {
        if self.elements.len() == self.elements.capacity() {
            let grow = self.elements.capacity().max(16);
            self.elements
                .try_reserve_exact(grow)
                .map_err(|_| Error::NoMemory)?;
        }
        self.elements.push(elt);
        self.sift_up(self.elements.len() - 1);
        Ok(())
    }

    /// Removes the smallest element.
    pub fn pop(&mut self) -> Option<T> {
        if self.elements.is_empty() {
            return None;
        }
        let last = self.elements.len() - 1;
        self.elements.swap(0, last);
        let ret = self.elements.pop();
        self.sift_down(0);
        ret
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.elements[parent] <= self.elements[i] {
                break;
            }
            self.elements.swap(parent, i);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.elements.len();
        loop {
            let mut child = 2 * i + 1;
            if child >= len {
                break;
            }
            if child + 1 < len && self.elements[child + 1] < self.elements[child] {
                child += 1;
            }
            if self.elements[i] <= self.elements[child] {
                break;
            }
            self.elements.swap(i, child);
            i = child;
        }
    }
}
