//! Centroids and the mean-ordered sequence that holds them
//!
//! The sequence is a doubly-linked list stored in an arena: every centroid
//! lives in a slot of a `Vec`, links are slot indices, and removed slots go
//! onto a free list for reuse. Splicing and merging are O(1) link rewrites.

use core::fmt;
use core::iter::FusedIterator;

#[cfg(feature = "std")]
use std::vec::Vec;

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// A centroid in the digest
///
/// Centroids summarize one or more samples by their weighted mean and total
/// weight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Centroid {
    /// Weighted mean of the absorbed samples
    pub mean: f32,
    /// Total weight of the absorbed samples
    pub weight: f32,
}

impl Centroid {
    /// Create a new centroid
    pub fn new(mean: f32, weight: f32) -> Self {
        Self { mean, weight }
    }

    /// Absorb `other` into this centroid.
    ///
    /// The weight grows first so the mean delta divides by the combined
    /// weight. The result is clamped to the span of the two means, which keeps
    /// neighbours ordered under float rounding.
    pub fn update(&mut self, other: &Centroid) {
        debug_assert!(self.weight > 0.0, "update on a weightless centroid");

        let lo = self.mean.min(other.mean);
        let hi = self.mean.max(other.mean);

        self.weight += other.weight;
        let step = other.weight * (other.mean - self.mean) / self.weight;
        self.mean = if step.is_finite() {
            self.mean + step
        } else {
            // the delta overflowed; blend the means instead
            let share = other.weight / self.weight;
            self.mean * (1.0 - share) + other.mean * share
        };
        self.mean = self.mean.clamp(lo, hi);
    }
}

impl fmt::Display for Centroid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Centroid{{mean={} weight={}}}", self.mean, self.weight)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Slot {
    centroid: Centroid,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Mean-ordered, doubly-linked centroid sequence backed by an arena.
///
/// The list itself does not enforce ordering; the digest only splices at
/// positions that keep means non-decreasing.
#[derive(Clone, Debug, Default)]
pub(crate) struct CentroidList {
    slots: Vec<Slot>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl CentroidList {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn head(&self) -> Option<usize> {
        self.head
    }

    pub(crate) fn tail(&self) -> Option<usize> {
        self.tail
    }

    pub(crate) fn next(&self, idx: usize) -> Option<usize> {
        self.slots[idx].next
    }

    pub(crate) fn get(&self, idx: usize) -> &Centroid {
        &self.slots[idx].centroid
    }

    pub(crate) fn head_centroid(&self) -> Option<&Centroid> {
        self.head().map(|idx| self.get(idx))
    }

    pub(crate) fn tail_centroid(&self) -> Option<&Centroid> {
        self.tail().map(|idx| self.get(idx))
    }

    fn alloc(&mut self, centroid: Centroid, prev: Option<usize>, next: Option<usize>) -> usize {
        let slot = Slot {
            centroid,
            prev,
            next,
        };
        self.len += 1;
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = slot;
                idx
            }
            None => {
                self.slots.push(slot);
                self.slots.len() - 1
            }
        }
    }

    /// Insert `centroid` as the new head
    pub(crate) fn push_front(&mut self, centroid: Centroid) -> usize {
        let old_head = self.head;
        let idx = self.alloc(centroid, None, old_head);
        match old_head {
            Some(h) => self.slots[h].prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
        idx
    }

    /// Insert `centroid` as the new tail
    pub(crate) fn push_back(&mut self, centroid: Centroid) -> usize {
        match self.tail {
            Some(t) => self.insert_after(t, centroid),
            None => {
                let idx = self.alloc(centroid, None, None);
                self.head = Some(idx);
                self.tail = Some(idx);
                idx
            }
        }
    }

    /// Splice `centroid` directly after the slot `at`
    pub(crate) fn insert_after(&mut self, at: usize, centroid: Centroid) -> usize {
        let after = self.slots[at].next;
        let idx = self.alloc(centroid, Some(at), after);
        self.slots[at].next = Some(idx);
        match after {
            Some(n) => self.slots[n].prev = Some(idx),
            None => self.tail = Some(idx),
        }
        idx
    }

    /// Unlink the slot `idx` and return its centroid
    fn remove(&mut self, idx: usize) -> Centroid {
        let Slot {
            centroid,
            prev,
            next,
        } = self.slots[idx].clone();

        match prev {
            Some(p) => self.slots[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].prev = prev,
            None => self.tail = prev,
        }

        self.slots[idx].prev = None;
        self.slots[idx].next = None;
        self.free.push(idx);
        self.len -= 1;
        centroid
    }

    /// Fold the successor of `idx` into `idx` and drop the successor.
    ///
    /// Returns `false` if `idx` is the tail.
    pub(crate) fn merge_next(&mut self, idx: usize) -> bool {
        let Some(next) = self.slots[idx].next else {
            return false;
        };
        let absorbed = self.remove(next);
        self.slots[idx].centroid.update(&absorbed);
        true
    }

    /// Drop every centroid, keeping the allocation
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Copy out all centroids in head-to-tail order
    pub(crate) fn snapshot(&self) -> Vec<Centroid> {
        self.iter().copied().collect()
    }

    pub(crate) fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }

    pub(crate) fn heap_bytes(&self) -> usize {
        self.slots.capacity() * core::mem::size_of::<Slot>()
            + self.free.capacity() * core::mem::size_of::<usize>()
    }
}

/// Iterator over the centroids of a digest in mean order.
///
/// Forward iteration follows `next` links from the head; reversing it follows
/// `prev` links from the tail.
#[derive(Clone, Debug)]
pub struct Iter<'a> {
    list: &'a CentroidList,
    front: Option<usize>,
    back: Option<usize>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Centroid;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.front?;
        let slot = &self.list.slots[idx];
        self.front = slot.next;
        self.remaining -= 1;
        Some(&slot.centroid)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.back?;
        let slot = &self.list.slots[idx];
        self.back = slot.prev;
        self.remaining -= 1;
        Some(&slot.centroid)
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}
