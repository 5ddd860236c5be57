//! A bounded heap for the `k` nearest neighbors under primitive `f64` distances.

use core::cmp::Ordering;
use std::collections::BinaryHeap;

use super::NeighborHeap;

/// An entry of a [`DoubleKnnHeap`], ordered by distance with [`f64::total_cmp`] and then by the associated data.
#[derive(Clone, Copy, Debug)]
struct Entry<A>(f64, A);

impl<A: Ord> PartialEq for Entry<A> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<A: Ord> Eq for Entry<A> {}

impl<A: Ord> PartialOrd for Entry<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A: Ord> Ord for Entry<A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0).then_with(|| self.1.cmp(&other.1))
    }
}

/// Keeps the `k` items with the smallest `f64` distances.
///
/// The specialization of [`KnnHeap`](super::KnnHeap) for the primitive fast path: comparisons are a single `total_cmp` and never fall back to a general
/// ordering. Equal distances are broken by the associated data, so the result is fully deterministic.
#[derive(Debug)]
pub struct DoubleKnnHeap<A: Ord> {
    /// The heap of items.
    heap: BinaryHeap<Entry<A>>,
    /// The maximum size of the heap.
    k: usize,
}

impl<A: Ord> DoubleKnnHeap<A> {
    /// Creates a heap that keeps at most `k` items.
    #[must_use]
    pub fn new(k: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(k),
            k,
        }
    }
}

impl<A: Ord> NeighborHeap<A> for DoubleKnnHeap<A> {
    type Distance = f64;

    fn push(&mut self, item: A, distance: f64) {
        let entry = Entry(distance, item);
        if self.heap.len() < self.k {
            self.heap.push(entry);
        } else if let Some(top) = self.heap.peek()
            && entry < *top
        {
            self.heap.pop();
            self.heap.push(entry);
        }
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn is_full(&self) -> bool {
        self.heap.len() >= self.k
    }

    fn k_distance(&self) -> Option<f64> {
        if self.is_full() { self.heap.peek().map(|e| e.0) } else { None }
    }

    fn into_sorted_vec(self) -> Vec<(A, f64)> {
        self.heap.into_sorted_vec().into_iter().map(|Entry(d, a)| (a, d)).collect()
    }
}
