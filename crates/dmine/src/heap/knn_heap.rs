//! A bounded heap for the `k` nearest neighbors under a general distance value.

use std::collections::BinaryHeap;

use super::{MinItem, NeighborHeap};

/// Keeps the `k` items with the smallest distances seen so far.
///
/// Internally a max-heap of at most `k` items, so the current `k`-distance is at the top and a candidate is admitted only when it is strictly
/// closer. Incomparable distances (e.g. NaN) count as farther than any number.
///
/// # Type Parameters
///
/// - `A`: The data associated with each distance, e.g. an identifier or a cluster index. Ignored by the ordering.
/// - `T`: The distance type. Only `PartialOrd` is required, so general distance values work as well as primitives.
#[derive(Debug)]
pub struct KnnHeap<A, T: PartialOrd> {
    /// The heap of items.
    heap: BinaryHeap<MinItem<A, T>>,
    /// The maximum size of the heap.
    k: usize,
}

impl<A, T: PartialOrd> KnnHeap<A, T> {
    /// Creates a heap that keeps at most `k` items.
    #[must_use]
    pub fn new(k: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(k),
            k,
        }
    }
}

impl<A, T: PartialOrd + Clone> NeighborHeap<A> for KnnHeap<A, T> {
    type Distance = T;

    fn push(&mut self, item: A, distance: T) {
        let candidate = MinItem(item, distance);
        if self.heap.len() < self.k {
            self.heap.push(candidate);
        } else if let Some(mut top) = self.heap.peek_mut()
            && candidate < *top
        {
            *top = candidate;
        }
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn is_full(&self) -> bool {
        self.heap.len() >= self.k
    }

    fn k_distance(&self) -> Option<T> {
        if self.is_full() { self.heap.peek().map(|top| top.1.clone()) } else { None }
    }

    fn into_sorted_vec(self) -> Vec<(A, T)> {
        self.heap.into_sorted_vec().into_iter().map(|MinItem(a, d)| (a, d)).collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::heap::NeighborHeap;

    use super::KnnHeap;

    #[test]
    fn keeps_k_smallest() {
        let mut heap = KnnHeap::new(3);
        for (i, d) in [5.0, 1.0, 4.0, 2.0, 3.0].into_iter().enumerate() {
            heap.push(i, d);
        }
        assert!(heap.is_full());
        assert_eq!(heap.k_distance(), Some(3.0));
        assert_eq!(heap.into_sorted_vec(), vec![(1, 1.0), (3, 2.0), (4, 3.0)]);
    }

    #[test]
    fn ties_do_not_displace() {
        let mut heap = KnnHeap::new(1);
        heap.push("first", 1.0);
        heap.push("second", 1.0);
        assert_eq!(heap.into_sorted_vec(), vec![("first", 1.0)]);
    }

    #[test]
    fn zero_capacity() {
        let mut heap = KnnHeap::new(0);
        heap.push('a', 1.0);
        assert!(heap.is_full());
        assert!(heap.is_empty());
        assert_eq!(heap.k_distance(), None);
    }

    #[test]
    fn nan_is_never_kept_over_a_number() {
        let mut heap = KnnHeap::new(2);
        heap.push(0, f64::NAN);
        heap.push(1, 3.0);
        heap.push(2, 1.0);
        assert_eq!(heap.into_sorted_vec().into_iter().map(|(i, _)| i).collect::<Vec<_>>(), vec![2, 1]);
    }
}
