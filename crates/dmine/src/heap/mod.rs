//! Bounded heaps for nearest-neighbor bookkeeping.
//!
//! [`KnnHeap`] works with any partially ordered distance value. [`DoubleKnnHeap`] is its specialization for primitive `f64` distances. Both implement
//! [`NeighborHeap`], so callers can pick one when they pick their distance path.

mod double_knn_heap;
mod knn_heap;
mod ord_items;

pub use double_knn_heap::DoubleKnnHeap;
pub use knn_heap::KnnHeap;
pub use ord_items::MinItem;

/// A bounded collection of the nearest items seen so far.
pub trait NeighborHeap<A> {
    /// The type of the distances by which items are ordered.
    type Distance;

    /// Offers an item at the given distance. It is kept if the heap is not full or if it is strictly closer than the current farthest item.
    fn push(&mut self, item: A, distance: Self::Distance);

    /// Returns the number of items in the heap.
    fn len(&self) -> usize;

    /// Returns whether the heap holds no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns whether the heap holds as many items as it may keep.
    fn is_full(&self) -> bool;

    /// Returns the distance of the farthest kept item once the heap is full.
    fn k_distance(&self) -> Option<Self::Distance>;

    /// Consumes the heap and returns the kept items from nearest to farthest.
    fn into_sorted_vec(self) -> Vec<(A, Self::Distance)>;
}
