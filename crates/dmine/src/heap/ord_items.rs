//! A wrapper that gives partially ordered values a total order.

use core::cmp::Ordering;

/// Whether `x` cannot be compared with itself, e.g. a NaN.
fn is_incomparable<T: PartialOrd>(x: &T) -> bool {
    x.partial_cmp(x).is_none()
}

/// Orders by the second field, with incomparable values (e.g. NaN) sorted last.
///
/// Use this as the key for `min_by_key` and `sort_by_key`, or as the item of a bounded max-heap that should discard NaNs first. The first field is carried
/// along and ignored by the ordering.
#[derive(Clone, Copy, Debug)]
pub struct MinItem<A, T>(pub A, pub T);

impl<A, T: PartialOrd> PartialEq for MinItem<A, T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<A, T: PartialOrd> Eq for MinItem<A, T> {}

impl<A, T: PartialOrd> PartialOrd for MinItem<A, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A, T: PartialOrd> Ord for MinItem<A, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.1
            .partial_cmp(&other.1)
            .unwrap_or_else(|| is_incomparable(&self.1).cmp(&is_incomparable(&other.1)))
    }
}
