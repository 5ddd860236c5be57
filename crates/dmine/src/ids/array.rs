//! An ordered array of identifiers.

use super::{DbId, DbIds, ModifiableDbIds};

/// An ordered, growable array of identifiers.
///
/// Membership tests and removal are linear scans. Use [`HashSetDbIds`](super::HashSetDbIds) when those are on a hot path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct ArrayDbIds(Vec<DbId>);

impl ArrayDbIds {
    /// Creates an empty array with room for `capacity` identifiers.
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Copies the identifiers of any collection into a new array, preserving their iteration order.
    pub fn from_ids<D: DbIds>(ids: &D) -> Self {
        let mut array = Self::with_capacity(ids.len());
        array.0.extend(ids.iter());
        array
    }

    /// Returns the identifier at offset `i`.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<DbId> {
        self.0.get(i).copied()
    }

    /// Swaps the identifiers at offsets `i` and `j`.
    ///
    /// # Panics
    ///
    /// If either offset is out of bounds.
    pub fn swap(&mut self, i: usize, j: usize) {
        self.0.swap(i, j);
    }

    /// Copies the identifiers in `start..end` into a new array.
    ///
    /// # Panics
    ///
    /// If the range is out of bounds.
    pub fn slice(&self, start: usize, end: usize) -> Self {
        Self(self.0[start..end].to_vec())
    }

    /// Sorts the identifiers in ascending order.
    pub fn sort(&mut self) {
        self.0.sort_unstable();
    }

    /// Returns the identifiers as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[DbId] {
        &self.0
    }

    /// Returns the identifiers as a mutable slice.
    pub(crate) fn as_mut_slice(&mut self) -> &mut [DbId] {
        &mut self.0
    }
}

impl From<Vec<DbId>> for ArrayDbIds {
    fn from(ids: Vec<DbId>) -> Self {
        Self(ids)
    }
}

impl FromIterator<DbId> for ArrayDbIds {
    fn from_iter<I: IntoIterator<Item = DbId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl DbIds for ArrayDbIds {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn contains(&self, id: DbId) -> bool {
        self.0.contains(&id)
    }

    fn iter(&self) -> impl Iterator<Item = DbId> + '_ {
        self.0.iter().copied()
    }
}

impl ModifiableDbIds for ArrayDbIds {
    fn add(&mut self, id: DbId) -> bool {
        self.0.push(id);
        true
    }

    fn remove(&mut self, id: DbId) -> bool {
        self.0.iter().position(|&x| x == id).is_some_and(|i| {
            self.0.remove(i);
            true
        })
    }

    fn clear(&mut self) {
        self.0.clear();
    }
}
