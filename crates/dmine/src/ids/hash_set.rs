//! A hash set of identifiers.

use std::collections::HashSet;

use super::{DbId, DbIds, ModifiableDbIds};

/// A set of identifiers with O(1) add, remove and membership tests.
///
/// This is the membership record of a cluster: objects join and leave a cluster one at a time, from anywhere in the dataset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct HashSetDbIds(HashSet<DbId>);

impl HashSetDbIds {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty set that can hold `capacity` identifiers before rehashing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self(HashSet::with_capacity(capacity))
    }

    /// Returns the identifiers in ascending order.
    #[must_use]
    pub fn to_sorted_vec(&self) -> Vec<DbId> {
        let mut ids = self.0.iter().copied().collect::<Vec<_>>();
        ids.sort_unstable();
        ids
    }
}

impl FromIterator<DbId> for HashSetDbIds {
    fn from_iter<I: IntoIterator<Item = DbId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl DbIds for HashSetDbIds {
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

impl ModifiableDbIds for HashSetDbIds {
    fn add(&mut self, id: DbId) -> bool {
        self.0.insert(id)
    }

    fn remove(&mut self, id: DbId) -> bool {
        self.0.remove(&id)
    }

    fn clear(&mut self) {
        self.0.clear();
    }
}
