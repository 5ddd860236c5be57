//! Pairs of identifiers, and identifiers paired with distances.

use super::DbId;

/// An ordered pair of identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DbIdPair(pub DbId, pub DbId);

impl DbIdPair {
    /// Returns the pair with its members swapped.
    #[must_use]
    pub const fn swapped(self) -> Self {
        Self(self.1, self.0)
    }
}

/// An identifier paired with a primitive distance, as found in nearest-neighbor lists.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DoubleDbIdPair {
    /// The distance.
    pub distance: f64,
    /// The identifier.
    pub id: DbId,
}

impl DoubleDbIdPair {
    /// Orders pairs by distance with [`f64::total_cmp`], then by identifier.
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.distance.total_cmp(&other.distance).then_with(|| self.id.cmp(&other.id))
    }
}
