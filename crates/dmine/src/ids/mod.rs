//! Stable, compact identifiers for the objects in a dataset and collections thereof.
//!
//! - [`DbId`]: the identifier of a single object.
//! - [`DbIdRange`]: a static, contiguous range of identifiers, as allocated for a freshly loaded relation.
//! - [`ArrayDbIds`]: an ordered, growable array of identifiers. Blocks produced by [`random_split`] are arrays.
//! - [`HashSetDbIds`]: a set of identifiers with O(1) add/remove. Cluster memberships are sets.
//! - [`DbIdFactory`]: hands out single identifiers and static ranges.

mod array;
mod factory;
mod hash_set;
mod pair;
mod range;
mod split;

pub use array::ArrayDbIds;
pub use factory::DbIdFactory;
pub use hash_set::HashSetDbIds;
pub use pair::{DbIdPair, DoubleDbIdPair};
pub use range::DbIdRange;
pub use split::random_split;

/// The identifier of one object in a dataset.
///
/// Identifiers are unique for the lifetime of the [`DbIdFactory`] that issued them, totally ordered and cheap to copy, hash and compare. They carry no
/// reference to the object's feature vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct DbId(pub(crate) u32);

impl DbId {
    /// Returns the integer behind this identifier.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for DbId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A read-only collection of identifiers.
pub trait DbIds {
    /// Returns the number of identifiers in the collection.
    fn len(&self) -> usize;

    /// Returns whether the collection holds no identifiers.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns whether `id` is in the collection.
    fn contains(&self, id: DbId) -> bool;

    /// Iterates over the identifiers in the collection.
    ///
    /// For ordered collections (ranges and arrays) this is their order. For sets the order is unspecified.
    fn iter(&self) -> impl Iterator<Item = DbId> + '_;
}

/// A collection of identifiers that can be added to and removed from.
pub trait ModifiableDbIds: DbIds {
    /// Adds `id`, returning whether the collection changed.
    fn add(&mut self, id: DbId) -> bool;

    /// Removes `id`, returning whether the collection changed.
    fn remove(&mut self, id: DbId) -> bool;

    /// Removes all identifiers.
    fn clear(&mut self);

    /// Adds every identifier in `ids`, returning whether the collection changed.
    fn add_all<D: DbIds>(&mut self, ids: &D) -> bool {
        ids.iter().fold(false, |changed, id| self.add(id) || changed)
    }
}
