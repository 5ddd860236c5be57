//! Per-object integer property stores.

use std::collections::HashMap;

use crate::ids::{DbId, DbIdRange, DbIds};

/// A mutable map from identifiers to small integers.
pub trait IntegerStore {
    /// Returns the value stored for `id`, or the store's default if nothing was stored.
    fn get(&self, id: DbId) -> i32;

    /// Stores `value` for `id`, returning the previous value.
    ///
    /// A store that cannot hold `id` is left unchanged and returns its default, matching what [`get`](Self::get) reports for `id`.
    fn put(&mut self, id: DbId, value: i32) -> i32;

    /// Returns the default value of the store.
    fn default_value(&self) -> i32;
}

/// An [`IntegerStore`] laid out for the identifiers it was created for.
///
/// When the identifiers form a static range, values live in a dense array indexed by offset into the range, so `get` and `put` are a subtraction and an index.
/// Any other identifier set falls back to a hash map.
#[derive(Clone, Debug)]
#[must_use]
pub enum IntegerStorage {
    /// Values for a contiguous range of identifiers.
    Dense {
        /// The identifiers covered by `values`.
        range: DbIdRange,
        /// One value per identifier in `range`.
        values: Vec<i32>,
        /// The value reported for identifiers outside `range`.
        default: i32,
    },
    /// Values for an arbitrary identifier set.
    Sparse {
        /// Stored values.
        values: HashMap<DbId, i32>,
        /// The value reported for identifiers without a stored value.
        default: i32,
    },
}

impl IntegerStorage {
    /// Creates a dense store over `range` with every value set to `default`.
    pub fn for_range(range: DbIdRange, default: i32) -> Self {
        Self::Dense {
            range,
            values: vec![default; range.len()],
            default,
        }
    }

    /// Creates a store for an arbitrary identifier set with every value set to `default`.
    pub fn for_ids<D: DbIds>(ids: &D, default: i32) -> Self {
        Self::Sparse {
            values: HashMap::with_capacity(ids.len()),
            default,
        }
    }

    /// Resets every value to the default, keeping the allocation.
    pub fn reset(&mut self) {
        match self {
            Self::Dense { values, default, .. } => values.fill(*default),
            Self::Sparse { values, .. } => values.clear(),
        }
    }
}

impl IntegerStore for IntegerStorage {
    fn get(&self, id: DbId) -> i32 {
        match self {
            Self::Dense { range, values, default } => range.index_of(id).map_or(*default, |i| values[i]),
            Self::Sparse { values, default } => values.get(&id).copied().unwrap_or(*default),
        }
    }

    fn put(&mut self, id: DbId, value: i32) -> i32 {
        match self {
            Self::Dense { range, values, default } => range.index_of(id).map_or_else(
                || {
                    ftlog::warn!("Ignoring a value for {id}, which is outside the range this store was created for");
                    *default
                },
                |i| core::mem::replace(&mut values[i], value),
            ),
            Self::Sparse { values, default } => values.insert(id, value).unwrap_or(*default),
        }
    }

    fn default_value(&self) -> i32 {
        match self {
            Self::Dense { default, .. } | Self::Sparse { default, .. } => *default,
        }
    }
}
