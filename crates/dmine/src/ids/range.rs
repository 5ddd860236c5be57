//! A static, contiguous range of identifiers.

use super::{DbId, DbIds};

/// A static, contiguous range of identifiers `start, start + 1, …, start + len - 1`.
///
/// Ranges are what a [`DbIdFactory`](super::DbIdFactory) hands out when a whole relation is loaded at once. Because the identifiers are contiguous, the
/// offset of an identifier in the range is a subtraction, which lets property stores use a dense array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct DbIdRange {
    /// The first identifier in the range.
    pub(crate) start: u32,
    /// The number of identifiers in the range.
    pub(crate) len: u32,
}

impl DbIdRange {
    /// Returns the first identifier in the range, if the range is not empty.
    #[must_use]
    pub const fn first(&self) -> Option<DbId> {
        if self.len == 0 { None } else { Some(DbId(self.start)) }
    }

    /// Returns the offset of `id` in the range, if it belongs to the range.
    #[must_use]
    pub const fn index_of(&self, id: DbId) -> Option<usize> {
        if id.0 >= self.start && id.0 - self.start < self.len {
            Some((id.0 - self.start) as usize)
        } else {
            None
        }
    }

    /// Returns the identifier at offset `i`, if `i` is in bounds.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub const fn get(&self, i: usize) -> Option<DbId> {
        if i < self.len as usize { Some(DbId(self.start + i as u32)) } else { None }
    }

    /// Returns the exclusive upper bound of the range.
    pub(crate) const fn end(&self) -> u32 {
        self.start + self.len
    }
}

impl DbIds for DbIdRange {
    fn len(&self) -> usize {
        self.len as usize
    }

    fn contains(&self, id: DbId) -> bool {
        self.index_of(id).is_some()
    }

    fn iter(&self) -> impl Iterator<Item = DbId> + '_ {
        (self.start..self.end()).map(DbId)
    }
}
