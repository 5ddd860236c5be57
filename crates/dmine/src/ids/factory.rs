//! Allocation of identifiers.

use std::sync::{Mutex, PoisonError};

use crate::{Error, Result};

use super::{DbId, DbIdPair, DbIdRange, DoubleDbIdPair};

/// Hands out identifiers, either one at a time or as static ranges.
///
/// The factory is thread-safe. Identifiers are issued from a single increasing counter. Single identifiers that are given back are reused before the counter
/// advances. A range that is given back is reclaimed only if it is the most recently issued one, since reclaiming from the middle of the id space would make
/// later ranges non-contiguous.
#[derive(Debug, Default)]
pub struct DbIdFactory {
    /// Mutable allocation state.
    state: Mutex<FactoryState>,
}

/// The mutable state behind a [`DbIdFactory`].
#[derive(Debug, Default)]
struct FactoryState {
    /// The next identifier that has never been issued.
    next: u32,
    /// Single identifiers given back for reuse.
    free: Vec<DbId>,
}

impl DbIdFactory {
    /// Creates a factory whose first identifier is `0`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a factory whose first identifier is `start`.
    #[must_use]
    pub fn starting_at(start: u32) -> Self {
        Self {
            state: Mutex::new(FactoryState {
                next: start,
                ..FactoryState::default()
            }),
        }
    }

    /// Locks the allocation state. A poisoned lock is recovered since the state is always left consistent.
    fn state(&self) -> std::sync::MutexGuard<'_, FactoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issues a single identifier.
    ///
    /// # Errors
    ///
    /// If the identifier space is exhausted.
    pub fn generate_single(&self) -> Result<DbId> {
        let mut state = self.state();
        if let Some(id) = state.free.pop() {
            return Ok(id);
        }
        let id = state.next;
        state.next = id
            .checked_add(1)
            .ok_or_else(|| Error::InvalidConfiguration("identifier space exhausted".to_string()))?;
        Ok(DbId(id))
    }

    /// Gives a single identifier back for reuse.
    pub fn deallocate_single(&self, id: DbId) {
        self.state().free.push(id);
    }

    /// Issues `size` contiguous, never-before-issued identifiers.
    ///
    /// # Errors
    ///
    /// If the identifier space cannot hold `size` more identifiers.
    pub fn generate_static_range(&self, size: usize) -> Result<DbIdRange> {
        let mut state = self.state();
        let len = u32::try_from(size)
            .ok()
            .filter(|&len| state.next.checked_add(len).is_some())
            .ok_or_else(|| Error::InvalidConfiguration(format!("cannot allocate {size} identifiers starting at {}", state.next)))?;
        let range = DbIdRange { start: state.next, len };
        state.next += len;
        ftlog::debug!("Allocated identifiers {}..{}", range.start, range.end());
        Ok(range)
    }

    /// Gives a static range back.
    ///
    /// Returns whether the range was reclaimed, i.e. whether its identifiers will be issued again.
    pub fn deallocate_range(&self, range: DbIdRange) -> bool {
        let mut state = self.state();
        if range.end() == state.next {
            state.next = range.start;
            true
        } else {
            ftlog::debug!(
                "Range {}..{} is not the most recent allocation and was not reclaimed",
                range.start,
                range.end()
            );
            false
        }
    }

    /// Returns the next identifier the counter would issue.
    #[must_use]
    pub fn high_water_mark(&self) -> u32 {
        self.state().next
    }

    /// Interprets an integer as an identifier.
    ///
    /// The caller is responsible for not colliding with identifiers issued by this factory.
    pub const fn import_integer(id: u32) -> DbId {
        DbId(id)
    }

    /// Pairs two identifiers.
    pub const fn new_pair(first: DbId, second: DbId) -> DbIdPair {
        DbIdPair(first, second)
    }

    /// Pairs an identifier with a primitive distance.
    pub const fn new_double_pair(distance: f64, id: DbId) -> DoubleDbIdPair {
        DoubleDbIdPair { distance, id }
    }
}
