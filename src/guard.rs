//! Cycle detection for recursive encoders.
//!
//! A [`CycleGuard`] tracks the identities of the tables on the active path of
//! one top-level `serialize` call. [`CycleGuard::enter`] hands out a [`Visit`]
//! scope; dropping the scope removes the table again, so the set is restored
//! on every exit path, including early returns through `?`.
//!
//! Only ancestors are tracked. The same table may appear any number of times
//! as a sibling or cousin without tripping the guard.
//!
//! ```rust
//! use table_codec::guard::CycleGuard;
//! use table_codec::{table, Error};
//!
//! let t = table![1];
//! let mut guard = CycleGuard::new(None);
//! {
//!     let mut scope = guard.enter(&t).unwrap();
//!     assert_eq!(scope.enter(&t).unwrap_err(), Error::CyclicStructure);
//! }
//! assert_eq!(guard.depth(), 0);
//! ```

use crate::table::TableId;
use crate::{Error, Result, Table};
use std::collections::HashSet;
use std::ops::{Deref, DerefMut};

/// The set of tables currently being visited by one encode call.
#[derive(Debug, Default)]
pub struct CycleGuard {
    visiting: HashSet<TableId>,
    max_depth: Option<usize>,
}

impl CycleGuard {
    /// Creates an empty guard. `max_depth` caps how many tables may be open
    /// at once; `None` leaves nesting unbounded.
    #[must_use]
    pub fn new(max_depth: Option<usize>) -> Self {
        CycleGuard {
            visiting: HashSet::new(),
            max_depth,
        }
    }

    /// Marks `table` as being visited until the returned scope is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CyclicStructure`] if `table` is already on the active
    /// path, or [`Error::DepthLimitExceeded`] if entering it would exceed the
    /// configured depth.
    pub fn enter(&mut self, table: &Table) -> Result<Visit<'_>> {
        let id = table.id();
        if self.visiting.contains(&id) {
            tracing::trace!(?id, depth = self.visiting.len(), "cyclic table rejected");
            return Err(Error::CyclicStructure);
        }
        if let Some(limit) = self.max_depth {
            if self.visiting.len() >= limit {
                return Err(Error::DepthLimitExceeded { limit });
            }
        }
        self.visiting.insert(id);
        Ok(Visit { guard: self, id })
    }

    /// Number of tables on the active path.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.visiting.len()
    }
}

/// A scope during which one table is marked as visited.
///
/// Dereferences to the guard so nested tables can be entered through it.
#[derive(Debug)]
pub struct Visit<'g> {
    guard: &'g mut CycleGuard,
    id: TableId,
}

impl Deref for Visit<'_> {
    type Target = CycleGuard;

    fn deref(&self) -> &CycleGuard {
        self.guard
    }
}

impl DerefMut for Visit<'_> {
    fn deref_mut(&mut self) -> &mut CycleGuard {
        self.guard
    }
}

impl Drop for Visit<'_> {
    fn drop(&mut self) {
        self.guard.visiting.remove(&self.id);
    }
}
