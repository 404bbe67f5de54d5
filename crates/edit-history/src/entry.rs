/// Revision numbers and the entries stored in a `ChangeQueue`.
use std::fmt;

/// A point in a queue's history.
///
/// Every pushed change is stamped with a fresh revision. Revisions are
/// strictly increasing within one queue and are never reused, not even
/// after the entries carrying them have been compacted away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Revision(u64);

impl Revision {
    /// The revision of an empty queue, before anything was pushed.
    pub const INITIAL: Self = Self(0);

    /// Creates a revision from a raw value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw revision value.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns the revision that follows this one.
    pub(crate) const fn successor(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// An immutable change paired with the revision it was pushed under.
#[derive(Debug, Clone)]
pub struct RevisionedEntry<C> {
    change: C,
    revision: Revision,
}

impl<C> RevisionedEntry<C> {
    pub fn new(change: C, revision: Revision) -> Self {
        Self { change, revision }
    }

    pub fn change(&self) -> &C {
        &self.change
    }

    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// Consumes the entry and returns its change.
    pub fn into_change(self) -> C {
        self.change
    }
}
