/// Captured positions in a queue's history.
///
/// A `QueuePosition` holds only plain numbers plus the identity of the queue
/// that produced it, so it can outlive compaction of that queue and be
/// checked against it later.
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::entry::Revision;
use crate::queue::ChangeQueue;

/// Counter handing out a distinct identity to every queue in the process.
static NEXT_QUEUE_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of a single `ChangeQueue` instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueId(u64);

impl QueueId {
    pub(crate) fn next() -> Self {
        Self(NEXT_QUEUE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A comparable snapshot of "where we were" in a queue's history.
///
/// Two positions are equal when they come from the same queue and carry
/// the same revision. The all-time index is only used for validation.
#[derive(Debug, Clone, Copy)]
pub struct QueuePosition {
    owner: QueueId,
    all_time_index: usize,
    revision: Revision,
}

impl QueuePosition {
    pub(crate) fn new(owner: QueueId, all_time_index: usize, revision: Revision) -> Self {
        Self {
            owner,
            all_time_index,
            revision,
        }
    }

    /// Identity of the queue that produced this position.
    pub fn owner(&self) -> QueueId {
        self.owner
    }

    /// Index counted from the creation of the queue, stable across compaction.
    pub fn all_time_index(&self) -> usize {
        self.all_time_index
    }

    /// Revision reached at this position when it was captured.
    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// Checks whether this position still denotes the same history in `queue`.
    ///
    /// A position is stale when it was compacted away, when it lies beyond
    /// the retained entries, or when the entries leading up to it were
    /// replaced by a later push. Positions from another queue are never valid.
    pub fn is_valid<C>(&self, queue: &ChangeQueue<C>) -> bool {
        if self.owner != queue.id() {
            return false;
        }
        let Some(live) = self.all_time_index.checked_sub(queue.forgotten_count()) else {
            return false;
        };
        live <= queue.len() && queue.revision_at(live) == self.revision
    }
}

impl PartialEq for QueuePosition {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && self.revision == other.revision
    }
}

impl Eq for QueuePosition {}

impl Hash for QueuePosition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.owner.hash(state);
        self.revision.hash(state);
    }
}
