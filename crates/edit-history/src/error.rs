use thiserror::Error;

/// Contract violations when moving through a `ChangeQueue`.
///
/// Callers are expected to gate traversal on `has_next`/`has_prev`;
/// hitting one of these means the caller's view of the queue is out of date.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    #[error("no change to redo (cursor {cursor} is at the end of {len} entries)")]
    NothingToRedo { cursor: usize, len: usize },

    #[error("no change to undo (cursor is at the start of retained history)")]
    NothingToUndo,
}
