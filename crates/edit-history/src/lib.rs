//! Change history for an editable document.
//!
//! A `ChangeQueue` keeps the ordered history of opaque changes together with
//! an undo/redo cursor, compaction and recency bookkeeping. `QueuePosition`s
//! capture a point in that history and can be validated later, even after
//! compaction. The `UndoManager` drives a queue for changes implementing
//! [`Change`], merging rapid edits and applying inverses through a closure.

pub mod change;
pub mod config;
pub mod entry;
pub mod error;
pub mod manager;
pub mod position;
pub mod queue;

pub use change::Change;
pub use config::HistoryConfig;
pub use entry::{Revision, RevisionedEntry};
pub use error::QueueError;
pub use manager::UndoManager;
pub use position::{QueueId, QueuePosition};
pub use queue::ChangeQueue;
