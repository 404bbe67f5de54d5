//! Plain text undo/redo built on `edit-history`.
//!
//! `TextChange` is the replacement record stored in the history,
//! `TextBuffer` is the rope it is applied to, and `TextDocument` wires the
//! two to an `UndoManager`.

pub mod buffer;
pub mod change;
pub mod document;

pub use buffer::TextBuffer;
pub use change::TextChange;
pub use document::TextDocument;
