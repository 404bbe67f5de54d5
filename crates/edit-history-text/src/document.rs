//! A `TextDocument` ties together a `TextBuffer`, a caret and an undo
//! history of `TextChange`s.
//!
//! Every edit goes through [`TextDocument::replace`], which records the
//! change it performs. Undo and redo apply the recorded changes back to the
//! buffer and move the caret to where the change ended.

use std::time::Instant;

use anyhow::{Context, Result};
use edit_history::{HistoryConfig, QueuePosition, UndoManager};

use crate::buffer::TextBuffer;
use crate::change::TextChange;

/// A single editable text with its caret and history.
#[derive(Debug)]
pub struct TextDocument {
    buffer: TextBuffer,
    /// Caret position as a char index.
    caret: usize,
    history: UndoManager<TextChange>,
}

impl Default for TextDocument {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl TextDocument {
    /// Creates an empty document.
    pub fn new(config: HistoryConfig) -> Self {
        Self::with_text("", config)
    }

    /// Creates a document holding `text`, marked as saved.
    pub fn with_text(text: &str, config: HistoryConfig) -> Self {
        Self {
            buffer: TextBuffer::from(text),
            caret: 0,
            history: UndoManager::new(config),
        }
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    /// Moves the caret, clamped to the document length.
    pub fn set_caret(&mut self, char_idx: usize) {
        self.caret = char_idx.min(self.buffer.len_chars());
    }

    pub fn history(&self) -> &UndoManager<TextChange> {
        &self.history
    }

    /// Replaces the chars in `[start..end)` with `text` and records the change.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is out of bounds.
    pub fn replace(&mut self, start: usize, end: usize, text: &str) -> Result<()> {
        self.replace_at(start, end, text, Instant::now())
    }

    /// Like [`replace`](Self::replace), with an explicit time for merging.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is out of bounds.
    pub fn replace_at(&mut self, start: usize, end: usize, text: &str, now: Instant) -> Result<()> {
        let removed = self
            .buffer
            .slice(start, end)
            .context("Failed to replace text")?
            .to_string();
        let change = TextChange::new(start, removed, text);
        self.buffer
            .apply(&change)
            .context("Failed to replace text")?;
        self.caret = change.insertion_end();
        self.history.record_at(change, now);
        Ok(())
    }

    /// Inserts `text` at `char_idx`.
    ///
    /// # Errors
    ///
    /// Returns an error if the position is out of bounds.
    pub fn insert(&mut self, char_idx: usize, text: &str) -> Result<()> {
        self.replace(char_idx, char_idx, text)
    }

    /// Deletes the chars in `[start..end)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is out of bounds.
    pub fn delete(&mut self, start: usize, end: usize) -> Result<()> {
        self.replace(start, end, "")
    }

    /// Ends the current undo step; the next edit starts a new one.
    pub fn prevent_merge(&mut self) {
        self.history.prevent_merge();
    }

    /// Performs undo. Returns `false` if there was nothing to undo.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer no longer matches the history.
    pub fn undo(&mut self) -> Result<bool> {
        let buffer = &mut self.buffer;
        let mut caret = None;
        let undone = self.history.undo(|change| {
            buffer.apply(change)?;
            caret = Some(caret_after(change));
            Ok(())
        })?;
        if let Some(pos) = caret {
            self.set_caret(pos);
        }
        Ok(undone)
    }

    /// Performs redo. Returns `false` if there was nothing to redo.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer no longer matches the history.
    pub fn redo(&mut self) -> Result<bool> {
        let buffer = &mut self.buffer;
        let mut caret = None;
        let redone = self.history.redo(|change| {
            buffer.apply(change)?;
            caret = Some(caret_after(change));
            Ok(())
        })?;
        if let Some(pos) = caret {
            self.set_caret(pos);
        }
        Ok(redone)
    }

    /// Records that the document was saved.
    pub fn mark_saved(&mut self) {
        self.history.mark_saved();
    }

    /// Whether the history moved away from the last saved position.
    pub fn is_modified(&self) -> bool {
        !self.history.is_at_marked_position()
    }

    /// Number of edits since the last save.
    pub fn edits_since_save(&self) -> usize {
        self.history.edits_since_save()
    }

    pub fn current_position(&self) -> QueuePosition {
        self.history.current_position()
    }

    pub fn is_position_valid(&self, position: &QueuePosition) -> bool {
        self.history.is_position_valid(position)
    }

    /// The most recent edits, newest first.
    pub fn recent_changes(&self) -> Vec<&TextChange> {
        self.history.recent_changes()
    }
}

/// Where the caret lands after `change` was applied: past any text it
/// added, otherwise at its start.
fn caret_after(change: &TextChange) -> usize {
    let net = change.net_length();
    if net > 0 {
        change.position + net.unsigned_abs()
    } else {
        change.position
    }
}
