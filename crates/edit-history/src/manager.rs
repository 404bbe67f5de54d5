/// Undo/redo orchestration on top of a `ChangeQueue`.
///
/// The manager decides when consecutive changes merge, turns undo into the
/// inverse change, and hands every change to a caller-supplied `apply`
/// closure. It never touches the document itself.
use std::time::Instant;

use anyhow::{Context, Result};

use crate::change::Change;
use crate::config::HistoryConfig;
use crate::error::QueueError;
use crate::position::QueuePosition;
use crate::queue::ChangeQueue;

/// Manages undo/redo history for a single document.
pub struct UndoManager<C> {
    queue: ChangeQueue<C>,
    /// Configuration parameters.
    config: HistoryConfig,
    /// Timestamp of the last recorded change, used for merging.
    last_record: Option<Instant>,
    /// Cleared by undo, redo, marks and `prevent_merge`.
    can_merge: bool,
    /// Position the document was last marked at (e.g. saved).
    mark: QueuePosition,
}

impl<C> std::fmt::Debug for UndoManager<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoManager")
            .field("queue", &self.queue)
            .field("can_merge", &self.can_merge)
            .field("mark", &self.mark)
            .finish()
    }
}

impl<C: Change> Default for UndoManager<C> {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl<C: Change> UndoManager<C> {
    /// Creates a manager with an empty history, marked at its start.
    pub fn new(config: HistoryConfig) -> Self {
        let queue = ChangeQueue::new();
        let mark = queue.current_position();
        Self {
            queue,
            config,
            last_record: None,
            can_merge: false,
            mark,
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Read-only access to the underlying history.
    pub fn queue(&self) -> &ChangeQueue<C> {
        &self.queue
    }

    /// Records a change that was just applied to the document.
    pub fn record(&mut self, change: C) {
        self.record_at(change, Instant::now());
    }

    /// Records a change observed at `now`.
    ///
    /// Identity changes are ignored. Inside the merge window the change is
    /// merged into the previous one when the two combine; a merge that
    /// cancels out removes the previous change from history altogether.
    pub fn record_at(&mut self, change: C, now: Instant) {
        if change.is_identity() {
            tracing::trace!("Ignoring identity change");
            return;
        }

        let merged = if self.can_merge_at(now) {
            self.queue
                .peek_prev()
                .ok()
                .and_then(|prev| prev.merge_with(&change))
        } else {
            None
        };

        self.last_record = Some(now);
        self.can_merge = true;

        let Some(merged) = merged else {
            self.queue.push([change]);
            return;
        };
        let cancelled = merged.is_identity();
        if let Err(e) = self.replace_prev(merged) {
            tracing::warn!("Failed to merge change into history: {e}");
            self.queue.push([change]);
            return;
        }
        if cancelled {
            // The change before the cancelled one may be a saved state.
            tracing::trace!("Merged change cancelled out");
            self.can_merge = false;
        }
    }

    /// Replaces the most recent change, dropping it when `merged` has no effect.
    fn replace_prev(&mut self, merged: C) -> Result<(), QueueError> {
        // The previous change's revision goes with it.
        self.queue.prev()?;
        if merged.is_identity() {
            self.queue.push(std::iter::empty());
        } else {
            self.queue.push([merged]);
        }
        Ok(())
    }

    fn can_merge_at(&self, now: Instant) -> bool {
        self.config.merge_enabled
            && self.can_merge
            && self.queue.has_prev()
            && self
                .last_record
                .is_some_and(|last| now.duration_since(last) < self.config.prevent_merge_delay())
    }

    /// Forces the next recorded change to start a new undo step.
    pub fn prevent_merge(&mut self) {
        self.can_merge = false;
    }

    pub fn is_undo_available(&self) -> bool {
        self.queue.has_prev()
    }

    pub fn is_redo_available(&self) -> bool {
        self.queue.has_next()
    }

    /// Undoes the most recent change by applying its inverse.
    ///
    /// Returns `Ok(false)` if there is nothing to undo. History only moves
    /// once `apply` succeeds.
    ///
    /// # Errors
    ///
    /// Returns the error from `apply`; history is left unchanged.
    pub fn undo<F>(&mut self, mut apply: F) -> Result<bool>
    where
        F: FnMut(&C) -> Result<()>,
    {
        if !self.queue.has_prev() {
            return Ok(false);
        }
        self.can_merge = false;
        let inverse = self.queue.peek_prev()?.invert();
        apply(&inverse).context("Failed to apply undo")?;
        self.queue.prev()?;
        Ok(true)
    }

    /// Redoes the most recently undone change.
    ///
    /// Returns `Ok(false)` if there is nothing to redo.
    ///
    /// # Errors
    ///
    /// Returns the error from `apply`; history is left unchanged.
    pub fn redo<F>(&mut self, mut apply: F) -> Result<bool>
    where
        F: FnMut(&C) -> Result<()>,
    {
        if !self.queue.has_next() {
            return Ok(false);
        }
        self.can_merge = false;
        apply(self.queue.peek_next()?).context("Failed to apply redo")?;
        self.queue.next()?;
        Ok(true)
    }

    /// Remembers the current position, e.g. when the document is saved.
    pub fn mark(&mut self) {
        self.mark = self.queue.current_position();
        self.can_merge = false;
    }

    /// Whether history is back at the last marked position.
    pub fn is_at_marked_position(&self) -> bool {
        self.mark == self.queue.current_position()
    }

    /// Marks the position and the recency baseline after a successful save.
    ///
    /// With `forget_history_on_save` set, everything before this point is
    /// dropped and can no longer be undone.
    pub fn mark_saved(&mut self) {
        self.mark();
        self.queue.mark_position_as_base();
        if self.config.forget_history_on_save {
            self.queue.forget_history();
        }
    }

    /// Number of changes applied since the last save.
    pub fn edits_since_save(&self) -> usize {
        self.queue.recent_history_count()
    }

    /// Drops all undo-able history. See [`ChangeQueue::forget_history`].
    pub fn forget_history(&mut self) {
        self.queue.forget_history();
    }

    pub fn current_position(&self) -> QueuePosition {
        self.queue.current_position()
    }

    pub fn is_position_valid(&self, position: &QueuePosition) -> bool {
        position.is_valid(&self.queue)
    }

    /// The most recently applied changes, newest first, up to
    /// `recent_history_limit` of them.
    pub fn recent_changes(&self) -> Vec<&C> {
        (0..self.config.recent_history_limit)
            .map_while(|i| self.queue.history_item(i))
            .collect()
    }
}
