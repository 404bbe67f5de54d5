/// Linear change history with a cursor, compaction and recency bookkeeping.
///
/// Entries before the cursor have been applied to the document and can be
/// undone; entries at or after the cursor were undone and can be redone.
/// Pushing new changes discards the redo tail, so history never branches.
use crate::entry::{Revision, RevisionedEntry};
use crate::error::QueueError;
use crate::position::{QueueId, QueuePosition};

/// Ordered history of changes for a single document.
///
/// The queue stores, orders and indexes opaque change values. It never
/// applies or inverts them; that is the caller's job.
pub struct ChangeQueue<C> {
    /// Retained entries in chronological order.
    entries: Vec<RevisionedEntry<C>>,
    /// Live index dividing applied entries (`< cursor`) from undone ones.
    cursor: usize,
    /// Highest revision ever issued by this queue.
    revision: Revision,
    /// Revision associated with live index 0.
    zero_revision: Revision,
    /// Number of entries evicted from the front by compaction.
    forgotten_count: usize,
    /// Recency marker, never above the cursor.
    baseline: usize,
    id: QueueId,
}

impl<C> std::fmt::Debug for ChangeQueue<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeQueue")
            .field("id", &self.id)
            .field("len", &self.entries.len())
            .field("cursor", &self.cursor)
            .field("revision", &self.revision)
            .field("zero_revision", &self.zero_revision)
            .field("forgotten_count", &self.forgotten_count)
            .field("baseline", &self.baseline)
            .finish()
    }
}

impl<C> Default for ChangeQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> ChangeQueue<C> {
    /// Creates an empty queue with a fresh identity.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            revision: Revision::INITIAL,
            zero_revision: Revision::INITIAL,
            forgotten_count: 0,
            baseline: 0,
            id: QueueId::next(),
        }
    }

    /// Identity used to tell positions of different queues apart.
    pub fn id(&self) -> QueueId {
        self.id
    }

    /// Number of retained entries, undo-able and redo-able together.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries permanently dropped by [`forget_history`](Self::forget_history).
    pub fn forgotten_count(&self) -> usize {
        self.forgotten_count
    }

    /// Highest revision issued so far.
    pub fn latest_revision(&self) -> Revision {
        self.revision
    }

    /// Records changes as one history event.
    ///
    /// Any undone entries after the cursor are discarded first; they can
    /// never be redone afterwards. Each change receives its own revision and
    /// the cursor ends up after the last of them.
    pub fn push<I>(&mut self, changes: I)
    where
        I: IntoIterator<Item = C>,
    {
        if self.cursor < self.entries.len() {
            tracing::trace!(
                "Discarding {} redo entries",
                self.entries.len() - self.cursor
            );
            self.entries.truncate(self.cursor);
        }
        for change in changes {
            self.revision = self.revision.successor();
            self.entries.push(RevisionedEntry::new(change, self.revision));
        }
        self.cursor = self.entries.len();
    }

    pub fn has_next(&self) -> bool {
        self.cursor < self.entries.len()
    }

    pub fn has_prev(&self) -> bool {
        self.cursor > 0
    }

    /// Returns the next change to redo without moving the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::NothingToRedo`] if the cursor is at the end.
    pub fn peek_next(&self) -> Result<&C, QueueError> {
        self.entries
            .get(self.cursor)
            .map(RevisionedEntry::change)
            .ok_or(QueueError::NothingToRedo {
                cursor: self.cursor,
                len: self.entries.len(),
            })
    }

    /// Returns the next change to redo and moves the cursor past it.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::NothingToRedo`] if the cursor is at the end.
    /// The cursor is left untouched in that case.
    pub fn next(&mut self) -> Result<&C, QueueError> {
        if !self.has_next() {
            return Err(QueueError::NothingToRedo {
                cursor: self.cursor,
                len: self.entries.len(),
            });
        }
        let index = self.cursor;
        self.cursor += 1;
        Ok(self.entries[index].change())
    }

    /// Returns the most recently applied change without moving the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::NothingToUndo`] if the cursor is at the start.
    pub fn peek_prev(&self) -> Result<&C, QueueError> {
        self.cursor
            .checked_sub(1)
            .map(|index| self.entries[index].change())
            .ok_or(QueueError::NothingToUndo)
    }

    /// Steps the cursor back over the most recently applied change and returns it.
    ///
    /// If the cursor drops below the recency baseline, the baseline follows it.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::NothingToUndo`] if the cursor is at the start.
    pub fn prev(&mut self) -> Result<&C, QueueError> {
        let index = self.cursor.checked_sub(1).ok_or(QueueError::NothingToUndo)?;
        self.cursor = index;
        if self.cursor < self.baseline {
            self.baseline = self.cursor;
        }
        Ok(self.entries[index].change())
    }

    /// Permanently drops every applied entry before the cursor.
    ///
    /// This is a one-way operation: undo can never go back past the current
    /// position afterwards. Redo-able entries are kept, and positions captured
    /// exactly here stay valid. Does nothing when the cursor is at the start.
    pub fn forget_history(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.zero_revision = self.revision_at(self.cursor);
        self.entries.drain(..self.cursor);
        self.forgotten_count += self.cursor;
        tracing::debug!(
            "Forgot {} history entries ({} forgotten in total)",
            self.cursor,
            self.forgotten_count
        );
        self.cursor = 0;
        self.baseline = 0;
    }

    /// Looks back through applied changes, most recent first.
    ///
    /// `index` 0 is the change that would be undone next. Returns `None`
    /// once `index` runs past the start of retained history.
    pub fn history_item(&self, index: usize) -> Option<&C> {
        let live = self.cursor.checked_sub(index)?.checked_sub(1)?;
        self.entries.get(live).map(RevisionedEntry::change)
    }

    /// Number of changes that can currently be undone.
    pub fn history_len(&self) -> usize {
        self.cursor
    }

    /// Iterates applied changes from the most recent backwards.
    pub fn history(&self) -> impl Iterator<Item = &C> + '_ {
        self.entries[..self.cursor]
            .iter()
            .rev()
            .map(RevisionedEntry::change)
    }

    /// Sets the recency baseline to the current cursor.
    pub fn mark_position_as_base(&mut self) {
        self.baseline = self.cursor;
    }

    /// Number of changes applied since the last [`mark_position_as_base`](Self::mark_position_as_base).
    ///
    /// Undoing past the mark pulls the mark down with the cursor. Redo does
    /// not raise it again.
    pub fn recent_history_count(&self) -> usize {
        self.cursor - self.baseline
    }

    /// Captures the current position for later validation.
    pub fn current_position(&self) -> QueuePosition {
        QueuePosition::new(
            self.id,
            self.forgotten_count + self.cursor,
            self.revision_at(self.cursor),
        )
    }

    /// Shorthand for [`QueuePosition::is_valid`] against this queue.
    pub fn is_position_valid(&self, position: &QueuePosition) -> bool {
        position.is_valid(self)
    }

    /// Revision reached after the entry at `live - 1` was applied.
    pub(crate) fn revision_at(&self, live: usize) -> Revision {
        match live {
            0 => self.zero_revision,
            _ => self.entries[live - 1].revision(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue_with(changes: &[u32]) -> ChangeQueue<u32> {
        let mut q = ChangeQueue::new();
        for &c in changes {
            q.push([c]);
        }
        q
    }

    // ── Empty queue ────────────────────────────────────────────────────

    #[test]
    fn test_empty_queue() {
        let q: ChangeQueue<u32> = ChangeQueue::new();
        assert_eq!(q.history_len(), 0);
        assert!(!q.has_next());
        assert!(!q.has_prev());
        assert!(q.is_empty());
        assert!(q.current_position().is_valid(&q));
        assert_eq!(q.recent_history_count(), 0);
    }

    #[test]
    fn test_traversal_errors_on_empty_queue() {
        let mut q: ChangeQueue<u32> = ChangeQueue::new();
        assert_eq!(q.peek_prev(), Err(QueueError::NothingToUndo));
        assert_eq!(q.prev(), Err(QueueError::NothingToUndo));
        assert_eq!(
            q.peek_next(),
            Err(QueueError::NothingToRedo { cursor: 0, len: 0 })
        );
        assert_eq!(
            q.next(),
            Err(QueueError::NothingToRedo { cursor: 0, len: 0 })
        );
        assert_eq!(q.history_len(), 0);
    }

    // ── Push ───────────────────────────────────────────────────────────

    #[test]
    fn test_push_advances_cursor() {
        let mut q = ChangeQueue::new();
        q.push([1, 2, 3]);
        assert_eq!(q.history_len(), 3);
        assert_eq!(q.len(), 3);
        assert!(!q.has_next());
        assert!(q.has_prev());
    }

    #[test]
    fn test_push_assigns_increasing_revisions() {
        let mut q = ChangeQueue::new();
        q.push([1, 2]);
        q.push([3]);
        let revisions: Vec<u64> = q.entries.iter().map(|e| e.revision().get()).collect();
        assert_eq!(revisions, vec![1, 2, 3]);
        assert_eq!(q.latest_revision(), Revision::new(3));
    }

    #[test]
    fn test_push_discards_redo_tail() {
        let mut q = queue_with(&[1, 2]);
        assert_eq!(q.prev(), Ok(&2));
        q.push([3]);
        assert!(!q.has_next());
        assert_eq!(q.len(), 2);
        assert_eq!(q.prev(), Ok(&3));
        assert_eq!(q.prev(), Ok(&1));
        assert!(!q.has_prev());
    }

    #[test]
    fn test_push_empty_still_discards_redo_tail() {
        let mut q = queue_with(&[1, 2]);
        q.prev().unwrap();
        q.push(std::iter::empty());
        assert!(!q.has_next());
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn test_revisions_never_reused_after_discard() {
        let mut q = queue_with(&[1, 2]);
        q.prev().unwrap();
        q.push([3]);
        assert_eq!(q.entries[1].revision(), Revision::new(3));
    }

    // ── Traversal ──────────────────────────────────────────────────────

    #[test]
    fn test_prev_next_round_trip() {
        let mut q = queue_with(&[7]);
        assert_eq!(q.peek_prev(), Ok(&7));
        assert_eq!(q.prev(), Ok(&7));
        assert_eq!(q.history_len(), 0);
        assert_eq!(q.peek_next(), Ok(&7));
        assert_eq!(q.next(), Ok(&7));
        assert_eq!(q.history_len(), 1);
        assert!(!q.has_next());
    }

    #[test]
    fn test_next_at_end_is_error_and_keeps_cursor() {
        let mut q = queue_with(&[1]);
        assert_eq!(
            q.next(),
            Err(QueueError::NothingToRedo { cursor: 1, len: 1 })
        );
        assert_eq!(q.history_len(), 1);
    }

    // ── History items ──────────────────────────────────────────────────

    #[test]
    fn test_history_item_most_recent_first() {
        let q = queue_with(&[1, 2, 3]);
        assert_eq!(q.history_item(0), Some(&3));
        assert_eq!(q.history_item(1), Some(&2));
        assert_eq!(q.history_item(2), Some(&1));
        assert_eq!(q.history_item(3), None);
        assert_eq!(q.history_item(usize::MAX), None);
    }

    #[test]
    fn test_history_item_ignores_redo_entries() {
        let mut q = queue_with(&[1, 2, 3]);
        q.prev().unwrap();
        assert_eq!(q.history_item(0), Some(&2));
        assert_eq!(q.history_len(), 2);
    }

    #[test]
    fn test_history_iterator() {
        let mut q = queue_with(&[1, 2, 3]);
        q.prev().unwrap();
        let items: Vec<u32> = q.history().copied().collect();
        assert_eq!(items, vec![2, 1]);
    }

    // ── Recency baseline ───────────────────────────────────────────────

    #[test]
    fn test_recent_history_count() {
        let mut q = queue_with(&[1, 2]);
        q.mark_position_as_base();
        q.push([3]);
        assert_eq!(q.recent_history_count(), 1);
        q.prev().unwrap();
        q.prev().unwrap();
        assert_eq!(q.recent_history_count(), 0);
    }

    #[test]
    fn test_redo_does_not_raise_baseline() {
        let mut q = queue_with(&[1, 2]);
        q.mark_position_as_base();
        q.prev().unwrap();
        q.next().unwrap();
        // The mark was pulled down to 1 by the undo and stays there.
        assert_eq!(q.recent_history_count(), 1);
    }

    // ── Compaction ─────────────────────────────────────────────────────

    #[test]
    fn test_forget_history_noop_at_start() {
        let mut q = queue_with(&[1]);
        q.prev().unwrap();
        q.forget_history();
        assert_eq!(q.forgotten_count(), 0);
        assert_eq!(q.len(), 1);
        assert!(q.has_next());
    }

    #[test]
    fn test_forget_history_keeps_redo_entries() {
        let mut q = queue_with(&[1, 2, 3]);
        q.prev().unwrap();
        q.forget_history();
        assert!(!q.has_prev());
        assert_eq!(q.forgotten_count(), 2);
        assert_eq!(q.len(), 1);
        assert_eq!(q.next(), Ok(&3));
    }

    #[test]
    fn test_forget_history_resets_baseline() {
        let mut q = queue_with(&[1, 2]);
        q.mark_position_as_base();
        q.push([3]);
        q.forget_history();
        assert_eq!(q.recent_history_count(), 0);
        q.push([4]);
        assert_eq!(q.recent_history_count(), 1);
    }

    #[test]
    fn test_forget_history_twice_is_idempotent() {
        let mut q = queue_with(&[1, 2]);
        q.forget_history();
        let pos = q.current_position();
        q.forget_history();
        assert_eq!(q.forgotten_count(), 2);
        assert!(pos.is_valid(&q));
    }

    #[test]
    fn test_revisions_continue_after_compaction() {
        let mut q = queue_with(&[1, 2]);
        q.forget_history();
        q.push([3]);
        assert_eq!(q.entries[0].revision(), Revision::new(3));
    }

    // ── Positions ──────────────────────────────────────────────────────

    #[test]
    fn test_position_valid_across_undo_redo() {
        let mut q = queue_with(&[1, 2]);
        let pos = q.current_position();
        q.prev().unwrap();
        assert_ne!(q.current_position(), pos);
        q.next().unwrap();
        assert!(pos.is_valid(&q));
        assert_eq!(q.current_position(), pos);
    }

    #[test]
    fn test_position_invalid_after_divergent_push() {
        let mut q = queue_with(&[1, 2]);
        let after_two = q.current_position();
        q.prev().unwrap();
        q.push([3]);
        assert!(!after_two.is_valid(&q));
    }

    #[test]
    fn test_position_in_redo_tail_stays_valid() {
        let mut q = queue_with(&[1, 2]);
        let after_two = q.current_position();
        q.prev().unwrap();
        q.prev().unwrap();
        assert!(q.is_position_valid(&after_two));
    }

    #[test]
    fn test_position_before_compaction_becomes_invalid() {
        let mut q = queue_with(&[1]);
        let after_a = q.current_position();
        q.push([2]);
        let after_b = q.current_position();
        q.forget_history();
        assert!(!q.has_prev());
        assert!(!after_a.is_valid(&q));
        assert!(after_b.is_valid(&q));
    }

    #[test]
    fn test_start_position_invalid_after_compaction() {
        let mut q: ChangeQueue<u32> = ChangeQueue::new();
        let start = q.current_position();
        q.push([1]);
        q.forget_history();
        assert!(!start.is_valid(&q));
    }

    #[test]
    fn test_same_numbers_different_queues_not_equal() {
        let a = queue_with(&[1]);
        let b = queue_with(&[1]);
        let pa = a.current_position();
        let pb = b.current_position();
        assert_eq!(pa.all_time_index(), pb.all_time_index());
        assert_eq!(pa.revision(), pb.revision());
        assert_ne!(pa, pb);
    }
}
