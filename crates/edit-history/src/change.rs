/// Capabilities an `UndoManager` needs from the changes it records.
///
/// The `ChangeQueue` never calls these; only the manager does, when it
/// merges consecutive edits or turns an undo into the inverse change.
pub trait Change: Sized {
    /// Returns the change that reverts `self`.
    fn invert(&self) -> Self;

    /// Combines `self` with the change that immediately followed it.
    ///
    /// Returns `None` when the two cannot be expressed as one change.
    fn merge_with(&self, later: &Self) -> Option<Self>;

    /// Whether applying this change leaves the document untouched.
    fn is_identity(&self) -> bool;
}
