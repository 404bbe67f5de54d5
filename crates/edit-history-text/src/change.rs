/// Plain text replacements, the change type recorded for text documents.
use edit_history::Change;

/// Replacement of `removed` by `inserted` at a char offset.
///
/// Pure insertions have an empty `removed`, pure deletions an empty `inserted`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    /// Char index where the replacement starts.
    pub position: usize,
    /// Text that was removed.
    pub removed: String,
    /// Text that was inserted in its place.
    pub inserted: String,
}

impl TextChange {
    pub fn new(position: usize, removed: impl Into<String>, inserted: impl Into<String>) -> Self {
        Self {
            position,
            removed: removed.into(),
            inserted: inserted.into(),
        }
    }

    pub fn insertion(position: usize, text: impl Into<String>) -> Self {
        Self::new(position, String::new(), text)
    }

    pub fn deletion(position: usize, text: impl Into<String>) -> Self {
        Self::new(position, text, String::new())
    }

    pub fn removed_len(&self) -> usize {
        self.removed.chars().count()
    }

    pub fn inserted_len(&self) -> usize {
        self.inserted.chars().count()
    }

    /// Char index one past the removed range, in the document before the change.
    pub fn removal_end(&self) -> usize {
        self.position + self.removed_len()
    }

    /// Char index one past the inserted text, in the document after the change.
    pub fn insertion_end(&self) -> usize {
        self.position + self.inserted_len()
    }

    /// How much the document grows (positive) or shrinks (negative).
    pub fn net_length(&self) -> isize {
        self.inserted_len() as isize - self.removed_len() as isize
    }
}

/// Returns the first `n` chars of `s`.
fn char_prefix(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

impl Change for TextChange {
    fn invert(&self) -> Self {
        Self {
            position: self.position,
            removed: self.inserted.clone(),
            inserted: self.removed.clone(),
        }
    }

    fn merge_with(&self, later: &Self) -> Option<Self> {
        let end = self.insertion_end();

        // Typing on: `later` starts where our insertion ended.
        if later.position == end {
            return Some(Self {
                position: self.position,
                removed: format!("{}{}", self.removed, later.removed),
                inserted: format!("{}{}", self.inserted, later.inserted),
            });
        }

        // Backspacing: `later` removes text ending where our insertion ended.
        if later.removal_end() != end {
            return None;
        }
        if self.position <= later.position {
            let kept = char_prefix(&self.inserted, later.position - self.position);
            Some(Self {
                position: self.position,
                removed: self.removed.clone(),
                inserted: format!("{kept}{}", later.inserted),
            })
        } else {
            let before = char_prefix(&later.removed, self.position - later.position);
            Some(Self {
                position: later.position,
                removed: format!("{before}{}", self.removed),
                inserted: later.inserted.clone(),
            })
        }
    }

    fn is_identity(&self) -> bool {
        self.removed == self.inserted
    }
}
