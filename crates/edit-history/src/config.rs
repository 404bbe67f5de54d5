/// Configuration for the history system: defaults, load, save, sanitize.
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Time window in milliseconds within which consecutive changes are merged
/// into a single undo step.
const DEFAULT_PREVENT_MERGE_DELAY_MS: u64 = 1000;

/// Upper bound for the merge window.
const MAX_PREVENT_MERGE_DELAY_MS: u64 = 60_000;

/// Maximum number of changes returned when listing recent edits.
const DEFAULT_RECENT_HISTORY_LIMIT: usize = 50;

/// Configuration for the history system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Merge window in milliseconds. Zero disables time-based merging.
    pub prevent_merge_delay_ms: u64,
    /// Whether consecutive changes may be merged at all.
    pub merge_enabled: bool,
    /// Compact history whenever the document is marked as saved.
    pub forget_history_on_save: bool,
    /// Max changes returned by `UndoManager::recent_changes`.
    pub recent_history_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            prevent_merge_delay_ms: DEFAULT_PREVENT_MERGE_DELAY_MS,
            merge_enabled: true,
            forget_history_on_save: false,
            recent_history_limit: DEFAULT_RECENT_HISTORY_LIMIT,
        }
    }
}

impl HistoryConfig {
    /// Loads config from `path`.
    /// Returns defaults on any error (missing file, parse error, etc.).
    pub fn load_or_default(path: &Path) -> Self {
        let mut config = match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<HistoryConfig>(&contents) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to parse history config at {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                tracing::warn!("Failed to read history config at {}: {e}", path.display());
                Self::default()
            }
        };
        config.sanitize();
        config
    }

    /// Saves config to `path` as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the file write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize history config")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write history config to {}", path.display()))
    }

    /// Clamps values to valid ranges.
    pub fn sanitize(&mut self) {
        self.prevent_merge_delay_ms = self.prevent_merge_delay_ms.min(MAX_PREVENT_MERGE_DELAY_MS);
        self.recent_history_limit = self.recent_history_limit.max(1);
    }

    /// Merge window as a `Duration`.
    pub fn prevent_merge_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.prevent_merge_delay_ms)
    }
}
