//! The persisted progress record.
//!
//! A [`ProgressRecord`] is the only state that survives between ticks. It is
//! a plain `Copy` value: every transition returns a new record instead of
//! mutating in place, so the caller decides exactly when a new value is
//! written to the store.

use serde::{Deserialize, Serialize};

/// Cursor into the list of items plus the running flag.
///
/// # Example
///
/// ```
/// use tilewalk::record::ProgressRecord;
///
/// let record = ProgressRecord::started();
/// assert!(record.running);
/// assert_eq!(record.advanced().index, 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// Whether ticks should act.
    pub running: bool,
    /// Zero-based position in the list of items.
    pub index: usize,
}

impl ProgressRecord {
    /// Record written by a fresh start: running at the first item.
    #[must_use]
    pub fn started() -> Self {
        Self {
            running: true,
            index: 0,
        }
    }

    /// Same cursor, running again.
    #[must_use]
    pub fn resumed(self) -> Self {
        Self {
            running: true,
            ..self
        }
    }

    /// Same cursor, not running.
    #[must_use]
    pub fn stopped(self) -> Self {
        Self {
            running: false,
            ..self
        }
    }

    /// Cursor moved past the current item.
    #[must_use]
    pub fn advanced(self) -> Self {
        Self {
            index: self.index.saturating_add(1),
            ..self
        }
    }

    /// Stopped by the engine itself; identical to [`stopped`](Self::stopped)
    /// but named for the log trail.
    #[must_use]
    pub fn halted(self) -> Self {
        self.stopped()
    }

    /// One-based position for display.
    #[must_use]
    pub fn display_position(&self) -> usize {
        self.index + 1
    }
}

impl std::fmt::Display for ProgressRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = if self.running { "running" } else { "stopped" };
        write!(f, "{} at index {}", state, self.index)
    }
}
