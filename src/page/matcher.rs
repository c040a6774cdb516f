//! Action control label matching.

use crate::config::DEFAULT_ACTION_LABELS;

use super::ControlHandle;

/// Decides which control label is the action control.
///
/// Labels are compared after trimming and lower-casing. A candidate matches
/// when it equals a recognized label or contains one; the first candidate in
/// document order wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlMatcher {
    labels: Vec<String>,
}

impl Default for ControlMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_ACTION_LABELS)
    }
}

impl ControlMatcher {
    /// Build a matcher from recognized labels. Blank labels are dropped.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let labels = labels
            .into_iter()
            .map(|l| normalize(l.as_ref()))
            .filter(|l| !l.is_empty())
            .collect();
        Self { labels }
    }

    /// Recognized labels, normalized.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Whether a single control label is recognized.
    #[must_use]
    pub fn matches(&self, label: &str) -> bool {
        let text = normalize(label);
        if text.is_empty() {
            return false;
        }
        self.labels
            .iter()
            .any(|key| text == *key || text.contains(key.as_str()))
    }

    /// First recognized control among `candidates`.
    #[must_use]
    pub fn find<S: AsRef<str>>(&self, candidates: &[S]) -> Option<ControlHandle> {
        candidates
            .iter()
            .position(|c| self.matches(c.as_ref()))
            .map(|position| ControlHandle {
                position,
                label: candidates[position].as_ref().trim().to_string(),
            })
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}
