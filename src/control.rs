//! Control surface: start, resume, stop, reset, status.
//!
//! Each operation is a read-modify-write on the progress store and never
//! touches the page. A refused operation logs a warning, leaves the store as
//! it was and reports why through [`ControlOutcome`]; only storage faults are
//! returned as errors.

use serde::Serialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::page::PageClassifier;
use crate::record::ProgressRecord;
use crate::store::ProgressStore;

/// Result of a control operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlOutcome {
    /// A fresh record was written.
    Started,
    /// `start` refused: the location is not the list page.
    NotOnList { location: String },
    /// The walk continues at `index`.
    Resumed { index: usize },
    /// `resume` refused: nothing to resume.
    NoRecord,
    /// The record now says not running.
    Stopped { index: usize },
    /// `stop` with no record; nothing to do.
    AlreadyIdle,
    /// The record was deleted.
    Reset,
}

impl ControlOutcome {
    /// Whether the operation changed or confirmed state as asked.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        !matches!(
            self,
            ControlOutcome::NotOnList { .. } | ControlOutcome::NoRecord
        )
    }
}

/// Read-only projection of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub key: String,
    pub record: Option<ProgressRecord>,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.record {
            Some(record) => write!(f, "{}: {}", self.key, record),
            None => write!(f, "{}: no progress record", self.key),
        }
    }
}

/// Control operations over one progress store.
#[derive(Debug, Clone)]
pub struct Controls {
    store: ProgressStore,
    classifier: PageClassifier,
}

impl Controls {
    #[must_use]
    pub fn new(store: ProgressStore, classifier: PageClassifier) -> Self {
        Self { store, classifier }
    }

    #[must_use]
    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    #[must_use]
    pub fn classifier(&self) -> &PageClassifier {
        &self.classifier
    }

    /// Begin a new walk at the first item. `location` must be the list page.
    pub fn start(&self, location: &str) -> Result<ControlOutcome> {
        if !self.classifier.is_list(location) {
            warn!("Go to the list page first (current location: {})", location);
            return Ok(ControlOutcome::NotOnList {
                location: location.to_string(),
            });
        }

        self.store.save(&ProgressRecord::started())?;
        info!("Started walk at index 0");
        Ok(ControlOutcome::Started)
    }

    /// Continue an existing walk where it left off.
    pub fn resume(&self) -> Result<ControlOutcome> {
        let Some(record) = self.store.load()? else {
            warn!("No progress record. Run start first.");
            return Ok(ControlOutcome::NoRecord);
        };

        let record = record.resumed();
        self.store.save(&record)?;
        info!("Resuming at index {}", record.index);
        Ok(ControlOutcome::Resumed {
            index: record.index,
        })
    }

    /// Stop at the next tick boundary. No record, no-op.
    pub fn stop(&self) -> Result<ControlOutcome> {
        let Some(record) = self.store.load()? else {
            return Ok(ControlOutcome::AlreadyIdle);
        };

        let record = record.stopped();
        self.store.save(&record)?;
        info!("Stopped at index {}", record.index);
        Ok(ControlOutcome::Stopped {
            index: record.index,
        })
    }

    /// Delete the record unconditionally.
    pub fn reset(&self) -> Result<ControlOutcome> {
        self.store.clear()?;
        info!("Reset progress record");
        Ok(ControlOutcome::Reset)
    }

    pub fn status(&self) -> Result<Status> {
        Ok(Status {
            key: self.store.key().to_string(),
            record: self.store.load()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageConfig;

    const HUB: &str = "https://bank.test/offer-hub";

    fn controls() -> Controls {
        Controls::new(
            ProgressStore::in_memory(),
            PageClassifier::from_config(&PageConfig::default()).unwrap(),
        )
    }

    #[test]
    fn test_start_on_list_writes_fresh_record() {
        let controls = controls();
        controls
            .store()
            .save(&ProgressRecord {
                running: false,
                index: 9,
            })
            .unwrap();

        assert_eq!(controls.start(HUB).unwrap(), ControlOutcome::Started);
        assert_eq!(
            controls.status().unwrap().record,
            Some(ProgressRecord::started())
        );
    }

    #[test]
    fn test_start_elsewhere_refused_and_store_untouched() {
        let controls = controls();
        let before = ProgressRecord {
            running: false,
            index: 3,
        };
        controls.store().save(&before).unwrap();

        let outcome = controls.start("https://bank.test/offer/42").unwrap();
        assert!(matches!(outcome, ControlOutcome::NotOnList { .. }));
        assert!(!outcome.is_applied());
        assert_eq!(controls.status().unwrap().record, Some(before));
    }

    #[test]
    fn test_resume_keeps_index() {
        let controls = controls();
        controls
            .store()
            .save(&ProgressRecord {
                running: false,
                index: 5,
            })
            .unwrap();

        assert_eq!(
            controls.resume().unwrap(),
            ControlOutcome::Resumed { index: 5 }
        );
        assert_eq!(
            controls.status().unwrap().record,
            Some(ProgressRecord {
                running: true,
                index: 5
            })
        );
    }

    #[test]
    fn test_resume_without_record_refused() {
        let controls = controls();
        assert_eq!(controls.resume().unwrap(), ControlOutcome::NoRecord);
        assert!(controls.status().unwrap().record.is_none());
    }

    #[test]
    fn test_stop_sets_not_running() {
        let controls = controls();
        controls.start(HUB).unwrap();
        assert_eq!(
            controls.stop().unwrap(),
            ControlOutcome::Stopped { index: 0 }
        );
        assert_eq!(controls.status().unwrap().record.map(|r| r.running), Some(false));
    }

    #[test]
    fn test_stop_without_record_is_noop() {
        let controls = controls();
        assert_eq!(controls.stop().unwrap(), ControlOutcome::AlreadyIdle);
        assert!(controls.status().unwrap().record.is_none());
    }

    #[test]
    fn test_reset_deletes_from_any_state() {
        let controls = controls();
        assert_eq!(controls.reset().unwrap(), ControlOutcome::Reset);

        controls.start(HUB).unwrap();
        controls.reset().unwrap();
        assert!(controls.status().unwrap().record.is_none());
        assert_eq!(controls.resume().unwrap(), ControlOutcome::NoRecord);
    }

    #[test]
    fn test_status_display() {
        let controls = controls();
        assert_eq!(
            controls.status().unwrap().to_string(),
            "TILEWALK_PROGRESS_V1: no progress record"
        );
        controls.start(HUB).unwrap();
        assert_eq!(
            controls.status().unwrap().to_string(),
            "TILEWALK_PROGRESS_V1: running at index 0"
        );
    }
}
