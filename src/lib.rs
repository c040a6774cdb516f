//! Tilewalk - resumable walker for tile-list pages
//!
//! Visits every item on a list page in order, opening each one, clicking an
//! action control on its detail page when there is one, and coming back. The
//! cursor lives in a small persisted record so a reload, a crash or a manual
//! stop loses nothing.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`engine`] - Pure decision function: page state + record in, intent + record out
//! - [`record`] - The persisted `{running, index}` cursor
//! - [`store`] - Key-value storage of the record (file-backed and in-memory)
//! - [`page`] - Page collaborator trait, location classifier, control matcher
//! - [`scheduler`] - Fixed-period, non-overlapping, panic-isolated ticking
//! - [`control`] - start / resume / stop / reset / status
//! - [`automaton`] - Wires the above into one walker
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Custom error types and handling
//! - [`testing`] - Test doubles for the page
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tilewalk::{Automaton, ProgressStore, WalkConfig};
//! use tilewalk::testing::MockPage;
//!
//! let page = Arc::new(MockPage::new("https://bank.test/offer-hub").with_items(["a", "b"]));
//! let walker = Arc::new(Automaton::new(page, ProgressStore::in_memory(), &WalkConfig::default())?);
//!
//! walker.start().await?;
//! let handle = walker.spawn();
//! // ...
//! walker.stop()?;
//! handle.shutdown().await?;
//! ```

pub mod automaton;
pub mod config;
pub mod control;
pub mod engine;
pub mod error;
pub mod page;
pub mod record;
pub mod scheduler;
pub mod store;
pub mod testing;

// Re-export commonly used types
pub use error::{Result, WalkError};

pub use automaton::{Automaton, Observation, Pacing, TickReport};
pub use config::{resolve_state_dir, WalkConfig};
pub use control::{ControlOutcome, Controls, Status};
pub use engine::{decide, Decision, Intent, PageClassification};
pub use page::{ControlHandle, ControlMatcher, ItemHandle, PageClassifier, PageDriver};
pub use record::ProgressRecord;
pub use scheduler::{Scheduler, SchedulerHandle, SchedulerStats, Tick};
pub use store::{FileStore, KeyValueStore, MemoryStore, ProgressStore, DEFAULT_KEY};

#[cfg(feature = "chrome")]
pub use page::chrome::ChromeDriver;
