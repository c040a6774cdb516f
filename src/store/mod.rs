//! Progress storage.
//!
//! The store is a single key/value slot that outlives page navigations and
//! process restarts. Two layers:
//!
//! - [`KeyValueStore`] - raw string values under string keys. Implemented by
//!   [`FileStore`] (one JSON file per key, atomic writes) and [`MemoryStore`].
//! - [`ProgressStore`] - the typed view over one key. It serializes a
//!   [`ProgressRecord`] and treats a missing *or* unparsable value as
//!   "no record".

pub mod file;
pub mod memory;

use std::sync::Arc;

use tracing::warn;

use crate::error::Result;
use crate::record::ProgressRecord;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Default key the progress record is stored under.
pub const DEFAULT_KEY: &str = "TILEWALK_PROGRESS_V1";

/// Raw key/value capability.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error only when the backing medium fails, never for a
    /// missing key.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value could not be durably written.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium fails.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Typed access to the progress record under one key.
#[derive(Clone)]
pub struct ProgressStore {
    backend: Arc<dyn KeyValueStore>,
    key: String,
}

impl std::fmt::Debug for ProgressStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressStore")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl ProgressStore {
    /// Wrap a backend, storing the record under `key`.
    pub fn new(backend: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// In-memory store under the default key.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), DEFAULT_KEY)
    }

    /// The key this store reads and writes.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the current record.
    ///
    /// A value that does not parse as a record is logged and reported as
    /// `None`, exactly like a missing value.
    pub fn load(&self) -> Result<Option<ProgressRecord>> {
        let Some(raw) = self.backend.get(&self.key)? else {
            return Ok(None);
        };

        match serde_json::from_str::<ProgressRecord>(&raw) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!(
                    "Ignoring unreadable progress record under '{}': {}",
                    self.key, e
                );
                Ok(None)
            }
        }
    }

    /// Persist `record`.
    pub fn save(&self, record: &ProgressRecord) -> Result<()> {
        let json = serde_json::to_string(record)?;
        self.backend.set(&self.key, &json)
    }

    /// Delete the record.
    pub fn clear(&self) -> Result<()> {
        self.backend.remove(&self.key)
    }
}
