//! Loading and saving the history blob.

use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::period::PeriodHistory;

use super::{migrate::read_legacy, KeyValueStore, RECORDS_KEY};

/// How a load went.
///
/// Callers that only need a history use [`PersistenceGateway::load`]; this
/// status separates "never used" from "data was unreadable".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// Nothing was stored under either key
    Empty,
    /// The current-format blob was read
    Loaded,
    /// A legacy blob was converted. Writing it under the current key may
    /// have failed, in which case the next load converts it again.
    Migrated,
    /// Stored data could not be read or violated record invariants
    Corrupted,
}

/// Serialize a history into the current blob format.
pub fn encode_history(history: &PeriodHistory) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(history)?)
}

/// Parse and validate a current-format blob.
pub fn decode_history(bytes: &[u8]) -> Result<PeriodHistory> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Reads and writes the period history through a key-value store.
#[derive(Debug, Clone)]
pub struct PersistenceGateway<S> {
    store: S,
}

impl<S: KeyValueStore> PersistenceGateway<S> {
    /// Wrap a store
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Load the history, degrading to empty on any failure.
    pub fn load(&mut self) -> PeriodHistory {
        self.load_with_status().0
    }

    /// Load the history and report how the load went.
    ///
    /// When the current key is absent, a legacy blob is migrated first.
    /// Failures never propagate: the history is empty and the status is
    /// [`LoadStatus::Corrupted`].
    pub fn load_with_status(&mut self) -> (PeriodHistory, LoadStatus) {
        let stored = match self.store.get(RECORDS_KEY) {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Failed to read period history, starting empty: {}", e);
                return (PeriodHistory::default(), LoadStatus::Corrupted);
            }
        };

        if let Some(bytes) = stored {
            return match decode_history(&bytes) {
                Ok(history) => {
                    debug!(records = history.len(), "Loaded period history");
                    (history, LoadStatus::Loaded)
                }
                Err(e) => {
                    warn!("Discarding unreadable period history: {}", e);
                    (PeriodHistory::default(), LoadStatus::Corrupted)
                }
            };
        }

        match read_legacy(&self.store) {
            Ok(Some(history)) => {
                let written = encode_history(&history)
                    .and_then(|bytes| self.store.set(RECORDS_KEY, &bytes));
                match written {
                    Ok(()) => info!(periods = history.len(), "Migrated legacy period records"),
                    Err(e) => warn!("Could not write migrated history, keeping it in memory: {}", e),
                }
                (history, LoadStatus::Migrated)
            }
            Ok(None) => (PeriodHistory::default(), LoadStatus::Empty),
            Err(e) => {
                warn!("Legacy period data could not be migrated, starting empty: {}", e);
                (PeriodHistory::default(), LoadStatus::Corrupted)
            }
        }
    }

    /// Persist the history. Failures are logged, not returned.
    pub fn save(&mut self, history: &PeriodHistory) {
        if let Err(e) = self.try_save(history) {
            error!("Failed to save period history: {}", e);
        }
    }

    /// Persist the history, returning any failure.
    pub fn try_save(&mut self, history: &PeriodHistory) -> Result<()> {
        let bytes = encode_history(history)?;
        self.store.set(RECORDS_KEY, &bytes)?;
        debug!(records = history.len(), "Saved period history");
        Ok(())
    }

    /// The wrapped store
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Unwrap the store
    pub fn into_inner(self) -> S {
        self.store
    }
}
