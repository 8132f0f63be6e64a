//! The customer collection, persisted as one JSON array under one storage key.
//!
//! There is no indexing and no partial update: every write serializes and
//! replaces the whole collection. Positional index is the public addressing
//! scheme (list order = insertion order); each record also carries a stable
//! [`CustomerId`] so a form can find its record again after deletions shifted
//! the indices.
//!
//! Unreadable or malformed stored data loads as an empty collection.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use customer_desk_core::{CustomerId, CustomerRecord};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::storage::{KeyValueStorage, StorageError};

/// Errors that can occur while writing the collection.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage backend failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The collection could not be encoded.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Reads and writes the customer collection.
///
/// Cheap to clone; clones share the backend and the write lock.
#[derive(Clone)]
pub struct RecordStore {
    storage: Arc<dyn KeyValueStorage>,
    key: Arc<str>,
    write_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl RecordStore {
    /// Create a store over `storage`, keeping the collection under `key`.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>, key: &str) -> Self {
        Self {
            storage,
            key: Arc::from(key),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Storage key of the collection.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load every record in display order.
    ///
    /// Returns an empty collection if nothing is stored or the stored data
    /// cannot be read or parsed. Records stored without an id get one, and
    /// the assignment is written back so it stays stable.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn load_all(&self) -> Vec<CustomerRecord> {
        let _guard = self.lock();
        self.load_locked()
    }

    /// Persist `records` as the whole collection, replacing prior content.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the storage write fails.
    #[instrument(skip(self, records), fields(key = %self.key, count = records.len()))]
    pub fn save_all(&self, records: &[CustomerRecord]) -> Result<(), StoreError> {
        let _guard = self.lock();
        self.save_locked(records)
    }

    /// Record at `index`, if in range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<CustomerRecord> {
        self.load_all().into_iter().nth(index)
    }

    /// Current index of the record with `id`.
    #[must_use]
    pub fn position_of(&self, id: CustomerId) -> Option<usize> {
        self.load_all()
            .iter()
            .position(|record| record.id == Some(id))
    }

    /// Remove the record at `index` and persist the rest.
    ///
    /// Records after `index` move down by one. An out-of-range index is a
    /// no-op: nothing is written and `None` is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage write fails.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn delete_at(&self, index: usize) -> Result<Option<CustomerRecord>, StoreError> {
        let _guard = self.lock();
        let mut records = self.load_locked();
        if index >= records.len() {
            debug!(index, len = records.len(), "Delete index out of range");
            return Ok(None);
        }

        let removed = records.remove(index);
        self.save_locked(&records)?;
        info!(index, id = ?removed.id, "Customer deleted");
        Ok(Some(removed))
    }

    /// Write `record` over the stored record with the same id, or append it
    /// when no stored record has that id. Returns the record's index.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage write fails.
    #[instrument(skip(self, record), fields(key = %self.key))]
    pub fn save_record(&self, mut record: CustomerRecord) -> Result<usize, StoreError> {
        let id = record.ensure_id();

        let _guard = self.lock();
        let mut records = self.load_locked();
        let index = match records.iter().position(|r| r.id == Some(id)) {
            Some(index) => {
                if let Some(slot) = records.get_mut(index) {
                    *slot = record;
                }
                index
            }
            None => {
                records.push(record);
                records.len() - 1
            }
        };
        self.save_locked(&records)?;
        info!(index, %id, "Customer saved");
        Ok(index)
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn load_locked(&self) -> Vec<CustomerRecord> {
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read customers, treating as empty");
                return Vec::new();
            }
        };

        let mut records: Vec<CustomerRecord> = match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Stored customers are corrupt, treating as empty");
                return Vec::new();
            }
        };

        let missing = records.iter().filter(|r| r.id.is_none()).count();
        if missing > 0 {
            for record in &mut records {
                record.ensure_id();
            }
            match self.save_locked(&records) {
                Ok(()) => info!(missing, "Assigned ids to stored customers"),
                Err(e) => warn!(error = %e, "Failed to persist assigned customer ids"),
            }
        }

        records
    }

    fn save_locked(&self, records: &[CustomerRecord]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(records)?;
        self.storage.set_item(&self.key, &raw)?;
        Ok(())
    }
}
