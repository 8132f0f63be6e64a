//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::list::ListController;
use crate::lookup::{HttpLookupClient, LookupError, LookupService};
use crate::sessions::FormSessions;
use crate::storage::{FileStorage, StorageError};
use crate::store::RecordStore;

/// Error building the application state from configuration.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("lookup client error: {0}")]
    Lookup(#[from] LookupError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: RecordStore,
    lookup: Arc<dyn LookupService>,
    forms: FormSessions,
}

impl AppState {
    /// Assemble state from already-built parts.
    #[must_use]
    pub fn new(store: RecordStore, lookup: Arc<dyn LookupService>, forms: FormSessions) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                lookup,
                forms,
            }),
        }
    }

    /// Build state from configuration: file storage under the data
    /// directory and the HTTP lookup client.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created or the HTTP
    /// client fails to build.
    pub fn from_config(config: &AppConfig) -> Result<Self, StateError> {
        let storage = FileStorage::open(config.storage.data_dir.clone())?;
        let store = RecordStore::new(Arc::new(storage), &config.storage.key);
        let lookup = HttpLookupClient::new(&config.lookup)?;
        let forms = FormSessions::new(&config.forms);

        Ok(Self::new(store, Arc::new(lookup), forms))
    }

    /// Get a reference to the record store.
    #[must_use]
    pub fn store(&self) -> &RecordStore {
        &self.inner.store
    }

    /// Get a reference to the lookup service.
    #[must_use]
    pub fn lookup(&self) -> &Arc<dyn LookupService> {
        &self.inner.lookup
    }

    /// Get a reference to the open form sessions.
    #[must_use]
    pub fn forms(&self) -> &FormSessions {
        &self.inner.forms
    }

    /// A list controller over the record store.
    #[must_use]
    pub fn list(&self) -> ListController {
        ListController::new(self.inner.store.clone())
    }
}
