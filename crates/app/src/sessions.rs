//! Open form instances, addressed by form id.
//!
//! Each form session owns one [`FormController`] behind an async mutex.
//! Sessions are cached with `moka` and expire after sitting idle.

use std::sync::Arc;

use moka::future::Cache;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::FormSessionConfig;
use crate::form::FormController;

/// Shared handle to one open form.
pub type FormHandle = Arc<Mutex<FormController>>;

/// Cache of open forms.
#[derive(Clone)]
pub struct FormSessions {
    cache: Cache<Uuid, FormHandle>,
}

impl std::fmt::Debug for FormSessions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormSessions")
            .field("open", &self.cache.entry_count())
            .finish()
    }
}

impl FormSessions {
    #[must_use]
    pub fn new(config: &FormSessionConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_sessions)
            .time_to_idle(config.idle_timeout)
            .build();
        Self { cache }
    }

    /// Register `form` and return its id.
    pub async fn open(&self, form: FormController) -> Uuid {
        let id = Uuid::new_v4();
        self.cache.insert(id, Arc::new(Mutex::new(form))).await;
        id
    }

    /// The form with `id`, if it is still open.
    pub async fn get(&self, id: Uuid) -> Option<FormHandle> {
        self.cache.get(&id).await
    }

    /// Forget the form with `id`.
    pub async fn close(&self, id: Uuid) {
        self.cache.invalidate(&id).await;
    }
}
