//! Integration tests for Customer Desk.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p customer-desk-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `http_api` - The list and form routes, driven in-process through the router
//! - `lookup_client` - The HTTP lookup client and form against a mock lookup service
//!
//! [`TestApp`] wires the router to in-memory storage and a scripted lookup
//! service, so no test touches the network unless it starts its own mock
//! server. [`TestApp::with_storage`] swaps in another backend, such as file
//! storage in a temp directory.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use customer_desk_app::config::FormSessionConfig;
use customer_desk_app::lookup::testing::ScriptedLookup;
use customer_desk_app::routes;
use customer_desk_app::sessions::FormSessions;
use customer_desk_app::state::AppState;
use customer_desk_app::storage::{KeyValueStorage, MemoryStorage};
use customer_desk_app::store::RecordStore;
use serde_json::Value;
use tower::ServiceExt;

/// Upper bound on response bodies read by tests.
const BODY_LIMIT: usize = 1024 * 1024;

/// The application over in-memory storage and a scripted lookup service.
pub struct TestApp {
    pub router: Router,
    pub store: RecordStore,
    pub lookup: Arc<ScriptedLookup>,
}

impl TestApp {
    /// An app whose lookup service knows the PAN `ABCDE1234F` (Jane Doe) and
    /// the postcode `560001` (Karnataka / Bengaluru).
    #[must_use]
    pub fn new() -> Self {
        Self::with_lookup(
            ScriptedLookup::new()
                .with_pan("ABCDE1234F", "Jane Doe")
                .with_rejected_pan("ZZZZZ9999Z")
                .with_postcode("560001", &["Karnataka"], &["Bengaluru", "Mysuru"])
                .with_unknown_postcode("999999"),
        )
    }

    #[must_use]
    pub fn with_lookup(lookup: ScriptedLookup) -> Self {
        Self::with_storage(Arc::new(MemoryStorage::new()), lookup)
    }

    /// An app persisting through `storage` instead of memory.
    #[must_use]
    pub fn with_storage(storage: Arc<dyn KeyValueStorage>, lookup: ScriptedLookup) -> Self {
        let store = RecordStore::new(storage, "customers");
        let lookup = Arc::new(lookup);
        let state = AppState::new(
            store.clone(),
            lookup.clone(),
            FormSessions::new(&FormSessionConfig::default()),
        );

        Self {
            router: routes::router(state),
            store,
            lookup,
        }
    }

    /// Send one request and return the status and the body.
    ///
    /// JSON bodies are parsed; anything else comes back as a JSON string.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), BODY_LIMIT)
            .await
            .expect("Failed to read response body");
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        (status, body)
    }

    /// Open a form (new, or for the customer at `index`) and return its id
    /// and initial state.
    ///
    /// # Panics
    ///
    /// Panics if the form does not open.
    pub async fn open_form(&self, index: Option<usize>) -> (String, Value) {
        let uri = index.map_or_else(
            || "/customer-form".to_string(),
            |index| format!("/customer-form/{index}"),
        );
        let (status, body) = self.request(Method::POST, &uri, None).await;
        assert_eq!(status, StatusCode::CREATED, "open form: {body}");

        let form_id = body["formId"]
            .as_str()
            .expect("formId in response")
            .to_string();
        (form_id, body["form"].clone())
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
