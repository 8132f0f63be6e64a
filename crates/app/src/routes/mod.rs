//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                        - Health check
//!
//! # List view
//! GET    /                              - Customer summaries
//! DELETE /customers/{index}             - Delete, returns the refreshed list
//!
//! # Form view
//! POST   /customer-form                 - Open a form for a new customer
//! POST   /customer-form/{index}         - Open a form for the customer at index
//! GET    /forms/{form_id}               - Current form state
//! PATCH  /forms/{form_id}               - Edit a top-level field
//! POST   /forms/{form_id}/pan/blur      - Leave the PAN field (verifies the PAN)
//! POST   /forms/{form_id}/addresses     - Add a blank address
//! PATCH  /forms/{form_id}/addresses/{i} - Edit an address field (postcode resolves state/city)
//! DELETE /forms/{form_id}/addresses/{i} - Remove an address
//! POST   /forms/{form_id}/submit        - Validate and save (422 with errors when invalid)
//! ```

pub mod customers;
pub mod forms;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use tower_http::trace::TraceLayer;

use crate::error::Result;
use crate::state::AppState;

/// Run record store work on the blocking thread pool.
///
/// Storage reads and writes are synchronous file I/O under the store's lock.
pub(crate) async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(work).await?)
}

/// Create the list view routes router.
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(customers::index))
        .route("/customers/{index}", delete(customers::delete))
}

/// Create the form view routes router.
pub fn form_routes() -> Router<AppState> {
    Router::new()
        .route("/customer-form", post(forms::open_new))
        .route("/customer-form/{index}", post(forms::open_existing))
        .route("/forms/{form_id}", get(forms::show).patch(forms::edit_field))
        .route("/forms/{form_id}/pan/blur", post(forms::blur_pan))
        .route("/forms/{form_id}/addresses", post(forms::add_address))
        .route(
            "/forms/{form_id}/addresses/{index}",
            patch(forms::edit_address).delete(forms::remove_address),
        )
        .route("/forms/{form_id}/submit", post(forms::submit))
}

/// Create all application routes.
pub fn routes() -> Router<AppState> {
    Router::new().merge(customer_routes()).merge(form_routes())
}

/// The full application: routes, health check and request tracing, bound to
/// `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_run_blocking_returns_value() {
        let value = run_blocking(|| 6 * 7).await;
        assert!(matches!(value, Ok(42)));
    }

    #[tokio::test]
    async fn test_run_blocking_panic_is_internal_error() {
        let err = run_blocking(|| -> usize { panic!("storage exploded") })
            .await
            .err();

        assert!(matches!(err, Some(AppError::Internal(_))));
        let status = err.map(|e| e.into_response().status());
        assert_eq!(status, Some(StatusCode::INTERNAL_SERVER_ERROR));
    }
}
