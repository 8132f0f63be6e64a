//! Lookup-related errors.

use thiserror::Error;

/// Errors that can occur when calling the lookup service.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The HTTP client could not be built.
    #[error("Lookup client error: {0}")]
    Client(String),

    /// HTTP request failed.
    #[error("Lookup request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    #[error("Lookup service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Failed to parse response.
    #[error("Lookup response error: {0}")]
    Response(String),
}
