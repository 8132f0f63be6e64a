//! Command implementations.

pub mod customers;
pub mod lookup;

use customer_desk_app::config::{AppConfig, ConfigError};
use customer_desk_app::form::FormError;
use customer_desk_app::lookup::LookupError;
use customer_desk_app::state::{AppState, StateError};
use customer_desk_app::store::StoreError;
use customer_desk_core::{FormErrors, PanError, PostcodeError};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Startup error: {0}")]
    State(#[from] StateError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Form error: {0}")]
    Form(#[from] FormError),

    #[error("Lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("Invalid PAN: {0}")]
    Pan(#[from] PanError),

    #[error("Invalid postcode: {0}")]
    Postcode(#[from] PostcodeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No customer at index {0}")]
    NoSuchCustomer(usize),

    /// The form did not pass validation and nothing was saved.
    #[error("Customer not saved: {0}")]
    Invalid(FormErrors),
}

/// Load configuration and open storage and the lookup client.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the data directory cannot
/// be opened.
pub fn open_state() -> Result<AppState, CliError> {
    let config = AppConfig::from_env()?;
    tracing::debug!(data_dir = %config.storage.data_dir.display(), "Opening customer store");
    Ok(AppState::from_config(&config)?)
}
