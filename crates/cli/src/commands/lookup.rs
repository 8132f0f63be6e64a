//! One-off lookups against the PAN and postcode service.
//!
//! # Usage
//!
//! ```bash
//! desk-cli verify-pan ABCDE1234F
//! desk-cli postcode 560001
//! ```

use customer_desk_app::state::AppState;
use customer_desk_core::{Pan, Postcode};

use super::CliError;

/// Verify `pan` and print the service's answer as JSON.
///
/// # Errors
///
/// Returns an error if `pan` is malformed or the lookup fails.
#[allow(clippy::print_stdout)]
pub async fn verify_pan(state: &AppState, pan: &str) -> Result<(), CliError> {
    let pan = Pan::parse(pan)?;
    let verification = state.lookup().verify_pan(&pan).await?;
    println!("{}", serde_json::to_string_pretty(&verification)?);
    Ok(())
}

/// Resolve `postcode` and print the service's answer as JSON.
///
/// # Errors
///
/// Returns an error if `postcode` is malformed or the lookup fails.
#[allow(clippy::print_stdout)]
pub async fn postcode(state: &AppState, postcode: &str) -> Result<(), CliError> {
    let postcode = Postcode::parse(postcode)?;
    let details = state.lookup().postcode_details(&postcode).await?;
    println!("{}", serde_json::to_string_pretty(&details)?);
    Ok(())
}
