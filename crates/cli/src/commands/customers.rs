//! Customer list and form commands.
//!
//! # Usage
//!
//! ```bash
//! # List customers
//! desk-cli list
//!
//! # Show one customer as JSON
//! desk-cli show 0
//!
//! # Add a customer; the full name and the state/city are looked up
//! desk-cli add --pan ABCDE1234F --email jane@x.com --mobile-number 9876543210 \
//!     --address-line1 "1 Rd" --postcode 560001
//!
//! # Change the email of customer 0
//! desk-cli edit 0 --email jane@y.com
//!
//! # Delete customer 2
//! desk-cli delete 2
//! ```
//!
//! Address flags apply to the first address.

use std::sync::Arc;

use clap::Args;
use customer_desk_app::form::{FormController, SubmitOutcome};
use customer_desk_app::state::AppState;
use customer_desk_core::{AddressField, CustomerField};
use tracing::{error, info, warn};

use super::CliError;

/// Field values given on the command line.
#[derive(Debug, Default, Clone, Args)]
pub struct CustomerFields {
    /// PAN number; verified remotely, which also fills the full name
    #[arg(long)]
    pub pan: Option<String>,

    /// Full name (overrides the name returned by PAN verification)
    #[arg(long)]
    pub full_name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub mobile_number: Option<String>,

    #[arg(long)]
    pub address_line1: Option<String>,

    #[arg(long)]
    pub address_line2: Option<String>,

    /// Postcode; resolved remotely to a state and city
    #[arg(long)]
    pub postcode: Option<String>,

    /// State (overrides the looked-up state)
    #[arg(long)]
    pub state: Option<String>,

    /// City (overrides the looked-up city)
    #[arg(long)]
    pub city: Option<String>,
}

/// Print every customer.
#[allow(clippy::print_stdout)]
pub fn list(state: &AppState) {
    let summaries = state.list().summaries();
    if summaries.is_empty() {
        println!("No customers");
        return;
    }

    for summary in summaries {
        println!(
            "{}: {} <{}> PAN {} mobile {}",
            summary.index, summary.full_name, summary.email, summary.pan, summary.mobile_number
        );
        for address in &summary.addresses {
            println!("    {address}");
        }
    }
}

/// Print the customer at `index` as JSON.
///
/// # Errors
///
/// Returns an error if there is no customer at `index`.
#[allow(clippy::print_stdout)]
pub fn show(state: &AppState, index: usize) -> Result<(), CliError> {
    let record = state
        .store()
        .get(index)
        .ok_or(CliError::NoSuchCustomer(index))?;
    let json = serde_json::to_string_pretty(&record)?;
    println!("{json}");
    Ok(())
}

/// Create a customer from `fields`.
///
/// # Errors
///
/// Returns an error if the customer does not validate or cannot be saved.
pub async fn add(state: &AppState, fields: CustomerFields) -> Result<usize, CliError> {
    let list = state.list();
    let mut form = list.open(list.create(), Arc::clone(state.lookup()));
    fill(&mut form, fields).await?;
    submit(&mut form)
}

/// Update the customer at `index` with `fields`; unset flags keep their
/// stored values.
///
/// # Errors
///
/// Returns an error if the customer does not validate or cannot be saved.
pub async fn edit(
    state: &AppState,
    index: usize,
    fields: CustomerFields,
) -> Result<usize, CliError> {
    let list = state.list();
    let mut form = list.open(list.edit(index), Arc::clone(state.lookup()));
    if form.origin().is_none() {
        warn!(index, "No customer at index, creating a new one");
    }
    fill(&mut form, fields).await?;
    submit(&mut form)
}

/// Delete the customer at `index`.
///
/// # Errors
///
/// Returns an error if the store write fails.
pub fn delete(state: &AppState, index: usize) -> Result<(), CliError> {
    let before = state.store().load_all().len();
    let remaining = state.list().delete(index)?;
    if remaining.len() == before {
        warn!(index, "No customer at index, nothing deleted");
    } else {
        info!(index, remaining = remaining.len(), "Customer deleted");
    }
    Ok(())
}

async fn fill(form: &mut FormController, fields: CustomerFields) -> Result<(), CliError> {
    if let Some(pan) = fields.pan {
        form.set_field(CustomerField::Pan, pan);
        form.blur_pan().await;
    }
    if let Some(full_name) = fields.full_name {
        form.set_field(CustomerField::FullName, full_name);
    }
    if let Some(email) = fields.email {
        form.set_field(CustomerField::Email, email);
    }
    if let Some(mobile_number) = fields.mobile_number {
        form.set_field(CustomerField::MobileNumber, mobile_number);
    }
    if let Some(line1) = fields.address_line1 {
        form.set_address_field(0, AddressField::AddressLine1, line1)?;
    }
    if let Some(line2) = fields.address_line2 {
        form.set_address_field(0, AddressField::AddressLine2, line2)?;
    }
    if let Some(postcode) = fields.postcode {
        form.change_postcode(0, postcode).await?;
    }
    if let Some(state) = fields.state {
        form.set_address_field(0, AddressField::State, state)?;
    }
    if let Some(city) = fields.city {
        form.set_address_field(0, AddressField::City, city)?;
    }
    Ok(())
}

fn submit(form: &mut FormController) -> Result<usize, CliError> {
    match form.submit()? {
        SubmitOutcome::Saved { index } => {
            info!(index, "Customer saved");
            Ok(index)
        }
        SubmitOutcome::Invalid(errors) => {
            for (field, message) in errors.iter() {
                error!(%field, "{message}");
            }
            Err(CliError::Invalid(errors))
        }
    }
}
