//! Form view handlers.
//!
//! Every handler locks its form only while touching it. Lookup handlers
//! begin the lookup under the lock, release it for the remote call, and lock
//! again to merge the result, so edits to the same form are not blocked by a
//! slow lookup.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use customer_desk_core::{AddressField, CustomerField, FormErrors};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use super::run_blocking;
use crate::error::{AppError, Result};
use crate::form::{FormView, SubmitOutcome};
use crate::list::FormRoute;
use crate::sessions::FormHandle;
use crate::state::AppState;

/// A form and the id to address it by.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormResponse {
    pub form_id: Uuid,
    pub form: FormView,
}

/// Body of a top-level field edit.
#[derive(Debug, Deserialize)]
pub struct FieldEdit {
    pub field: CustomerField,
    pub value: String,
}

/// Body of an address field edit.
#[derive(Debug, Deserialize)]
pub struct AddressEdit {
    pub field: AddressField,
    pub value: String,
}

/// Result of a submit.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SubmitResponse {
    /// Saved at `index`; the form is closed and the client returns to the list.
    Saved { index: usize },
    /// Not saved.
    Invalid { errors: FormErrors },
}

async fn find_form(state: &AppState, form_id: Uuid) -> Result<FormHandle> {
    state
        .forms()
        .get(form_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("form {form_id}")))
}

async fn respond(form_id: Uuid, handle: &FormHandle) -> Json<FormResponse> {
    let form = handle.lock().await.view();
    Json(FormResponse { form_id, form })
}

async fn open(state: &AppState, route: FormRoute) -> Result<(StatusCode, Json<FormResponse>)> {
    let list = state.list();
    let lookup = Arc::clone(state.lookup());
    let form = run_blocking(move || list.open(route, lookup)).await?;
    let view = form.view();
    let form_id = state.forms().open(form).await;
    tracing::debug!(%form_id, path = %route.path(), "Form opened");
    Ok((
        StatusCode::CREATED,
        Json(FormResponse {
            form_id,
            form: view,
        }),
    ))
}

/// Open a form for a new customer.
#[instrument(skip(state))]
pub async fn open_new(State(state): State<AppState>) -> Result<(StatusCode, Json<FormResponse>)> {
    open(&state, state.list().create()).await
}

/// Open a form for the customer at `index`.
///
/// An index with no customer opens a blank form, as for a new customer.
#[instrument(skip(state))]
pub async fn open_existing(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<(StatusCode, Json<FormResponse>)> {
    open(&state, state.list().edit(index)).await
}

/// Current state of a form.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(form_id): Path<Uuid>,
) -> Result<Json<FormResponse>> {
    let handle = find_form(&state, form_id).await?;
    Ok(respond(form_id, &handle).await)
}

/// Overwrite a top-level field.
#[instrument(skip(state, edit), fields(field = ?edit.field))]
pub async fn edit_field(
    State(state): State<AppState>,
    Path(form_id): Path<Uuid>,
    Json(edit): Json<FieldEdit>,
) -> Result<Json<FormResponse>> {
    let handle = find_form(&state, form_id).await?;
    handle.lock().await.set_field(edit.field, edit.value);
    Ok(respond(form_id, &handle).await)
}

/// Leave the PAN field: verify the PAN and autofill the full name.
#[instrument(skip(state))]
pub async fn blur_pan(
    State(state): State<AppState>,
    Path(form_id): Path<Uuid>,
) -> Result<Json<FormResponse>> {
    let handle = find_form(&state, form_id).await?;

    let (ticket, lookup) = {
        let mut form = handle.lock().await;
        (form.begin_pan_lookup(), Arc::clone(form.lookup()))
    };
    if let Some(ticket) = ticket {
        let outcome = ticket.run(lookup.as_ref()).await;
        handle.lock().await.apply_pan(outcome);
    }

    Ok(respond(form_id, &handle).await)
}

/// Append a blank address.
#[instrument(skip(state))]
pub async fn add_address(
    State(state): State<AppState>,
    Path(form_id): Path<Uuid>,
) -> Result<Json<FormResponse>> {
    let handle = find_form(&state, form_id).await?;
    handle.lock().await.add_address();
    Ok(respond(form_id, &handle).await)
}

/// Overwrite an address field. A postcode edit also resolves the address's
/// state and city.
#[instrument(skip(state, edit), fields(field = ?edit.field))]
pub async fn edit_address(
    State(state): State<AppState>,
    Path((form_id, index)): Path<(Uuid, usize)>,
    Json(edit): Json<AddressEdit>,
) -> Result<Json<FormResponse>> {
    let handle = find_form(&state, form_id).await?;

    let (ticket, lookup) = {
        let mut form = handle.lock().await;
        let ticket = if edit.field == AddressField::Postcode {
            form.begin_postcode_lookup(index, edit.value)?
        } else {
            form.set_address_field(index, edit.field, edit.value)?;
            None
        };
        (ticket, Arc::clone(form.lookup()))
    };
    if let Some(ticket) = ticket {
        let outcome = ticket.run(lookup.as_ref()).await;
        handle.lock().await.apply_postcode(outcome);
    }

    Ok(respond(form_id, &handle).await)
}

/// Remove an address.
#[instrument(skip(state))]
pub async fn remove_address(
    State(state): State<AppState>,
    Path((form_id, index)): Path<(Uuid, usize)>,
) -> Result<Json<FormResponse>> {
    let handle = find_form(&state, form_id).await?;
    handle.lock().await.remove_address(index)?;
    Ok(respond(form_id, &handle).await)
}

/// Validate the form and save it when valid.
#[instrument(skip(state))]
pub async fn submit(
    State(state): State<AppState>,
    Path(form_id): Path<Uuid>,
) -> Result<(StatusCode, Json<SubmitResponse>)> {
    let handle = find_form(&state, form_id).await?;
    let mut form = Arc::clone(&handle).lock_owned().await;
    let outcome = run_blocking(move || form.submit()).await??;

    match outcome {
        SubmitOutcome::Saved { index } => {
            state.forms().close(form_id).await;
            Ok((StatusCode::OK, Json(SubmitResponse::Saved { index })))
        }
        SubmitOutcome::Invalid(errors) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(SubmitResponse::Invalid { errors }),
        )),
    }
}
