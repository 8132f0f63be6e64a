//! List view handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use super::run_blocking;
use crate::error::Result;
use crate::list::CustomerSummary;
use crate::state::AppState;

/// List every customer.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<CustomerSummary>>> {
    let list = state.list();
    Ok(Json(run_blocking(move || list.summaries()).await?))
}

/// Delete the customer at `index`.
///
/// An index past the end deletes nothing; the list comes back unchanged.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<Vec<CustomerSummary>>> {
    let list = state.list();
    Ok(Json(run_blocking(move || list.delete(index)).await??))
}
