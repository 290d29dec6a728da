//! History routes - list, reprint, delete-one, delete-all

use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Serialize;

use labelpress_core::{HistoryRecord, RecordId};

use crate::error::ApiError;
use crate::routes::print::PrintResponse;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/history", get(list).delete(clear))
        .route("/history/{id}", delete(remove))
        .route("/history/{id}/reprint", post(reprint))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<HistoryRecord>>, ApiError> {
    Ok(Json(state.service.history()?))
}

#[derive(Serialize)]
pub struct RemoveResponse {
    removed: bool,
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<Json<RemoveResponse>, ApiError> {
    let removed = state.service.delete(id)?;
    Ok(Json(RemoveResponse { removed }))
}

pub async fn clear(State(state): State<AppState>) -> Result<Json<RemoveResponse>, ApiError> {
    state.service.clear()?;
    Ok(Json(RemoveResponse { removed: true }))
}

/// Re-enters the dispatch pipeline with the stored request; the source
/// record stays untouched and the new record id comes back in the response.
pub async fn reprint(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<Json<PrintResponse>, ApiError> {
    let summary = state.service.reprint(id).await?;
    Ok(Json(PrintResponse::from(summary)))
}
