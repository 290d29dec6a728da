//! Submission route
//!
//! `POST /print` forwards a `{identifier, quantity}` payload to the
//! dispatch pipeline. The printer defaults to the first configured one, the
//! separator to enabled, so the minimal automation payload stays minimal.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use labelpress_core::{DispatchOptions, DispatchSummary, RecordId};

use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/print", post(print))
        .route("/printers", get(printers))
}

#[derive(Debug, Deserialize)]
pub struct PrintRequest {
    pub identifier: String,
    pub quantity: u32,
    #[serde(default)]
    pub printer: Option<String>,
    #[serde(default)]
    pub separator: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct PrintResponse {
    pub record_id: RecordId,
    pub status: &'static str,
    pub outcome: String,
    pub copies_submitted: u32,
    pub separator_submitted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl From<DispatchSummary> for PrintResponse {
    fn from(summary: DispatchSummary) -> Self {
        Self {
            record_id: summary.record.id,
            status: if summary.report.outcome.is_success() {
                "success"
            } else {
                "failure"
            },
            outcome: summary.report.outcome.to_string(),
            copies_submitted: summary.report.copies_submitted,
            separator_submitted: summary.report.separator_submitted,
            detail: summary.report.detail,
        }
    }
}

/// A failed dispatch is still a completed request: the outcome comes back
/// with 200 and a `failure` status, mirroring the library's result object.
pub async fn print(
    State(state): State<AppState>,
    Json(request): Json<PrintRequest>,
) -> Result<Json<PrintResponse>, ApiError> {
    let printer = match request.printer {
        Some(printer) => printer,
        None => state
            .service
            .printers()
            .first()
            .cloned()
            .ok_or_else(|| ApiError::bad_request("no printer configured"))?,
    };

    let options = DispatchOptions {
        separator: request.separator.unwrap_or(true),
    };
    let summary = state
        .service
        .dispatch(&request.identifier, request.quantity, &printer, options)
        .await?;

    Ok(Json(PrintResponse::from(summary)))
}

pub async fn printers(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.service.printers().to_vec())
}
