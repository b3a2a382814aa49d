//! POST /api/sync: replace the roster with the back office's snapshot

use axum::extract::rejection::JsonRejection;
use axum::{Json, extract::State};
use http::StatusCode;
use shared::error::{AppError, ErrorCode};
use shared::{SyncRequest, SyncResponse};

use crate::services::sync_roster;
use crate::state::AppState;

/// Handle a roster snapshot
///
/// 1. Parse and validate the whole payload (no database access on failure)
/// 2. Apply it in one transaction: member upserts, assignment replace
/// 3. Report the submitted counts once committed
pub async fn handle_sync(
    State(state): State<AppState>,
    payload: Result<Json<SyncRequest>, JsonRejection>,
) -> Result<Json<SyncResponse>, AppError> {
    let Json(request) = payload.map_err(rejection_to_error)?;

    let snapshot = request.validate().inspect_err(|e| {
        tracing::warn!(code = %e.code, error = %e.message, "Rejected roster snapshot");
    })?;

    let outcome = sync_roster(&state.pool, &snapshot, &state.sync).await?;

    tracing::info!(
        members = outcome.members_count,
        assignments = outcome.assignments_count,
        assignments_removed = outcome.assignments_removed,
        "Roster synced"
    );

    Ok(Json(SyncResponse::committed(
        outcome.members_count,
        outcome.assignments_count,
    )))
}

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    let details = rejection.body_text();
    tracing::warn!(status = %rejection.status(), error = %details, "Unreadable sync payload");
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::with_message(ErrorCode::PayloadTooLarge, "Request body too large")
    } else {
        AppError::invalid_request("Invalid JSON body").with_details(details)
    }
}
