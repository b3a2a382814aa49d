//! Health check endpoint

use axum::Json;
use axum::extract::State;

use crate::db;
use crate::state::AppState;

/// Always `200`; `database` reports whether a `SELECT 1` succeeded
pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let database = match db::ping(&state.pool).await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "Health check: database unreachable");
            "unavailable"
        }
    };

    Json(serde_json::json!({
        "status": "ok",
        "service": "roster-server",
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
    }))
}
