//! Assignment read endpoints

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use shared::AssignmentType;
use shared::error::AppError;
use shared::roster::Assignment;

use crate::db::assignments;
use crate::error::ServiceResult;
use crate::state::AppState;

const DEFAULT_WINDOW_DAYS: i64 = 30;
const MAX_WINDOW_DAYS: i64 = 365;

/// `?days=N&type=santa|knights`
#[derive(Debug, Default, Deserialize)]
pub struct UpcomingQuery {
    pub days: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<AssignmentType>,
}

impl UpcomingQuery {
    fn window_days(&self) -> i64 {
        self.days
            .unwrap_or(DEFAULT_WINDOW_DAYS)
            .clamp(1, MAX_WINDOW_DAYS)
    }
}

/// GET /api/assignments: everything stored, in submitted order
pub async fn list_assignments(
    State(state): State<AppState>,
) -> ServiceResult<Json<Vec<Assignment>>> {
    Ok(Json(assignments::list_all(&state.pool).await?))
}

/// GET /api/assignments/upcoming
pub async fn list_upcoming(
    State(state): State<AppState>,
    query: Result<Query<UpcomingQuery>, QueryRejection>,
) -> ServiceResult<Json<Vec<Assignment>>> {
    let Query(query) = query.map_err(|rej| {
        AppError::invalid_request("Invalid query parameters").with_details(rej.body_text())
    })?;

    let from = shared::util::today_utc();
    let until = shared::util::add_days(from, query.window_days());
    let rows = assignments::list_between(&state.pool, from, until, query.kind).await?;
    Ok(Json(rows))
}
