//! GET /api/members

use axum::{Json, extract::State};
use shared::roster::Member;

use crate::db::members;
use crate::error::ServiceResult;
use crate::state::AppState;

pub async fn list_members(State(state): State<AppState>) -> ServiceResult<Json<Vec<Member>>> {
    Ok(Json(members::list_members(&state.pool).await?))
}
