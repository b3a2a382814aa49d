//! API routes for roster-server

pub mod assignments;
pub mod health;
pub mod members;
pub mod sync;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Router, middleware};
use http::HeaderName;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use shared::error::AppError;

use crate::auth::api_secret_middleware;
use crate::state::AppState;

/// Largest accepted request body
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Back-office API (shared secret)
    let api = Router::new()
        .route("/api/sync", post(sync::handle_sync))
        .route("/api/members", get(members::list_members))
        .route("/api/assignments", get(assignments::list_assignments))
        .route("/api/assignments/upcoming", get(assignments::list_upcoming))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api_secret_middleware,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(api)
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            MakeRequestUuid,
        ))
        .with_state(state)
}

/// Unknown paths answer with the same JSON error body as everything else
async fn route_not_found() -> AppError {
    AppError::not_found("Route")
}


#[cfg(all(test, feature = "db_integration"))]
mod db_tests {
    use super::*;
    use crate::auth::secret_auth::API_SECRET_HEADER;
    use crate::state::SyncSettings;
    use axum::body::Body;
    use http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use sqlx::PgPool;
    use tower::ServiceExt;

    const SECRET: &str = "test-secret";

    fn app(pool: PgPool) -> Router {
        create_router(AppState::from_parts(pool, SECRET, SyncSettings::default()).unwrap())
    }

    async fn call(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_sync(secret: &str, body: serde_json::Value) -> Request<Body> {
        Request::post("/api/sync")
            .header("content-type", "application/json")
            .header(API_SECRET_HEADER, secret)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri)
            .header(API_SECRET_HEADER, SECRET)
            .body(Body::empty())
            .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn sync_reports_counts_and_reads_back(pool: PgPool) {
        let today = shared::util::today_utc();
        let assignments: Vec<_> = (0..5)
            .map(|i| {
                serde_json::json!({
                    "date": shared::util::add_days(today, i).to_string(),
                    "type": "santa",
                    "location": "Mall",
                    "role": "helper",
                    "memberName": if i % 2 == 0 { "Ann" } else { "Bob" },
                })
            })
            .collect();
        let payload = serde_json::json!({
            "members": [{ "name": "Ann" }, { "name": "Bob", "phone": "555" }],
            "assignments": assignments,
        });

        let (status, body) = call(app(pool.clone()), post_sync(SECRET, payload)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({ "success": true, "synced": { "members": 2, "assignments": 5 } })
        );

        let (_, members) = call(app(pool.clone()), get("/api/members")).await;
        assert_eq!(members[1]["name"], "Bob");
        assert_eq!(members[1]["phone"], "555");

        let (_, all) = call(app(pool.clone()), get("/api/assignments")).await;
        assert_eq!(all.as_array().unwrap().len(), 5);

        let (_, upcoming) = call(app(pool), get("/api/assignments/upcoming?days=2")).await;
        assert_eq!(upcoming.as_array().unwrap().len(), 2);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn rejected_secret_writes_nothing(pool: PgPool) {
        let payload = serde_json::json!({ "members": [{ "name": "Ann" }] });
        let (status, _) = call(app(pool.clone()), post_sync("wrong", payload)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (_, members) = call(app(pool), get("/api/members")).await;
        assert_eq!(members, serde_json::json!([]));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn invalid_snapshot_keeps_existing_assignments(pool: PgPool) {
        let seed = serde_json::json!({
            "assignments": [{ "date": "2026-12-05", "type": "knights", "memberName": "Ann" }]
        });
        call(app(pool.clone()), post_sync(SECRET, seed)).await;

        let bad = serde_json::json!({
            "assignments": [
                { "date": "2026-12-06", "type": "santa", "memberName": "Bob" },
                { "date": "2026-12-07", "type": "elves", "memberName": "Bob" }
            ]
        });
        let (status, _) = call(app(pool.clone()), post_sync(SECRET, bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, all) = call(app(pool), get("/api/assignments")).await;
        assert_eq!(all.as_array().unwrap().len(), 1);
        assert_eq!(all[0]["memberName"], "Ann");
    }
}
