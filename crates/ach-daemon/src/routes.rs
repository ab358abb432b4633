//! Axum router and HTTP handlers for `ach-daemon`.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers. The handler is `pub(crate)` so the scenario tests in
//! `tests/` can compose the router directly.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    queue_lag: i64,
    time: DateTime<Utc>,
}

/// `GET /health`: 200 with the current queue lag when the lag query
/// succeeds, 503 when it doesn't — a failing query is the daemon's only
/// signal that Postgres is unreachable, since it holds no other state.
pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    match ach_db::queue_lag(&st.pool).await {
        Ok(lag) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                queue_lag: lag,
                time: Utc::now(),
            }),
        )
            .into_response(),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unavailable",
                queue_lag: -1,
                time: Utc::now(),
            }),
        )
            .into_response(),
    }
}
