//! In-process scenario tests for ach-daemon's HTTP endpoints.
//!
//! Drives the Axum router via `tower::ServiceExt::oneshot` without binding a
//! TCP socket. Requires a live Postgres reachable via ACH_TEST_DATABASE_URL.

use std::sync::Arc;

use ach_daemon::{routes, state};
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

async fn make_router() -> axum::Router {
    let pool = ach_testkit::testkit_db_pool().await.unwrap();
    let st = Arc::new(state::AppState::new(pool));
    routes::build_router(st)
}

async fn call(router: axum::Router, req: Request<axum::body::Body>) -> (StatusCode, bytes::Bytes) {
    let resp = router.oneshot(req).await.expect("oneshot failed");
    let status = resp.status();
    let body = resp
        .into_body()
        .collect()
        .await
        .expect("body collect failed")
        .to_bytes();
    (status, body)
}

fn parse_json(b: bytes::Bytes) -> serde_json::Value {
    serde_json::from_slice(&b).expect("body is not valid JSON")
}

#[tokio::test]
async fn health_returns_200_with_queue_lag_against_a_reachable_database() {
    let router = make_router().await;
    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(axum::body::Body::empty())
        .unwrap();

    let (status, body) = call(router, req).await;
    assert_eq!(status, StatusCode::OK);

    let json = parse_json(body);
    assert_eq!(json["status"], "ok");
    assert!(json["queue_lag"].is_i64());
    assert!(json["time"].is_string());
}
