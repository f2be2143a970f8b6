//! End-to-end tests for the HTTP router.
#![cfg(feature = "http-server")]

mod support;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use research_registry::api::{MAX_OPPORTUNITY_ID, MIN_OPPORTUNITY_ID};
use research_registry::db::{LocalRepository, ResearchRepository};
use research_registry::http::{create_router, AppState};
use research_registry::services::{FixedIdSource, IdSource, SequenceIdSource};

fn app_with(repo: LocalRepository, id_source: Arc<dyn IdSource>) -> Router {
    let repository = Arc::new(repo) as Arc<dyn ResearchRepository>;
    create_router(AppState::with_id_source(repository, id_source))
}

fn app(records: i64) -> Router {
    app_with(
        support::seeded_repository(records),
        Arc::new(FixedIdSource::new(1)),
    )
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn ids(body: &Value) -> Vec<i64> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect()
}

// =========================================================================
// /getrange
// =========================================================================

#[tokio::test]
async fn test_getrange_respects_range() {
    let (status, body) = get(app(20), "/getrange?range=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_getrange_default_matches_range_ten() {
    let (_, default_body) = get(app(20), "/getrange").await;
    let (_, explicit_body) = get(app(20), "/getrange?range=10").await;
    assert_eq!(default_body, explicit_body);
    assert_eq!(default_body.as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_getrange_larger_than_store() {
    let (status, body) = get(app(4), "/getrange?range=500").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_getrange_records_keep_attributes() {
    let (_, body) = get(app(2), "/getrange?range=1").await;
    assert_eq!(body[0]["title"], "Study 1");
    assert_eq!(body[0]["department"], "Psychiatry");
}

#[tokio::test]
async fn test_getrange_rejects_non_positive_range() {
    for uri in ["/getrange?range=0", "/getrange?range=-4"] {
        let (status, body) = get(app(5), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
    }
}

#[tokio::test]
async fn test_getrange_rejects_non_integer_range() {
    let (status, body) = get(app(5), "/getrange?range=ten").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(body["message"].as_str().unwrap().contains("range"));
}

#[tokio::test]
async fn test_getrange_empty_range_uses_default() {
    let (status, body) = get(app(20), "/getrange?range=").await;
    let (_, default_body) = get(app(20), "/getrange?range=10").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, default_body);
    assert_eq!(ids(&body), (1..=10).collect::<Vec<i64>>());
}

// =========================================================================
// /getone
// =========================================================================

#[tokio::test]
async fn test_getone_uses_injected_id() {
    let app = app_with(
        support::seeded_repository(50),
        Arc::new(FixedIdSource::new(42)),
    );
    let (status, body) = get(app, "/getone").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 42);
    assert_eq!(body["title"], "Study 42");
}

#[tokio::test]
async fn test_getone_missing_record_is_not_found() {
    let app = app_with(
        support::seeded_repository(5),
        Arc::new(FixedIdSource::new(6)),
    );
    let (status, body) = get(app, "/getone").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_getone_draws_fresh_key_per_request() {
    let app = app_with(
        support::seeded_repository(10),
        Arc::new(SequenceIdSource::new([7, 3])),
    );
    let (_, first) = get(app.clone(), "/getone").await;
    let (_, second) = get(app, "/getone").await;
    assert_eq!(first["id"], 7);
    assert_eq!(second["id"], 3);
}

#[tokio::test]
async fn test_getone_random_key_stays_in_bounds() {
    // Every key in the draw range exists, so any drawn key must resolve.
    let app = create_router(AppState::new(Arc::new(support::seeded_repository(
        MAX_OPPORTUNITY_ID,
    ))));
    for _ in 0..25 {
        let (status, body) = get(app.clone(), "/getone").await;
        assert_eq!(status, StatusCode::OK);
        let id = body["id"].as_i64().unwrap();
        assert!((MIN_OPPORTUNITY_ID..=MAX_OPPORTUNITY_ID).contains(&id));
    }
}

// =========================================================================
// Health, CORS, routing
// =========================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = get(app(0), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_cors_header_on_simple_request() {
    let response = app(3)
        .oneshot(
            Request::builder()
                .uri("/getrange")
                .header(header::ORIGIN, "http://volunteer.example.org")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_cors_preflight() {
    let response = app(3)
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/getone")
                .header(header::ORIGIN, "http://volunteer.example.org")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (status, _) = get(app(3), "/edit").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_post_not_allowed() {
    let response = app(3)
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/getrange")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
