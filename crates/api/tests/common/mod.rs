#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use rankbag_core::gateway::MemoryGateway;
use rankbag_core::issuance::RetryPolicy;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use rankbag_api::background::coupon_persistence::{self, PersistQueue};
use rankbag_api::config::ServerConfig;
use rankbag_api::routes;
use rankbag_api::session::{SessionStore, SESSION_HEADER};
use rankbag_api::state::AppState;

pub const PUBLIC_ORIGIN: &str = "https://rankbag.test";
pub const QR_SERVICE_URL: &str = "https://qr.test/create/";

/// Build a test `ServerConfig` with safe defaults.
///
/// No verification delay and millisecond retry backoff keep the suite fast.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        public_origin: PUBLIC_ORIGIN.to_string(),
        qr_service_url: QR_SERVICE_URL.to_string(),
        redeem_verify_delay_ms: 0,
        session_ttl_secs: 3600,
        coupon_persist_retry_delays_ms: vec![1, 1, 1],
    }
}

/// Build the full application router with all middleware layers over the
/// given in-memory gateway, and spawn the coupon persistence worker.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack that production uses.
pub fn build_test_app(gateway: Arc<MemoryGateway>) -> Router {
    let config = test_config();
    let sessions = Arc::new(SessionStore::new(config.session_ttl()));

    let (persist_queue, jobs) = PersistQueue::channel(coupon_persistence::QUEUE_CAPACITY);
    tokio::spawn(coupon_persistence::run(
        gateway.clone(),
        Arc::clone(&sessions),
        RetryPolicy {
            delays: vec![Duration::from_millis(1); 3],
        },
        jobs,
        CancellationToken::new(),
    ));

    let state = AppState {
        gateway,
        config: Arc::new(config),
        sessions,
        persist_queue,
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(SESSION_HEADER)])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

/// A fresh tab id.
pub fn new_tab() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

/// GET with the tab's session header.
pub async fn get_in(app: &Router, tab: &str, uri: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header(SESSION_HEADER, tab)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response {
    json_request(app, Method::POST, None, uri, Some(body)).await
}

/// POST with the tab's session header; `body` may be absent.
pub async fn post_in(
    app: &Router,
    tab: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response {
    json_request(app, Method::POST, Some(tab), uri, body).await
}

pub async fn put_in(app: &Router, tab: &str, uri: &str, body: serde_json::Value) -> Response {
    json_request(app, Method::PUT, Some(tab), uri, Some(body)).await
}

async fn json_request(
    app: &Router,
    method: Method,
    tab: Option<&str>,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(tab) = tab {
        builder = builder.header(SESSION_HEADER, tab);
    }
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    send(app, request).await
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

// ---------------------------------------------------------------------------
// Wizard helpers
// ---------------------------------------------------------------------------

pub fn rating_body(business_id: &str, business_name: &str, rating: u8) -> serde_json::Value {
    serde_json::json!({
        "businessId": business_id,
        "businessName": business_name,
        "rating": rating,
        "service": "pizza",
        "staff": "Maria",
        "qualities": ["quick service", "friendly staff"],
        "feelings": ["happy"]
    })
}

/// Submit a rating step for `tab` and return the response body.
pub async fn submit_rating(app: &Router, tab: &str, body: serde_json::Value) -> serde_json::Value {
    let response = post_in(app, tab, "/api/v1/reviews", Some(body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

/// Poll `check` until it holds, failing after about a second.
pub async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..200 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}
