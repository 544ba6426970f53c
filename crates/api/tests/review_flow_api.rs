//! Integration tests for the feedback wizard: rating, membership capture
//! and the private feedback path.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_json, get_in, new_tab, post_in, put_in, rating_body, submit_rating};
use rankbag_core::feedback::ReviewRoute;
use rankbag_core::gateway::MemoryGateway;

// ---------------------------------------------------------------------------
// Rating step
// ---------------------------------------------------------------------------

#[tokio::test]
async fn positive_rating_routes_to_google_with_review_text() {
    let gateway = Arc::new(MemoryGateway::new());
    gateway
        .add_business("pizza-corner", "Pizza Corner", Some("ChIJpizza"))
        .await;
    let app = common::build_test_app(gateway.clone());
    let tab = new_tab();

    let json = submit_rating(&app, &tab, rating_body("pizza-corner", "Pizza Corner", 5)).await;
    let data = &json["data"];

    assert_eq!(data["route"], "google");
    assert_eq!(
        data["googleReviewUrl"],
        "https://search.google.com/local/writereview?placeid=ChIJpizza"
    );
    let text = data["reviewText"].as_str().unwrap();
    assert!(text.starts_with("Had a fantastic experience at Pizza Corner!"));
    assert!(text.contains("Special thanks to Maria"));

    let review_id = data["reviewId"].as_i64().unwrap();
    let stored = gateway.review(review_id).await.unwrap();
    assert_eq!(stored.route, ReviewRoute::Google);
}

#[tokio::test]
async fn low_rating_routes_to_private_feedback() {
    let app = common::build_test_app(Arc::new(MemoryGateway::new()));
    let tab = new_tab();

    let json = submit_rating(&app, &tab, rating_body("pizza-corner", "Pizza Corner", 2)).await;

    assert_eq!(json["data"]["route"], "private");
    assert!(json["data"].get("reviewText").is_none());
}

#[tokio::test]
async fn out_of_range_rating_is_rejected() {
    let app = common::build_test_app(Arc::new(MemoryGateway::new()));

    let response = post_in(
        &app,
        &new_tab(),
        "/api/v1/reviews",
        Some(rating_body("pizza-corner", "Pizza Corner", 6)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn oversized_quality_is_rejected() {
    let gateway = Arc::new(MemoryGateway::new());
    let app = common::build_test_app(gateway.clone());
    let mut body = rating_body("pizza-corner", "Pizza Corner", 5);
    body["qualities"] = serde_json::json!(["q".repeat(2001)]);

    let response = post_in(&app, &new_tab(), "/api/v1/reviews", Some(body)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    assert!(gateway.review(1).await.is_none());
}

#[tokio::test]
async fn client_supplied_coupon_fields_are_dropped() {
    let app = common::build_test_app(Arc::new(MemoryGateway::new()));
    let tab = new_tab();
    let mut body = rating_body("pizza-corner", "Pizza Corner", 5);
    body["couponCode"] = serde_json::json!("PIZ-FORGE");
    submit_rating(&app, &tab, body).await;

    let carried = body_json(get_in(&app, &tab, "/api/v1/session/review").await).await;
    assert!(carried["data"]["review"].get("couponCode").is_none());
}

#[tokio::test]
async fn rating_survives_gateway_outage() {
    let gateway = Arc::new(MemoryGateway::new());
    gateway.fail_next_writes(1);
    let app = common::build_test_app(gateway);
    let tab = new_tab();

    let json = submit_rating(&app, &tab, rating_body("pizza-corner", "Pizza Corner", 5)).await;
    assert!(json["data"].get("reviewId").is_none());

    let response = post_in(&app, &tab, "/api/v1/coupons/issue", None).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

// ---------------------------------------------------------------------------
// Carried submission
// ---------------------------------------------------------------------------

#[tokio::test]
async fn session_review_without_state_redirects() {
    let app = common::build_test_app(Arc::new(MemoryGateway::new()));

    let response = get_in(&app, &new_tab(), "/api/v1/session/review").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/");
}

#[tokio::test]
async fn invalid_session_id_is_rejected() {
    let app = common::build_test_app(Arc::new(MemoryGateway::new()));

    let response = get_in(&app, "not a valid id!", "/api/v1/session/review").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Membership capture
// ---------------------------------------------------------------------------

#[tokio::test]
async fn membership_is_carried_and_stored_on_review() {
    let gateway = Arc::new(MemoryGateway::new());
    let app = common::build_test_app(gateway.clone());
    let tab = new_tab();
    let rating = submit_rating(&app, &tab, rating_body("pizza-corner", "Pizza Corner", 5)).await;
    let review_id = rating["data"]["reviewId"].as_i64().unwrap();

    let response = put_in(
        &app,
        &tab,
        "/api/v1/session/membership",
        serde_json::json!({
            "name": "Asha",
            "phone": "+91 98765 43210",
            "email": "asha@example.com"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["review"]["customer"]["name"], "Asha");

    let stored = gateway.review(review_id).await.unwrap();
    assert_eq!(stored.customer.unwrap().email.as_deref(), Some("asha@example.com"));
}

#[tokio::test]
async fn bad_phone_is_rejected() {
    let app = common::build_test_app(Arc::new(MemoryGateway::new()));
    let tab = new_tab();
    submit_rating(&app, &tab, rating_body("pizza-corner", "Pizza Corner", 5)).await;

    let response = put_in(
        &app,
        &tab,
        "/api/v1/session/membership",
        serde_json::json!({ "name": "Asha", "phone": "call me" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn membership_without_review_redirects() {
    let app = common::build_test_app(Arc::new(MemoryGateway::new()));

    let response = put_in(
        &app,
        &new_tab(),
        "/api/v1/session/membership",
        serde_json::json!({ "name": "Asha" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

// ---------------------------------------------------------------------------
// Private feedback
// ---------------------------------------------------------------------------

#[tokio::test]
async fn private_feedback_is_stored_and_clears_the_session() {
    let gateway = Arc::new(MemoryGateway::new());
    let app = common::build_test_app(gateway.clone());
    let tab = new_tab();
    submit_rating(&app, &tab, rating_body("pizza-corner", "Pizza Corner", 2)).await;

    let response = post_in(
        &app,
        &tab,
        "/api/v1/private-feedback",
        Some(serde_json::json!({ "message": "The pizza arrived cold." })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let stored = gateway.private_feedback().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].rating, 2);
    assert_eq!(stored[0].message, "The pizza arrived cold.");

    let response = get_in(&app, &tab, "/api/v1/session/review").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = post_in(&app, &tab, "/api/v1/coupons/issue", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn private_feedback_without_draft_redirects() {
    let app = common::build_test_app(Arc::new(MemoryGateway::new()));
    let tab = new_tab();
    submit_rating(&app, &tab, rating_body("pizza-corner", "Pizza Corner", 5)).await;

    let response = post_in(
        &app,
        &tab,
        "/api/v1/private-feedback",
        Some(serde_json::json!({ "message": "hello" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn blank_private_feedback_is_rejected_and_draft_kept() {
    let gateway = Arc::new(MemoryGateway::new());
    let app = common::build_test_app(gateway.clone());
    let tab = new_tab();
    submit_rating(&app, &tab, rating_body("pizza-corner", "Pizza Corner", 1)).await;

    let response = post_in(
        &app,
        &tab,
        "/api/v1/private-feedback",
        Some(serde_json::json!({ "message": "   " })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(gateway.private_feedback().await.is_empty());

    let response = get_in(&app, &tab, "/api/v1/session/review").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn private_feedback_outage_is_503_and_retryable() {
    let gateway = Arc::new(MemoryGateway::new());
    let app = common::build_test_app(gateway.clone());
    let tab = new_tab();
    submit_rating(&app, &tab, rating_body("pizza-corner", "Pizza Corner", 3)).await;

    gateway.fail_next_writes(1);
    let body = serde_json::json!({ "message": "Too noisy." });
    let response = post_in(&app, &tab, "/api/v1/private-feedback", Some(body.clone())).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = post_in(&app, &tab, "/api/v1/private-feedback", Some(body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}
