//! Integration tests for `POST /api/v1/coupons/issue`.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{
    body_bytes, body_json, eventually, get_in, new_tab, post_in, rating_body, submit_rating,
};
use rankbag_core::coupon::is_well_formed_code;
use rankbag_core::gateway::MemoryGateway;

const ISSUE: &str = "/api/v1/coupons/issue";

// ---------------------------------------------------------------------------
// Missing state
// ---------------------------------------------------------------------------

#[tokio::test]
async fn issue_without_review_data_redirects_to_entry() {
    let gateway = Arc::new(MemoryGateway::new());
    let app = common::build_test_app(gateway.clone());

    let response = post_in(&app, &new_tab(), ISSUE, None).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/");
    assert!(body_bytes(response).await.is_empty());
    assert!(gateway.coupons().await.is_empty());
}

#[tokio::test]
async fn issue_without_session_header_is_bad_request() {
    let app = common::build_test_app(Arc::new(MemoryGateway::new()));

    let response = common::post_json(&app, ISSUE, serde_json::json!({})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Issuance
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_issue_creates_catalog_coupon() {
    let app = common::build_test_app(Arc::new(MemoryGateway::new()));
    let tab = new_tab();
    submit_rating(&app, &tab, rating_body("pizza-corner", "Pizza Corner", 5)).await;

    let response = post_in(&app, &tab, ISSUE, None).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let data = &json["data"];
    let code = data["coupon"]["code"].as_str().unwrap();
    assert!(is_well_formed_code(code), "unexpected code {code}");
    assert!(code.starts_with("PIZ-"));
    assert_eq!(data["offer"]["title"], "FREE Garlic Bread");
    assert_eq!(data["coupon"]["businessName"], "Pizza Corner");
    assert_eq!(data["newlyIssued"], true);
    assert_eq!(
        data["redeemUrl"],
        format!("{}/redeem/{code}", common::PUBLIC_ORIGIN)
    );
    let qr = data["qrImageUrl"].as_str().unwrap();
    assert!(qr.starts_with(common::QR_SERVICE_URL));
    assert!(qr.contains("size=240x240"));
}

#[tokio::test]
async fn reissue_in_same_tab_reuses_the_code() {
    let app = common::build_test_app(Arc::new(MemoryGateway::new()));
    let tab = new_tab();
    submit_rating(&app, &tab, rating_body("rajs-salon", "Raj's Salon", 5)).await;

    let first = body_json(post_in(&app, &tab, ISSUE, None).await).await;

    let response = post_in(&app, &tab, ISSUE, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let second = body_json(response).await;

    assert_eq!(first["data"]["coupon"]["code"], second["data"]["coupon"]["code"]);
    assert_eq!(
        first["data"]["coupon"]["issuedAt"],
        second["data"]["coupon"]["issuedAt"]
    );
    assert_eq!(second["data"]["newlyIssued"], false);
}

#[tokio::test]
async fn tabs_get_separate_coupons() {
    let app = common::build_test_app(Arc::new(MemoryGateway::new()));
    let (tab_a, tab_b) = (new_tab(), new_tab());
    submit_rating(&app, &tab_a, rating_body("pizza-corner", "Pizza Corner", 5)).await;

    let response = post_in(&app, &tab_b, ISSUE, None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = post_in(&app, &tab_a, ISSUE, None).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn new_rating_starts_a_new_coupon() {
    let app = common::build_test_app(Arc::new(MemoryGateway::new()));
    let tab = new_tab();

    submit_rating(&app, &tab, rating_body("pizza-corner", "Pizza Corner", 5)).await;
    let first = body_json(post_in(&app, &tab, ISSUE, None).await).await;

    submit_rating(&app, &tab, rating_body("fitzone-gym", "FitZone Gym", 4)).await;
    let response = post_in(&app, &tab, ISSUE, None).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let second = body_json(response).await;

    assert_ne!(first["data"]["coupon"]["code"], second["data"]["coupon"]["code"]);
    assert_eq!(second["data"]["offer"]["title"], "1 Week Free Pass");
}

#[tokio::test]
async fn unknown_business_gets_default_offer() {
    let app = common::build_test_app(Arc::new(MemoryGateway::new()));
    let tab = new_tab();
    submit_rating(&app, &tab, rating_body("tonys-tacos", "Tony's Tacos", 5)).await;

    let json = body_json(post_in(&app, &tab, ISSUE, None).await).await;

    assert_eq!(json["data"]["offer"]["title"], "10% Off Your Next Visit");
    assert!(json["data"]["coupon"]["code"]
        .as_str()
        .unwrap()
        .starts_with("TON-"));
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn coupon_is_persisted_once_and_linked_to_review() {
    let gateway = Arc::new(MemoryGateway::new());
    let app = common::build_test_app(gateway.clone());
    let tab = new_tab();
    let rating = submit_rating(&app, &tab, rating_body("pizza-corner", "Pizza Corner", 5)).await;
    let review_id = rating["data"]["reviewId"].as_i64().unwrap();

    let issued = body_json(post_in(&app, &tab, ISSUE, None).await).await;
    let code = issued["data"]["coupon"]["code"].as_str().unwrap().to_string();

    let gw = gateway.clone();
    let expected = code.clone();
    eventually(|| {
        let gw = gw.clone();
        let expected = expected.clone();
        async move { gw.review(review_id).await.and_then(|r| r.coupon_code) == Some(expected) }
    })
    .await;

    // A re-display after confirmation reports it and writes nothing new.
    let again = body_json(post_in(&app, &tab, ISSUE, None).await).await;
    assert_eq!(again["data"]["persisted"], true);

    let coupons = gateway.coupons().await;
    assert_eq!(coupons.len(), 1);
    assert_eq!(coupons[0].code, code);
    assert_eq!(coupons[0].offer_title, "FREE Garlic Bread");
}

#[tokio::test]
async fn persistence_failure_still_displays_the_coupon() {
    let gateway = Arc::new(MemoryGateway::new());
    let app = common::build_test_app(gateway.clone());
    let tab = new_tab();
    submit_rating(&app, &tab, rating_body("pizza-corner", "Pizza Corner", 5)).await;

    // Enough failures to exhaust every retry of the first hand-off.
    gateway.fail_next_writes(4);
    let response = post_in(&app, &tab, ISSUE, None).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let first = body_json(response).await;
    assert_eq!(first["data"]["persisted"], false);

    let gw = gateway.clone();
    eventually(|| {
        let gw = gw.clone();
        async move { gw.pending_write_failures() == 0 }
    })
    .await;
    assert!(gateway.coupons().await.is_empty());

    let carried = body_json(get_in(&app, &tab, "/api/v1/session/review").await).await;
    assert_eq!(carried["data"]["review"]["couponPersisted"], false);

    // The next display hands the same coupon over again and it sticks.
    let second = body_json(post_in(&app, &tab, ISSUE, None).await).await;
    assert_eq!(first["data"]["coupon"]["code"], second["data"]["coupon"]["code"]);

    let gw = gateway.clone();
    eventually(|| {
        let gw = gw.clone();
        async move { gw.coupons().await.len() == 1 }
    })
    .await;
}

#[tokio::test]
async fn session_review_reflects_issued_code() {
    let app = common::build_test_app(Arc::new(MemoryGateway::new()));
    let tab = new_tab();
    submit_rating(&app, &tab, rating_body("brew-haven-cafe", "Brew Haven Cafe", 5)).await;

    let issued = body_json(post_in(&app, &tab, ISSUE, None).await).await;
    let carried = body_json(get_in(&app, &tab, "/api/v1/session/review").await).await;

    assert_eq!(
        carried["data"]["review"]["couponCode"],
        issued["data"]["coupon"]["code"]
    );
}
