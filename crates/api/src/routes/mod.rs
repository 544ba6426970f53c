pub mod business;
pub mod coupons;
pub mod fsr;
pub mod health;
pub mod private_feedback;
pub mod redemption;
pub mod reviews;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /reviews                       submit rating step (POST)
/// /session/review                carried submission (GET)
/// /session/membership            capture contact details (PUT)
///
/// /coupons/issue                 issue or re-display coupon (POST)
///
/// /redeem                        redeem without a code (GET)
/// /redeem/{code}                 redeem a scanned code (GET)
///
/// /private-feedback              submit private feedback (POST)
///
/// /businesses/{slug}             business landing data (GET)
///
/// /fsr/{id}                      FSR account and points (GET)
/// /fsr/{id}/onboardings          onboard a business (POST)
/// ```
///
/// Wizard routes require the `x-session-id` header.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Feedback wizard steps.
        .merge(reviews::router())
        // Coupon issuance.
        .nest("/coupons", coupons::router())
        // Coupon redemption.
        .nest("/redeem", redemption::router())
        // Negative-feedback path.
        .nest("/private-feedback", private_feedback::router())
        // Business landing data.
        .nest("/businesses", business::router())
        // Field sales representatives.
        .nest("/fsr", fsr::router())
}
