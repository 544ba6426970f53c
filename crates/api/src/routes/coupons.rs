use axum::routing::post;
use axum::Router;

use crate::handlers::coupons;
use crate::state::AppState;

/// Coupon routes mounted at `/coupons`.
///
/// ```text
/// POST /issue -> issue_coupon
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/issue", post(coupons::issue_coupon))
}
