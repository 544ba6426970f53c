use axum::routing::get;
use axum::Router;

use crate::handlers::redemption;
use crate::state::AppState;

/// Redemption routes mounted at `/redeem`.
///
/// ```text
/// GET /        -> redeem_missing
/// GET /{code}  -> redeem_code
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(redemption::redeem_missing))
        .route("/{code}", get(redemption::redeem_code))
}
