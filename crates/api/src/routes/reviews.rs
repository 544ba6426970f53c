use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::reviews;
use crate::state::AppState;

/// Feedback wizard routes, merged at the `/api/v1` root.
///
/// ```text
/// POST /reviews              -> submit_rating
/// GET  /session/review       -> get_session_review
/// PUT  /session/membership   -> update_membership
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reviews", post(reviews::submit_rating))
        .route("/session/review", get(reviews::get_session_review))
        .route("/session/membership", put(reviews::update_membership))
}
