use axum::routing::post;
use axum::Router;

use crate::handlers::private_feedback;
use crate::state::AppState;

/// Private feedback routes mounted at `/private-feedback`.
///
/// ```text
/// POST / -> submit_private_feedback
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(private_feedback::submit_private_feedback))
}
