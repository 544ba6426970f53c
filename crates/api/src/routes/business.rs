use axum::routing::get;
use axum::Router;

use crate::handlers::business;
use crate::state::AppState;

/// Business routes mounted at `/businesses`.
///
/// ```text
/// GET /{slug} -> get_business
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{slug}", get(business::get_business))
}
