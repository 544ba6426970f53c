use axum::routing::{get, post};
use axum::Router;

use crate::handlers::fsr;
use crate::state::AppState;

/// FSR routes mounted at `/fsr`.
///
/// ```text
/// GET  /{id}              -> get_fsr
/// POST /{id}/onboardings  -> onboard_business
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(fsr::get_fsr))
        .route("/{id}/onboardings", post(fsr::onboard_business))
}
