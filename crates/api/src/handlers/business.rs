//! Handler for the customer-facing business landing data.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use rankbag_core::fsr::Business;
use rankbag_core::gateway::GatewayError;
use rankbag_core::offer::{select_offer, Offer};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// A business as the feedback wizard sees it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessProfile {
    #[serde(flatten)]
    pub business: Business,
    pub google_review_url: Option<String>,
    /// The reward a positive review earns here.
    pub offer: Offer,
}

/// GET /api/v1/businesses/{slug}
pub async fn get_business(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let business = state
        .gateway
        .find_business(&slug)
        .await?
        .ok_or_else(|| {
            AppError::Gateway(GatewayError::NotFound {
                entity: "Business",
                key: slug.clone(),
            })
        })?;

    let profile = BusinessProfile {
        google_review_url: business.google_review_url(),
        offer: select_offer(Some(business.slug.as_str()), Some(business.name.as_str())),
        business,
    };

    Ok(Json(DataResponse { data: profile }))
}
