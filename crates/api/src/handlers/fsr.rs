//! Handlers for field sales representatives.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use rankbag_core::error::CoreError;
use rankbag_core::fsr::{NewBusiness, Onboarding};
use rankbag_core::types::DbId;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingResponse {
    #[serde(flatten)]
    pub onboarding: Onboarding,
    /// Link to print on the business's review QR stand.
    pub google_review_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// GET /api/v1/fsr/{id}
///
/// An FSR account with its current points balance.
pub async fn get_fsr(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let account = state
        .gateway
        .find_fsr(id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "FsrAccount",
            id,
        }))?;

    Ok(Json(DataResponse { data: account }))
}

// ---------------------------------------------------------------------------
// Onboarding
// ---------------------------------------------------------------------------

/// POST /api/v1/fsr/{id}/onboardings
///
/// Register a business on behalf of the FSR and credit their points.
/// The slug is derived from the name unless given. A taken slug is 409.
pub async fn onboard_business(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<NewBusiness>,
) -> AppResult<impl IntoResponse> {
    let slug = input.check()?;
    let onboarding = state.gateway.onboard_business(id, &slug, &input).await?;

    tracing::info!(
        fsr_id = id,
        slug = %onboarding.business.slug,
        points_awarded = onboarding.points_awarded,
        total_points = onboarding.total_points,
        "Business onboarded",
    );

    let google_review_url = onboarding.business.google_review_url();
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: OnboardingResponse {
                onboarding,
                google_review_url,
            },
        }),
    ))
}
