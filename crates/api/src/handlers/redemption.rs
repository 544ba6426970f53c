//! Handlers for coupon redemption.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use rankbag_core::redemption::{redeem, Redemption};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/redeem/{code}
///
/// Verify a scanned code. The response arrives after the configured
/// verification delay and is always 200; the `state` field says whether
/// the coupon is `valid` or `invalid`.
pub async fn redeem_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let redemption = run_redemption(&state, Some(&code)).await;
    Ok(Json(DataResponse { data: redemption }))
}

/// GET /api/v1/redeem
///
/// A scan without a code. Always resolves to `invalid`.
pub async fn redeem_missing(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let redemption = run_redemption(&state, None).await;
    Ok(Json(DataResponse { data: redemption }))
}

async fn run_redemption(state: &AppState, code: Option<&str>) -> Redemption {
    let report = redeem(
        &*state.gateway,
        code,
        state.config.redeem_verify_delay(),
        Utc::now(),
    )
    .await;

    if let Some(e) = &report.lookup_error {
        tracing::warn!(
            code = code.unwrap_or_default(),
            error = %e,
            "Coupon lookup failed, falling back to catalog",
        );
    }

    match &report.redemption {
        Redemption::Valid {
            code,
            basis,
            expired,
            well_formed,
            ..
        } => tracing::info!(
            code = %code,
            basis = ?basis,
            expired,
            well_formed,
            "Coupon redeemed as valid",
        ),
        Redemption::Invalid { .. } => tracing::info!("Redemption without a code"),
    }

    report.redemption
}
