//! Handler for coupon issuance.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use chrono::Utc;
use rankbag_core::issuance::{issue_locally, IssuanceContext, IssuanceOutcome};

use crate::background::coupon_persistence::PersistJob;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::session::SessionTab;
use crate::state::AppState;

/// POST /api/v1/coupons/issue
///
/// Issue (or re-display) the coupon for the tab's carried submission.
///
/// - 201 with the coupon when a code was minted by this call.
/// - 200 with the same coupon when the tab already holds a code.
/// - 303 to the entry route, empty body, when there is no submission.
///
/// The response never waits for persistence. Every coupon the gateway
/// has not confirmed yet is handed to the persistence worker; the write
/// is retry-safe, so re-displays simply try again.
pub async fn issue_coupon(
    SessionTab(tab): SessionTab,
    State(state): State<AppState>,
) -> AppResult<Response> {
    let ctx = IssuanceContext {
        origin: &state.config.public_origin,
        qr_service_url: &state.config.qr_service_url,
        now: Utc::now(),
    };

    let outcome = state
        .sessions
        .with_relay(&tab, |relay| issue_locally(relay, &ctx))
        .await?;

    let issued = match outcome {
        IssuanceOutcome::Aborted { redirect_to } => {
            tracing::debug!("No review data in session, redirecting to entry");
            return Ok(Redirect::to(redirect_to).into_response());
        }
        IssuanceOutcome::Issued(issued) => issued,
    };

    if !issued.persisted {
        state.persist_queue.enqueue(PersistJob {
            session_id: tab,
            review_id: issued.review_id,
            coupon: issued.coupon.clone(),
        });
    }

    tracing::info!(
        code = %issued.coupon.code,
        business_id = %issued.coupon.business_id,
        newly_issued = issued.newly_issued,
        persisted = issued.persisted,
        "Coupon displayed",
    );

    let status = if issued.newly_issued {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(DataResponse { data: issued })).into_response())
}
