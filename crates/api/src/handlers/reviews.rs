//! Handlers for the feedback wizard: the rating step, reading the carried
//! submission, and membership capture.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use rankbag_core::error::CoreError;
use rankbag_core::feedback::{
    compose_review_text, validate_membership, FeedbackSubmission, MembershipDetails,
    PrivateFeedbackDraft, ReviewRoute, ReviewUpdate,
};
use rankbag_core::session::{
    self, SessionRelay, ENTRY_ROUTE, KEY_PRIVATE_FEEDBACK, KEY_REVIEW_DATA, KEY_REVIEW_ID,
};
use rankbag_core::types::DbId;
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::session::SessionTab;
use crate::state::AppState;

/// What the client needs to render the step after the rating.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingOutcome {
    pub route: ReviewRoute,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_id: Option<DbId>,
    /// Suggested text to paste into Google. Only for the Google route.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_review_url: Option<String>,
}

/// The submission a tab is carrying.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReview {
    pub review: FeedbackSubmission,
    pub review_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Rating step
// ---------------------------------------------------------------------------

/// POST /api/v1/reviews
///
/// Store a completed rating step and start a fresh relay for the tab.
/// Ratings of 4 or 5 go to the Google route; lower ratings also get a
/// private feedback draft. Coupon fields sent by the client are ignored.
///
/// A failed review write is logged and the wizard continues without a
/// `reviewId`.
pub async fn submit_rating(
    SessionTab(tab): SessionTab,
    State(state): State<AppState>,
    Json(mut submission): Json<FeedbackSubmission>,
) -> AppResult<impl IntoResponse> {
    submission.clear_coupon_fields();
    submission.check()?;
    let route = submission.route();

    let review_id = match state.gateway.create_review(&submission).await {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::warn!(
                business_id = %submission.business_id,
                error = %e,
                "Review not stored, continuing without a review id",
            );
            None
        }
    };

    state
        .sessions
        .with_relay(&tab, |relay| -> Result<(), CoreError> {
            relay.remove(KEY_REVIEW_ID);
            relay.remove(KEY_PRIVATE_FEEDBACK);
            session::write(relay, KEY_REVIEW_DATA, &submission)?;
            if let Some(id) = review_id {
                session::write(relay, KEY_REVIEW_ID, &id)?;
            }
            if route == ReviewRoute::Private {
                let draft = PrivateFeedbackDraft::from_submission(&submission);
                session::write(relay, KEY_PRIVATE_FEEDBACK, &draft)?;
            }
            Ok(())
        })
        .await?;

    let (review_text, google_review_url) = match route {
        ReviewRoute::Google => (
            Some(compose_review_text(&submission)),
            google_link(&state, &submission.business_id).await,
        ),
        ReviewRoute::Private => (None, None),
    };

    tracing::info!(
        business_id = %submission.business_id,
        rating = submission.rating,
        route = route.as_str(),
        review_id = ?review_id,
        "Rating submitted",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: RatingOutcome {
                route,
                review_id,
                review_text,
                google_review_url,
            },
        }),
    ))
}

/// Google review link for a known business. Lookup failures are logged
/// and leave the link out.
async fn google_link(state: &AppState, business_id: &str) -> Option<String> {
    match state.gateway.find_business(business_id).await {
        Ok(business) => business.and_then(|b| b.google_review_url()),
        Err(e) => {
            tracing::warn!(business_id, error = %e, "Business lookup failed");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Carried submission
// ---------------------------------------------------------------------------

/// GET /api/v1/session/review
///
/// Return the tab's submission, or redirect to the entry route when it
/// has none.
pub async fn get_session_review(
    SessionTab(tab): SessionTab,
    State(state): State<AppState>,
) -> AppResult<Response> {
    let carried = state
        .sessions
        .with_relay(&tab, |relay| -> Result<_, CoreError> {
            let review: Option<FeedbackSubmission> = session::read(&*relay, KEY_REVIEW_DATA)?;
            let review_id: Option<DbId> = session::read(&*relay, KEY_REVIEW_ID)?;
            Ok(review.map(|review| SessionReview { review, review_id }))
        })
        .await?;

    match carried {
        Some(data) => Ok(Json(DataResponse { data }).into_response()),
        None => Ok(Redirect::to(ENTRY_ROUTE).into_response()),
    }
}

// ---------------------------------------------------------------------------
// Membership capture
// ---------------------------------------------------------------------------

/// PUT /api/v1/session/membership
///
/// Attach the customer's contact details to the carried submission and,
/// when the review was stored, to the review record.
pub async fn update_membership(
    SessionTab(tab): SessionTab,
    State(state): State<AppState>,
    Json(details): Json<MembershipDetails>,
) -> AppResult<Response> {
    validate_membership(&details)?;

    let updated = state
        .sessions
        .with_relay(&tab, |relay| -> Result<_, CoreError> {
            let Some(mut review) =
                session::read::<FeedbackSubmission, _>(&*relay, KEY_REVIEW_DATA)?
            else {
                return Ok(None);
            };
            review.customer = Some(details.clone());
            session::write(relay, KEY_REVIEW_DATA, &review)?;
            let review_id: Option<DbId> = session::read(&*relay, KEY_REVIEW_ID)?;
            Ok(Some(SessionReview { review, review_id }))
        })
        .await?;

    let Some(updated) = updated else {
        return Ok(Redirect::to(ENTRY_ROUTE).into_response());
    };

    if let Some(review_id) = updated.review_id {
        let fields = ReviewUpdate {
            coupon_code: None,
            customer: Some(details),
        };
        if let Err(e) = state.gateway.update_review(review_id, &fields).await {
            tracing::warn!(review_id, error = %e, "Membership not stored on review");
        }
    }

    tracing::info!(
        business_id = %updated.review.business_id,
        review_id = ?updated.review_id,
        "Membership captured",
    );

    Ok(Json(DataResponse { data: updated }).into_response())
}
