//! Handler for the negative-feedback path.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use rankbag_core::feedback::{PrivateFeedbackDraft, PrivateFeedbackInput};
use rankbag_core::session::{
    self, SessionRelay, ENTRY_ROUTE, KEY_PRIVATE_FEEDBACK, KEY_REVIEW_DATA, KEY_REVIEW_ID,
};
use rankbag_core::types::DbId;
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::session::SessionTab;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SubmittedFeedback {
    pub id: DbId,
}

/// POST /api/v1/private-feedback
///
/// Send the tab's private feedback draft together with the customer's
/// message to the business owner. Once stored, the tab's relay keys are
/// cleared so the wizard starts over. Without a draft the request is
/// redirected to the entry route.
pub async fn submit_private_feedback(
    SessionTab(tab): SessionTab,
    State(state): State<AppState>,
    Json(input): Json<PrivateFeedbackInput>,
) -> AppResult<Response> {
    let draft = state
        .sessions
        .with_relay(&tab, |relay| {
            session::read::<PrivateFeedbackDraft, _>(&*relay, KEY_PRIVATE_FEEDBACK)
        })
        .await?;

    let Some(draft) = draft else {
        return Ok(Redirect::to(ENTRY_ROUTE).into_response());
    };

    let feedback = draft.complete(input)?;
    let id = state.gateway.create_private_feedback(&feedback).await?;

    state
        .sessions
        .with_relay(&tab, |relay| {
            relay.remove(KEY_PRIVATE_FEEDBACK);
            relay.remove(KEY_REVIEW_DATA);
            relay.remove(KEY_REVIEW_ID);
        })
        .await;

    tracing::info!(
        id,
        business_id = %feedback.business_id,
        rating = feedback.rating,
        "Private feedback submitted",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SubmittedFeedback { id },
        }),
    )
        .into_response())
}
