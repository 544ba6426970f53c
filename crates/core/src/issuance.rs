//! Coupon issuance flow.
//!
//! Issuance runs in two phases:
//!
//! 1. [`issue_locally`] reads the feedback submission from the session
//!    relay, reuses a previously issued code or mints a new one, caches the
//!    code back into the relay, and returns everything needed to display
//!    the coupon. It never touches the network and never fails for a
//!    missing session (that is the `Aborted` outcome).
//! 2. [`persist_with_retry`] writes the coupon through the persistence
//!    gateway. It is run off the request path; a terminal failure leaves a
//!    displayed coupon that only the catalog fallback can redeem.

use std::time::Duration;

use chrono::SubsecRound;
use serde::Serialize;

use crate::coupon::{self, Coupon};
use crate::error::CoreError;
use crate::feedback::FeedbackSubmission;
use crate::gateway::{GatewayError, PersistenceGateway};
use crate::offer::{select_offer, Offer};
use crate::session::{self, SessionRelay, ENTRY_ROUTE, KEY_REVIEW_DATA, KEY_REVIEW_ID};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Phase 1: local issuance
// ---------------------------------------------------------------------------

/// Environment for one issuance.
#[derive(Debug, Clone, Copy)]
pub struct IssuanceContext<'a> {
    /// Public origin the redemption URL is built on.
    pub origin: &'a str,
    /// Base URL of the external QR image service.
    pub qr_service_url: &'a str,
    pub now: Timestamp,
}

/// A coupon ready to display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedCoupon {
    pub coupon: Coupon,
    pub offer: Offer,
    /// QR payload: `{origin}/redeem/{code}`.
    pub redeem_url: String,
    pub qr_image_url: String,
    /// `false` when an earlier issuance was reused.
    pub newly_issued: bool,
    /// Whether the gateway has confirmed the write.
    pub persisted: bool,
    /// Review record the coupon belongs to, if the rating step stored one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_id: Option<DbId>,
}

#[derive(Debug, Clone)]
pub enum IssuanceOutcome {
    /// No submission in the relay; the caller redirects without rendering.
    Aborted { redirect_to: &'static str },
    Issued(IssuedCoupon),
}

/// Run the load, resolve, and generate steps of issuance.
///
/// Reads `reviewData` and `reviewId`; writes `reviewData` when a code is
/// minted so later calls for the same session reuse it.
pub fn issue_locally<R>(
    relay: &mut R,
    ctx: &IssuanceContext<'_>,
) -> Result<IssuanceOutcome, CoreError>
where
    R: SessionRelay + ?Sized,
{
    let Some(mut submission) = session::read::<FeedbackSubmission, _>(&*relay, KEY_REVIEW_DATA)?
    else {
        return Ok(IssuanceOutcome::Aborted {
            redirect_to: ENTRY_ROUTE,
        });
    };
    let review_id: Option<DbId> = session::read(&*relay, KEY_REVIEW_ID)?;

    let offer = submission.offer.clone().unwrap_or_else(|| {
        select_offer(
            Some(submission.business_id.as_str()),
            submission.business_name.as_deref(),
        )
    });

    let newly_issued = submission.coupon_code.is_none();
    let mut dirty = false;

    let code = match submission.coupon_code.clone() {
        Some(code) => code,
        None => {
            let code = coupon::generate_code(submission.display_name());
            submission.coupon_code = Some(code.clone());
            submission.coupon_persisted = false;
            dirty = true;
            code
        }
    };

    let issued_at = match submission.coupon_issued_at {
        Some(at) => at,
        None => {
            // Microsecond precision survives a round trip through the store.
            let at = ctx.now.trunc_subsecs(6);
            submission.coupon_issued_at = Some(at);
            dirty = true;
            at
        }
    };

    if submission.offer.is_none() {
        submission.offer = Some(offer.clone());
        dirty = true;
    }

    if dirty {
        session::write(relay, KEY_REVIEW_DATA, &submission)?;
    }

    let coupon = Coupon::issue(&submission, &offer, code, issued_at);
    let redeem_url = coupon::redeem_url(ctx.origin, &coupon.code);
    let qr_image_url = coupon::qr_image_url(ctx.qr_service_url, &redeem_url);

    Ok(IssuanceOutcome::Issued(IssuedCoupon {
        coupon,
        offer,
        redeem_url,
        qr_image_url,
        newly_issued,
        persisted: submission.coupon_persisted,
        review_id,
    }))
}

/// Record in the relay that the gateway confirmed `code`.
///
/// Returns `false` when the relay no longer carries that code (the tab
/// moved on or started over).
pub fn mark_persisted<R>(relay: &mut R, code: &str) -> Result<bool, CoreError>
where
    R: SessionRelay + ?Sized,
{
    let Some(mut submission) = session::read::<FeedbackSubmission, _>(&*relay, KEY_REVIEW_DATA)?
    else {
        return Ok(false);
    };
    if submission.coupon_code.as_deref() != Some(code) {
        return Ok(false);
    }
    submission.coupon_persisted = true;
    session::write(relay, KEY_REVIEW_DATA, &submission)?;
    Ok(true)
}

// ---------------------------------------------------------------------------
// Phase 2: persistence
// ---------------------------------------------------------------------------

/// Backoff schedule for coupon writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before each retry; the number of attempts is `delays.len() + 1`.
    pub delays: Vec<Duration>,
}

impl RetryPolicy {
    /// Single attempt, no retries.
    pub fn none() -> Self {
        Self { delays: Vec::new() }
    }

    pub fn max_attempts(&self) -> usize {
        self.delays.len() + 1
    }
}

impl Default for RetryPolicy {
    /// Exponential backoff: 1 s, 2 s, 4 s.
    fn default() -> Self {
        Self {
            delays: [1, 2, 4].into_iter().map(Duration::from_secs).collect(),
        }
    }
}

/// Write a coupon through the gateway, retrying transient failures.
///
/// Returns the number of attempts it took. Conflicts and other
/// non-transient errors are returned immediately.
pub async fn persist_with_retry(
    gateway: &dyn PersistenceGateway,
    coupon: &Coupon,
    policy: &RetryPolicy,
) -> Result<usize, GatewayError> {
    let mut attempt = 1;
    loop {
        match gateway.create_coupon(coupon).await {
            Ok(()) => return Ok(attempt),
            Err(GatewayError::Unavailable(_)) if attempt <= policy.delays.len() => {
                tokio::time::sleep(policy.delays[attempt - 1]).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
