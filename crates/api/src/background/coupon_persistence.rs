//! Coupon persistence worker.
//!
//! Issuance hands every not-yet-confirmed coupon to this worker and
//! answers the request without waiting. The worker writes the coupon
//! through the gateway with the configured retry policy. On success it
//! marks `couponPersisted` in the tab's relay and records the code on the
//! underlying review. A terminal failure is logged and nothing else
//! happens: the customer keeps the coupon they were shown.

use std::sync::Arc;

use rankbag_core::coupon::Coupon;
use rankbag_core::feedback::ReviewUpdate;
use rankbag_core::gateway::PersistenceGateway;
use rankbag_core::issuance::{mark_persisted, persist_with_retry, RetryPolicy};
use rankbag_core::types::DbId;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::session::SessionStore;

/// Jobs buffered before issuance starts dropping hand-offs.
pub const QUEUE_CAPACITY: usize = 256;

/// One coupon waiting to be written.
#[derive(Debug, Clone)]
pub struct PersistJob {
    /// Tab that issued the coupon.
    pub session_id: String,
    pub review_id: Option<DbId>,
    pub coupon: Coupon,
}

/// Sending half of the persistence queue.
#[derive(Debug, Clone)]
pub struct PersistQueue {
    tx: mpsc::Sender<PersistJob>,
}

impl PersistQueue {
    /// Create a bounded queue and the receiver the worker consumes.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<PersistJob>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Hand a job to the worker without waiting. Returns `false` if the
    /// queue is full or the worker has stopped; the coupon is then only
    /// redeemable through the catalog until the tab re-issues it.
    pub fn enqueue(&self, job: PersistJob) -> bool {
        let code = job.coupon.code.clone();
        match self.tx.try_send(job) {
            Ok(()) => {
                tracing::debug!(code = %code, "Coupon queued for persistence");
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(code = %code, "Coupon persistence queue full, write skipped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!(code = %code, "Coupon persistence worker stopped, write skipped");
                false
            }
        }
    }
}

/// Run the worker until `cancel` is triggered or every sender is gone.
///
/// Jobs run concurrently so one coupon's backoff never delays another.
/// On shutdown the worker stops taking jobs and waits for in-flight
/// writes to finish.
pub async fn run(
    gateway: Arc<dyn PersistenceGateway>,
    sessions: Arc<SessionStore>,
    policy: RetryPolicy,
    mut jobs: mpsc::Receiver<PersistJob>,
    cancel: CancellationToken,
) {
    tracing::info!(
        max_attempts = policy.max_attempts(),
        "Coupon persistence worker started"
    );

    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Coupon persistence worker stopping");
                break;
            }
            job = jobs.recv() => {
                let Some(job) = job else {
                    tracing::info!("Coupon persistence queue closed");
                    break;
                };
                in_flight.spawn(persist_one(
                    Arc::clone(&gateway),
                    Arc::clone(&sessions),
                    policy.clone(),
                    job,
                ));
            }
            Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
        }
    }

    let pending = in_flight.len();
    if pending > 0 {
        tracing::info!(pending, "Waiting for in-flight coupon writes");
    }
    while in_flight.join_next().await.is_some() {}
}

async fn persist_one(
    gateway: Arc<dyn PersistenceGateway>,
    sessions: Arc<SessionStore>,
    policy: RetryPolicy,
    job: PersistJob,
) {
    let code = job.coupon.code.as_str();

    let attempts = match persist_with_retry(&*gateway, &job.coupon, &policy).await {
        Ok(attempts) => attempts,
        Err(e) => {
            tracing::error!(
                code = %code,
                business_id = %job.coupon.business_id,
                error = %e,
                "Coupon persistence failed; coupon is displayed but not stored",
            );
            return;
        }
    };

    tracing::info!(code = %code, attempts, "Coupon persisted");

    match sessions
        .with_existing_relay(&job.session_id, |relay| mark_persisted(relay, code))
        .await
    {
        Some(Ok(true)) => {}
        Some(Ok(false)) | None => {
            tracing::debug!(code = %code, "Session moved on before persistence finished");
        }
        Some(Err(e)) => {
            tracing::warn!(code = %code, error = %e, "Could not mark coupon as persisted");
        }
    }

    if let Some(review_id) = job.review_id {
        let update = ReviewUpdate {
            coupon_code: Some(code.to_string()),
            customer: None,
        };
        if let Err(e) = gateway.update_review(review_id, &update).await {
            tracing::warn!(
                code = %code,
                review_id,
                error = %e,
                "Could not link coupon to review",
            );
        }
    }
}
