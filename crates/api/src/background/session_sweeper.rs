//! Periodic removal of idle tab relays.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::session::SessionStore;

/// Upper bound on how often the sweep runs.
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Run the sweep loop until `cancel` is triggered.
///
/// Sweeps at the session TTL or once a minute, whichever is shorter.
pub async fn run(sessions: Arc<SessionStore>, cancel: CancellationToken) {
    let period = sessions
        .ttl()
        .min(MAX_SWEEP_INTERVAL)
        .max(Duration::from_secs(1));

    tracing::info!(
        ttl_secs = sessions.ttl().as_secs(),
        interval_secs = period.as_secs(),
        "Session sweeper started"
    );

    let mut interval = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session sweeper stopping");
                break;
            }
            _ = interval.tick() => {
                let dropped = sessions.sweep_idle().await;
                if dropped > 0 {
                    tracing::info!(dropped, "Session sweeper: dropped idle relays");
                } else {
                    tracing::debug!("Session sweeper: nothing idle");
                }
            }
        }
    }
}
