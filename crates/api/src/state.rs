use std::sync::Arc;

use rankbag_core::gateway::PersistenceGateway;

use crate::background::coupon_persistence::PersistQueue;
use crate::config::ServerConfig;
use crate::session::SessionStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every field is behind an `Arc` or is a channel handle.
#[derive(Clone)]
pub struct AppState {
    /// Record store: Postgres when `DATABASE_URL` is set, in-memory otherwise.
    pub gateway: Arc<dyn PersistenceGateway>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Per-tab session relays.
    pub sessions: Arc<SessionStore>,
    /// Hand-off to the coupon persistence worker.
    pub persist_queue: PersistQueue,
}
