//! Per-tab session relays.
//!
//! Every browser tab generates an opaque id once and sends it on each
//! request as `x-session-id`. The [`SessionStore`] keeps one
//! [`MemoryRelay`] per id; relays that go idle for longer than the
//! configured TTL are dropped by the sweeper in
//! [`crate::background::session_sweeper`].

use std::collections::HashMap;
use std::time::{Duration, Instant};

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use rankbag_core::session::MemoryRelay;
use tokio::sync::RwLock;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the tab's session id.
pub const SESSION_HEADER: &str = "x-session-id";

/// Longest session id accepted.
pub const MAX_SESSION_ID_LENGTH: usize = 128;

struct TabEntry {
    relay: MemoryRelay,
    last_seen: Instant,
}

/// All live tab relays.
pub struct SessionStore {
    tabs: RwLock<HashMap<String, TabEntry>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            tabs: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Run `f` against the tab's relay, creating an empty relay first if
    /// the tab is new. A relay left empty afterwards is discarded.
    pub async fn with_relay<T>(&self, tab: &str, f: impl FnOnce(&mut MemoryRelay) -> T) -> T {
        let mut tabs = self.tabs.write().await;
        let entry = tabs.entry(tab.to_string()).or_insert_with(|| TabEntry {
            relay: MemoryRelay::new(),
            last_seen: Instant::now(),
        });
        entry.last_seen = Instant::now();
        let out = f(&mut entry.relay);
        if entry.relay.is_empty() {
            tabs.remove(tab);
        }
        out
    }

    /// Like [`with_relay`](Self::with_relay) but never creates a relay.
    /// Returns `None` when the tab has none.
    pub async fn with_existing_relay<T>(
        &self,
        tab: &str,
        f: impl FnOnce(&mut MemoryRelay) -> T,
    ) -> Option<T> {
        let mut tabs = self.tabs.write().await;
        let entry = tabs.get_mut(tab)?;
        Some(f(&mut entry.relay))
    }

    /// Drop relays idle for longer than the TTL. Returns how many went.
    pub async fn sweep_idle(&self) -> usize {
        self.sweep_idle_at(Instant::now()).await
    }

    async fn sweep_idle_at(&self, now: Instant) -> usize {
        let mut tabs = self.tabs.write().await;
        let before = tabs.len();
        tabs.retain(|_, entry| now.saturating_duration_since(entry.last_seen) <= self.ttl);
        before - tabs.len()
    }

    pub async fn len(&self) -> usize {
        self.tabs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tabs.read().await.is_empty()
    }
}

/// The calling tab's session id, taken from the `x-session-id` header.
///
/// ```ignore
/// async fn handler(SessionTab(tab): SessionTab, State(state): State<AppState>) { .. }
/// ```
#[derive(Debug, Clone)]
pub struct SessionTab(pub String);

impl FromRequestParts<AppState> for SessionTab {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::BadRequest(format!("Missing {SESSION_HEADER} header")))?;

        let valid = raw.len() <= MAX_SESSION_ID_LENGTH
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(AppError::BadRequest(format!(
                "Invalid {SESSION_HEADER} header"
            )));
        }

        Ok(SessionTab(raw.to_string()))
    }
}
