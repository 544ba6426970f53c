//! Session relay: transient per-tab key-value state carried between
//! wizard steps.
//!
//! Each step names the keys it reads and writes; the relay itself is an
//! explicit value handed to the step rather than ambient storage.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Feedback submission plus in-progress coupon fields.
pub const KEY_REVIEW_DATA: &str = "reviewData";
/// Gateway record id of the stored review.
pub const KEY_REVIEW_ID: &str = "reviewId";
/// Negative-feedback draft; never a coupon input.
pub const KEY_PRIVATE_FEEDBACK: &str = "privateFeedback";

/// Route every step redirects to when its state is missing.
pub const ENTRY_ROUTE: &str = "/";

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// Key-value storage scoped to one browser tab.
pub trait SessionRelay {
    fn put(&mut self, key: &str, value: serde_json::Value);
    fn get(&self, key: &str) -> Option<serde_json::Value>;
    fn remove(&mut self, key: &str) -> Option<serde_json::Value>;
}

/// Read and deserialize a value. Absent keys give `Ok(None)`.
pub fn read<T, R>(relay: &R, key: &str) -> Result<Option<T>, CoreError>
where
    T: DeserializeOwned,
    R: SessionRelay + ?Sized,
{
    relay
        .get(key)
        .map(serde_json::from_value)
        .transpose()
        .map_err(CoreError::from)
}

/// Serialize and store a value.
pub fn write<T, R>(relay: &mut R, key: &str, value: &T) -> Result<(), CoreError>
where
    T: Serialize,
    R: SessionRelay + ?Sized,
{
    relay.put(key, serde_json::to_value(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// In-memory relay
// ---------------------------------------------------------------------------

/// Relay backed by a `HashMap`.
#[derive(Debug, Clone, Default)]
pub struct MemoryRelay {
    entries: HashMap<String, serde_json::Value>,
}

impl MemoryRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionRelay for MemoryRelay {
    fn put(&mut self, key: &str, value: serde_json::Value) {
        self.entries.insert(key.to_string(), value);
    }

    fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.entries.get(key).cloned()
    }

    fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.entries.remove(key)
    }
}
