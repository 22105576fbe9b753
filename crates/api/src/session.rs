//! One-shot values kept between two requests of the same candidate.
//!
//! Entries are written once and consumed by the first read, so the UI
//! behavior they trigger (a notice, access to a confirmation page) cannot
//! be replayed.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::RwLock;

/// The context in which an application was just submitted.
pub const PROPOSITION_JUST_SUBMITTED: &str = "proposition_just_submitted";
/// `after-submission` or `after-request` once fees are paid.
pub const PAYMENT_COMPLETED: &str = "payment_completed";
/// Uuid of the admission whose requested documents were just sent.
pub const ADMISSION_CONFIRM_DOCUMENTS: &str = "admission_confirm_documents";

pub const PAYMENT_AFTER_SUBMISSION: &str = "after-submission";
pub const PAYMENT_AFTER_REQUEST: &str = "after-request";

/// Lifetime of an entry nobody consumed (default: 15 minutes).
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(15 * 60);

/// Per-candidate one-shot entries, keyed by global id.
///
/// Entries older than the store's time to live are never returned and are
/// purged on the next write, so abandoned notices do not pile up.
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc`.
pub struct SessionStore {
    entries: RwLock<HashMap<String, HashMap<&'static str, Entry>>>,
    ttl: Duration,
}

struct Entry {
    value: Value,
    stored_at: Instant,
}

impl Entry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() >= ttl
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Store `value` under `key`, replacing a value not consumed yet.
    pub async fn put(&self, candidate: &str, key: &'static str, value: Value) {
        let mut entries = self.entries.write().await;
        let ttl = self.ttl;
        entries.retain(|_, session| {
            session.retain(|_, entry| !entry.is_expired(ttl));
            !session.is_empty()
        });
        entries.entry(candidate.to_string()).or_default().insert(
            key,
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Take the value stored under `key`, if any and not expired.
    pub async fn pop(&self, candidate: &str, key: &str) -> Option<Value> {
        let mut entries = self.entries.write().await;
        let session = entries.get_mut(candidate)?;
        let entry = session.remove(key);
        if session.is_empty() {
            entries.remove(candidate);
        }
        entry
            .filter(|entry| !entry.is_expired(self.ttl))
            .map(|entry| entry.value)
    }

    /// Number of candidates with pending entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn values_are_popped_once() {
        let store = SessionStore::new();
        store.put("cand-1", PAYMENT_COMPLETED, json!(PAYMENT_AFTER_REQUEST)).await;

        assert_eq!(
            store.pop("cand-1", PAYMENT_COMPLETED).await,
            Some(json!(PAYMENT_AFTER_REQUEST))
        );
        assert_eq!(store.pop("cand-1", PAYMENT_COMPLETED).await, None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn candidates_are_isolated() {
        let store = SessionStore::new();
        store.put("cand-1", PROPOSITION_JUST_SUBMITTED, json!("doctorate")).await;

        assert_eq!(store.pop("cand-2", PROPOSITION_JUST_SUBMITTED).await, None);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn expired_values_are_never_returned() {
        let store = SessionStore::with_ttl(Duration::ZERO);
        store.put("cand-1", PAYMENT_COMPLETED, json!(PAYMENT_AFTER_REQUEST)).await;

        assert_eq!(store.pop("cand-1", PAYMENT_COMPLETED).await, None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn abandoned_values_are_purged_on_write() {
        let store = SessionStore::with_ttl(Duration::ZERO);
        store.put("cand-1", PROPOSITION_JUST_SUBMITTED, json!("doctorate")).await;
        store.put("cand-2", PROPOSITION_JUST_SUBMITTED, json!("doctorate")).await;

        assert_eq!(store.len().await, 1);
    }
}
