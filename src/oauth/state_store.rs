//! Single-use OAuth state tokens for CSRF/replay protection.
//!
//! Correlates an outbound authorization redirect with its inbound callback.
//! Entries are read-once and expire after a short TTL; abandoned flows are
//! swept by a background task.

use crate::integrations::Service;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

/// Correlation record stored per outstanding authorization round-trip.
#[derive(Clone, Debug)]
pub struct StateEntry {
    pub service: Service,
    pub user_id: String,
    pub issued_at: DateTime<Utc>,
}

/// In-memory state token store with read-once semantics.
#[derive(Clone)]
pub struct StateStore {
    entries: Arc<Mutex<HashMap<String, StateEntry>>>,
    ttl: Duration,
}

impl StateStore {
    /// Create a store whose entries expire after `ttl_seconds`.
    pub fn new(ttl_seconds: i64) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    /// Mint an unguessable state token and record the correlation entry.
    pub fn put(&self, service: Service, user_id: &str) -> String {
        let token = mint_token();
        let entry = StateEntry {
            service,
            user_id: user_id.to_string(),
            issued_at: Utc::now(),
        };

        let mut entries = self.entries.lock().unwrap();
        entries.insert(token.clone(), entry);

        token
    }

    /// Remove and return the entry for `token`, if present and unexpired.
    ///
    /// The entry is deleted whether or not it has expired, so a token can
    /// never be presented twice.
    pub fn take(&self, token: &str) -> Option<StateEntry> {
        let mut entries = self.entries.lock().unwrap();
        let entry = entries.remove(token)?;

        if Utc::now() - entry.issued_at > self.ttl {
            return None;
        }

        Some(entry)
    }

    /// Drop expired entries. Called periodically by [`run_state_sweep`].
    pub fn sweep(&self) {
        let mut entries = self.entries.lock().unwrap();
        let now = Utc::now();
        entries.retain(|_, entry| now - entry.issued_at <= self.ttl);
    }

    /// Number of outstanding entries.
    pub fn count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

/// 16 random bytes, hex-encoded.
fn mint_token() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    let mut token = String::with_capacity(32);
    for byte in bytes {
        // Writing to a String cannot fail
        let _ = write!(token, "{:02x}", byte);
    }
    token
}

/// Background task that periodically evicts expired state entries.
pub async fn run_state_sweep(store: StateStore, interval_seconds: u64) {
    let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(interval_seconds));

    loop {
        interval.tick().await;
        store.sweep();
        tracing::debug!(remaining = store.count(), "OAuth state sweep complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_take() {
        let store = StateStore::new(600);

        let token = store.put(Service::Slack, "u1");
        assert_eq!(token.len(), 32);

        let entry = store.take(&token).unwrap();
        assert_eq!(entry.service, Service::Slack);
        assert_eq!(entry.user_id, "u1");
    }

    #[test]
    fn test_token_is_single_use() {
        let store = StateStore::new(600);

        let token = store.put(Service::Github, "alice");

        assert!(store.take(&token).is_some());
        assert!(store.take(&token).is_none());
    }

    #[test]
    fn test_unknown_token_rejected() {
        let store = StateStore::new(600);
        assert!(store.take("deadbeefdeadbeefdeadbeefdeadbeef").is_none());
    }

    #[test]
    fn test_expired_token_rejected_and_consumed() {
        let store = StateStore::new(0);

        let token = store.put(Service::Notion, "bob");
        std::thread::sleep(std::time::Duration::from_millis(1100));

        assert!(store.take(&token).is_none());
        // Expired take still removed the entry
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_sweep_removes_expired() {
        let store = StateStore::new(0);

        store.put(Service::Google, "u1");
        store.put(Service::Slack, "u2");
        assert_eq!(store.count(), 2);

        std::thread::sleep(std::time::Duration::from_millis(1100));
        store.sweep();
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_tokens_are_unique() {
        let store = StateStore::new(600);
        let a = store.put(Service::Slack, "u1");
        let b = store.put(Service::Slack, "u1");
        assert_ne!(a, b);
        assert_eq!(store.count(), 2);
    }
}
