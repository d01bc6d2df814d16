//! Cookie-referenced server-side sessions.
//!
//! A session carries only the user id. Created on login/registration,
//! removed on logout, expired entries are dropped on first read.

use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "opsdesk_session";

#[derive(Clone, Debug)]
pub struct Session {
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// In-memory session store with TTL expiry (default 24 hours).
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_hours: i64) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Create a session and return its opaque id.
    pub fn create(&self, user_id: &str) -> String {
        let id = Uuid::new_v4().to_string();
        self.sessions.insert(
            id.clone(),
            Session {
                user_id: user_id.to_string(),
                created_at: Utc::now(),
            },
        );
        id
    }

    /// Look up a session by id; expired sessions are removed and not returned.
    pub fn get(&self, id: &str) -> Option<Session> {
        let expired = match self.sessions.get(id) {
            Some(entry) => Utc::now() - entry.created_at > self.ttl,
            None => return None,
        };

        if expired {
            self.sessions.remove(id);
            return None;
        }
        self.sessions.get(id).map(|entry| entry.value().clone())
    }

    /// Destroy a session. Returns true if one existed.
    pub fn remove(&self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    /// Resolve the user id referenced by the session cookie, if any.
    pub fn user_from_jar(&self, jar: &CookieJar) -> Option<String> {
        let cookie = jar.get(SESSION_COOKIE)?;
        self.get(cookie.value()).map(|session| session.user_id)
    }

    pub fn count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_get() {
        let store = SessionStore::new(24);
        let id = store.create("u1");

        let session = store.get(&id).unwrap();
        assert_eq!(session.user_id, "u1");
    }

    #[test]
    fn test_remove() {
        let store = SessionStore::new(24);
        let id = store.create("u1");

        assert!(store.remove(&id));
        assert!(!store.remove(&id));
        assert!(store.get(&id).is_none());
    }

    #[test]
    fn test_expired_session_dropped() {
        let store = SessionStore::new(0);
        let id = store.create("u1");

        std::thread::sleep(std::time::Duration::from_millis(1100));

        assert!(store.get(&id).is_none());
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_user_from_jar() {
        let store = SessionStore::new(24);
        let id = store.create("u7");

        let jar = CookieJar::new().add(
            axum_extra::extract::cookie::Cookie::new(SESSION_COOKIE, id),
        );
        assert_eq!(store.user_from_jar(&jar), Some("u7".to_string()));

        let empty = CookieJar::new();
        assert_eq!(store.user_from_jar(&empty), None);
    }
}
