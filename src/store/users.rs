//! Demo user accounts.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// A registered account. Passwords are not stored: authentication is a demo
/// compare against a fixed password.
#[derive(Clone, Debug, Serialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub company: String,
    pub plan: String,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
}

/// In-memory user array, seeded with the demo account.
pub struct UserStore {
    users: Mutex<Vec<User>>,
    next_id: AtomicU64,
}

impl UserStore {
    pub fn new() -> Self {
        let demo = User {
            id: "1".to_string(),
            email: "demo@example.com".to_string(),
            name: "Demo User".to_string(),
            company: "Demo Company".to_string(),
            plan: "professional".to_string(),
            created_at: Utc::now(),
        };
        Self {
            users: Mutex::new(vec![demo]),
            next_id: AtomicU64::new(2),
        }
    }

    pub fn find_by_email(&self, email: &str) -> Option<User> {
        let users = self.users.lock().unwrap();
        users.iter().find(|u| u.email == email).cloned()
    }

    pub fn find_by_id(&self, id: &str) -> Option<User> {
        let users = self.users.lock().unwrap();
        users.iter().find(|u| u.id == id).cloned()
    }

    /// Register a new account on the `starter` plan.
    ///
    /// Returns `None` if the email is already taken.
    pub fn create(&self, email: &str, name: &str, company: &str) -> Option<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == email) {
            return None;
        }

        let user = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst).to_string(),
            email: email.to_string(),
            name: name.to_string(),
            company: company.to_string(),
            plan: "starter".to_string(),
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Some(user)
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}
