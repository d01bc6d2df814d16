//! Email automation rule fixtures.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRule {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    pub status: String,
    pub responses_sent: u64,
    pub success_rate: u32,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields a rule update may change; `None` leaves the current value.
#[derive(Default)]
pub struct RuleUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub template: Option<String>,
    pub status: Option<String>,
}

/// In-memory rule array, seeded with demo automations.
pub struct RuleStore {
    rules: Mutex<Vec<EmailRule>>,
    next_id: AtomicU64,
}

impl RuleStore {
    pub fn new() -> Self {
        let now = Utc::now();
        let seeded = vec![
            EmailRule {
                id: "1".to_string(),
                name: "Customer Support Auto-Response".to_string(),
                description: "Automatically responds to common customer support questions"
                    .to_string(),
                template: None,
                status: "active".to_string(),
                responses_sent: 156,
                success_rate: 94,
                created_at: now,
                updated_at: None,
            },
            EmailRule {
                id: "2".to_string(),
                name: "Meeting Confirmation".to_string(),
                description: "Sends automatic confirmation emails when meetings are scheduled"
                    .to_string(),
                template: None,
                status: "active".to_string(),
                responses_sent: 89,
                success_rate: 98,
                created_at: now,
                updated_at: None,
            },
        ];
        Self {
            rules: Mutex::new(seeded),
            next_id: AtomicU64::new(3),
        }
    }

    pub fn list(&self) -> Vec<EmailRule> {
        self.rules.lock().unwrap().clone()
    }

    pub fn create(&self, name: &str, description: &str, template: Option<String>) -> EmailRule {
        let rule = EmailRule {
            id: self.next_id.fetch_add(1, Ordering::SeqCst).to_string(),
            name: name.to_string(),
            description: description.to_string(),
            template,
            status: "active".to_string(),
            responses_sent: 0,
            success_rate: 0,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.rules.lock().unwrap().push(rule.clone());
        rule
    }

    pub fn update(&self, id: &str, update: RuleUpdate) -> Option<EmailRule> {
        let mut rules = self.rules.lock().unwrap();
        let rule = rules.iter_mut().find(|r| r.id == id)?;

        if let Some(name) = update.name {
            rule.name = name;
        }
        if let Some(description) = update.description {
            rule.description = description;
        }
        if let Some(template) = update.template {
            rule.template = Some(template);
        }
        if let Some(status) = update.status {
            rule.status = status;
        }
        rule.updated_at = Some(Utc::now());

        Some(rule.clone())
    }

    pub fn delete(&self, id: &str) -> bool {
        let mut rules = self.rules.lock().unwrap();
        let before = rules.len();
        rules.retain(|r| r.id != id);
        rules.len() != before
    }
}

impl Default for RuleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_rules() {
        let store = RuleStore::new();
        let rules = store.list();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].id, "1");
    }

    #[test]
    fn test_create_and_delete() {
        let store = RuleStore::new();
        let rule = store.create("Invoice Reminder", "Chases unpaid invoices", None);
        assert_eq!(rule.id, "3");
        assert_eq!(rule.status, "active");

        assert!(store.delete(&rule.id));
        assert!(!store.delete(&rule.id));
        assert_eq!(store.list().len(), 2);
    }

    #[test]
    fn test_ids_stay_unique_after_delete() {
        let store = RuleStore::new();
        let a = store.create("A", "", None);
        store.delete(&a.id);
        let b = store.create("B", "", None);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_partial_update() {
        let store = RuleStore::new();
        let updated = store
            .update(
                "1",
                RuleUpdate {
                    status: Some("paused".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.status, "paused");
        assert_eq!(updated.name, "Customer Support Auto-Response");
        assert!(updated.updated_at.is_some());
    }

    #[test]
    fn test_update_missing_rule() {
        let store = RuleStore::new();
        assert!(store.update("99", RuleUpdate::default()).is_none());
    }
}
