//! Subscription and billing fixtures.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub plan_id: String,
    pub plan_name: String,
    pub status: String,
    pub amount: u32,
    pub next_billing_date: DateTime<Utc>,
    /// Masked card reference, mock only.
    pub payment_method: String,
}

/// Monthly price in dollars for a plan id, if the plan exists.
pub fn plan_price(plan_id: &str) -> Option<(&'static str, u32)> {
    match plan_id {
        "starter" => Some(("Starter", 29)),
        "professional" => Some(("Professional", 79)),
        "enterprise" => Some(("Enterprise", 199)),
        _ => None,
    }
}

/// The full plan catalog served by `/api/subscription/plans`.
pub fn plan_catalog() -> serde_json::Value {
    serde_json::json!([
        {
            "id": "starter",
            "name": "Starter",
            "price": 29,
            "interval": "month",
            "features": [
                "500 automated emails/month",
                "100 scheduled meetings/month",
                "5 email rules",
                "2 integrations"
            ]
        },
        {
            "id": "professional",
            "name": "Professional",
            "price": 79,
            "interval": "month",
            "features": [
                "2,000 automated emails/month",
                "500 scheduled meetings/month",
                "25 email rules",
                "10 integrations",
                "Priority support"
            ]
        },
        {
            "id": "enterprise",
            "name": "Enterprise",
            "price": 199,
            "interval": "month",
            "features": [
                "Unlimited automated emails",
                "Unlimited scheduled meetings",
                "Unlimited email rules",
                "All integrations",
                "Dedicated support",
                "Custom workflows"
            ]
        }
    ])
}

/// Per-user subscription records, seeded with the demo user's plan.
pub struct SubscriptionStore {
    subscriptions: DashMap<String, Subscription>,
}

impl SubscriptionStore {
    pub fn new() -> Self {
        let store = Self {
            subscriptions: DashMap::new(),
        };
        store.subscriptions.insert(
            "1".to_string(),
            Subscription {
                plan_id: "professional".to_string(),
                plan_name: "Professional".to_string(),
                status: "active".to_string(),
                amount: 79,
                next_billing_date: Utc::now() + Duration::days(30),
                payment_method: "card_****1234".to_string(),
            },
        );
        store
    }

    pub fn get(&self, user_id: &str) -> Option<Subscription> {
        self.subscriptions
            .get(user_id)
            .map(|entry| entry.value().clone())
    }

    /// Subscribe a user to a plan. Returns `None` for an unknown plan id.
    pub fn create(&self, user_id: &str, plan_id: &str) -> Option<Subscription> {
        let (plan_name, amount) = plan_price(plan_id)?;
        let subscription = Subscription {
            plan_id: plan_id.to_string(),
            plan_name: plan_name.to_string(),
            status: "active".to_string(),
            amount,
            next_billing_date: Utc::now() + Duration::days(30),
            payment_method: "card_****1234".to_string(),
        };
        self.subscriptions
            .insert(user_id.to_string(), subscription.clone());
        Some(subscription)
    }

    /// Move an existing subscription to a different plan, keeping its status
    /// and payment method. Returns `None` when the user has no subscription
    /// or the plan id is unknown.
    pub fn change_plan(&self, user_id: &str, plan_id: &str) -> Option<Subscription> {
        let (plan_name, amount) = plan_price(plan_id)?;
        let mut entry = self.subscriptions.get_mut(user_id)?;
        entry.plan_id = plan_id.to_string();
        entry.plan_name = plan_name.to_string();
        entry.amount = amount;
        Some(entry.value().clone())
    }

    /// Replace the payment method on an existing subscription.
    pub fn update_payment_method(&self, user_id: &str, payment_method: &str) -> Option<Subscription> {
        let mut entry = self.subscriptions.get_mut(user_id)?;
        entry.payment_method = payment_method.to_string();
        Some(entry.value().clone())
    }

    /// Mark a subscription cancelled. Returns the updated record.
    pub fn cancel(&self, user_id: &str) -> Option<Subscription> {
        let mut entry = self.subscriptions.get_mut(user_id)?;
        entry.status = "cancelled".to_string();
        Some(entry.value().clone())
    }
}

impl Default for SubscriptionStore {
    fn default() -> Self {
        Self::new()
    }
}
