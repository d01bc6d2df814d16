//! In-memory stores for demo fixtures and connected integrations.
//!
//! Everything here is process-local and resets on restart by design; the
//! only consistency rule is array uniqueness by id.

mod connections;
mod email_rules;
mod meetings;
mod subscriptions;
mod users;

pub use connections::ConnectionStore;
pub use email_rules::{EmailRule, RuleStore, RuleUpdate};
pub use meetings::{Meeting, MeetingStore, MeetingUpdate};
pub use subscriptions::{plan_catalog, Subscription, SubscriptionStore};
pub use users::{User, UserStore};
