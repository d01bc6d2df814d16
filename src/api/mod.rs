// HTTP API routers, one module per feature area.

pub mod analytics;
pub mod auth;
pub mod chat;
pub mod email;
pub mod oauth;
pub mod schedule;
pub mod subscription;

pub use analytics::create_analytics_router;
pub use auth::{create_auth_router, AuthAppState};
pub use chat::{create_chat_router, ChatAppState};
pub use email::{create_email_router, EmailAppState};
pub use oauth::{create_integration_router, IntegrationAppState};
pub use schedule::{create_schedule_router, ScheduleAppState};
pub use subscription::{create_subscription_router, SubscriptionAppState};
