//! Email automation endpoints: rule CRUD, templates, mock analytics.

use crate::store::{RuleStore, RuleUpdate};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// Shared application state for the email API.
#[derive(Clone)]
pub struct EmailAppState {
    pub rules: Arc<RuleStore>,
}

#[derive(Deserialize)]
pub struct CreateRuleRequest {
    name: String,
    description: Option<String>,
    template: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateRuleRequest {
    name: Option<String>,
    description: Option<String>,
    template: Option<String>,
    status: Option<String>,
}

#[derive(Deserialize)]
pub struct TestEmailRequest {
    #[allow(dead_code)]
    to: Option<String>,
    #[allow(dead_code)]
    subject: Option<String>,
    #[allow(dead_code)]
    body: Option<String>,
}

#[derive(Serialize)]
struct NotFoundResponse {
    success: bool,
    message: String,
}

/// Create the email API router.
pub fn create_email_router(state: EmailAppState) -> Router {
    Router::new()
        .route("/api/email/rules", get(list_rules))
        .route("/api/email/rules", post(create_rule))
        .route("/api/email/rules/:id", put(update_rule))
        .route("/api/email/rules/:id", delete(delete_rule))
        .route("/api/email/analytics", get(email_analytics))
        .route("/api/email/templates", get(email_templates))
        .route("/api/email/test", post(send_test_email))
        .with_state(Arc::new(state))
}

/// GET /api/email/rules
async fn list_rules(State(state): State<Arc<EmailAppState>>) -> Json<serde_json::Value> {
    Json(json!({ "success": true, "rules": state.rules.list() }))
}

/// POST /api/email/rules
async fn create_rule(
    State(state): State<Arc<EmailAppState>>,
    Json(body): Json<CreateRuleRequest>,
) -> Json<serde_json::Value> {
    let rule = state.rules.create(
        &body.name,
        body.description.as_deref().unwrap_or_default(),
        body.template,
    );
    debug!(rule = %rule.id, "Email rule created");
    Json(json!({ "success": true, "rule": rule }))
}

/// PUT /api/email/rules/:id
async fn update_rule(
    State(state): State<Arc<EmailAppState>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateRuleRequest>,
) -> Response {
    let update = RuleUpdate {
        name: body.name,
        description: body.description,
        template: body.template,
        status: body.status,
    };

    match state.rules.update(&id, update) {
        Some(rule) => Json(json!({ "success": true, "rule": rule })).into_response(),
        None => rule_not_found(),
    }
}

/// DELETE /api/email/rules/:id
async fn delete_rule(State(state): State<Arc<EmailAppState>>, Path(id): Path<String>) -> Response {
    if state.rules.delete(&id) {
        Json(json!({ "success": true, "message": "Rule deleted successfully" })).into_response()
    } else {
        rule_not_found()
    }
}

/// GET /api/email/analytics — mock email automation metrics.
async fn email_analytics() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "analytics": {
            "totalEmails": 1247,
            "automatedEmails": 873,
            "manualEmails": 374,
            "responseRate": 94.2,
            "averageResponseTime": "2.3 minutes",
            "topKeywords": [
                { "keyword": "pricing", "count": 45 },
                { "keyword": "support", "count": 38 },
                { "keyword": "meeting", "count": 32 },
                { "keyword": "demo", "count": 28 }
            ],
            "dailyStats": [
                { "date": "2024-10-20", "emails": 45, "automated": 32 },
                { "date": "2024-10-21", "emails": 52, "automated": 38 },
                { "date": "2024-10-22", "emails": 38, "automated": 28 },
                { "date": "2024-10-23", "emails": 61, "automated": 45 },
                { "date": "2024-10-24", "emails": 47, "automated": 35 },
                { "date": "2024-10-25", "emails": 43, "automated": 31 },
                { "date": "2024-10-26", "emails": 39, "automated": 29 }
            ]
        }
    }))
}

/// GET /api/email/templates — built-in template catalog.
async fn email_templates() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "templates": [
            {
                "id": "1",
                "name": "Welcome Email",
                "subject": "Welcome to {{company}}!",
                "body": "Hi {{name}},\n\nWelcome to {{company}}! We're excited to have you on board.\n\nBest regards,\nThe {{company}} Team",
                "variables": ["name", "company"]
            },
            {
                "id": "2",
                "name": "Meeting Confirmation",
                "subject": "Meeting Confirmed: {{meeting_title}}",
                "body": "Hi {{name}},\n\nYour meeting \"{{meeting_title}}\" has been confirmed for {{meeting_date}} at {{meeting_time}}.\n\nMeeting Link: {{meeting_link}}\n\nBest regards,\n{{company}}",
                "variables": ["name", "meeting_title", "meeting_date", "meeting_time", "meeting_link", "company"]
            },
            {
                "id": "3",
                "name": "Follow-up Email",
                "subject": "Following up on {{topic}}",
                "body": "Hi {{name}},\n\nI wanted to follow up on our discussion about {{topic}}.\n\nPlease let me know if you have any questions.\n\nBest regards,\n{{sender_name}}",
                "variables": ["name", "topic", "sender_name"]
            }
        ]
    }))
}

/// POST /api/email/test — mock send, nothing leaves the process.
async fn send_test_email(Json(_body): Json<TestEmailRequest>) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "message": "Test email sent successfully",
        "emailId": format!("test_{}", chrono::Utc::now().timestamp_millis())
    }))
}

fn rule_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse {
            success: false,
            message: "Rule not found".to_string(),
        }),
    )
        .into_response()
}
