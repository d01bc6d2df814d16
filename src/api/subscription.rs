//! Subscription and billing endpoints. Mock plans, no payment processing.

use crate::sessions::SessionStore;
use crate::store::{plan_catalog, SubscriptionStore};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// User id assumed when no session is present, matching the demo fixture.
const FALLBACK_USER: &str = "1";

/// Shared application state for the subscription API.
#[derive(Clone)]
pub struct SubscriptionAppState {
    pub subscriptions: Arc<SubscriptionStore>,
    pub sessions: Arc<SessionStore>,
}

#[derive(Deserialize)]
pub struct CreateSubscriptionRequest {
    #[serde(rename = "planId")]
    plan_id: String,
}

#[derive(Deserialize)]
pub struct UpdatePaymentMethodRequest {
    #[serde(rename = "paymentMethod")]
    #[allow(dead_code)]
    payment_method: Option<String>,
}

#[derive(Serialize)]
struct FailureResponse {
    success: bool,
    message: String,
}

/// Create the subscription API router.
pub fn create_subscription_router(state: SubscriptionAppState) -> Router {
    Router::new()
        .route("/api/subscription/current", get(current))
        .route("/api/subscription/plans", get(plans))
        .route("/api/subscription/create", post(create))
        .route("/api/subscription/update", put(update))
        .route("/api/subscription/cancel", post(cancel))
        .route("/api/subscription/usage", get(usage))
        .route("/api/subscription/billing", get(billing))
        .route("/api/subscription/payment-method", put(payment_method))
        .route("/api/subscription/analytics", get(subscription_analytics))
        .with_state(Arc::new(state))
}

fn session_user(state: &SubscriptionAppState, jar: &CookieJar) -> String {
    state
        .sessions
        .user_from_jar(jar)
        .unwrap_or_else(|| FALLBACK_USER.to_string())
}

/// GET /api/subscription/current
async fn current(State(state): State<Arc<SubscriptionAppState>>, jar: CookieJar) -> Response {
    let user_id = session_user(&state, &jar);

    match state.subscriptions.get(&user_id) {
        Some(subscription) => {
            Json(json!({ "success": true, "subscription": subscription })).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(FailureResponse {
                success: false,
                message: "No subscription found".to_string(),
            }),
        )
            .into_response(),
    }
}

/// GET /api/subscription/plans — the plan catalog.
async fn plans() -> Json<serde_json::Value> {
    Json(json!({ "success": true, "plans": plan_catalog() }))
}

/// POST /api/subscription/create
async fn create(
    State(state): State<Arc<SubscriptionAppState>>,
    jar: CookieJar,
    Json(body): Json<CreateSubscriptionRequest>,
) -> Response {
    let user_id = session_user(&state, &jar);

    match state.subscriptions.create(&user_id, &body.plan_id) {
        Some(subscription) => {
            debug!(user = %user_id, plan = %body.plan_id, "Subscription created");
            Json(json!({ "success": true, "subscription": subscription })).into_response()
        }
        None => (
            StatusCode::BAD_REQUEST,
            Json(FailureResponse {
                success: false,
                message: "Invalid plan".to_string(),
            }),
        )
            .into_response(),
    }
}

/// PUT /api/subscription/update — move the user to a different plan.
async fn update(
    State(state): State<Arc<SubscriptionAppState>>,
    jar: CookieJar,
    Json(body): Json<CreateSubscriptionRequest>,
) -> Response {
    let user_id = session_user(&state, &jar);

    if state.subscriptions.get(&user_id).is_none() {
        return no_subscription();
    }

    match state.subscriptions.change_plan(&user_id, &body.plan_id) {
        Some(subscription) => {
            debug!(user = %user_id, plan = %body.plan_id, "Subscription plan changed");
            Json(json!({
                "success": true,
                "subscription": subscription,
                "message": "Subscription updated successfully"
            }))
            .into_response()
        }
        None => (
            StatusCode::BAD_REQUEST,
            Json(FailureResponse {
                success: false,
                message: "Invalid plan selected".to_string(),
            }),
        )
            .into_response(),
    }
}

/// POST /api/subscription/cancel
async fn cancel(State(state): State<Arc<SubscriptionAppState>>, jar: CookieJar) -> Response {
    let user_id = session_user(&state, &jar);

    match state.subscriptions.cancel(&user_id) {
        Some(subscription) => {
            debug!(user = %user_id, "Subscription cancelled");
            Json(json!({ "success": true, "subscription": subscription })).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(FailureResponse {
                success: false,
                message: "No subscription found".to_string(),
            }),
        )
            .into_response(),
    }
}

/// GET /api/subscription/usage — mock usage against plan limits.
async fn usage() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "usage": {
            "emailsAutomated": { "used": 873, "limit": 2000, "percentage": 43.7 },
            "meetingsScheduled": { "used": 156, "limit": 500, "percentage": 31.2 },
            "activeRules": { "used": 12, "limit": 25, "percentage": 48 },
            "integrations": { "used": 3, "limit": 10, "percentage": 30 }
        }
    }))
}

/// PUT /api/subscription/payment-method — mock card swap, nothing is charged.
async fn payment_method(
    State(state): State<Arc<SubscriptionAppState>>,
    jar: CookieJar,
    Json(_body): Json<UpdatePaymentMethodRequest>,
) -> Response {
    let user_id = session_user(&state, &jar);

    match state
        .subscriptions
        .update_payment_method(&user_id, "card_****5678")
    {
        Some(subscription) => {
            debug!(user = %user_id, "Payment method updated");
            Json(json!({
                "success": true,
                "message": "Payment method updated successfully",
                "subscription": subscription
            }))
            .into_response()
        }
        None => no_subscription(),
    }
}

/// GET /api/subscription/analytics — mock revenue and savings figures.
async fn subscription_analytics() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "analytics": {
            "revenue": {
                "monthly": 79,
                "yearly": 948,
                "growth": 12.5
            },
            "usage": {
                "emailsProcessed": 1247,
                "meetingsScheduled": 156,
                "timeSaved": 32.1,
                "automationRate": 94.2
            },
            "savings": {
                "timeValue": 1284,
                "efficiencyGain": 35.4,
                "costSavings": 2400
            }
        }
    }))
}

fn no_subscription() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(FailureResponse {
            success: false,
            message: "No active subscription found".to_string(),
        }),
    )
        .into_response()
}

/// GET /api/subscription/billing — mock billing history.
async fn billing() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "billingHistory": [
            { "id": "inv_003", "date": "2024-10-01", "amount": 79, "status": "paid", "description": "Professional plan - October 2024" },
            { "id": "inv_002", "date": "2024-09-01", "amount": 79, "status": "paid", "description": "Professional plan - September 2024" },
            { "id": "inv_001", "date": "2024-08-01", "amount": 79, "status": "paid", "description": "Professional plan - August 2024" }
        ]
    }))
}
