//! HTTP surface of the OAuth connector.
//!
//! - `GET /auth/:service` begins the flow: 302 to the provider, or a JSON
//!   setup-required body when credentials are missing.
//! - `GET /auth/:service/callback` completes it and sends the browser back
//!   to the dashboard with a success/failure query parameter.
//! - `GET /api/integrations[/:service/status]` reports configuration state.

use crate::integrations::{IntegrationRegistry, Service};
use crate::oauth::{ConnectError, OAuthConnector};
use crate::sessions::SessionStore;
use crate::store::ConnectionStore;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// User id used when no session cookie is present.
const ANONYMOUS_USER: &str = "default";

/// Shared application state for the integration API.
#[derive(Clone)]
pub struct IntegrationAppState {
    pub connector: Arc<OAuthConnector>,
    pub registry: Arc<IntegrationRegistry>,
    pub sessions: Arc<SessionStore>,
    pub connections: Arc<ConnectionStore>,
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Body returned when the provider has placeholder credentials, so the
/// front-end can render setup instructions instead of redirecting.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SetupRequiredResponse {
    error: String,
    message: String,
    setup_required: bool,
    setup_guide: String,
}

/// OAuth callback query parameters.
#[derive(Deserialize)]
pub struct OAuthCallback {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    service: String,
    configured: bool,
    setup_required: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UnknownServiceStatus {
    service: String,
    configured: bool,
    setup_required: bool,
    message: String,
}

#[derive(Serialize)]
struct IntegrationSummary {
    service: String,
    name: String,
    configured: bool,
    connected: bool,
}

#[derive(Serialize)]
struct ListIntegrationsResponse {
    integrations: Vec<IntegrationSummary>,
}

/// Create the integration API router.
pub fn create_integration_router(state: IntegrationAppState) -> Router {
    Router::new()
        .route("/auth/:service", get(oauth_start))
        .route("/auth/:service/callback", get(oauth_callback))
        .route("/api/integrations", get(list_integrations))
        .route("/api/integrations/:service/status", get(integration_status))
        .with_state(Arc::new(state))
}

/// GET /auth/:service
///
/// Redirects the browser to the provider's authorization page. An
/// unconfigured provider returns a 200 JSON body with setup instructions;
/// an unknown service key is a 404.
async fn oauth_start(
    State(state): State<Arc<IntegrationAppState>>,
    Path(service): Path<String>,
    jar: CookieJar,
) -> Response {
    let user_id = state
        .sessions
        .user_from_jar(&jar)
        .unwrap_or_else(|| ANONYMOUS_USER.to_string());

    debug!(service = %service, user = %user_id, "OAuth start requested");

    match state.connector.initiate(&service, &user_id) {
        Ok(auth_url) => Redirect::temporary(&auth_url).into_response(),
        Err(err @ ConnectError::UnknownService(_)) => not_found(&err),
        Err(ConnectError::NotConfigured {
            service,
            setup_guide,
        }) => Json(SetupRequiredResponse {
            error: format!("{} OAuth not configured", service.display_name()),
            message: format!(
                "Please set up {} OAuth credentials in your environment variables.",
                service.display_name()
            ),
            setup_required: true,
            setup_guide,
        })
        .into_response(),
        Err(err) => server_error(&err),
    }
}

/// GET /auth/:service/callback?code&state
///
/// Completes the flow and redirects back to the dashboard. Any flow failure
/// after the service key resolves (denied authorization, bad state, failed
/// exchange) lands on `/dashboard?integration=error`; there is no retry.
async fn oauth_callback(
    State(state): State<Arc<IntegrationAppState>>,
    Path(service): Path<String>,
    Query(callback): Query<OAuthCallback>,
) -> Response {
    debug!(service = %service, "OAuth callback received");

    if Service::parse(&service).is_none() {
        return not_found(&ConnectError::UnknownService(service));
    }

    if let Some(error) = callback.error {
        warn!(
            service = %service,
            error = %error,
            description = ?callback.error_description,
            "Provider reported an authorization error"
        );
        return error_redirect(&service);
    }

    let (Some(code), Some(csrf_state)) = (callback.code, callback.state) else {
        warn!(service = %service, "Callback missing code or state parameter");
        return error_redirect(&service);
    };

    match state
        .connector
        .handle_callback(&service, &code, &csrf_state)
        .await
    {
        Ok(_grant) => Redirect::temporary(&format!(
            "/dashboard?integration=connected&service={}",
            service
        ))
        .into_response(),
        Err(err @ ConnectError::UnknownService(_)) => not_found(&err),
        Err(err) => {
            warn!(service = %service, error = %err, "OAuth callback failed");
            error_redirect(&service)
        }
    }
}

/// GET /api/integrations/:service/status
async fn integration_status(
    State(state): State<Arc<IntegrationAppState>>,
    Path(service): Path<String>,
) -> Response {
    let Some(parsed) = Service::parse(&service) else {
        return (
            StatusCode::NOT_FOUND,
            Json(UnknownServiceStatus {
                service,
                configured: false,
                setup_required: true,
                message: "Integration not found".to_string(),
            }),
        )
            .into_response();
    };

    let configured = state
        .registry
        .get(parsed)
        .map(|entry| entry.is_configured())
        .unwrap_or(false);

    Json(StatusResponse {
        service,
        configured,
        setup_required: !configured,
    })
    .into_response()
}

/// GET /api/integrations
///
/// Lists every registered integration with its configuration state and
/// whether the current session's user has connected it.
async fn list_integrations(
    State(state): State<Arc<IntegrationAppState>>,
    jar: CookieJar,
) -> Json<ListIntegrationsResponse> {
    let user_id = state
        .sessions
        .user_from_jar(&jar)
        .unwrap_or_else(|| ANONYMOUS_USER.to_string());

    let integrations = Service::ALL
        .iter()
        .map(|service| {
            let configured = state
                .registry
                .get(*service)
                .map(|entry| entry.is_configured())
                .unwrap_or(false);
            IntegrationSummary {
                service: service.key().to_string(),
                name: service.display_name().to_string(),
                configured,
                connected: state.connections.is_connected(&user_id, *service),
            }
        })
        .collect();

    Json(ListIntegrationsResponse { integrations })
}

fn not_found(err: &ConnectError) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

fn server_error(err: &ConnectError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

fn error_redirect(service: &str) -> Response {
    Redirect::temporary(&format!(
        "/dashboard?integration=error&service={}",
        service
    ))
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oauth_callback_deserialization() {
        // Success case
        let query = "code=auth_code_123&state=csrf_state_456";
        let callback: OAuthCallback = serde_urlencoded::from_str(query).unwrap();
        assert_eq!(callback.code, Some("auth_code_123".to_string()));
        assert_eq!(callback.state, Some("csrf_state_456".to_string()));
        assert_eq!(callback.error, None);

        // Denied case
        let query = "error=access_denied&error_description=User+cancelled";
        let callback: OAuthCallback = serde_urlencoded::from_str(query).unwrap();
        assert_eq!(callback.error, Some("access_denied".to_string()));
        assert_eq!(
            callback.error_description,
            Some("User cancelled".to_string())
        );
        assert_eq!(callback.code, None);
    }

    #[test]
    fn test_setup_required_serialization() {
        let body = SetupRequiredResponse {
            error: "Slack OAuth not configured".to_string(),
            message: "Please set up Slack OAuth credentials in your environment variables."
                .to_string(),
            setup_required: true,
            setup_guide: "https://api.slack.com/authentication/oauth-v2".to_string(),
        };

        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"setupRequired\":true"));
        assert!(json.contains("\"setupGuide\":\"https://api.slack.com/authentication/oauth-v2\""));
    }
}
