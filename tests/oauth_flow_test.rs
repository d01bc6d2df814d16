// Integration tests for the OAuth connector HTTP surface

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use opsdesk::api::{create_integration_router, IntegrationAppState};
use opsdesk::integrations::{integration_with_credentials, IntegrationRegistry, Service};
use opsdesk::oauth::{OAuthConnector, StateStore};
use opsdesk::sessions::SessionStore;
use opsdesk::store::ConnectionStore;
use std::sync::Arc;
use tower::ServiceExt;

struct TestHarness {
    app: Router,
    connector: Arc<OAuthConnector>,
    connections: Arc<ConnectionStore>,
}

/// Build an app where slack/github are configured (token endpoints pointed at
/// `token_base`) and google still carries placeholder credentials.
fn test_harness(token_base: &str) -> TestHarness {
    let mut entries = vec![integration_with_credentials(
        Service::Google,
        "your-google-client-id",
        "your-google-client-secret",
    )];

    let mut slack = integration_with_credentials(Service::Slack, "slack-id-123", "slack-secret");
    slack.token_url = format!("{}/slack/token", token_base);
    entries.push(slack);

    let mut github = integration_with_credentials(Service::Github, "gh-id-456", "gh-secret");
    github.token_url = format!("{}/github/token", token_base);
    entries.push(github);

    let registry = Arc::new(IntegrationRegistry::from_entries(entries));
    let connections = Arc::new(ConnectionStore::new());
    let connector = Arc::new(OAuthConnector::new(
        Arc::clone(&registry),
        StateStore::new(600),
        Arc::clone(&connections),
        "http://localhost:3002".to_string(),
    ));

    let app = create_integration_router(IntegrationAppState {
        connector: Arc::clone(&connector),
        registry,
        sessions: Arc::new(SessionStore::new(24)),
        connections: Arc::clone(&connections),
    });

    TestHarness {
        app,
        connector,
        connections,
    }
}

async fn get(app: Router, uri: &str) -> axum::response::Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn location(response: &axum::response::Response) -> String {
    response
        .headers()
        .get("location")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

/// Pull the state token out of the authorization URL.
fn extract_state(auth_url: &str) -> String {
    auth_url
        .split('&')
        .find_map(|pair| pair.strip_prefix("state="))
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_start_unknown_service_is_404() {
    let harness = test_harness("http://localhost:9");

    let response = get(harness.app, "/auth/imaginary").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("Integration 'imaginary' not found"));
}

#[tokio::test]
async fn test_callback_unknown_service_is_404() {
    let harness = test_harness("http://localhost:9");

    let response = get(harness.app, "/auth/imaginary/callback?code=x&state=y").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_start_unconfigured_returns_setup_guide() {
    let harness = test_harness("http://localhost:9");

    let response = get(harness.app, "/auth/google").await;
    // Setup instructions, not a redirect and not an error status
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["setupRequired"], true);
    assert!(json["error"].as_str().unwrap().contains("Google"));
    assert!(!json["setupGuide"].as_str().unwrap().is_empty());

    // No state was minted for the doomed flow
    assert_eq!(harness.connector.states().count(), 0);
}

#[tokio::test]
async fn test_start_configured_redirects_with_state() {
    let harness = test_harness("http://localhost:9");

    let response = get(harness.app, "/auth/slack").await;
    assert!(response.status().is_redirection());

    let auth_url = location(&response);
    assert!(auth_url.starts_with("https://slack.com/oauth/v2/authorize?"));
    assert!(auth_url.contains("client_id=slack-id-123"));
    assert!(auth_url.contains("response_type=code"));
    assert_eq!(extract_state(&auth_url).len(), 32);
}

#[tokio::test]
async fn test_full_flow_exchanges_code_once() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/slack/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"access_token":"xoxb-111","refresh_token":"xoxe-222","scope":"channels:read","team":{"id":"T1"}}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let harness = test_harness(&server.url());

    // Initiate and capture the state parameter from the redirect
    let response = get(harness.app.clone(), "/auth/slack").await;
    assert!(response.status().is_redirection());
    let state = extract_state(&location(&response));

    // Complete the callback
    let response = get(
        harness.app.clone(),
        &format!("/auth/slack/callback?code=code123&state={}", state),
    )
    .await;
    assert!(response.status().is_redirection());
    assert_eq!(
        location(&response),
        "/dashboard?integration=connected&service=slack"
    );

    // Exactly one POST reached the token endpoint
    mock.assert_async().await;

    // The grant was recorded verbatim, provider extras included
    let grant = harness.connections.get("default", Service::Slack).unwrap();
    assert_eq!(grant.access_token, "xoxb-111");
    assert_eq!(grant.refresh_token.as_deref(), Some("xoxe-222"));
    assert_eq!(grant.extra["team"]["id"], serde_json::json!("T1"));

    // Replaying the same state token fails: it was consumed
    let response = get(
        harness.app,
        &format!("/auth/slack/callback?code=code123&state={}", state),
    )
    .await;
    assert!(response.status().is_redirection());
    assert_eq!(
        location(&response),
        "/dashboard?integration=error&service=slack"
    );
}

#[tokio::test]
async fn test_callback_cross_service_state_rejected() {
    let mut server = mockito::Server::new_async().await;
    // The github token endpoint must never be called
    let mock = server
        .mock("POST", "/github/token")
        .expect(0)
        .create_async()
        .await;

    let harness = test_harness(&server.url());

    // State minted for slack, presented on the github callback
    let response = get(harness.app.clone(), "/auth/slack").await;
    let state = extract_state(&location(&response));

    let response = get(
        harness.app,
        &format!("/auth/github/callback?code=code123&state={}", state),
    )
    .await;
    assert!(response.status().is_redirection());
    assert_eq!(
        location(&response),
        "/dashboard?integration=error&service=github"
    );

    mock.assert_async().await;
}

#[tokio::test]
async fn test_callback_provider_denial_redirects_to_error() {
    let harness = test_harness("http://localhost:9");

    let response = get(
        harness.app,
        "/auth/slack/callback?error=access_denied&error_description=User+cancelled",
    )
    .await;
    assert!(response.status().is_redirection());
    assert_eq!(
        location(&response),
        "/dashboard?integration=error&service=slack"
    );
}

#[tokio::test]
async fn test_callback_failed_exchange_redirects_to_error() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/slack/token")
        .with_status(400)
        .with_body(r#"{"error":"invalid_grant"}"#)
        .expect(1)
        .create_async()
        .await;

    let harness = test_harness(&server.url());

    let response = get(harness.app.clone(), "/auth/slack").await;
    let state = extract_state(&location(&response));

    let response = get(
        harness.app,
        &format!("/auth/slack/callback?code=bad&state={}", state),
    )
    .await;
    assert_eq!(
        location(&response),
        "/dashboard?integration=error&service=slack"
    );
    mock.assert_async().await;

    // The failed exchange still consumed the state token
    assert_eq!(harness.connector.states().count(), 0);
    assert!(!harness.connections.is_connected("default", Service::Slack));
}

#[tokio::test]
async fn test_status_endpoint() {
    let harness = test_harness("http://localhost:9");

    let response = get(harness.app.clone(), "/api/integrations/slack/status").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["service"], "slack");
    assert_eq!(json["configured"], true);
    assert_eq!(json["setupRequired"], false);

    let response = get(harness.app.clone(), "/api/integrations/google/status").await;
    let json = body_json(response).await;
    assert_eq!(json["configured"], false);
    assert_eq!(json["setupRequired"], true);

    let response = get(harness.app, "/api/integrations/imaginary/status").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["configured"], false);
    assert_eq!(json["message"], "Integration not found");
}

#[tokio::test]
async fn test_list_integrations() {
    let harness = test_harness("http://localhost:9");

    let response = get(harness.app, "/api/integrations").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let integrations = json["integrations"].as_array().unwrap();
    assert_eq!(integrations.len(), 10);

    let slack = integrations
        .iter()
        .find(|entry| entry["service"] == "slack")
        .unwrap();
    assert_eq!(slack["configured"], true);
    assert_eq!(slack["connected"], false);

    let google = integrations
        .iter()
        .find(|entry| entry["service"] == "google")
        .unwrap();
    assert_eq!(google["configured"], false);
}
