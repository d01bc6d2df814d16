//! Generic multi-provider OAuth 2.0 authorization-code flow.
//!
//! One code path serves every registered integration:
//! 1. `GET /auth/:service` → [`OAuthConnector::initiate`] builds the
//!    authorization URL and redirects the browser.
//! 2. User authorizes on the provider's site.
//! 3. Provider redirects to `GET /auth/:service/callback?code&state`.
//! 4. [`OAuthConnector::handle_callback`] validates the single-use state
//!    token, exchanges the code for tokens, and records the connection.

mod exchange;
mod state_store;

pub use exchange::TokenGrant;
pub use state_store::{run_state_sweep, StateEntry, StateStore};

use crate::integrations::{IntegrationRegistry, Service};
use crate::store::ConnectionStore;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Errors surfaced by the connector. Three kinds suffice: bad input
/// (`UnknownService`), missing credentials (`NotConfigured`, with a
/// remediation hint), and an aborted flow (`InvalidState` /
/// `TokenExchangeFailed`).
#[derive(Debug)]
pub enum ConnectError {
    /// The service key is not in the registry.
    UnknownService(String),
    /// The registry entry has placeholder/empty credentials. The caller
    /// should render setup instructions instead of redirecting.
    NotConfigured {
        service: Service,
        setup_guide: String,
    },
    /// State token absent, expired, already used, or recorded under a
    /// different service.
    InvalidState,
    /// The server-to-server token exchange failed.
    TokenExchangeFailed(String),
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectError::UnknownService(key) => write!(f, "Integration '{}' not found", key),
            ConnectError::NotConfigured { service, .. } => {
                write!(f, "{} OAuth not configured", service.display_name())
            }
            ConnectError::InvalidState => write!(f, "Invalid or expired OAuth state"),
            ConnectError::TokenExchangeFailed(msg) => {
                write!(f, "Token exchange failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConnectError {}

/// Mediates the three-legged authorization-code exchange for any registered
/// provider without provider-specific code paths.
pub struct OAuthConnector {
    registry: Arc<IntegrationRegistry>,
    states: StateStore,
    connections: Arc<ConnectionStore>,
    http: reqwest::Client,
    base_url: String,
}

impl OAuthConnector {
    pub fn new(
        registry: Arc<IntegrationRegistry>,
        states: StateStore,
        connections: Arc<ConnectionStore>,
        base_url: String,
    ) -> Self {
        Self {
            registry,
            states,
            connections,
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Begin the authorization flow: mint a state token and build the
    /// provider authorization URL.
    ///
    /// No outbound HTTP is performed; an unconfigured provider fails before
    /// any state is minted.
    pub fn initiate(&self, service_key: &str, user_id: &str) -> Result<String, ConnectError> {
        let service = Service::parse(service_key)
            .ok_or_else(|| ConnectError::UnknownService(service_key.to_string()))?;
        let integration = self
            .registry
            .get(service)
            .ok_or_else(|| ConnectError::UnknownService(service_key.to_string()))?;

        if !integration.is_configured() {
            warn!(service = %service, "OAuth credentials not configured");
            return Err(ConnectError::NotConfigured {
                service,
                setup_guide: integration.setup_guide.clone(),
            });
        }

        let state = self.states.put(service, user_id);
        let redirect_uri = self.redirect_uri(&integration.callback_path);
        let auth_url = integration.build_auth_url(&state, &redirect_uri);

        info!(service = %service, user = %user_id, "Redirecting to OAuth provider");

        Ok(auth_url)
    }

    /// Complete the authorization flow: validate and consume the state token,
    /// then exchange the code for an access/refresh token pair.
    ///
    /// The state entry is deleted exactly once, whether the exchange succeeds
    /// or fails, so a token can never be replayed. One POST, no retry.
    pub async fn handle_callback(
        &self,
        service_key: &str,
        code: &str,
        state: &str,
    ) -> Result<TokenGrant, ConnectError> {
        let service = Service::parse(service_key)
            .ok_or_else(|| ConnectError::UnknownService(service_key.to_string()))?;
        let integration = self
            .registry
            .get(service)
            .ok_or_else(|| ConnectError::UnknownService(service_key.to_string()))?;

        // Read-once: the entry is gone after this regardless of what follows
        let entry = self.states.take(state).ok_or_else(|| {
            warn!(service = %service, "OAuth state absent or expired");
            ConnectError::InvalidState
        })?;

        if entry.service != service {
            warn!(
                expected = %entry.service,
                actual = %service,
                "OAuth state recorded under a different service"
            );
            return Err(ConnectError::InvalidState);
        }

        if !integration.is_configured() {
            return Err(ConnectError::NotConfigured {
                service,
                setup_guide: integration.setup_guide.clone(),
            });
        }

        debug!(service = %service, user = %entry.user_id, "State validated, exchanging code");

        let redirect_uri = self.redirect_uri(&integration.callback_path);
        let grant = exchange::exchange_code_for_token(
            &self.http,
            &integration.token_url,
            code,
            &redirect_uri,
            &integration.client_id,
            &integration.client_secret,
        )
        .await
        .map_err(|e| ConnectError::TokenExchangeFailed(e.to_string()))?;

        self.connections.record(&entry.user_id, service, &grant);

        info!(
            service = %service,
            user = %entry.user_id,
            has_refresh_token = grant.refresh_token.is_some(),
            "OAuth flow completed"
        );

        Ok(grant)
    }

    /// The state store, exposed for the background sweep task and tests.
    pub fn states(&self) -> &StateStore {
        &self.states
    }

    fn redirect_uri(&self, callback_path: &str) -> String {
        format!("{}{}", self.base_url, callback_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::integration_with_credentials;

    fn test_connector(entries: Vec<crate::integrations::Integration>) -> OAuthConnector {
        OAuthConnector::new(
            Arc::new(IntegrationRegistry::from_entries(entries)),
            StateStore::new(600),
            Arc::new(ConnectionStore::new()),
            "http://localhost:3002".to_string(),
        )
    }

    #[test]
    fn test_initiate_unknown_service() {
        let connector = test_connector(vec![]);
        let err = connector.initiate("imaginary", "u1").unwrap_err();
        assert!(matches!(err, ConnectError::UnknownService(_)));
    }

    #[test]
    fn test_initiate_not_configured_mints_no_state() {
        let connector = test_connector(vec![integration_with_credentials(
            Service::Google,
            "your-google-client-id",
            "your-google-client-secret",
        )]);

        let err = connector.initiate("google", "u1").unwrap_err();
        match err {
            ConnectError::NotConfigured { setup_guide, .. } => {
                assert!(!setup_guide.is_empty());
            }
            other => panic!("expected NotConfigured, got {:?}", other),
        }
        assert_eq!(connector.states().count(), 0);
    }

    #[test]
    fn test_initiate_builds_auth_url_with_state() {
        let connector = test_connector(vec![integration_with_credentials(
            Service::Slack,
            "slack-client-id",
            "slack-secret",
        )]);

        let url = connector.initiate("slack", "u1").unwrap();
        assert!(url.contains("client_id=slack-client-id"));
        assert!(url.contains("state="));
        assert!(url.contains("response_type=code"));
        assert_eq!(connector.states().count(), 1);
    }

    #[tokio::test]
    async fn test_callback_unknown_service() {
        let connector = test_connector(vec![]);
        let err = connector
            .handle_callback("imaginary", "code", "state")
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectError::UnknownService(_)));
    }

    #[tokio::test]
    async fn test_callback_unknown_state() {
        let connector = test_connector(vec![integration_with_credentials(
            Service::Slack,
            "id",
            "secret",
        )]);
        let err = connector
            .handle_callback("slack", "code", "not-a-real-state")
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectError::InvalidState));
    }

    #[tokio::test]
    async fn test_callback_cross_service_state_rejected() {
        let connector = test_connector(vec![
            integration_with_credentials(Service::Slack, "id", "secret"),
            integration_with_credentials(Service::Github, "id2", "secret2"),
        ]);

        // State minted for slack, presented on the github callback
        let state = connector.states().put(Service::Slack, "u1");
        let err = connector
            .handle_callback("github", "code", &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectError::InvalidState));

        // The entry was consumed by the failed attempt
        assert!(connector.states().take(&state).is_none());
    }
}
