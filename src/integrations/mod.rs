//! Integration registry for third-party OAuth providers.
//!
//! Every connectable service is described by a static [`Integration`] entry:
//! authorization/token endpoints, scope string, callback path, and the client
//! credentials loaded from environment variables. The registry is built once
//! at startup, validated exhaustively, and injected into request handlers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Marker substring used by placeholder credentials (e.g. "your-google-client-id").
/// A credential containing it is treated as not configured.
const PLACEHOLDER_MARKER: &str = "your-";

/// Enumerated service identifier for every supported integration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Google,
    Slack,
    Microsoft,
    Salesforce,
    Hubspot,
    Zapier,
    Trello,
    Asana,
    Notion,
    Github,
}

impl Service {
    /// All supported services, in registry order.
    pub const ALL: [Service; 10] = [
        Service::Google,
        Service::Slack,
        Service::Microsoft,
        Service::Salesforce,
        Service::Hubspot,
        Service::Zapier,
        Service::Trello,
        Service::Asana,
        Service::Notion,
        Service::Github,
    ];

    /// Parse a URL path segment into a service identifier.
    pub fn parse(key: &str) -> Option<Service> {
        match key {
            "google" => Some(Service::Google),
            "slack" => Some(Service::Slack),
            "microsoft" => Some(Service::Microsoft),
            "salesforce" => Some(Service::Salesforce),
            "hubspot" => Some(Service::Hubspot),
            "zapier" => Some(Service::Zapier),
            "trello" => Some(Service::Trello),
            "asana" => Some(Service::Asana),
            "notion" => Some(Service::Notion),
            "github" => Some(Service::Github),
            _ => None,
        }
    }

    /// Lowercase key used in URLs and environment variable names.
    pub fn key(&self) -> &'static str {
        match self {
            Service::Google => "google",
            Service::Slack => "slack",
            Service::Microsoft => "microsoft",
            Service::Salesforce => "salesforce",
            Service::Hubspot => "hubspot",
            Service::Zapier => "zapier",
            Service::Trello => "trello",
            Service::Asana => "asana",
            Service::Notion => "notion",
            Service::Github => "github",
        }
    }

    /// Human-facing name shown in setup messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Service::Google => "Google",
            Service::Slack => "Slack",
            Service::Microsoft => "Microsoft",
            Service::Salesforce => "Salesforce",
            Service::Hubspot => "HubSpot",
            Service::Zapier => "Zapier",
            Service::Trello => "Trello",
            Service::Asana => "Asana",
            Service::Notion => "Notion",
            Service::Github => "GitHub",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Immutable descriptor for one OAuth integration.
#[derive(Clone, Debug)]
pub struct Integration {
    pub service: Service,
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub scope: String,
    pub callback_path: String,
    pub setup_guide: String,
}

impl Integration {
    /// Whether real (non-placeholder) client credentials are present.
    ///
    /// Both client id AND client secret must be set. The upstream behavior of
    /// treating a missing secret as configured is deliberately not replicated.
    pub fn is_configured(&self) -> bool {
        credential_present(&self.client_id) && credential_present(&self.client_secret)
    }

    /// Build the provider authorization URL with state and redirect_uri.
    pub fn build_auth_url(&self, state: &str, redirect_uri: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&scope={}&response_type=code&state={}",
            self.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&self.scope),
            urlencoding::encode(state)
        )
    }
}

fn credential_present(value: &str) -> bool {
    !value.is_empty() && !value.contains(PLACEHOLDER_MARKER)
}

/// Provider endpoint table: (auth URL, token URL, scope, setup guide).
fn provider_defaults(service: Service) -> (&'static str, &'static str, &'static str, &'static str) {
    match service {
        Service::Google => (
            "https://accounts.google.com/o/oauth2/v2/auth",
            "https://oauth2.googleapis.com/token",
            "profile email https://www.googleapis.com/auth/gmail.readonly https://www.googleapis.com/auth/gmail.send https://www.googleapis.com/auth/calendar https://www.googleapis.com/auth/calendar.events",
            "https://developers.google.com/identity/protocols/oauth2",
        ),
        Service::Slack => (
            "https://slack.com/oauth/v2/authorize",
            "https://slack.com/api/oauth.v2.access",
            "channels:read,chat:write,users:read,team:read",
            "https://api.slack.com/authentication/oauth-v2",
        ),
        Service::Microsoft => (
            "https://login.microsoftonline.com/common/oauth2/v2.0/authorize",
            "https://login.microsoftonline.com/common/oauth2/v2.0/token",
            "https://graph.microsoft.com/User.Read https://graph.microsoft.com/Mail.Read https://graph.microsoft.com/Calendars.ReadWrite",
            "https://docs.microsoft.com/en-us/azure/active-directory/develop/quickstart-register-app",
        ),
        Service::Salesforce => (
            "https://login.salesforce.com/services/oauth2/authorize",
            "https://login.salesforce.com/services/oauth2/token",
            "api refresh_token",
            "https://help.salesforce.com/s/articleView?id=sf.connected_app_create.htm",
        ),
        Service::Hubspot => (
            "https://app.hubspot.com/oauth/authorize",
            "https://api.hubapi.com/oauth/v1/token",
            "contacts deals tickets",
            "https://developers.hubspot.com/docs/api/working-with-oauth",
        ),
        Service::Zapier => (
            "https://zapier.com/oauth/authorize",
            "https://zapier.com/oauth/token",
            "zaps:read zaps:write",
            "https://zapier.com/developer/",
        ),
        Service::Trello => (
            "https://trello.com/1/OAuthAuthorizeToken",
            "https://trello.com/1/OAuthGetAccessToken",
            "read,write",
            "https://developer.atlassian.com/cloud/trello/guides/rest-api/api-introduction/",
        ),
        Service::Asana => (
            "https://app.asana.com/-/oauth_authorize",
            "https://app.asana.com/-/oauth_token",
            "default",
            "https://developers.asana.com/docs/oauth",
        ),
        Service::Notion => (
            "https://api.notion.com/v1/oauth/authorize",
            "https://api.notion.com/v1/oauth/token",
            "read",
            "https://developers.notion.com/docs/authorization",
        ),
        Service::Github => (
            "https://github.com/login/oauth/authorize",
            "https://github.com/login/oauth/access_token",
            "user:email repo",
            "https://docs.github.com/en/developers/apps/building-oauth-apps",
        ),
    }
}

/// Registry of all integration descriptors, keyed by service.
#[derive(Clone, Debug)]
pub struct IntegrationRegistry {
    entries: HashMap<Service, Integration>,
}

impl IntegrationRegistry {
    /// Build the registry with credentials from `OPSDESK_OAUTH_<SERVICE>_CLIENT_ID`
    /// and `OPSDESK_OAUTH_<SERVICE>_CLIENT_SECRET` environment variables.
    ///
    /// Missing variables produce an unconfigured entry; `initiate` reports
    /// `NotConfigured` for those instead of attempting a doomed redirect.
    pub fn from_env() -> Self {
        let mut entries = HashMap::new();
        for service in Service::ALL {
            let env_prefix = service.key().to_uppercase();
            let client_id =
                std::env::var(format!("OPSDESK_OAUTH_{}_CLIENT_ID", env_prefix)).unwrap_or_default();
            let client_secret = std::env::var(format!("OPSDESK_OAUTH_{}_CLIENT_SECRET", env_prefix))
                .unwrap_or_default();
            entries.insert(service, build_entry(service, client_id, client_secret));
        }
        Self { entries }
    }

    /// Build a registry from explicit descriptors (tests, custom endpoints).
    pub fn from_entries(integrations: Vec<Integration>) -> Self {
        let mut entries = HashMap::new();
        for integration in integrations {
            entries.insert(integration.service, integration);
        }
        Self { entries }
    }

    /// Look up the descriptor for a service.
    pub fn get(&self, service: Service) -> Option<&Integration> {
        self.entries.get(&service)
    }

    /// Validate that every service has an entry with non-empty endpoints.
    pub fn validate(&self) -> anyhow::Result<()> {
        for service in Service::ALL {
            let entry = self
                .entries
                .get(&service)
                .ok_or_else(|| anyhow::anyhow!("missing registry entry for '{}'", service))?;
            if entry.auth_url.is_empty() || entry.token_url.is_empty() {
                anyhow::bail!("registry entry for '{}' has empty endpoint URLs", service);
            }
            if entry.callback_path.is_empty() {
                anyhow::bail!("registry entry for '{}' has empty callback path", service);
            }
        }
        Ok(())
    }

    /// Number of configured (real credentials) integrations.
    pub fn configured_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_configured()).count()
    }
}

fn build_entry(service: Service, client_id: String, client_secret: String) -> Integration {
    let (auth_url, token_url, scope, setup_guide) = provider_defaults(service);
    Integration {
        service,
        client_id,
        client_secret,
        auth_url: auth_url.to_string(),
        token_url: token_url.to_string(),
        scope: scope.to_string(),
        callback_path: format!("/auth/{}/callback", service.key()),
        setup_guide: setup_guide.to_string(),
    }
}

/// Build one integration with explicit credentials and default endpoints.
/// Used by tests and by deployments overriding single entries.
pub fn integration_with_credentials(
    service: Service,
    client_id: &str,
    client_secret: &str,
) -> Integration {
    build_entry(service, client_id.to_string(), client_secret.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_services() {
        assert_eq!(Service::parse("slack"), Some(Service::Slack));
        assert_eq!(Service::parse("github"), Some(Service::Github));
        assert_eq!(Service::parse("hubspot"), Some(Service::Hubspot));
        assert_eq!(Service::parse("invalid"), None);
        assert_eq!(Service::parse(""), None);
        // Keys are case-sensitive, matching the URL path
        assert_eq!(Service::parse("Slack"), None);
    }

    #[test]
    fn test_key_round_trips() {
        for service in Service::ALL {
            assert_eq!(Service::parse(service.key()), Some(service));
        }
    }

    #[test]
    fn test_placeholder_credentials_not_configured() {
        let entry = integration_with_credentials(
            Service::Google,
            "your-google-client-id",
            "your-google-client-secret",
        );
        assert!(!entry.is_configured());
    }

    #[test]
    fn test_missing_secret_not_configured() {
        // A real client id with a missing secret must NOT count as configured
        let entry = integration_with_credentials(Service::Trello, "real-id-123", "");
        assert!(!entry.is_configured());
    }

    #[test]
    fn test_real_credentials_configured() {
        let entry = integration_with_credentials(Service::Slack, "slack-id", "slack-secret");
        assert!(entry.is_configured());
    }

    #[test]
    fn test_build_auth_url() {
        let mut entry = integration_with_credentials(Service::Slack, "test_client_id", "sekret");
        entry.auth_url = "https://example.com/oauth/authorize".to_string();
        entry.scope = "read write".to_string();

        let url = entry.build_auth_url("random_state", "http://localhost:3002/auth/slack/callback");

        assert!(url.starts_with("https://example.com/oauth/authorize?"));
        assert!(url.contains("client_id=test_client_id"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3002%2Fauth%2Fslack%2Fcallback"));
        assert!(url.contains("scope=read%20write"));
        assert!(url.contains("state=random_state"));
        assert!(url.contains("response_type=code"));
    }

    #[test]
    fn test_registry_covers_all_services() {
        let registry = IntegrationRegistry::from_entries(
            Service::ALL
                .iter()
                .map(|s| integration_with_credentials(*s, "", ""))
                .collect(),
        );
        assert!(registry.validate().is_ok());
        for service in Service::ALL {
            assert!(registry.get(service).is_some());
        }
    }

    #[test]
    fn test_registry_validation_rejects_missing_entry() {
        let registry = IntegrationRegistry::from_entries(vec![integration_with_credentials(
            Service::Slack,
            "id",
            "secret",
        )]);
        assert!(registry.validate().is_err());
    }
}
