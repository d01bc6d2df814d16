//! Application configuration.
//!
//! Loaded from a TOML file at startup; every section has defaults so a
//! missing file or partial config still yields a runnable server. OAuth
//! client credentials are not in the file: they come from environment
//! variables via [`crate::integrations::IntegrationRegistry::from_env`].

use serde::Deserialize;

/// Complete opsdesk configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OpsdeskConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub oauth: OAuthConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public base URL used to build OAuth redirect URIs.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_port() -> u16 {
    3002
}

fn default_base_url() -> String {
    "http://localhost:3002".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            base_url: default_base_url(),
        }
    }
}

/// Session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// How long a session cookie stays valid (hours).
    #[serde(default = "default_session_ttl_hours")]
    pub ttl_hours: i64,
}

fn default_session_ttl_hours() -> i64 {
    24
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_session_ttl_hours(),
        }
    }
}

/// OAuth state store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthConfig {
    /// How long state tokens remain valid (seconds).
    #[serde(default = "default_state_ttl_seconds")]
    pub state_ttl_seconds: i64,
    /// How often abandoned state entries are swept (seconds).
    #[serde(default = "default_sweep_interval_seconds")]
    pub sweep_interval_seconds: u64,
}

fn default_state_ttl_seconds() -> i64 {
    600
}

fn default_sweep_interval_seconds() -> u64 {
    60
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            state_ttl_seconds: default_state_ttl_seconds(),
            sweep_interval_seconds: default_sweep_interval_seconds(),
        }
    }
}

/// AI chat configuration. Without an API key the endpoint serves canned
/// fallback responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Completion API key. Overridden by OPSDESK_CHAT_API_KEY when set.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_chat_api_url")]
    pub api_url: String,
    #[serde(default = "default_chat_model")]
    pub model: String,
    #[serde(default = "default_chat_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_chat_temperature")]
    pub temperature: f64,
    /// How many prior conversation turns are forwarded to the provider.
    #[serde(default = "default_chat_history_limit")]
    pub history_limit: usize,
}

fn default_chat_api_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_chat_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_chat_max_tokens() -> u32 {
    1000
}

fn default_chat_temperature() -> f64 {
    0.7
}

fn default_chat_history_limit() -> usize {
    10
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_chat_api_url(),
            model: default_chat_model(),
            max_tokens: default_chat_max_tokens(),
            temperature: default_chat_temperature(),
            history_limit: default_chat_history_limit(),
        }
    }
}

/// Rate limit configuration (per client IP).
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_max_requests")]
    pub max_requests: u64,
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,
}

fn default_max_requests() -> u64 {
    100
}

fn default_window_seconds() -> u64 {
    900
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_seconds: default_window_seconds(),
        }
    }
}

/// Load configuration from a TOML file.
pub fn load_config(path: &str) -> anyhow::Result<OpsdeskConfig> {
    let contents = std::fs::read_to_string(path)?;
    let config: OpsdeskConfig = toml::from_str(&contents)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OpsdeskConfig::default();
        assert_eq!(config.server.port, 3002);
        assert_eq!(config.server.base_url, "http://localhost:3002");
        assert_eq!(config.session.ttl_hours, 24);
        assert_eq!(config.oauth.state_ttl_seconds, 600);
        assert_eq!(config.rate_limit.max_requests, 100);
        assert_eq!(config.chat.model, "gpt-3.5-turbo");
        assert!(config.chat.api_key.is_none());
    }

    #[test]
    fn test_config_deserialization() {
        let toml = r#"
            [server]
            port = 8080
            base_url = "https://opsdesk.example.com"

            [session]
            ttl_hours = 12

            [oauth]
            state_ttl_seconds = 300
            sweep_interval_seconds = 30

            [chat]
            api_key = "sk-test"
            model = "gpt-4"

            [rate_limit]
            max_requests = 50
            window_seconds = 60
        "#;

        let config: OpsdeskConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.base_url, "https://opsdesk.example.com");
        assert_eq!(config.session.ttl_hours, 12);
        assert_eq!(config.oauth.state_ttl_seconds, 300);
        assert_eq!(config.chat.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.chat.model, "gpt-4");
        assert_eq!(config.rate_limit.max_requests, 50);
    }

    #[test]
    fn test_partial_config() {
        // Missing sections use defaults
        let toml = r#"
            [server]
            port = 9000
        "#;

        let config: OpsdeskConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.session.ttl_hours, 24);
        assert_eq!(config.rate_limit.window_seconds, 900);
    }
}
