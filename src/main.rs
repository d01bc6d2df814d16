use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use opsdesk::api::{
    create_analytics_router, create_auth_router, create_chat_router, create_email_router,
    create_integration_router, create_schedule_router, create_subscription_router, AuthAppState,
    ChatAppState, EmailAppState, IntegrationAppState, ScheduleAppState, SubscriptionAppState,
};
use opsdesk::config::{load_config, OpsdeskConfig};
use opsdesk::integrations::IntegrationRegistry;
use opsdesk::oauth::{run_state_sweep, OAuthConnector, StateStore};
use opsdesk::rate_limit::{rate_limit_middleware, RateLimiter};
use opsdesk::sessions::SessionStore;
use opsdesk::store::{ConnectionStore, MeetingStore, RuleStore, SubscriptionStore, UserStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "opsdesk=info".into()),
        )
        .init();

    let mut config = match std::env::args().nth(1) {
        Some(path) => load_config(&path)?,
        None => OpsdeskConfig::default(),
    };

    // Environment wins over the config file for the completion API key
    if let Ok(key) = std::env::var("OPSDESK_CHAT_API_KEY") {
        config.chat.api_key = Some(key);
    }

    let registry = Arc::new(IntegrationRegistry::from_env());
    registry.validate()?;
    info!(
        configured = registry.configured_count(),
        "Integration registry loaded"
    );

    let sessions = Arc::new(SessionStore::new(config.session.ttl_hours));
    let connections = Arc::new(ConnectionStore::new());
    let states = StateStore::new(config.oauth.state_ttl_seconds);
    let connector = Arc::new(OAuthConnector::new(
        Arc::clone(&registry),
        states.clone(),
        Arc::clone(&connections),
        config.server.base_url.clone(),
    ));

    tokio::spawn(run_state_sweep(
        states,
        config.oauth.sweep_interval_seconds,
    ));

    let users = Arc::new(UserStore::new());
    let rules = Arc::new(RuleStore::new());
    let meetings = Arc::new(MeetingStore::new());
    let subscriptions = Arc::new(SubscriptionStore::new());
    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit.max_requests,
        config.rate_limit.window_seconds,
    ));

    let app = Router::new()
        .merge(create_integration_router(IntegrationAppState {
            connector,
            registry,
            sessions: Arc::clone(&sessions),
            connections,
        }))
        .merge(create_auth_router(AuthAppState {
            users,
            sessions: Arc::clone(&sessions),
        }))
        .merge(create_chat_router(ChatAppState {
            config: config.chat.clone(),
            http: reqwest::Client::new(),
        }))
        .merge(create_email_router(EmailAppState { rules }))
        .merge(create_schedule_router(ScheduleAppState { meetings }))
        .merge(create_analytics_router())
        .merge(create_subscription_router(SubscriptionAppState {
            subscriptions,
            sessions,
        }))
        .route("/health", get(health))
        .layer(axum::middleware::from_fn_with_state(
            limiter,
            rate_limit_middleware,
        ))
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!(addr = %addr, base_url = %config.server.base_url, "opsdesk listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "service": "opsdesk"
    }))
}
