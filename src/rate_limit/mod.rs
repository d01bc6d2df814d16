//! Per-client request rate limiting.
//!
//! Token bucket per client IP, refilled continuously at capacity/window.
//! Buckets are created lazily on first request. State is in-memory only
//! (resets on restart).

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Token bucket for a single client.
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(capacity: u64) -> Self {
        Self {
            tokens: capacity as f64,
            last_refill: Instant::now(),
        }
    }

    /// Try to consume one token. Refills at rate = capacity/window tokens/sec.
    fn try_consume(&mut self, capacity: u64, window_seconds: u64) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        let refill_rate = capacity as f64 / window_seconds.max(1) as f64;
        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity as f64);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Per-client-IP token bucket rate limiter.
pub struct RateLimiter {
    buckets: DashMap<String, TokenBucket>,
    capacity: u64,
    window_seconds: u64,
}

impl RateLimiter {
    pub fn new(capacity: u64, window_seconds: u64) -> Self {
        Self {
            buckets: DashMap::new(),
            capacity,
            window_seconds,
        }
    }

    /// Check and consume one token for `client`.
    ///
    /// Returns true if the request is allowed.
    pub fn check_and_consume(&self, client: &str) -> bool {
        let mut bucket = self
            .buckets
            .entry(client.to_string())
            .or_insert_with(|| TokenBucket::new(self.capacity));
        bucket.try_consume(self.capacity, self.window_seconds)
    }
}

#[derive(serde::Serialize)]
struct RateLimitedResponse {
    error: String,
}

/// Axum middleware enforcing the limit ahead of the routers.
///
/// The client key is the peer IP when connect info is available (it is not
/// under `tower::ServiceExt::oneshot` in tests), otherwise a shared bucket.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    if !limiter.check_and_consume(&client) {
        tracing::warn!(client = %client, "Rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(RateLimitedResponse {
                error: "Too many requests from this IP, please try again later.".to_string(),
            }),
        )
            .into_response();
    }

    next.run(request).await
}
