// Integration registry and descriptors
pub mod integrations;

// Multi-provider OAuth authorization-code flow
pub mod oauth;

// Server-side sessions
pub mod sessions;

// In-memory demo stores
pub mod store;

// HTTP APIs
pub mod api;

// Per-IP request rate limiting
pub mod rate_limit;

// Configuration
pub mod config;
