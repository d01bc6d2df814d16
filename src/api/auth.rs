//! Login, registration, and session endpoints.
//!
//! Mock authentication: a fixed demo password checked against the in-memory
//! user array. Sessions are server-side and cookie-referenced.

use crate::sessions::{SessionStore, SESSION_COOKIE};
use crate::store::{User, UserStore};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The only accepted password in demo mode.
const DEMO_PASSWORD: &str = "demo123";

/// Shared application state for the auth API.
#[derive(Clone)]
pub struct AuthAppState {
    pub users: Arc<UserStore>,
    pub sessions: Arc<SessionStore>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    email: String,
    #[allow(dead_code)]
    password: String,
    name: String,
    company: String,
}

#[derive(Serialize)]
struct AuthResponse {
    success: bool,
    user: User,
}

#[derive(Serialize)]
struct SuccessResponse {
    success: bool,
}

#[derive(Serialize)]
struct FailureResponse {
    success: bool,
    message: String,
}

/// Auth endpoint errors, rendered as `{success:false, message}`.
enum AuthError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AuthError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AuthError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        (
            status,
            Json(FailureResponse {
                success: false,
                message,
            }),
        )
            .into_response()
    }
}

/// Create the auth API router.
pub fn create_auth_router(state: AuthAppState) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
        .with_state(Arc::new(state))
}

/// POST /api/auth/login
async fn login(
    State(state): State<Arc<AuthAppState>>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AuthError> {
    let user = state.users.find_by_email(&body.email);

    let Some(user) = user.filter(|_| body.password == DEMO_PASSWORD) else {
        warn!(email = %body.email, "Login rejected");
        return Err(AuthError::Unauthorized("Invalid credentials".to_string()));
    };

    let session_id = state.sessions.create(&user.id);
    info!(user = %user.id, "User logged in");

    Ok((
        jar.add(session_cookie(session_id)),
        Json(AuthResponse {
            success: true,
            user,
        }),
    ))
}

/// POST /api/auth/register
async fn register(
    State(state): State<Arc<AuthAppState>>,
    jar: CookieJar,
    Json(body): Json<RegisterRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AuthError> {
    let user = state
        .users
        .create(&body.email, &body.name, &body.company)
        .ok_or_else(|| {
            warn!(email = %body.email, "Registration rejected, email taken");
            AuthError::BadRequest("User already exists".to_string())
        })?;

    let session_id = state.sessions.create(&user.id);
    info!(user = %user.id, "User registered");

    Ok((
        jar.add(session_cookie(session_id)),
        Json(AuthResponse {
            success: true,
            user,
        }),
    ))
}

/// POST /api/auth/logout
async fn logout(
    State(state): State<Arc<AuthAppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<SuccessResponse>) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.remove(cookie.value());
        debug!("Session destroyed");
    }

    (
        jar.remove(Cookie::from(SESSION_COOKIE)),
        Json(SuccessResponse { success: true }),
    )
}

/// GET /api/auth/me
async fn me(
    State(state): State<Arc<AuthAppState>>,
    jar: CookieJar,
) -> Result<Json<AuthResponse>, AuthError> {
    let user_id = state
        .sessions
        .user_from_jar(&jar)
        .ok_or_else(|| AuthError::Unauthorized("Not authenticated".to_string()))?;

    let user = state
        .users
        .find_by_id(&user_id)
        .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;

    Ok(Json(AuthResponse {
        success: true,
        user,
    }))
}

fn session_cookie(session_id: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .build()
}
