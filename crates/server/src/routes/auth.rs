//! Authentication route handlers.
//!
//! Sessions ride in an httpOnly cookie; API clients without cookies can use
//! the same token as a `Bearer` header.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::error::{Result, set_sentry_user};
use crate::middleware::RequireAuth;
use crate::middleware::cookies;
use crate::middleware::csrf;
use crate::middleware::rate_limit;
use crate::services::auth::{self, AuthenticatedSession, SessionMeta};
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Create an account and open the first session.
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RegisterRequest>,
) -> Result<Response> {
    let meta = session_meta(&headers);
    let session = auth::register(
        &state,
        &body.email,
        &body.password,
        body.full_name.as_deref(),
        &meta,
    )
    .await?;

    set_sentry_user(&session.user.id, Some(session.user.email.as_str()));
    tracing::info!(user_id = %session.user.id, "User registered");

    Ok(session_response(&state, &session, StatusCode::CREATED))
}

/// Login with email and password.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> Result<Response> {
    let meta = session_meta(&headers);
    let session = auth::login(&state, &body.email, &body.password, &meta).await?;

    set_sentry_user(&session.user.id, Some(session.user.email.as_str()));
    tracing::info!(user_id = %session.user.id, "User logged in");

    Ok(session_response(&state, &session, StatusCode::OK))
}

/// Revoke the current session and clear the cookie.
///
/// Succeeds even without a valid session so a half-logged-out client can
/// always reach a clean state.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    if let Some(token) = cookies::get_cookie(&headers, cookies::AUTH_COOKIE) {
        auth::logout(&state, &token).await?;
    }

    let clear = cookies::clear_auth_cookie(state.config().cookies_secure());
    Ok((
        [(SET_COOKIE, clear)],
        Json(json!({ "message": "Logged out" })),
    )
        .into_response())
}

/// The authenticated user behind the current session.
pub async fn me(RequireAuth(user): RequireAuth) -> impl IntoResponse {
    Json(json!({ "user": user }))
}

/// Issue a CSRF token.
///
/// The token also arrives in the `csrf_token` cookie; this endpoint exists
/// so clients can bootstrap before their first mutation.
pub async fn csrf_token(State(state): State<AppState>) -> impl IntoResponse {
    let token = csrf::generate_token();
    let cookie = cookies::csrf_cookie(&token, state.config().cookies_secure());
    (
        [(SET_COOKIE, cookie)],
        Json(json!({ "csrfToken": token })),
    )
}

/// Build the user payload response with the session cookie attached.
fn session_response(state: &AppState, session: &AuthenticatedSession, status: StatusCode) -> Response {
    let cookie = cookies::auth_cookie(&session.token, state.config().cookies_secure());
    (
        status,
        [(SET_COOKIE, cookie)],
        Json(json!({ "user": session.user, "token": session.token })),
    )
        .into_response()
}

/// Request metadata recorded on the session row.
fn session_meta(headers: &HeaderMap) -> SessionMeta {
    let user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);

    SessionMeta {
        user_agent,
        ip_address: rate_limit::forwarded_ip(headers),
    }
}
