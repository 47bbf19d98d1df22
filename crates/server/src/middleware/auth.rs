//! Authentication extractors.
//!
//! Handlers take [`RequireAuth`] or [`OptionalAuth`] as arguments; the
//! extractor reads the session cookie (or a bearer token), verifies the
//! signed token, and confirms the server-side session row still exists.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::cookies;
use crate::models::CurrentUser;
use crate::services::auth;
use crate::state::AppState;

/// Extractor that requires an authenticated user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Rejection returned when authentication is required but missing or invalid.
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Authentication required" })),
        )
            .into_response()
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts).ok_or(AuthRejection)?;

        let user = auth::authenticate(state, &token)
            .await
            .map_err(|_| AuthRejection)?;

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request when no valid
/// session is present.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = match extract_token(parts) {
            Some(token) => auth::authenticate(state, &token).await.ok(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Pull the session token from the cookie, or a `Bearer` header for API
/// clients that don't use cookies.
fn extract_token(parts: &Parts) -> Option<String> {
    if let Some(token) = cookies::get_cookie(&parts.headers, cookies::AUTH_COOKIE) {
        return Some(token);
    }

    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(ToString::to_string)
}
