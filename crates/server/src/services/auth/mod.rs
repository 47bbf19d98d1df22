//! Authentication service.
//!
//! Sessions are a signed token plus a server-side row: the token carries
//! identity claims, the row makes revocation possible. Both must check out
//! for a request to be authenticated.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use mercantia_core::Email;

use crate::db::RepositoryError;
use crate::db::sessions::SessionRepository;
use crate::db::users::UserRepository;
use crate::models::CurrentUser;
use crate::models::user::User;
use crate::state::AppState;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Sessions and their tokens live for seven days.
pub const SESSION_TTL_DAYS: i64 = 7;

/// Claims carried in the session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: String,
    pub email: String,
    pub role: String,
    /// Expiry, seconds since epoch.
    pub exp: i64,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
}

/// A successful login or registration: the user plus their session token.
#[derive(Debug)]
pub struct AuthenticatedSession {
    pub user: User,
    pub token: String,
}

/// Request metadata recorded on the session row.
#[derive(Debug, Default, Clone)]
pub struct SessionMeta {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

/// Register a new user and open their first session.
///
/// # Errors
///
/// Returns `AuthError::InvalidEmail` if the email format is invalid.
/// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
/// Returns `AuthError::UserAlreadyExists` if the email is already registered.
pub async fn register(
    state: &AppState,
    email: &str,
    password: &str,
    full_name: Option<&str>,
    meta: &SessionMeta,
) -> Result<AuthenticatedSession, AuthError> {
    let email = Email::parse(email)?;
    validate_password(password)?;
    let password_hash = hash_password(password)?;

    let users = UserRepository::new(state.pool());
    let user = users
        .create(&email, &password_hash, full_name)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Database(other),
        })?;

    let token = open_session(state, &user, meta).await?;

    Ok(AuthenticatedSession { user, token })
}

/// Login with email and password.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
pub async fn login(
    state: &AppState,
    email: &str,
    password: &str,
    meta: &SessionMeta,
) -> Result<AuthenticatedSession, AuthError> {
    let email = Email::parse(email)?;

    let users = UserRepository::new(state.pool());
    let (user, password_hash) = users
        .get_with_password_hash(&email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    verify_password(password, &password_hash)?;

    users.touch_last_login(user.id).await?;
    let token = open_session(state, &user, meta).await?;

    Ok(AuthenticatedSession { user, token })
}

/// Validate a session token end to end.
///
/// Checks the signature and expiry claims, then confirms the server-side
/// session row still exists. Expired rows are deleted on sight.
///
/// # Errors
///
/// Returns `AuthError::InvalidToken` if the token fails verification.
/// Returns `AuthError::SessionExpired` if the session row is gone or stale.
pub async fn authenticate(state: &AppState, token: &str) -> Result<CurrentUser, AuthError> {
    let claims = decode_claims(state, token)?;

    let sessions = SessionRepository::new(state.pool());
    let session = sessions
        .get_by_token(token)
        .await?
        .ok_or(AuthError::SessionExpired)?;

    if session.is_expired() {
        // Purge the whole expired backlog, not just this token's row.
        sessions.delete_expired().await?;
        return Err(AuthError::SessionExpired);
    }

    let users = UserRepository::new(state.pool());
    let user = users
        .get_by_id(session.user_id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    // The row is authoritative; claims are only a cross-check.
    if claims.sub != user.id.to_string() {
        return Err(AuthError::InvalidToken);
    }

    Ok(CurrentUser::from(&user))
}

/// Revoke the session behind a token. Succeeds even if already gone.
///
/// # Errors
///
/// Returns `AuthError::Database` if the deletion fails.
pub async fn logout(state: &AppState, token: &str) -> Result<(), AuthError> {
    SessionRepository::new(state.pool())
        .delete_by_token(token)
        .await?;
    Ok(())
}

/// How often the background purger removes expired session rows.
const PURGE_INTERVAL: std::time::Duration = std::time::Duration::from_secs(3600);

/// Spawn a background task that periodically deletes expired sessions.
///
/// Expired rows are also purged when an expired token is presented, but
/// abandoned sessions never present their token again; this task keeps the
/// table from accumulating them.
pub fn spawn_session_purger(pool: sqlx::PgPool) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        // First tick fires immediately; skip it.
        interval.tick().await;
        loop {
            interval.tick().await;
            match SessionRepository::new(&pool).delete_expired().await {
                Ok(0) => {}
                Ok(purged) => tracing::debug!(purged, "Expired sessions removed"),
                Err(e) => tracing::warn!(error = %e, "Expired session purge failed"),
            }
        }
    });
}

/// Issue a token and persist its session row.
async fn open_session(
    state: &AppState,
    user: &User,
    meta: &SessionMeta,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let expires_at = now + Duration::days(SESSION_TTL_DAYS);

    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.as_str().to_string(),
        role: user.role.clone(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.config().jwt_secret.expose_secret().as_bytes()),
    )?;

    SessionRepository::new(state.pool())
        .create(
            user.id,
            &token,
            expires_at,
            meta.user_agent.as_deref(),
            meta.ip_address.as_deref(),
        )
        .await?;

    Ok(token)
}

fn decode_claims(state: &AppState, token: &str) -> Result<Claims, AuthError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.config().jwt_secret.expose_secret().as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AuthError::InvalidToken)
}

/// Validate password strength requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AuthError::WeakPassword(
            "password must contain at least one number".to_string(),
        ));
    }

    if !password.chars().any(char::is_alphabetic) {
        return Err(AuthError::WeakPassword(
            "password must contain at least one letter".to_string(),
        ));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_too_short() {
        assert!(matches!(
            validate_password("a1"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_validate_password_needs_digit() {
        assert!(matches!(
            validate_password("onlyletters"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_validate_password_needs_letter() {
        assert!(matches!(
            validate_password("1234567890"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_validate_password_ok() {
        assert!(validate_password("correct horse 1").is_ok());
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(verify_password("hunter2hunter2", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong-password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("samepassword1").unwrap();
        let b = hash_password("samepassword1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("password1", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    fn test_claims(exp: i64) -> Claims {
        Claims {
            sub: "user-1".to_string(),
            email: "a@b.c".to_string(),
            role: "user".to_string(),
            exp,
            iat: Utc::now().timestamp(),
        }
    }

    #[test]
    fn test_token_roundtrip() {
        let secret = b"unit-test-secret";
        let claims = test_claims((Utc::now() + Duration::hours(1)).timestamp());

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap();

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(secret),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(decoded.claims.sub, "user-1");
        assert_eq!(decoded.claims.role, "user");
    }

    #[test]
    fn test_expired_token_rejected() {
        let secret = b"unit-test-secret";
        let claims = test_claims((Utc::now() - Duration::hours(1)).timestamp());

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap();

        assert!(
            decode::<Claims>(
                &token,
                &DecodingKey::from_secret(secret),
                &Validation::default(),
            )
            .is_err()
        );
    }

    #[test]
    fn test_wrong_key_rejected() {
        let claims = test_claims((Utc::now() + Duration::hours(1)).timestamp());
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"key-one"),
        )
        .unwrap();

        assert!(
            decode::<Claims>(
                &token,
                &DecodingKey::from_secret(b"key-two"),
                &Validation::default(),
            )
            .is_err()
        );
    }
}
