//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a user
//! mercantia user create -e maria@example.com -n "Maria Silva" -p "s3cret-pass"
//!
//! # Create an admin user
//! mercantia user create -e admin@example.com -n "Admin" -p "s3cret-pass" -r admin
//! ```
//!
//! # Environment Variables
//!
//! - `MERCANTIA_DATABASE_URL` - `PostgreSQL` connection string

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use mercantia_core::{Email, UserRole};

use super::migrate::MigrationError;

const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    /// Required environment variable is missing.
    #[error("{0}")]
    Environment(#[from] MigrationError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: user, admin")]
    InvalidRole(String),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password too short.
    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    WeakPassword,

    /// User already exists.
    #[error("User already exists with email: {0}")]
    UserExists(String),

    /// Password hashing failed.
    #[error("Failed to hash password")]
    Hashing,
}

/// Create a new user.
///
/// # Errors
///
/// Returns `UserError` if validation fails, the email is taken, or the
/// database rejects the insert.
pub async fn create(
    email: &str,
    name: &str,
    password: &str,
    role: &str,
) -> Result<Uuid, UserError> {
    dotenvy::dotenv().ok();

    let role: UserRole = role
        .parse()
        .map_err(|_| UserError::InvalidRole(role.to_owned()))?;
    let email = Email::parse(email).map_err(|e| UserError::InvalidEmail(e.to_string()))?;
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(UserError::WeakPassword);
    }

    let database_url = super::migrate::database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Creating user: {} ({})", email.as_str(), role);

    let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(&pool)
        .await?;

    if existing.is_some() {
        return Err(UserError::UserExists(email.into_inner()));
    }

    let password_hash = hash_password(password)?;

    let user_id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO users (email, password_hash, full_name, role) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id",
    )
    .bind(email.as_str())
    .bind(&password_hash)
    .bind(name)
    .bind(role.to_string())
    .fetch_one(&pool)
    .await?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}, Role: {}",
        user_id,
        email.as_str(),
        role
    );

    Ok(user_id)
}

pub(crate) fn hash_password(password: &str) -> Result<String, UserError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|_| UserError::Hashing)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_salts_differ() {
        let a = hash_password("correct horse battery").unwrap();
        let b = hash_password("correct horse battery").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2"));
    }
}
