//! User accounts and database-backed sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mercantia_core::{Email, SessionId, UserId, UserRole};

/// A registered user.
///
/// The password hash never leaves the repository layer; this struct is safe
/// to serialize in API responses.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub full_name: Option<String>,
    pub role: String,
    pub email_verified: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Parsed role, defaulting to `User` for unknown database values.
    #[must_use]
    pub fn role(&self) -> UserRole {
        self.role.parse().unwrap_or(UserRole::User)
    }
}

/// A server-side session row backing an issued token.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionRecord {
    pub id: SessionId,
    pub user_id: UserId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Whether the session has passed its expiry time.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// The authenticated user attached to a request by the auth extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Email,
    pub role: String,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_expiry() {
        let mut session = SessionRecord {
            id: SessionId::generate(),
            user_id: UserId::generate(),
            token: "tok".to_string(),
            expires_at: Utc::now() + chrono::Duration::hours(1),
            user_agent: None,
            ip_address: None,
            created_at: Utc::now(),
        };
        assert!(!session.is_expired());

        session.expires_at = Utc::now() - chrono::Duration::seconds(1);
        assert!(session.is_expired());
    }

    #[test]
    fn test_unknown_role_defaults_to_user() {
        let user = User {
            id: UserId::generate(),
            email: Email::parse("a@b.c").unwrap(),
            full_name: None,
            role: "wizard".to_string(),
            email_verified: false,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(user.role(), UserRole::User);
    }
}
