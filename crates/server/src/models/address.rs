//! User shipping address book.

use chrono::{DateTime, Utc};
use serde::Serialize;

use mercantia_core::{AddressId, UserId};

/// A saved shipping address. At most one per user is the default.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub id: AddressId,
    pub user_id: UserId,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub street: String,
    pub city: String,
    pub state: Option<String>,
    pub zip_code: String,
    pub country: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
