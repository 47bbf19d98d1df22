//! Seller store records.

use chrono::{DateTime, Utc};
use serde::Serialize;

use mercantia_core::{Slug, StoreId, UserId};

/// A seller's shop, owning products and receiving orders.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: StoreId,
    pub user_id: UserId,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    /// Street/city/state/zip/country, free-form.
    pub address: Option<serde_json::Value>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A store together with its active-product count, for owner listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreWithCount {
    #[serde(flatten)]
    pub store: Store,
    pub product_count: i64,
}
