//! Shopping cart records.

use chrono::{DateTime, Utc};
use serde::Serialize;

use mercantia_core::{CartId, CartItemId, ProductId, UserId};

/// A user's cart. One cart per user, created on first use.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A cart line. `price_per_unit` snapshots the product price at add time.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub price_per_unit: i64,
    pub added_at: DateTime<Utc>,
}

/// A cart line joined with display fields from the product.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartItemDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub item: CartItem,
    pub store_id: mercantia_core::StoreId,
    pub product_name: String,
    pub product_slug: String,
    pub product_images: serde_json::Value,
    pub current_price: i64,
    pub inventory: i32,
}

/// Cart totals returned alongside the item list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub subtotal: i64,
    pub item_count: usize,
}

impl CartTotals {
    /// Sum line totals over the given items.
    #[must_use]
    pub fn compute(items: &[CartItemDetail]) -> Self {
        let subtotal = items
            .iter()
            .map(|i| i.item.price_per_unit.saturating_mul(i64::from(i.item.quantity)))
            .sum();
        Self {
            subtotal,
            item_count: items.len(),
        }
    }
}
