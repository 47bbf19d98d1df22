//! Order records and their immutable snapshots.

use chrono::{DateTime, Utc};
use serde::Serialize;

use mercantia_core::{OrderId, OrderItemId, OrderStatus, ProductId, StoreId, UserId};

/// An order placed against a single store.
///
/// Checkout splits a mixed cart into one order per store; all money fields
/// are integer minor units snapshotted at creation time.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub store_id: StoreId,
    pub status: String,
    pub subtotal: i64,
    pub tax: i64,
    pub shipping_cost: i64,
    pub discount: i64,
    pub total: i64,
    pub notes: Option<String>,
    pub payment_transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Parsed status, defaulting to `Pending` for unknown database values.
    #[must_use]
    pub fn status(&self) -> OrderStatus {
        self.status.parse().unwrap_or(OrderStatus::Pending)
    }
}

/// A line on an order, snapshotting price and quantity.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub price_per_unit: i64,
    pub total: i64,
}

/// The shipping address snapshotted onto an order.
///
/// Copied from the user's address book at checkout so later edits to the
/// address book do not change where a placed order ships.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderAddress {
    pub order_id: OrderId,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub street: String,
    pub city: String,
    pub state: Option<String>,
    pub zip_code: String,
    pub country: String,
}

/// An order with its items and address, for detail responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub address: Option<OrderAddress>,
}
