//! Order repository for database operations.
//!
//! Order placement is a single transaction: insert one order per store,
//! snapshot line items and the shipping address, decrement inventory, and
//! clear the cart. Any failure rolls the whole checkout back.

use sqlx::{PgPool, Postgres, Transaction};

use mercantia_core::{CartId, OrderId, OrderStatus, ProductId, StoreId, UserId};

use super::RepositoryError;
use crate::models::order::{Order, OrderAddress, OrderDetail, OrderItem};

const ORDER_COLUMNS: &str = "id, user_id, store_id, status, subtotal, tax, shipping_cost, \
                             discount, total, notes, payment_transaction_id, \
                             created_at, updated_at";

/// A priced order for one store, ready to persist.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub store_id: StoreId,
    pub subtotal: i64,
    pub tax: i64,
    pub shipping_cost: i64,
    pub total: i64,
    pub notes: Option<String>,
    pub items: Vec<NewOrderItem>,
}

/// A priced line within a [`NewOrder`].
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: i32,
    pub price_per_unit: i64,
    pub total: i64,
}

/// The shipping address to snapshot onto each created order.
#[derive(Debug, Clone)]
pub struct AddressSnapshot {
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub street: String,
    pub city: String,
    pub state: Option<String>,
    pub zip_code: String,
    pub country: String,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a checkout atomically.
    ///
    /// Inserts every order with its items and address snapshot, decrements
    /// product inventory, and empties the cart. The inventory decrement is
    /// guarded in SQL, so two concurrent checkouts cannot oversell.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InsufficientInventory` if any product lacks
    /// stock, rolling back the entire checkout.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn place_orders(
        &self,
        user_id: UserId,
        cart_id: CartId,
        orders: &[NewOrder],
        address: &AddressSnapshot,
    ) -> Result<Vec<Order>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(orders.len());

        for draft in orders {
            let order = sqlx::query_as::<_, Order>(&format!(
                "INSERT INTO orders \
                     (user_id, store_id, status, subtotal, tax, shipping_cost, \
                      discount, total, notes) \
                 VALUES ($1, $2, $3, $4, $5, $6, 0, $7, $8) \
                 RETURNING {ORDER_COLUMNS}"
            ))
            .bind(user_id)
            .bind(draft.store_id)
            .bind(OrderStatus::Pending.as_str())
            .bind(draft.subtotal)
            .bind(draft.tax)
            .bind(draft.shipping_cost)
            .bind(draft.total)
            .bind(&draft.notes)
            .fetch_one(&mut *tx)
            .await?;

            for item in &draft.items {
                decrement_inventory(&mut tx, item.product_id, item.quantity).await?;

                sqlx::query(
                    "INSERT INTO order_items \
                         (order_id, product_id, quantity, price_per_unit, total) \
                     VALUES ($1, $2, $3, $4, $5)",
                )
                .bind(order.id)
                .bind(item.product_id)
                .bind(item.quantity)
                .bind(item.price_per_unit)
                .bind(item.total)
                .execute(&mut *tx)
                .await?;
            }

            sqlx::query(
                "INSERT INTO order_addresses \
                     (order_id, full_name, phone, email, street, city, state, \
                      zip_code, country) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            )
            .bind(order.id)
            .bind(&address.full_name)
            .bind(&address.phone)
            .bind(&address.email)
            .bind(&address.street)
            .bind(&address.city)
            .bind(&address.state)
            .bind(&address.zip_code)
            .bind(&address.country)
            .execute(&mut *tx)
            .await?;

            created.push(order);
        }

        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    /// Get an order with its items and address snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any query fails.
    pub async fn get_detail(&self, id: OrderId) -> Result<Option<OrderDetail>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT id, order_id, product_id, quantity, price_per_unit, total \
             FROM order_items WHERE order_id = $1",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let address = sqlx::query_as::<_, OrderAddress>(
            "SELECT order_id, full_name, phone, email, street, city, state, \
                    zip_code, country \
             FROM order_addresses WHERE order_id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(Some(OrderDetail {
            order,
            items,
            address,
        }))
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// List a store's incoming orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_store(&self, store_id: StoreId) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE store_id = $1 ORDER BY created_at DESC"
        ))
        .bind(store_id)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// Set an order's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status.as_str())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Attach a payment gateway transaction ID to an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_payment_transaction(
        &self,
        id: OrderId,
        transaction_id: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE orders SET payment_transaction_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(transaction_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Find an order by the gateway transaction ID, for webhook handling.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_payment_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE payment_transaction_id = $1"
        ))
        .bind(transaction_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }
}

/// Decrement a product's stock, failing if not enough remains.
async fn decrement_inventory(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
    quantity: i32,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        "UPDATE products SET inventory = inventory - $2 \
         WHERE id = $1 AND inventory >= $2",
    )
    .bind(product_id)
    .bind(quantity)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::InsufficientInventory {
            product: product_id.to_string(),
        });
    }

    Ok(())
}
