//! Shipping address repository.

use sqlx::PgPool;

use mercantia_core::{AddressId, UserId};

use super::RepositoryError;
use crate::models::address::ShippingAddress;

const ADDRESS_COLUMNS: &str = "id, user_id, full_name, phone, email, street, city, state, \
                               zip_code, country, is_default, created_at, updated_at";

/// Fields accepted when creating or updating a shipping address.
#[derive(Debug, Clone)]
pub struct AddressInput {
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub street: String,
    pub city: String,
    pub state: Option<String>,
    pub zip_code: String,
    pub country: String,
    pub is_default: bool,
}

/// Repository for the user address book.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's addresses, default first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ShippingAddress>, RepositoryError> {
        let addresses = sqlx::query_as::<_, ShippingAddress>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM shipping_addresses \
             WHERE user_id = $1 \
             ORDER BY is_default DESC, created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(addresses)
    }

    /// Get one of a user's addresses by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        user_id: UserId,
        id: AddressId,
    ) -> Result<Option<ShippingAddress>, RepositoryError> {
        let address = sqlx::query_as::<_, ShippingAddress>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM shipping_addresses \
             WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(address)
    }

    /// Get a user's default address, falling back to their most recent one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_default(
        &self,
        user_id: UserId,
    ) -> Result<Option<ShippingAddress>, RepositoryError> {
        let address = sqlx::query_as::<_, ShippingAddress>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM shipping_addresses \
             WHERE user_id = $1 \
             ORDER BY is_default DESC, created_at DESC \
             LIMIT 1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(address)
    }

    /// Create an address. Marking it default clears the previous default.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any query fails.
    pub async fn create(
        &self,
        user_id: UserId,
        input: &AddressInput,
    ) -> Result<ShippingAddress, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if input.is_default {
            sqlx::query("UPDATE shipping_addresses SET is_default = FALSE WHERE user_id = $1")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        let address = sqlx::query_as::<_, ShippingAddress>(&format!(
            "INSERT INTO shipping_addresses \
                 (user_id, full_name, phone, email, street, city, state, \
                  zip_code, country, is_default) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&input.full_name)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.street)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.zip_code)
        .bind(&input.country)
        .bind(input.is_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(address)
    }

    /// Update one of a user's addresses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address isn't the user's.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        user_id: UserId,
        id: AddressId,
        input: &AddressInput,
    ) -> Result<ShippingAddress, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if input.is_default {
            sqlx::query(
                "UPDATE shipping_addresses SET is_default = FALSE \
                 WHERE user_id = $1 AND id <> $2",
            )
            .bind(user_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        let address = sqlx::query_as::<_, ShippingAddress>(&format!(
            "UPDATE shipping_addresses \
             SET full_name = $3, phone = $4, email = $5, street = $6, city = $7, \
                 state = $8, zip_code = $9, country = $10, is_default = $11, \
                 updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .bind(&input.full_name)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.street)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.zip_code)
        .bind(&input.country)
        .bind(input.is_default)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;

        Ok(address)
    }

    /// Delete one of a user's addresses. Returns `true` if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, user_id: UserId, id: AddressId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shipping_addresses WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
