//! Store repository for database operations.

use sqlx::PgPool;

use mercantia_core::{Slug, StoreId, UserId};

use super::RepositoryError;
use crate::models::store::{Store, StoreWithCount};

const STORE_COLUMNS: &str = "id, user_id, name, slug, description, email, phone, website, \
                             logo_url, banner_url, address, is_active, created_at, updated_at";

/// Fields accepted when creating or updating a store.
#[derive(Debug, Clone)]
pub struct StoreInput {
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub address: Option<serde_json::Value>,
}

/// Repository for store database operations.
pub struct StoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a store by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let store = sqlx::query_as::<_, Store>(&format!(
            "SELECT {STORE_COLUMNS} FROM stores WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(store)
    }

    /// Get a store by its URL slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &Slug) -> Result<Option<Store>, RepositoryError> {
        let store = sqlx::query_as::<_, Store>(&format!(
            "SELECT {STORE_COLUMNS} FROM stores WHERE slug = $1"
        ))
        .bind(slug.as_str())
        .fetch_optional(self.pool)
        .await?;

        Ok(store)
    }

    /// Get the store owned by a user, if any. One store per user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_owner(&self, user_id: UserId) -> Result<Option<Store>, RepositoryError> {
        let store = sqlx::query_as::<_, Store>(&format!(
            "SELECT {STORE_COLUMNS} FROM stores WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(store)
    }

    /// List active stores with their active-product counts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self) -> Result<Vec<StoreWithCount>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            #[sqlx(flatten)]
            store: Store,
            product_count: i64,
        }

        let rows = sqlx::query_as::<_, Row>(
            "SELECT s.id, s.user_id, s.name, s.slug, s.description, s.email, s.phone, \
                    s.website, s.logo_url, s.banner_url, s.address, s.is_active, \
                    s.created_at, s.updated_at, \
                    COUNT(p.id) FILTER (WHERE p.is_active) AS product_count \
             FROM stores s \
             LEFT JOIN products p ON p.store_id = s.id \
             WHERE s.is_active \
             GROUP BY s.id \
             ORDER BY s.created_at DESC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| StoreWithCount {
                store: r.store,
                product_count: r.product_count,
            })
            .collect())
    }

    /// Create a store owned by the given user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already has a store
    /// or the slug is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        user_id: UserId,
        input: &StoreInput,
    ) -> Result<Store, RepositoryError> {
        let store = sqlx::query_as::<_, Store>(&format!(
            "INSERT INTO stores \
                 (user_id, name, slug, description, email, phone, website, \
                  logo_url, banner_url, address) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {STORE_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&input.name)
        .bind(input.slug.as_str())
        .bind(&input.description)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.website)
        .bind(&input.logo_url)
        .bind(&input.banner_url)
        .bind(&input.address)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, "store slug or owner already taken"))?;

        Ok(store)
    }

    /// Update a store. The caller must have checked ownership.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new slug is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(&self, id: StoreId, input: &StoreInput) -> Result<Store, RepositoryError> {
        let store = sqlx::query_as::<_, Store>(&format!(
            "UPDATE stores \
             SET name = $2, slug = $3, description = $4, email = $5, phone = $6, \
                 website = $7, logo_url = $8, banner_url = $9, address = $10, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {STORE_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.name)
        .bind(input.slug.as_str())
        .bind(&input.description)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.website)
        .bind(&input.logo_url)
        .bind(&input.banner_url)
        .bind(&input.address)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, "store slug already taken"))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(store)
    }

    /// Deactivate a store instead of deleting it, keeping order history intact.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn deactivate(&self, id: StoreId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE stores SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
