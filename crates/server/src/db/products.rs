//! Product repository for database operations.

use sqlx::PgPool;

use mercantia_core::{Price, ProductId, Slug, StoreId};

use super::RepositoryError;
use crate::models::product::{MarketplaceProduct, Product, ProductSort};

const PRODUCT_COLUMNS: &str = "id, store_id, name, slug, description, price, cost, currency, \
                               sku, images, inventory, category, tags, is_active, \
                               created_at, updated_at";

/// Fields accepted when creating or updating a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub price: Price,
    pub cost: Option<Price>,
    pub currency: String,
    pub sku: Option<String>,
    pub images: serde_json::Value,
    pub inventory: i32,
    pub category: Option<String>,
    pub tags: serde_json::Value,
    pub is_active: bool,
}

/// Filters for the public marketplace feed.
#[derive(Debug, Clone, Default)]
pub struct MarketplaceFilter {
    pub category: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub limit: i64,
    pub offset: i64,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Get a product within a store by its slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(
        &self,
        store_id: StoreId,
        slug: &Slug,
    ) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE store_id = $1 AND slug = $2"
        ))
        .bind(store_id)
        .bind(slug.as_str())
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// List every product in a store, active or not, for the owner dashboard.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_store(&self, store_id: StoreId) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE store_id = $1 ORDER BY created_at DESC"
        ))
        .bind(store_id)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// List active products across all active stores for the marketplace feed.
    ///
    /// The sort column comes from a fixed enum, never from client input, so
    /// interpolating it into the statement is safe.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_marketplace(
        &self,
        filter: &MarketplaceFilter,
        sort: ProductSort,
    ) -> Result<Vec<MarketplaceProduct>, RepositoryError> {
        let sql = format!(
            "SELECT p.id, p.store_id, p.name, p.slug, p.description, p.price, p.cost, \
                    p.currency, p.sku, p.images, p.inventory, p.category, p.tags, \
                    p.is_active, p.created_at, p.updated_at, \
                    s.name AS store_name, s.slug AS store_slug \
             FROM products p \
             JOIN stores s ON s.id = p.store_id \
             WHERE p.is_active AND s.is_active \
               AND ($1::text IS NULL OR p.category = $1) \
               AND ($2::text IS NULL OR p.name ILIKE '%' || $2 || '%' \
                    OR p.description ILIKE '%' || $2 || '%') \
               AND ($3::bigint IS NULL OR p.price >= $3) \
               AND ($4::bigint IS NULL OR p.price <= $4) \
             ORDER BY p.{} \
             LIMIT $5 OFFSET $6",
            sort.order_by()
        );

        let products = sqlx::query_as::<_, MarketplaceProduct>(&sql)
            .bind(&filter.category)
            .bind(&filter.search)
            .bind(filter.min_price)
            .bind(filter.max_price)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(self.pool)
            .await?;

        Ok(products)
    }

    /// Create a product in a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken within the store.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        store_id: StoreId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products \
                 (store_id, name, slug, description, price, cost, currency, sku, \
                  images, inventory, category, tags, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(store_id)
        .bind(&input.name)
        .bind(input.slug.as_str())
        .bind(&input.description)
        .bind(input.price.cents())
        .bind(input.cost.map(Price::cents))
        .bind(&input.currency)
        .bind(&input.sku)
        .bind(&input.images)
        .bind(input.inventory)
        .bind(&input.category)
        .bind(&input.tags)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, "product slug already taken"))?;

        Ok(product)
    }

    /// Update a product. The caller must have checked store ownership.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new slug is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "UPDATE products \
             SET name = $2, slug = $3, description = $4, price = $5, cost = $6, \
                 currency = $7, sku = $8, images = $9, inventory = $10, \
                 category = $11, tags = $12, is_active = $13, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.name)
        .bind(input.slug.as_str())
        .bind(&input.description)
        .bind(input.price.cents())
        .bind(input.cost.map(Price::cents))
        .bind(&input.currency)
        .bind(&input.sku)
        .bind(&input.images)
        .bind(input.inventory)
        .bind(&input.category)
        .bind(&input.tags)
        .bind(input.is_active)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, "product slug already taken"))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(product)
    }

    /// Delete a product. Returns `true` if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
