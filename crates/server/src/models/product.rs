//! Product catalog records.

use chrono::{DateTime, Utc};
use serde::Serialize;

use mercantia_core::{ProductId, Slug, StoreId};

/// A product listed by a store. Prices are integer minor units.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub store_id: StoreId,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub price: i64,
    pub cost: Option<i64>,
    pub currency: String,
    pub sku: Option<String>,
    /// Array of `{url, alt}` objects.
    pub images: serde_json::Value,
    pub inventory: i32,
    pub category: Option<String>,
    /// Array of tag strings.
    pub tags: serde_json::Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product joined with its store, for the public marketplace feed.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceProduct {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub product: Product,
    pub store_name: String,
    pub store_slug: String,
}

/// Sort orders accepted by the product listing endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductSort {
    Newest,
    PriceAsc,
    PriceDesc,
}

impl Default for ProductSort {
    fn default() -> Self {
        Self::Newest
    }
}

impl ProductSort {
    /// The `ORDER BY` clause fragment for this sort.
    #[must_use]
    pub const fn order_by(self) -> &'static str {
        match self {
            Self::Newest => "created_at DESC",
            Self::PriceAsc => "price ASC",
            Self::PriceDesc => "price DESC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_deserializes_kebab_case() {
        let sort: ProductSort = serde_json::from_str("\"price-asc\"").expect("valid sort");
        assert_eq!(sort, ProductSort::PriceAsc);
    }

    #[test]
    fn test_sort_order_by() {
        assert_eq!(ProductSort::Newest.order_by(), "created_at DESC");
        assert_eq!(ProductSort::PriceDesc.order_by(), "price DESC");
    }
}
