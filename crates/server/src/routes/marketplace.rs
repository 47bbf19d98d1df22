//! Marketplace feed: active products across every active store.

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::db::products::{MarketplaceFilter, ProductRepository};
use crate::error::{AppError, Result};
use crate::models::product::ProductSort;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

/// Marketplace query parameters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    #[serde(default)]
    pub sort: ProductSort,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// The cross-store product feed.
pub async fn feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<impl IntoResponse> {
    if let (Some(min), Some(max)) = (query.min_price, query.max_price)
        && min > max
    {
        return Err(AppError::BadRequest(
            "minPrice cannot exceed maxPrice".to_string(),
        ));
    }

    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0).max(0);

    let filter = MarketplaceFilter {
        category: query.category,
        search: query.search,
        min_price: query.min_price,
        max_price: query.max_price,
        limit,
        offset,
    };

    let products = ProductRepository::new(state.pool())
        .list_marketplace(&filter, query.sort)
        .await?;

    Ok(Json(json!({
        "products": products,
        "limit": limit,
        "offset": offset,
    })))
}
