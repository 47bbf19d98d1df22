//! Product route handlers.
//!
//! Products hang off stores; mutations require owning the parent store.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use mercantia_core::{Price, ProductId, Slug};

use crate::db::products::{ProductInput, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::product::Product;
use crate::routes::stores::owned_store;
use crate::state::AppState;

/// Product create/update request body. Prices arrive as integer minor units.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: i64,
    pub cost: Option<i64>,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub sku: Option<String>,
    #[serde(default = "empty_array")]
    pub images: serde_json::Value,
    #[serde(default)]
    pub inventory: i32,
    pub category: Option<String>,
    #[serde(default = "empty_array")]
    pub tags: serde_json::Value,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_currency() -> String {
    "BRL".to_string()
}

fn empty_array() -> serde_json::Value {
    serde_json::json!([])
}

const fn default_active() -> bool {
    true
}

impl ProductRequest {
    pub(super) fn into_input(self) -> Result<ProductInput> {
        let slug = Slug::parse(&self.slug).map_err(|e| AppError::BadRequest(e.to_string()))?;
        let price = Price::from_cents(self.price)
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        let cost = self
            .cost
            .map(Price::from_cents)
            .transpose()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        if self.name.trim().is_empty() {
            return Err(AppError::BadRequest("product name is required".to_string()));
        }
        if self.inventory < 0 {
            return Err(AppError::BadRequest(
                "inventory cannot be negative".to_string(),
            ));
        }

        Ok(ProductInput {
            name: self.name,
            slug,
            description: self.description,
            price,
            cost,
            currency: self.currency,
            sku: self.sku,
            images: self.images,
            inventory: self.inventory,
            category: self.category,
            tags: self.tags,
            is_active: self.is_active,
        })
    }
}

/// Product detail.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

    Ok(Json(json!({ "product": product })))
}

/// Update a product in the caller's store.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ProductId>,
    Json(body): Json<ProductRequest>,
) -> Result<impl IntoResponse> {
    let repo = ProductRepository::new(state.pool());
    let product = load_owned(&state, &user, &repo, id).await?;

    let input = body.into_input()?;
    let updated = repo.update(product.id, &input).await?;

    Ok(Json(json!({ "product": updated })))
}

/// Delete a product from the caller's store.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let repo = ProductRepository::new(state.pool());
    let product = load_owned(&state, &user, &repo, id).await?;

    repo.delete(product.id).await?;
    tracing::info!(product_id = %id, "Product deleted");

    Ok(Json(json!({ "message": "Product deleted" })))
}

/// Load a product and confirm the caller owns its store.
async fn load_owned(
    state: &AppState,
    user: &crate::models::CurrentUser,
    repo: &ProductRepository<'_>,
    id: ProductId,
) -> Result<Product> {
    let product = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

    owned_store(state, user, product.store_id).await?;

    Ok(product)
}
