//! Cart route handlers.
//!
//! One cart per user, created on first touch. Lines snapshot the price at
//! add time; checkout charges the current listing price.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use mercantia_core::{CartItemId, ProductId};

use crate::db::carts::CartRepository;
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::cart::CartTotals;
use crate::state::AppState;

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

const fn default_quantity() -> i32 {
    1
}

/// Quantity update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i32,
}

/// The caller's cart with lines and totals.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let repo = CartRepository::new(state.pool());
    let cart = repo.get_or_create(user.id).await?;
    let items = repo.list_items(cart.id).await?;
    let totals = CartTotals::compute(&items);

    Ok(Json(json!({ "cart": cart, "items": items, "totals": totals })))
}

/// Add a product to the cart, or bump its quantity.
pub async fn add_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<AddItemRequest>,
) -> Result<impl IntoResponse> {
    if body.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be positive".to_string(),
        ));
    }

    let product = ProductRepository::new(state.pool())
        .get_by_id(body.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

    if !product.is_active {
        return Err(AppError::Unprocessable(
            "This product is not available".to_string(),
        ));
    }
    if body.quantity > product.inventory {
        return Err(AppError::Unprocessable(format!(
            "Only {} in stock",
            product.inventory
        )));
    }

    let repo = CartRepository::new(state.pool());
    let cart = repo.get_or_create(user.id).await?;
    repo.add_item(cart.id, product.id, body.quantity, product.price)
        .await?;

    let items = repo.list_items(cart.id).await?;
    let totals = CartTotals::compute(&items);

    Ok(Json(json!({ "items": items, "totals": totals })))
}

/// Set a line's quantity. Zero removes the line.
pub async fn update_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<CartItemId>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<impl IntoResponse> {
    if body.quantity < 0 {
        return Err(AppError::BadRequest(
            "quantity cannot be negative".to_string(),
        ));
    }

    let repo = CartRepository::new(state.pool());
    let cart = repo.get_or_create(user.id).await?;
    repo.set_quantity(cart.id, id, body.quantity).await?;

    let items = repo.list_items(cart.id).await?;
    let totals = CartTotals::compute(&items);

    Ok(Json(json!({ "items": items, "totals": totals })))
}

/// Remove a line from the cart.
pub async fn remove_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<CartItemId>,
) -> Result<impl IntoResponse> {
    let repo = CartRepository::new(state.pool());
    let cart = repo.get_or_create(user.id).await?;

    if !repo.remove_item(cart.id, id).await? {
        return Err(AppError::NotFound("Cart item".to_string()));
    }

    let items = repo.list_items(cart.id).await?;
    let totals = CartTotals::compute(&items);

    Ok(Json(json!({ "items": items, "totals": totals })))
}

/// Empty the cart.
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let repo = CartRepository::new(state.pool());
    let cart = repo.get_or_create(user.id).await?;
    repo.clear(cart.id).await?;

    Ok(Json(json!({ "message": "Cart cleared" })))
}
