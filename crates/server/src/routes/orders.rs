//! Order route handlers.
//!
//! Checkout prices the cart, splits it into one order per store, snapshots
//! the shipping address, and persists the whole thing in one transaction.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use mercantia_core::{AddressId, OrderId, OrderStatus};

use crate::db::addresses::AddressRepository;
use crate::db::carts::CartRepository;
use crate::db::orders::{AddressSnapshot, OrderRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::address::ShippingAddress;
use crate::services::checkout::{self, CheckoutError};
use crate::state::AppState;

/// Checkout request body. Without `shipping_address_id` the user's default
/// address is used.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub shipping_address_id: Option<AddressId>,
    pub notes: Option<String>,
}

/// Status update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// The caller's orders, newest first.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(Json(json!({ "orders": orders })))
}

/// Place orders from the cart.
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<CheckoutRequest>,
) -> Result<impl IntoResponse> {
    let carts = CartRepository::new(state.pool());
    let cart = carts.get_or_create(user.id).await?;
    let items = carts.list_items(cart.id).await?;

    let drafts = checkout::price_cart(&items, body.notes.as_deref()).map_err(|e| match e {
        CheckoutError::EmptyCart => AppError::BadRequest(e.to_string()),
        CheckoutError::InsufficientStock { .. } => AppError::Unprocessable(e.to_string()),
    })?;

    let addresses = AddressRepository::new(state.pool());
    let address = match body.shipping_address_id {
        Some(id) => addresses
            .get_for_user(user.id, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Shipping address".to_string()))?,
        None => addresses.get_default(user.id).await?.ok_or_else(|| {
            AppError::BadRequest("Add a shipping address before checking out".to_string())
        })?,
    };

    let orders = OrderRepository::new(state.pool())
        .place_orders(user.id, cart.id, &drafts, &snapshot(&address))
        .await?;

    tracing::info!(
        user_id = %user.id,
        order_count = orders.len(),
        "Checkout completed"
    );

    Ok((StatusCode::CREATED, Json(json!({ "orders": orders }))))
}

/// Order detail, buyer or store owner only.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<impl IntoResponse> {
    let detail = OrderRepository::new(state.pool())
        .get_detail(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

    if detail.order.user_id != user.id {
        let owns_store = crate::db::stores::StoreRepository::new(state.pool())
            .get_by_owner(user.id)
            .await?
            .is_some_and(|store| store.id == detail.order.store_id);

        if !owns_store {
            return Err(AppError::Forbidden(
                "This order belongs to someone else".to_string(),
            ));
        }
    }

    Ok(Json(json!({ "order": detail })))
}

/// Move an order along its fulfilment flow, store owner only.
pub async fn update_status(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse> {
    let next: OrderStatus = body
        .status
        .parse()
        .map_err(|e: mercantia_core::StatusParseError| AppError::BadRequest(e.to_string()))?;

    let repo = OrderRepository::new(state.pool());
    let detail = repo
        .get_detail(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

    let owns_store = crate::db::stores::StoreRepository::new(state.pool())
        .get_by_owner(user.id)
        .await?
        .is_some_and(|store| store.id == detail.order.store_id);
    if !owns_store {
        return Err(AppError::Forbidden(
            "Only the store owner can update this order".to_string(),
        ));
    }

    let current = detail.order.status();
    if !transition_allowed(current, next) {
        return Err(AppError::Unprocessable(format!(
            "Cannot move a {current} order to {next}"
        )));
    }

    repo.set_status(id, next).await?;
    tracing::info!(order_id = %id, from = %current, to = %next, "Order status updated");

    Ok(Json(json!({ "orderId": id, "status": next })))
}

/// Valid fulfilment transitions. Cancellation stays open until shipping;
/// refunds only apply to delivered orders.
const fn transition_allowed(from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::{Cancelled, Confirmed, Delivered, Pending, Processing, Refunded, Shipped};
    matches!(
        (from, to),
        (Pending, Confirmed | Cancelled)
            | (Confirmed, Processing | Cancelled)
            | (Processing, Shipped | Cancelled)
            | (Shipped, Delivered)
            | (Delivered, Refunded)
    )
}

fn snapshot(address: &ShippingAddress) -> AddressSnapshot {
    AddressSnapshot {
        full_name: address.full_name.clone(),
        phone: address.phone.clone(),
        email: address.email.clone(),
        street: address.street.clone(),
        city: address.city.clone(),
        state: address.state.clone(),
        zip_code: address.zip_code.clone(),
        country: address.country.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fulfilment_progression() {
        assert!(transition_allowed(OrderStatus::Pending, OrderStatus::Confirmed));
        assert!(transition_allowed(OrderStatus::Confirmed, OrderStatus::Processing));
        assert!(transition_allowed(OrderStatus::Processing, OrderStatus::Shipped));
        assert!(transition_allowed(OrderStatus::Shipped, OrderStatus::Delivered));
        assert!(transition_allowed(OrderStatus::Delivered, OrderStatus::Refunded));
    }

    #[test]
    fn test_no_skipping_or_rewinding() {
        assert!(!transition_allowed(OrderStatus::Pending, OrderStatus::Shipped));
        assert!(!transition_allowed(OrderStatus::Shipped, OrderStatus::Pending));
        assert!(!transition_allowed(OrderStatus::Confirmed, OrderStatus::Confirmed));
    }

    #[test]
    fn test_cancellation_window_closes_at_shipping() {
        assert!(transition_allowed(OrderStatus::Pending, OrderStatus::Cancelled));
        assert!(transition_allowed(OrderStatus::Processing, OrderStatus::Cancelled));
        assert!(!transition_allowed(OrderStatus::Shipped, OrderStatus::Cancelled));
        assert!(!transition_allowed(OrderStatus::Cancelled, OrderStatus::Confirmed));
    }
}
