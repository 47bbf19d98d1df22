//! Payment route handlers.
//!
//! Each endpoint charges one existing pending order through the gateway and
//! records the returned transaction ID on the order. Card data passes
//! through to the gateway and is never logged or stored.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use mercantia_core::{OrderId, OrderStatus, PaymentStatus};

use crate::db::orders::OrderRepository;
use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::models::order::Order;
use crate::pagarme::{CardDetails, ChargeCustomer, ChargeRequest};
use crate::state::AppState;

/// PIX and boleto charge request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeBody {
    pub order_id: OrderId,
    /// CPF or CNPJ, when the gateway requires one.
    pub document: Option<String>,
}

/// Credit card charge request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardChargeBody {
    pub order_id: OrderId,
    pub document: Option<String>,
    pub card_number: String,
    pub holder_name: String,
    pub exp_month: u8,
    pub exp_year: u16,
    pub cvv: String,
    #[serde(default = "default_installments")]
    pub installments: u8,
}

const fn default_installments() -> u8 {
    1
}

/// Create a PIX charge for an order.
pub async fn create_pix(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<ChargeBody>,
) -> Result<impl IntoResponse> {
    let order = chargeable_order(&state, &user, body.order_id).await?;
    let request = charge_request(&state, &user, &order, body.document).await?;

    let charge = state.pagarme().create_pix(&request).await?;

    OrderRepository::new(state.pool())
        .set_payment_transaction(order.id, &charge.transaction_id)
        .await?;
    tracing::info!(order_id = %order.id, transaction_id = %charge.transaction_id, "PIX charge created");

    Ok((StatusCode::CREATED, Json(json!({ "charge": charge }))))
}

/// Create a boleto charge for an order.
pub async fn create_boleto(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<ChargeBody>,
) -> Result<impl IntoResponse> {
    let order = chargeable_order(&state, &user, body.order_id).await?;
    let request = charge_request(&state, &user, &order, body.document).await?;

    let charge = state.pagarme().create_boleto(&request).await?;

    OrderRepository::new(state.pool())
        .set_payment_transaction(order.id, &charge.transaction_id)
        .await?;
    tracing::info!(order_id = %order.id, transaction_id = %charge.transaction_id, "Boleto charge created");

    Ok((StatusCode::CREATED, Json(json!({ "charge": charge }))))
}

/// Charge a credit card for an order.
pub async fn create_card(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<CardChargeBody>,
) -> Result<impl IntoResponse> {
    let order = chargeable_order(&state, &user, body.order_id).await?;
    let request = charge_request(&state, &user, &order, body.document).await?;

    let card = CardDetails {
        number: body.card_number,
        holder_name: body.holder_name,
        exp_month: body.exp_month,
        exp_year: body.exp_year,
        cvv: body.cvv,
    };

    let charge = state
        .pagarme()
        .create_card(&request, card, body.installments)
        .await?;

    let orders = OrderRepository::new(state.pool());
    orders
        .set_payment_transaction(order.id, &charge.transaction_id)
        .await?;

    // Card charges settle synchronously; confirm right away when they do.
    if PaymentStatus::from_gateway(&charge.status) == PaymentStatus::Paid {
        orders.set_status(order.id, OrderStatus::Confirmed).await?;
    }
    tracing::info!(order_id = %order.id, transaction_id = %charge.transaction_id, "Card charge created");

    Ok((StatusCode::CREATED, Json(json!({ "charge": charge }))))
}

/// Poll the gateway for an order's payment status.
pub async fn status(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(order_id): Path<OrderId>,
) -> Result<impl IntoResponse> {
    let order = owned_order(&state, &user, order_id).await?;

    let transaction_id = order.payment_transaction_id.as_deref().ok_or_else(|| {
        AppError::BadRequest("No payment has been started for this order".to_string())
    })?;

    let gateway_order = state.pagarme().get_order(transaction_id).await?;
    let payment_status = gateway_order.payment_status();

    if payment_status == PaymentStatus::Paid && order.status() == OrderStatus::Pending {
        OrderRepository::new(state.pool())
            .set_status(order.id, OrderStatus::Confirmed)
            .await?;
    }

    Ok(Json(json!({
        "orderId": order.id,
        "gatewayStatus": gateway_order.status,
        "paymentStatus": payment_status,
    })))
}

/// Load an order owned by the caller.
async fn owned_order(state: &AppState, user: &CurrentUser, id: OrderId) -> Result<Order> {
    let detail = OrderRepository::new(state.pool())
        .get_detail(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

    if detail.order.user_id != user.id {
        return Err(AppError::Forbidden(
            "This order belongs to someone else".to_string(),
        ));
    }

    Ok(detail.order)
}

/// Load an order owned by the caller that can still be charged.
async fn chargeable_order(state: &AppState, user: &CurrentUser, id: OrderId) -> Result<Order> {
    let order = owned_order(state, user, id).await?;

    if order.status() != OrderStatus::Pending {
        return Err(AppError::Conflict(format!(
            "Order is already {}",
            order.status
        )));
    }

    Ok(order)
}

/// Build the gateway charge request for an order.
async fn charge_request(
    state: &AppState,
    user: &CurrentUser,
    order: &Order,
    document: Option<String>,
) -> Result<ChargeRequest> {
    let profile = UserRepository::new(state.pool())
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    let name = profile
        .full_name
        .unwrap_or_else(|| user.email.as_str().to_string());

    Ok(ChargeRequest {
        amount: order.total,
        description: format!("Mercantia order {}", order.id),
        customer: ChargeCustomer {
            name,
            email: user.email.as_str().to_string(),
            code: user.id.to_string(),
            document,
        },
        order_reference: order.id.to_string(),
    })
}
