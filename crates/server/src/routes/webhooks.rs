//! Payment gateway webhook handlers.
//!
//! The gateway signs each delivery with HMAC-SHA256 over the raw body,
//! sent as `X-Hub-Signature-256: sha256=<hex>`. Signature failures get a
//! 401 so the gateway retries; anything after a valid signature gets a 200
//! so it does not, even when the payload is unusable.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use hmac::{Hmac, Mac};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;

use mercantia_core::{OrderStatus, PaymentStatus};

use crate::db::orders::OrderRepository;
use crate::error::Result;
use crate::middleware::csrf::tokens_match;
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_HEADER: &str = "x-hub-signature-256";
const SIGNATURE_PREFIX: &str = "sha256=";

/// A gateway event envelope. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct WebhookEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: WebhookData,
}

/// The order payload inside an event.
#[derive(Debug, Deserialize)]
struct WebhookData {
    /// Gateway order ID, matching our stored transaction ID.
    id: String,
    #[serde(default)]
    status: Option<String>,
}

/// Handle a Pagar.me payment notification.
pub async fn pagarme(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    if let Some(secret) = &state.config().pagarme.webhook_secret {
        if !signature_valid(&headers, &body, secret.expose_secret()) {
            tracing::warn!("Webhook rejected: invalid signature");
            return Ok((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid signature" })),
            )
                .into_response());
        }
    } else {
        tracing::warn!("PAGARME_WEBHOOK_SECRET not set, accepting webhook unverified");
    }

    // The gateway retries non-2xx responses; a payload we cannot parse will
    // not parse next time either, so acknowledge and move on.
    let Ok(event) = serde_json::from_slice::<WebhookEvent>(&body) else {
        tracing::warn!("Webhook payload is not a recognized event");
        return Ok(ack());
    };

    handle_event(&state, &event).await?;

    Ok(ack())
}

fn ack() -> Response {
    Json(json!({ "received": true })).into_response()
}

/// Verify the HMAC-SHA256 signature over the raw body.
fn signature_valid(headers: &HeaderMap, body: &[u8], secret: &str) -> bool {
    let Some(header) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(SIGNATURE_PREFIX))
    else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    let computed = hex::encode(mac.finalize().into_bytes());

    tokens_match(&computed, header)
}

async fn handle_event(state: &AppState, event: &WebhookEvent) -> Result<()> {
    let new_status = match event.event_type.as_str() {
        "order.paid" => OrderStatus::Confirmed,
        "order.payment_failed" | "order.canceled" => OrderStatus::Cancelled,
        other => {
            tracing::debug!(event_type = other, "Ignoring webhook event");
            return Ok(());
        }
    };

    let orders = OrderRepository::new(state.pool());
    let Some(order) = orders.get_by_payment_transaction(&event.data.id).await? else {
        tracing::warn!(
            transaction_id = %event.data.id,
            "Webhook references an unknown transaction"
        );
        return Ok(());
    };

    // Paid events only confirm orders still waiting on payment; a shipped
    // order must not fall back to confirmed on a replayed delivery.
    if new_status == OrderStatus::Confirmed && order.status() != OrderStatus::Pending {
        tracing::debug!(order_id = %order.id, "Order already progressed, skipping");
        return Ok(());
    }

    orders.set_status(order.id, new_status).await?;
    tracing::info!(
        order_id = %order.id,
        event_type = %event.event_type,
        gateway_status = ?event.data.status.as_deref().map(PaymentStatus::from_gateway),
        new_status = %new_status,
        "Order updated from webhook"
    );

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn test_signature_valid_roundtrip() {
        let body = br#"{"type":"order.paid","data":{"id":"or_1"}}"#;
        let mut headers = HeaderMap::new();
        headers.insert(
            SIGNATURE_HEADER,
            HeaderValue::from_str(&sign("whsec", body)).unwrap(),
        );

        assert!(signature_valid(&headers, body, "whsec"));
        assert!(!signature_valid(&headers, body, "other-secret"));
        assert!(!signature_valid(&headers, b"tampered", "whsec"));
    }

    #[test]
    fn test_signature_missing_header_rejected() {
        assert!(!signature_valid(&HeaderMap::new(), b"{}", "whsec"));
    }

    #[test]
    fn test_signature_requires_prefix() {
        let body = b"{}";
        let raw = sign("whsec", body);
        let bare = raw.strip_prefix("sha256=").unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(SIGNATURE_HEADER, HeaderValue::from_str(bare).unwrap());
        assert!(!signature_valid(&headers, body, "whsec"));
    }

    #[test]
    fn test_event_parses() {
        let event: WebhookEvent = serde_json::from_str(
            r#"{"id":"hook_1","type":"order.paid","data":{"id":"or_abc","status":"paid"}}"#,
        )
        .unwrap();
        assert_eq!(event.event_type, "order.paid");
        assert_eq!(event.data.id, "or_abc");
        assert_eq!(event.data.status.as_deref(), Some("paid"));
    }
}
