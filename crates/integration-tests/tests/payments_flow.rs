//! Integration tests for payment charges and gateway webhooks.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The server running with `PAGARME_MOCK=true`
//! - `PAGARME_WEBHOOK_SECRET` set for the webhook tests, and exported to
//!   the test process with the same value
//!
//! Run with: cargo test -p mercantia-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use hmac::{Hmac, Mac};
use mercantia_integration_tests::{TestContext, base_url};
use reqwest::StatusCode;
use serde_json::{Value, json};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Place a one-item order and return its ID.
async fn place_order(buyer: &TestContext) -> String {
    let seller = TestContext::with_user().await;
    let store_id = seller
        .open_store("Payment Store", &TestContext::unique_slug("pay"))
        .await;
    let product_id = seller.add_product(&store_id, "Payable Item", 5000).await;

    let resp = buyer
        .post(
            "/api/cart/items",
            &json!({ "productId": product_id, "quantity": 1 }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = buyer
        .post(
            "/api/shipping-addresses",
            &json!({
                "fullName": "Paying Buyer",
                "street": "Rua Pagamento 10",
                "city": "Sao Paulo",
                "zipCode": "01000-000",
                "isDefault": true,
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = buyer.post("/api/orders/checkout", &json!({})).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    body["orders"][0]["id"].as_str().unwrap().to_string()
}

fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

// ============================================================================
// Charges
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server with PAGARME_MOCK=true"]
async fn test_pix_charge_created() {
    let buyer = TestContext::with_user().await;
    let order_id = place_order(&buyer).await;

    let resp = buyer
        .post("/api/payments/pix", &json!({ "orderId": order_id }))
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.unwrap();
    assert!(body["charge"]["transactionId"].as_str().unwrap().starts_with("or_"));
    assert!(!body["charge"]["qrCode"].as_str().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires running server with PAGARME_MOCK=true"]
async fn test_charge_for_foreign_order_forbidden() {
    let buyer = TestContext::with_user().await;
    let order_id = place_order(&buyer).await;

    let stranger = TestContext::with_user().await;
    let resp = stranger
        .post("/api/payments/pix", &json!({ "orderId": order_id }))
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running server with PAGARME_MOCK=true"]
async fn test_status_before_charge_rejected() {
    let buyer = TestContext::with_user().await;
    let order_id = place_order(&buyer).await;

    let resp = buyer.get(&format!("/api/payments/status/{order_id}")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Webhooks
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server with PAGARME_MOCK=true and PAGARME_WEBHOOK_SECRET"]
async fn test_webhook_confirms_paid_order() {
    let secret = std::env::var("PAGARME_WEBHOOK_SECRET").expect("PAGARME_WEBHOOK_SECRET not set");

    let buyer = TestContext::with_user().await;
    let order_id = place_order(&buyer).await;

    let resp = buyer
        .post("/api/payments/pix", &json!({ "orderId": order_id }))
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    let transaction_id = body["charge"]["transactionId"].as_str().unwrap();

    // Deliver order.paid the way the gateway would
    let payload =
        serde_json::to_vec(&json!({ "type": "order.paid", "data": { "id": transaction_id } }))
            .unwrap();
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/api/webhooks/pagarme", base_url()))
        .header("x-hub-signature-256", sign(&secret, &payload))
        .header("content-type", "application/json")
        .body(payload)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = buyer.get(&format!("/api/orders/{order_id}")).await;
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["order"]["status"], "confirmed");
}

#[tokio::test]
#[ignore = "Requires running server with PAGARME_WEBHOOK_SECRET"]
async fn test_webhook_bad_signature_unauthorized() {
    let payload = json!({ "type": "order.paid", "data": { "id": "or_bogus" } });
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/webhooks/pagarme", base_url()))
        .header("x-hub-signature-256", "sha256=deadbeef")
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
