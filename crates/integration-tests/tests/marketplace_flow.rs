//! Integration tests for stores, products, the feed, carts, and checkout.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The server running (cargo run -p mercantia-server)
//!
//! Run with: cargo test -p mercantia-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use mercantia_integration_tests::TestContext;
use reqwest::StatusCode;
use serde_json::{Value, json};

// ============================================================================
// Stores & Products
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_one_store_per_user() {
    let ctx = TestContext::with_user().await;
    ctx.open_store("First Store", &TestContext::unique_slug("first")).await;

    let resp = ctx
        .post(
            "/api/stores",
            &json!({ "name": "Second Store", "slug": TestContext::unique_slug("second") }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_store_lookup_by_slug() {
    let ctx = TestContext::with_user().await;
    let slug = TestContext::unique_slug("lookup");
    ctx.open_store("Lookup Store", &slug).await;

    let resp = ctx.get(&format!("/api/stores/slug/{slug}")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["store"]["slug"], slug.as_str());
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_inactive_products_hidden_from_non_owners() {
    let seller = TestContext::with_user().await;
    let store_id = seller
        .open_store("Hidden Goods", &TestContext::unique_slug("hidden"))
        .await;
    let product_id = seller.add_product(&store_id, "Visible Widget", 1500).await;

    let resp = seller
        .put(
            &format!("/api/products/{product_id}"),
            &json!({
                "name": "Visible Widget",
                "slug": "visible-widget",
                "price": 1500,
                "isActive": false,
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    // The owner still sees the deactivated product
    let resp = seller.get(&format!("/api/stores/{store_id}/products")).await;
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["products"].as_array().unwrap().len(), 1);

    // A stranger does not
    let stranger = TestContext::with_user().await;
    let resp = stranger.get(&format!("/api/stores/{store_id}/products")).await;
    let body: Value = resp.json().await.unwrap();
    assert!(body["products"].as_array().unwrap().is_empty());
}

// ============================================================================
// Marketplace Feed
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_feed_price_filter() {
    let seller = TestContext::with_user().await;
    let store_id = seller
        .open_store("Feed Store", &TestContext::unique_slug("feed"))
        .await;
    seller.add_product(&store_id, "Cheap Widget A1", 500).await;
    seller.add_product(&store_id, "Dear Widget A1", 50_000).await;

    let ctx = TestContext::new().await;
    let resp = ctx
        .get("/api/marketplace?search=Widget+A1&maxPrice=1000")
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    for product in body["products"].as_array().unwrap() {
        assert!(product["product"]["price"].as_i64().unwrap() <= 1000);
    }
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_feed_rejects_inverted_price_range() {
    let ctx = TestContext::new().await;
    let resp = ctx.get("/api/marketplace?minPrice=500&maxPrice=100").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Cart & Checkout
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_cart_to_checkout_splits_orders_per_store() {
    // Two sellers, one product each
    let seller_a = TestContext::with_user().await;
    let store_a = seller_a
        .open_store("Seller A", &TestContext::unique_slug("seller-a"))
        .await;
    let product_a = seller_a.add_product(&store_a, "Alpha Item", 1000).await;

    let seller_b = TestContext::with_user().await;
    let store_b = seller_b
        .open_store("Seller B", &TestContext::unique_slug("seller-b"))
        .await;
    let product_b = seller_b.add_product(&store_b, "Beta Item", 2000).await;

    // Buyer adds both, sets an address, checks out
    let buyer = TestContext::with_user().await;
    for (product_id, qty) in [(&product_a, 2), (&product_b, 1)] {
        let resp = buyer
            .post(
                "/api/cart/items",
                &json!({ "productId": product_id, "quantity": qty }),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = buyer
        .post(
            "/api/shipping-addresses",
            &json!({
                "fullName": "Integration Buyer",
                "street": "Rua Teste 1",
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

    let orders = body["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 2, "one order per store");

    // Totals: subtotal + 10% tax + 1000 flat shipping, per store
    let mut totals: Vec<i64> = orders
        .iter()
        .map(|o| o["total"].as_i64().unwrap())
        .collect();
    totals.sort_unstable();
    assert_eq!(totals, vec![2000 + 200 + 1000, 2000 + 200 + 1000]);

    // The cart is emptied by checkout
    let resp = buyer.get("/api/cart").await;
    let body: Value = resp.json().await.unwrap();
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_checkout_empty_cart_rejected() {
    let buyer = TestContext::with_user().await;
    let resp = buyer.post("/api/orders/checkout", &json!({})).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_add_to_cart_beyond_inventory_rejected() {
    let seller = TestContext::with_user().await;
    let store_id = seller
        .open_store("Scarce Goods", &TestContext::unique_slug("scarce"))
        .await;
    let resp = seller
        .post(
            &format!("/api/stores/{store_id}/products"),
            &json!({ "name": "Rare Item", "slug": "rare-item", "price": 9900, "inventory": 2 }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    let product_id = body["product"]["id"].as_str().unwrap().to_string();

    let buyer = TestContext::with_user().await;
    let resp = buyer
        .post(
            "/api/cart/items",
            &json!({ "productId": product_id, "quantity": 5 }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_order_status_transitions_by_store_owner() {
    let seller = TestContext::with_user().await;
    let store_id = seller
        .open_store("Fulfilment Store", &TestContext::unique_slug("fulfil"))
        .await;
    let product_id = seller.add_product(&store_id, "Shippable Item", 3000).await;

    let buyer = TestContext::with_user().await;
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
                "fullName": "Waiting Buyer",
                "street": "Rua Entrega 5",
                "city": "Curitiba",
                "zipCode": "80000-000",
                "isDefault": true,
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = buyer.post("/api/orders/checkout", &json!({})).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    let order_id = body["orders"][0]["id"].as_str().unwrap().to_string();

    // The buyer is not the store owner
    let resp = buyer
        .patch(
            &format!("/api/orders/{order_id}"),
            &json!({ "status": "confirmed" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Skipping ahead in the flow is rejected
    let resp = seller
        .patch(
            &format!("/api/orders/{order_id}"),
            &json!({ "status": "delivered" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let resp = seller
        .patch(
            &format!("/api/orders/{order_id}"),
            &json!({ "status": "confirmed" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = seller.get(&format!("/api/orders/{order_id}")).await;
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["order"]["status"], "confirmed");
}
