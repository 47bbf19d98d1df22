//! HTTP route handlers for the marketplace API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (pings the database)
//!
//! # Auth
//! POST /api/auth/register               - Create an account, open a session
//! POST /api/auth/login                  - Open a session
//! POST /api/auth/logout                 - Revoke the session
//! GET  /api/auth/me                     - Current user
//! GET  /api/auth/csrf                   - Issue a CSRF token
//!
//! # Profile
//! GET  /api/user/profile                - Current user's profile
//! PUT  /api/user/profile                - Update profile fields
//!
//! # Stores
//! GET    /api/stores                    - Active stores with product counts
//! POST   /api/stores                    - Create the caller's store (one each)
//! GET    /api/stores/mine               - The caller's store
//! GET    /api/stores/{id}               - Store detail
//! PUT    /api/stores/{id}               - Update (owner only)
//! DELETE /api/stores/{id}               - Deactivate (owner only)
//! GET    /api/stores/slug/{slug}        - Store detail by slug
//! GET    /api/stores/{id}/products      - Store catalog
//! POST   /api/stores/{id}/products      - Add a product (owner only)
//! GET    /api/stores/{id}/orders        - Incoming orders (owner only)
//!
//! # Products
//! GET    /api/products/{id}             - Product detail
//! PUT    /api/products/{id}             - Update (store owner only)
//! DELETE /api/products/{id}             - Delete (store owner only)
//!
//! # Marketplace
//! GET  /api/marketplace                 - Cross-store product feed
//!
//! # Cart
//! GET    /api/cart                      - Cart with lines and totals
//! POST   /api/cart/items                - Add a product
//! PUT    /api/cart/items/{id}           - Set a line's quantity
//! DELETE /api/cart/items/{id}           - Remove a line
//! DELETE /api/cart                      - Empty the cart
//!
//! # Orders
//! GET  /api/orders                      - The caller's orders
//! POST /api/orders/checkout             - Place orders from the cart
//! GET  /api/orders/{id}                 - Order detail with items and address
//! PATCH /api/orders/{id}                - Status transition (store owner only)
//!
//! # Shipping addresses
//! GET    /api/shipping-addresses        - Address book
//! POST   /api/shipping-addresses        - Add an address
//! PUT    /api/shipping-addresses/{id}   - Update an address
//! DELETE /api/shipping-addresses/{id}   - Delete an address
//!
//! # Knowledge graph
//! GET    /api/entities                  - List entities
//! POST   /api/entities                  - Create an entity
//! GET    /api/entities/{id}             - Entity with relations, verifications
//! PUT    /api/entities/{id}             - Update an entity
//! DELETE /api/entities/{id}             - Delete an entity
//! GET    /api/relations                 - List relations
//! POST   /api/relations                 - Create a relation
//! GET    /api/relations/{id}            - Relation with proofs, witnesses
//! DELETE /api/relations/{id}            - Delete a relation
//! POST   /api/relations/{id}/proofs     - Attach evidence
//! POST   /api/relations/{id}/witnesses  - Attach a witness
//!
//! # Schema.org explorer
//! GET  /api/schema/hierarchy            - Root of the type tree
//! GET  /api/schema/types/{name}         - One type, expanded
//! GET  /api/schema/types/{name}/children - A type's child stubs
//! GET  /api/schema/search               - Search types by name or description
//!
//! # Payments
//! POST /api/payments/pix                - Create a PIX charge for an order
//! POST /api/payments/boleto             - Create a boleto charge
//! POST /api/payments/card               - Charge a credit card
//! GET  /api/payments/status/{order_id}  - Poll gateway payment status
//!
//! # Webhooks
//! POST /api/webhooks/pagarme            - Gateway payment notifications
//! ```

pub mod addresses;
pub mod auth;
pub mod cart;
pub mod entities;
pub mod marketplace;
pub mod orders;
pub mod payments;
pub mod products;
pub mod profile;
pub mod relations;
pub mod schema;
pub mod stores;
pub mod webhooks;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde_json::json;

use crate::middleware::{csrf, rate_limit};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route("/csrf", get(auth::csrf_token))
}

/// Create the store routes router.
pub fn store_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(stores::list).post(stores::create))
        .route("/mine", get(stores::mine))
        .route(
            "/{id}",
            get(stores::show).put(stores::update).delete(stores::deactivate),
        )
        .route("/slug/{slug}", get(stores::show_by_slug))
        .route(
            "/{id}/products",
            get(stores::list_products).post(stores::create_product),
        )
        .route("/{id}/orders", get(stores::list_orders))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add_item))
        .route(
            "/items/{id}",
            put(cart::update_item).delete(cart::remove_item),
        )
}

/// Create the knowledge-graph routes router.
pub fn graph_routes() -> Router<AppState> {
    Router::new()
        .route("/entities", get(entities::list).post(entities::create))
        .route(
            "/entities/{id}",
            get(entities::show)
                .put(entities::update)
                .delete(entities::remove),
        )
        .route("/relations", get(relations::list).post(relations::create))
        .route(
            "/relations/{id}",
            get(relations::show).delete(relations::remove),
        )
        .route("/relations/{id}/proofs", post(relations::add_proof))
        .route("/relations/{id}/witnesses", post(relations::add_witness))
}

/// Create the schema.org explorer routes router.
pub fn schema_routes() -> Router<AppState> {
    Router::new()
        .route("/hierarchy", get(schema::hierarchy))
        .route("/types/{name}", get(schema::expand_type))
        .route("/types/{name}/children", get(schema::children))
        .route("/search", get(schema::search))
}

/// Create the payment routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/pix", post(payments::create_pix))
        .route("/boleto", post(payments::create_boleto))
        .route("/card", post(payments::create_card))
        .route("/status/{order_id}", get(payments::status))
}

/// Assemble the full application router.
///
/// Rate limits are tiered: credential endpoints get the tightest budget,
/// checkout and payments a strict one, public reads a generous one, and
/// everything else the standard budget. CSRF verification wraps the whole
/// API surface; webhooks mount outside it because the gateway authenticates
/// with an HMAC signature instead of a cookie.
pub fn router(state: AppState) -> Router {
    let auth_limited = auth_routes().layer(from_fn_with_state(
        (state.clone(), rate_limit::AUTH),
        rate_limit::enforce,
    ));

    let strict = Router::new()
        .route("/orders/checkout", post(orders::checkout))
        .nest("/payments", payment_routes())
        .layer(from_fn_with_state(
            (state.clone(), rate_limit::STRICT),
            rate_limit::enforce,
        ));

    let generous = Router::new()
        .route("/marketplace", get(marketplace::feed))
        .nest("/schema", schema_routes())
        .layer(from_fn_with_state(
            (state.clone(), rate_limit::GENEROUS),
            rate_limit::enforce,
        ));

    let standard = Router::new()
        .route(
            "/user/profile",
            get(profile::show).put(profile::update),
        )
        .nest("/stores", store_routes())
        .route(
            "/products/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::remove),
        )
        .nest("/cart", cart_routes())
        .route("/orders", get(orders::list))
        .route(
            "/orders/{id}",
            get(orders::show).patch(orders::update_status),
        )
        .route(
            "/shipping-addresses",
            get(addresses::list).post(addresses::create),
        )
        .route(
            "/shipping-addresses/{id}",
            put(addresses::update).delete(addresses::remove),
        )
        .merge(graph_routes())
        .layer(from_fn_with_state(
            (state.clone(), rate_limit::STANDARD),
            rate_limit::enforce,
        ));

    let api = Router::new()
        .nest("/auth", auth_limited)
        .merge(strict)
        .merge(generous)
        .merge(standard)
        .layer(from_fn_with_state(state.clone(), csrf::verify));

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api)
        .route("/api/webhooks/pagarme", post(webhooks::pagarme))
        .with_state(state)
}

/// Liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Readiness probe: confirms the database answers.
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    match sqlx::query("SELECT 1").execute(state.pool()).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "status": "ready" }))),
        Err(e) => {
            tracing::error!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}
