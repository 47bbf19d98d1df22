//! Integration tests for Mercantia.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! cargo run -p mercantia-cli -- migrate
//!
//! # Start the server (mock payments recommended)
//! PAGARME_MOCK=true cargo run -p mercantia-server
//!
//! # Run integration tests
//! cargo test -p mercantia-integration-tests -- --ignored
//! ```
//!
//! Tests hit a live server over HTTP and are `#[ignore]`d by default so
//! `cargo test` stays green without infrastructure.

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("MERCANTIA_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A cookie-holding client bound to one logged-in user.
///
/// Mutating requests need the double-submit CSRF pair: the cookie rides in
/// the jar, the matching header is added by [`Self::post`] and friends.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    csrf_token: String,
}

impl TestContext {
    /// Connect to the server and fetch a CSRF token.
    ///
    /// # Panics
    ///
    /// Panics if the server is unreachable.
    pub async fn new() -> Self {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");
        let base_url = base_url();

        let body: Value = client
            .get(format!("{base_url}/api/auth/csrf"))
            .send()
            .await
            .expect("Failed to fetch CSRF token")
            .json()
            .await
            .expect("CSRF response was not JSON");
        let csrf_token = body["csrfToken"]
            .as_str()
            .expect("csrfToken missing")
            .to_string();

        Self {
            client,
            base_url,
            csrf_token,
        }
    }

    /// Connect and register a fresh user with a unique email.
    ///
    /// # Panics
    ///
    /// Panics if registration fails.
    pub async fn with_user() -> Self {
        let ctx = Self::new().await;
        let email = format!("it-{}@mercantia.test", uuid::Uuid::new_v4());

        let resp = ctx
            .post(
                "/api/auth/register",
                &json!({
                    "email": email,
                    "password": "integration-pass-1",
                    "fullName": "Integration Tester",
                }),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED, "registration failed");

        ctx
    }

    /// GET a path relative to the base URL.
    ///
    /// # Panics
    ///
    /// Panics if the request fails to send.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .expect("GET failed")
    }

    /// POST a JSON body with the CSRF header attached.
    ///
    /// # Panics
    ///
    /// Panics if the request fails to send.
    pub async fn post(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}{path}", self.base_url))
            .header("x-csrf-token", &self.csrf_token)
            .json(body)
            .send()
            .await
            .expect("POST failed")
    }

    /// PUT a JSON body with the CSRF header attached.
    ///
    /// # Panics
    ///
    /// Panics if the request fails to send.
    pub async fn put(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .put(format!("{}{path}", self.base_url))
            .header("x-csrf-token", &self.csrf_token)
            .json(body)
            .send()
            .await
            .expect("PUT failed")
    }

    /// PATCH a JSON body with the CSRF header attached.
    ///
    /// # Panics
    ///
    /// Panics if the request fails to send.
    pub async fn patch(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .patch(format!("{}{path}", self.base_url))
            .header("x-csrf-token", &self.csrf_token)
            .json(body)
            .send()
            .await
            .expect("PATCH failed")
    }

    /// DELETE with the CSRF header attached.
    ///
    /// # Panics
    ///
    /// Panics if the request fails to send.
    pub async fn delete(&self, path: &str) -> reqwest::Response {
        self.client
            .delete(format!("{}{path}", self.base_url))
            .header("x-csrf-token", &self.csrf_token)
            .send()
            .await
            .expect("DELETE failed")
    }

    /// Open a store for this user and return its ID.
    ///
    /// # Panics
    ///
    /// Panics if store creation fails.
    pub async fn open_store(&self, name: &str, slug: &str) -> String {
        let resp = self
            .post(
                "/api/stores",
                &json!({ "name": name, "slug": slug, "description": "test store" }),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED, "store creation failed");

        let body: Value = resp.json().await.expect("store response was not JSON");
        body["store"]["id"]
            .as_str()
            .expect("store id missing")
            .to_string()
    }

    /// Add a product to a store and return its ID.
    ///
    /// # Panics
    ///
    /// Panics if product creation fails.
    pub async fn add_product(&self, store_id: &str, name: &str, price: i64) -> String {
        let slug = name.to_lowercase().replace(' ', "-");
        let resp = self
            .post(
                &format!("/api/stores/{store_id}/products"),
                &json!({
                    "name": name,
                    "slug": slug,
                    "price": price,
                    "inventory": 100,
                }),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED, "product creation failed");

        let body: Value = resp.json().await.expect("product response was not JSON");
        body["product"]["id"]
            .as_str()
            .expect("product id missing")
            .to_string()
    }

    /// Unique slug helper for tests that create stores.
    #[must_use]
    pub fn unique_slug(prefix: &str) -> String {
        format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
    }
}
