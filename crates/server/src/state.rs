//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::middleware::rate_limit::RateLimiter;
use crate::pagarme::PagarmeClient;
use crate::schema_org::SchemaOrgService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    pagarme: PagarmeClient,
    schema_org: SchemaOrgService,
    rate_limiter: RateLimiter,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool) -> Self {
        let pagarme = PagarmeClient::new(&config.pagarme);
        let schema_org = SchemaOrgService::new(&config.schema_org);
        let rate_limiter = RateLimiter::new();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                pagarme,
                schema_org,
                rate_limiter,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the Pagar.me payment client.
    #[must_use]
    pub fn pagarme(&self) -> &PagarmeClient {
        &self.inner.pagarme
    }

    /// Get a reference to the Schema.org ontology service.
    #[must_use]
    pub fn schema_org(&self) -> &SchemaOrgService {
        &self.inner.schema_org
    }

    /// Get a reference to the shared rate limiter.
    #[must_use]
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.inner.rate_limiter
    }
}
