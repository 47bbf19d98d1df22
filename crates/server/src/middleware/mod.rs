//! Request middleware: authentication, CSRF, and rate limiting.

pub mod auth;
pub mod cookies;
pub mod csrf;
pub mod rate_limit;

pub use auth::{OptionalAuth, RequireAuth};
