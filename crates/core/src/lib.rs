//! Shared domain types for Mercantia.
//!
//! This crate holds the types every other workspace member agrees on:
//! type-safe IDs, validated value types (`Email`, `Slug`), money as integer
//! minor units (`Price`), and the order/payment status enums.
//!
//! Enable the `postgres` feature to get `sqlx` trait implementations for
//! all of these types.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::email::{Email, EmailError};
pub use types::id::{
    AddressId, CartId, CartItemId, EntityId, OrderId, OrderItemId, ProductId, RelationId,
    SessionId, StoreId, UserId,
};
pub use types::price::{Price, PriceError};
pub use types::slug::{Slug, SlugError};
pub use types::status::{OrderStatus, PaymentMethod, PaymentStatus, StatusParseError, UserRole};
