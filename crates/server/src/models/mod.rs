//! Domain models backing the REST API.
//!
//! Field names serialize in camelCase to match the public JSON contract.

pub mod address;
pub mod cart;
pub mod graph;
pub mod order;
pub mod product;
pub mod store;
pub mod user;

pub use user::CurrentUser;
