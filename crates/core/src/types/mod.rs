//! Core type definitions.

pub mod email;
pub mod id;
pub mod price;
pub mod slug;
pub mod status;
