//! Pagar.me v5 payment gateway client.
//!
//! Charges are created as gateway orders (`POST /core/v5/orders`) with a
//! single payment entry for PIX, boleto, or credit card. Authentication is
//! HTTP Basic with the secret key as username and an empty password. Mock
//! mode fabricates deterministic charges for local development.

mod client;
mod error;
mod types;

pub use client::{PagarmeClient, MIN_CHARGE_CENTS};
pub use error::PagarmeError;
pub use types::{
    BoletoCharge, CardDetails, Charge, ChargeCustomer, ChargeRequest, GatewayOrder, PixCharge,
};
