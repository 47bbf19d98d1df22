//! Payment gateway error types.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors from the payment gateway client.
#[derive(Debug, Error)]
pub enum PagarmeError {
    /// The gateway is not configured and mock mode is off.
    #[error("payment gateway not configured")]
    NotConfigured,

    /// The charge amount is invalid.
    #[error("invalid charge amount: {0}")]
    InvalidAmount(String),

    /// Transport failure talking to the gateway.
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with an error status.
    #[error("gateway error ({status}): {message}")]
    Gateway { status: u16, message: String },

    /// The gateway response was missing expected fields.
    #[error("unexpected gateway response: {0}")]
    UnexpectedResponse(String),
}

impl PagarmeError {
    /// HTTP status to surface to our own client.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidAmount(_) => StatusCode::BAD_REQUEST,
            Self::Gateway { status: 422, .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotConfigured
            | Self::Http(_)
            | Self::Gateway { .. }
            | Self::UnexpectedResponse(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Message safe to show to our own client.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::InvalidAmount(msg) => msg.clone(),
            Self::Gateway {
                status: 422,
                message,
            } => message.clone(),
            Self::NotConfigured => "Payments are not available".to_string(),
            Self::Http(_) | Self::Gateway { .. } | Self::UnexpectedResponse(_) => {
                "Payment gateway error".to_string()
            }
        }
    }
}
