//! HTTP client for the Pagar.me v5 orders API.

use std::time::Duration as StdDuration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{Duration, Utc};
use secrecy::ExposeSecret;

use mercantia_core::PaymentMethod;

use super::PagarmeError;
use super::types::{
    BoletoBody, BoletoCharge, CardDetails, Charge, ChargeRequest, CreditCardBody, GatewayOrder,
    OrderItemBody, OrderRequestBody, PaymentBody, PixBody, PixCharge,
};
use crate::config::PagarmeConfig;

const BASE_URL: &str = "https://api.pagar.me/core/v5";
const USER_AGENT: &str = "Mercantia/1.0";
const REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// PIX charges expire after one hour.
const PIX_EXPIRES_SECS: i64 = 3600;

/// Boletos fall due three days out.
const BOLETO_DUE_DAYS: i64 = 3;

/// Gateway minimum charge: one real, in centavos.
pub const MIN_CHARGE_CENTS: i64 = 100;

/// Pagar.me v5 API client.
#[derive(Clone)]
pub struct PagarmeClient {
    http: reqwest::Client,
    /// Precomputed `Basic` authorization value.
    auth: Option<String>,
    mock: bool,
    base_url: String,
}

impl PagarmeClient {
    /// Build a client from configuration.
    #[must_use]
    pub fn new(config: &PagarmeConfig) -> Self {
        let auth = config.secret_key.as_ref().map(|key| {
            let credentials = format!("{}:", key.expose_secret());
            format!("Basic {}", STANDARD.encode(credentials))
        });

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            http,
            auth,
            mock: config.mock,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Whether the client can actually charge (configured or mocked).
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.mock || self.auth.is_some()
    }

    /// Create a PIX charge.
    ///
    /// # Errors
    ///
    /// Returns `PagarmeError::InvalidAmount` below the gateway minimum,
    /// `NotConfigured` without a key or mock mode, and gateway errors
    /// otherwise.
    pub async fn create_pix(&self, request: &ChargeRequest) -> Result<PixCharge, PagarmeError> {
        validate_amount(request.amount)?;

        if self.mock {
            return Ok(mock_pix(request));
        }

        let body = self.order_body(
            request,
            PaymentBody {
                payment_method: PaymentMethod::Pix.as_str(),
                pix: Some(PixBody {
                    expires_in: PIX_EXPIRES_SECS.unsigned_abs(),
                }),
                boleto: None,
                credit_card: None,
            },
        );

        let order = self.post_order(&body).await?;
        let payment = order
            .payment(PaymentMethod::Pix)
            .ok_or_else(|| PagarmeError::UnexpectedResponse("no pix payment in order".into()))?;

        Ok(PixCharge {
            transaction_id: order.id.clone(),
            pix_key: payment.pix_key.clone().unwrap_or_default(),
            qr_code: payment.qr_code.clone().unwrap_or_default(),
            qr_code_image: payment.qr_code_base64.clone(),
            expires_at: Utc::now() + Duration::seconds(PIX_EXPIRES_SECS),
            status: order.status,
            amount: request.amount,
        })
    }

    /// Create a boleto charge.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::create_pix`].
    pub async fn create_boleto(
        &self,
        request: &ChargeRequest,
    ) -> Result<BoletoCharge, PagarmeError> {
        validate_amount(request.amount)?;

        let due_at = Utc::now() + Duration::days(BOLETO_DUE_DAYS);

        if self.mock {
            return Ok(BoletoCharge {
                transaction_id: mock_transaction_id(&request.order_reference),
                line: "34191.79001 01043.510047 91020.150008 9 00000000002500".to_string(),
                barcode: "34199000000025001790001010435100479102015000".to_string(),
                pdf_url: None,
                due_at,
                status: "pending".to_string(),
                amount: request.amount,
            });
        }

        let body = self.order_body(
            request,
            PaymentBody {
                payment_method: PaymentMethod::Boleto.as_str(),
                pix: None,
                boleto: Some(BoletoBody {
                    due_at,
                    instructions: Some("Pagar até o vencimento".to_string()),
                }),
                credit_card: None,
            },
        );

        let order = self.post_order(&body).await?;
        let payment = order
            .payment(PaymentMethod::Boleto)
            .ok_or_else(|| PagarmeError::UnexpectedResponse("no boleto payment in order".into()))?;

        Ok(BoletoCharge {
            transaction_id: order.id.clone(),
            line: payment.boleto_line.clone().unwrap_or_default(),
            barcode: payment.boleto_barcode.clone().unwrap_or_default(),
            pdf_url: payment.boleto_url.clone(),
            due_at,
            status: order.status,
            amount: request.amount,
        })
    }

    /// Create a credit card charge. Card data passes through to the
    /// gateway and is never persisted.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::create_pix`].
    pub async fn create_card(
        &self,
        request: &ChargeRequest,
        card: CardDetails,
        installments: u8,
    ) -> Result<Charge, PagarmeError> {
        validate_amount(request.amount)?;

        if self.mock {
            return Ok(Charge {
                transaction_id: mock_transaction_id(&request.order_reference),
                status: "paid".to_string(),
                amount: request.amount,
            });
        }

        let body = self.order_body(
            request,
            PaymentBody {
                payment_method: PaymentMethod::CreditCard.as_str(),
                pix: None,
                boleto: None,
                credit_card: Some(CreditCardBody {
                    installments: installments.max(1),
                    statement_descriptor: "MERCANTIA".to_string(),
                    card,
                }),
            },
        );

        let order = self.post_order(&body).await?;

        Ok(Charge {
            transaction_id: order.id,
            status: order.status,
            amount: request.amount,
        })
    }

    /// Fetch a gateway order by its transaction ID.
    ///
    /// # Errors
    ///
    /// Returns `NotConfigured` without a key, gateway errors otherwise.
    pub async fn get_order(&self, transaction_id: &str) -> Result<GatewayOrder, PagarmeError> {
        if self.mock {
            return Ok(GatewayOrder {
                id: transaction_id.to_string(),
                status: "paid".to_string(),
                total_amount: None,
                payments: Vec::new(),
            });
        }

        let auth = self.auth.as_ref().ok_or(PagarmeError::NotConfigured)?;
        let response = self
            .http
            .get(format!("{}/orders/{transaction_id}", self.base_url))
            .header("Authorization", auth)
            .send()
            .await?;

        read_order(response).await
    }

    fn order_body(&self, request: &ChargeRequest, payment: PaymentBody) -> OrderRequestBody {
        OrderRequestBody {
            items: vec![OrderItemBody {
                description: request.description.clone(),
                quantity: 1,
                amount: request.amount,
            }],
            customer: request.customer.clone(),
            payments: vec![payment],
            metadata: serde_json::json!({
                "source": "mercantia_app",
                "order_id": request.order_reference,
            }),
        }
    }

    async fn post_order(&self, body: &OrderRequestBody) -> Result<GatewayOrder, PagarmeError> {
        let auth = self.auth.as_ref().ok_or(PagarmeError::NotConfigured)?;

        let response = self
            .http
            .post(format!("{}/orders", self.base_url))
            .header("Authorization", auth)
            .json(body)
            .send()
            .await?;

        read_order(response).await
    }
}

async fn read_order(response: reqwest::Response) -> Result<GatewayOrder, PagarmeError> {
    let status = response.status();
    if !status.is_success() {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "no response body".to_string());
        tracing::error!(status = %status, %message, "Gateway rejected order");
        return Err(PagarmeError::Gateway {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.json().await?)
}

fn validate_amount(amount: i64) -> Result<(), PagarmeError> {
    if amount < MIN_CHARGE_CENTS {
        return Err(PagarmeError::InvalidAmount(format!(
            "amount must be at least {MIN_CHARGE_CENTS} centavos"
        )));
    }
    Ok(())
}

fn mock_transaction_id(reference: &str) -> String {
    format!("or_mock_{reference}")
}

fn mock_pix(request: &ChargeRequest) -> PixCharge {
    PixCharge {
        transaction_id: mock_transaction_id(&request.order_reference),
        pix_key: "mock-pix-key@mercantia.local".to_string(),
        qr_code: format!("00020126mock{}", request.amount),
        qr_code_image: None,
        expires_at: Utc::now() + Duration::seconds(PIX_EXPIRES_SECS),
        status: "pending".to_string(),
        amount: request.amount,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::PagarmeConfig;
    use secrecy::SecretString;

    fn mock_client() -> PagarmeClient {
        PagarmeClient::new(&PagarmeConfig {
            secret_key: None,
            webhook_secret: None,
            mock: true,
        })
    }

    fn charge_request(amount: i64) -> ChargeRequest {
        ChargeRequest {
            amount,
            description: "Order #1".to_string(),
            customer: super::super::ChargeCustomer {
                name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
                code: "user-1".to_string(),
                document: None,
            },
            order_reference: "o-1".to_string(),
        }
    }

    #[test]
    fn test_availability() {
        assert!(mock_client().is_available());

        let unconfigured = PagarmeClient::new(&PagarmeConfig {
            secret_key: None,
            webhook_secret: None,
            mock: false,
        });
        assert!(!unconfigured.is_available());

        let configured = PagarmeClient::new(&PagarmeConfig {
            secret_key: Some(SecretString::from("sk_test_abc123")),
            webhook_secret: None,
            mock: false,
        });
        assert!(configured.is_available());
    }

    #[test]
    fn test_basic_auth_has_empty_password() {
        let client = PagarmeClient::new(&PagarmeConfig {
            secret_key: Some(SecretString::from("sk_test_abc")),
            webhook_secret: None,
            mock: false,
        });
        // base64("sk_test_abc:")
        assert_eq!(client.auth.as_deref(), Some("Basic c2tfdGVzdF9hYmM6"));
    }

    #[tokio::test]
    async fn test_mock_pix_charge() {
        let charge = mock_client().create_pix(&charge_request(2_500)).await.unwrap();
        assert_eq!(charge.transaction_id, "or_mock_o-1");
        assert_eq!(charge.amount, 2_500);
        assert_eq!(charge.status, "pending");
        assert!(charge.expires_at > Utc::now());
    }

    #[tokio::test]
    async fn test_amount_below_minimum_rejected() {
        let result = mock_client().create_pix(&charge_request(99)).await;
        assert!(matches!(result, Err(PagarmeError::InvalidAmount(_))));
    }

    #[tokio::test]
    async fn test_unconfigured_client_refuses_real_charge() {
        let client = PagarmeClient::new(&PagarmeConfig {
            secret_key: None,
            webhook_secret: None,
            mock: false,
        });
        let result = client.create_pix(&charge_request(2_500)).await;
        assert!(matches!(result, Err(PagarmeError::NotConfigured)));
    }
}
