//! Request and response shapes for the Pagar.me v5 orders API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mercantia_core::{PaymentMethod, PaymentStatus};

/// The customer attached to a gateway order.
#[derive(Debug, Clone, Serialize)]
pub struct ChargeCustomer {
    pub name: String,
    pub email: String,
    /// Our identifier for the customer; v5 calls this `code`.
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

/// What we want to charge, independent of payment method.
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    /// Amount in minor units (centavos).
    pub amount: i64,
    pub description: String,
    pub customer: ChargeCustomer,
    /// Our order ID, echoed back in webhooks via metadata.
    pub order_reference: String,
}

/// Card fields for a credit card charge. Never logged or stored.
#[derive(Debug, Clone, Serialize)]
pub struct CardDetails {
    pub number: String,
    pub holder_name: String,
    pub exp_month: u8,
    pub exp_year: u16,
    pub cvv: String,
}

/// A created PIX charge.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PixCharge {
    pub transaction_id: String,
    pub pix_key: String,
    pub qr_code: String,
    pub qr_code_image: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub status: String,
    pub amount: i64,
}

/// A created boleto charge.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoletoCharge {
    pub transaction_id: String,
    pub line: String,
    pub barcode: String,
    pub pdf_url: Option<String>,
    pub due_at: DateTime<Utc>,
    pub status: String,
    pub amount: i64,
}

/// A created charge of any method, for the generic status endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Charge {
    pub transaction_id: String,
    pub status: String,
    pub amount: i64,
}

// --- Wire types -------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct OrderRequestBody {
    pub items: Vec<OrderItemBody>,
    pub customer: ChargeCustomer,
    pub payments: Vec<PaymentBody>,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub(crate) struct OrderItemBody {
    pub description: String,
    pub quantity: u32,
    /// v5 uses `amount` for the unit price in minor units.
    pub amount: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct PaymentBody {
    pub payment_method: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pix: Option<PixBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boleto: Option<BoletoBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_card: Option<CreditCardBody>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PixBody {
    pub expires_in: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct BoletoBody {
    pub due_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreditCardBody {
    pub installments: u8,
    pub statement_descriptor: String,
    pub card: CardDetails,
}

/// A gateway order as returned by `POST /orders` and `GET /orders/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub total_amount: Option<i64>,
    #[serde(default)]
    pub payments: Vec<GatewayPayment>,
}

impl GatewayOrder {
    /// The payment entry for a given method, if present.
    #[must_use]
    pub fn payment(&self, method: PaymentMethod) -> Option<&GatewayPayment> {
        self.payments
            .iter()
            .find(|p| p.payment_method == method.as_str())
    }

    /// Gateway status mapped onto our payment status.
    #[must_use]
    pub fn payment_status(&self) -> PaymentStatus {
        PaymentStatus::from_gateway(&self.status)
    }
}

/// A payment entry within a gateway order.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayPayment {
    pub payment_method: String,
    #[serde(default)]
    pub pix_key: Option<String>,
    #[serde(default)]
    pub qr_code: Option<String>,
    #[serde(default)]
    pub qr_code_base64: Option<String>,
    #[serde(default)]
    pub boleto_line: Option<String>,
    #[serde(default)]
    pub boleto_barcode: Option<String>,
    #[serde(default)]
    pub boleto_url: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_request_serializes_v5_shape() {
        let body = OrderRequestBody {
            items: vec![OrderItemBody {
                description: "Order #1".to_string(),
                quantity: 1,
                amount: 2_500,
            }],
            customer: ChargeCustomer {
                name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
                code: "user-1".to_string(),
                document: None,
            },
            payments: vec![PaymentBody {
                payment_method: PaymentMethod::Pix.as_str(),
                pix: Some(PixBody { expires_in: 3600 }),
                boleto: None,
                credit_card: None,
            }],
            metadata: serde_json::json!({ "order_id": "o-1" }),
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["items"][0]["amount"], 2_500);
        assert_eq!(json["payments"][0]["payment_method"], "pix");
        assert_eq!(json["payments"][0]["pix"]["expires_in"], 3600);
        // Unused methods are omitted, not null.
        assert!(json["payments"][0].get("boleto").is_none());
        assert!(json["customer"].get("document").is_none());
    }

    #[test]
    fn test_gateway_order_deserializes() {
        let order: GatewayOrder = serde_json::from_str(
            r#"{
                "id": "or_abc123",
                "status": "pending",
                "total_amount": 2500,
                "payments": [
                    { "payment_method": "pix", "pix_key": "k", "qr_code": "q" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(order.id, "or_abc123");
        assert_eq!(
            order.payment(PaymentMethod::Pix).unwrap().qr_code.as_deref(),
            Some("q")
        );
        assert!(order.payment(PaymentMethod::Boleto).is_none());
        assert_eq!(order.payment_status(), PaymentStatus::Pending);
    }
}
