//! Request and response DTOs for the Openpay REST API.
//!
//! Response types deserialize leniently (`default` everywhere the API may
//! omit a field); request types skip `None` fields so the wire payload only
//! carries what the caller provided.

use serde::{Deserialize, Serialize};

// =============================================================================
// Response resources
// =============================================================================

/// A payment transaction record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Charge {
    pub id: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,
}

/// Payment-method block attached to a charge.
///
/// For redirect charges Openpay places the hosted payment URL here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethod {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line3: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

/// A hosted payment-link resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkout {
    pub id: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,
}

/// A webhook subscription resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Webhook {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

// =============================================================================
// Request payloads
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRequest {
    pub name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

/// Charge creation for anonymous (non-customer) payment links.
#[derive(Debug, Clone, Serialize)]
pub struct ChargeRequest {
    pub method: String,
    pub amount: f64,
    pub description: String,
    pub currency: String,
    pub order_id: String,
    pub redirect_url: String,
    pub send_email: bool,
    pub confirm: bool,
    pub use_3d_secure: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerRef>,
}

/// Customer reference embedded in a charge request.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerRef {
    pub id: String,
}

/// Charge creation against an existing customer.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerChargeRequest {
    pub amount: f64,
    pub currency: String,
    pub description: String,
    pub order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_session_id: Option<String>,
    pub confirm: bool,
    pub send_email: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutRequest {
    pub amount: f64,
    pub currency: String,
    pub description: String,
    pub order_id: String,
    pub redirect_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    pub send_email: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub events: Vec<String>,
}

/// Partial webhook update; only present fields are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<String>>,
}

/// List filters shared by charge and checkout listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_gte: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_lte: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_gte: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_lte: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Error envelope returned by the Openpay API.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenpayErrorBody {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub error_code: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub http_code: Option<u16>,
    #[serde(default)]
    pub request_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charge_deserializes_with_partial_fields() {
        let charge: Charge = serde_json::from_str(
            r#"{"id": "tr_1", "amount": 100.0, "status": "in_progress",
                "payment_method": {"type": "redirect", "url": "https://pay.example/x"}}"#,
        )
        .unwrap();

        assert_eq!(charge.id, "tr_1");
        assert_eq!(charge.currency, "");
        assert_eq!(
            charge.payment_method.unwrap().url.as_deref(),
            Some("https://pay.example/x")
        );
    }

    #[test]
    fn test_charge_request_serializes_without_customer() {
        let req = ChargeRequest {
            method: "card".to_string(),
            amount: 100.0,
            description: "Test".to_string(),
            currency: "MXN".to_string(),
            order_id: "ORD-1".to_string(),
            redirect_url: "https://example.com".to_string(),
            send_email: false,
            confirm: false,
            use_3d_secure: true,
            customer: None,
        };

        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("customer").is_none());
        assert_eq!(json["confirm"], false);
    }

    #[test]
    fn test_customer_charge_request_skips_none_fields() {
        let req = CustomerChargeRequest {
            amount: 50.0,
            currency: "MXN".to_string(),
            description: "Test".to_string(),
            order_id: "ORD-2".to_string(),
            source_id: None,
            method: Some("card".to_string()),
            device_session_id: None,
            confirm: true,
            send_email: false,
            redirect_url: None,
        };

        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("source_id"));
        assert!(!json.contains("device_session_id"));
        assert!(!json.contains("redirect_url"));
        assert!(json.contains("\"method\":\"card\""));
    }

    #[test]
    fn test_list_query_skips_absent_filters() {
        let query = ListQuery {
            limit: Some(10),
            offset: Some(0),
            email: Some("a@b.mx".to_string()),
            ..Default::default()
        };

        let value = serde_json::to_value(&query).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 3);
        assert!(value.get("creation").is_none());
    }

    #[test]
    fn test_openpay_error_body() {
        let err: OpenpayErrorBody = serde_json::from_str(
            r#"{"category": "request", "error_code": 3001,
                "description": "The card was declined",
                "http_code": 402, "request_id": "req-1"}"#,
        )
        .unwrap();

        assert_eq!(err.error_code, 3001);
        assert_eq!(err.http_code, Some(402));
    }
}
