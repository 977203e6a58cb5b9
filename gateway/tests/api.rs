//! HTTP round-trip tests for the gateway router.
//!
//! The server binds an ephemeral port and is driven with a real client.
//! External services (Openpay, Directus, SMTP) point at closed loopback
//! ports, which exercises both the boundary-validation contract and the
//! degradation paths (connect failures classify as 503; order processing
//! survives a dead CMS and relay).

use std::net::SocketAddr;

use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;

use gateway::{router, AppState, Config, DirectusClient, Mailer, OpenpayClient};

type HmacSha256 = Hmac<Sha256>;

const SIGNING_KEY: &str = "sk_test_key";

fn test_config() -> Config {
    Config {
        port: 0,
        openpay_merchant_id: "m123".to_string(),
        openpay_private_key: SIGNING_KEY.to_string(),
        openpay_production: false,
        // Port 9 (discard) is closed on loopback: connects fail immediately.
        openpay_api_url: Some("http://127.0.0.1:9".to_string()),
        directus_url: "http://127.0.0.1:9".to_string(),
        webhook_token: "token".to_string(),
        directus_event_webhook: None,
        directus_charge_webhook: None,
        smtp_host: "127.0.0.1".to_string(),
        smtp_port: 1,
        smtp_secure: false,
        smtp_user: String::new(),
        smtp_pass: String::new(),
        smtp_from: "pedidos@example.com".to_string(),
        request_timeout_ms: 2_000,
        default_redirect_url: "https://example.com/return".to_string(),
    }
}

async fn spawn_app() -> SocketAddr {
    let config = test_config();
    let openpay = OpenpayClient::new(&config).unwrap();
    let directus = DirectusClient::new(&config).unwrap();
    let mailer = Mailer::from_config(&config).unwrap();

    let app = router(AppState::new(config, openpay, directus, mailer));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

fn sign(payload: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(SIGNING_KEY.as_bytes()).unwrap();
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

// =============================================================================
// Service identification
// =============================================================================

#[tokio::test]
async fn root_returns_service_info() {
    let addr = spawn_app().await;
    let resp = reqwest::get(format!("http://{addr}/")).await.unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Openpay Middleware API");
    assert_eq!(body["status"], "active");
    assert!(body.get("version").is_some());
}

#[tokio::test]
async fn health_returns_ok() {
    let addr = spawn_app().await;
    let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn unknown_route_returns_404_envelope() {
    let addr = spawn_app().await;
    let resp = reqwest::get(format!("http://{addr}/ruta/inexistente"))
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Route not found");
}

// =============================================================================
// Charges
// =============================================================================

#[tokio::test]
async fn create_charge_rejects_empty_body() {
    let addr = spawn_app().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/api/charges"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn create_charge_rejects_invalid_data() {
    let addr = spawn_app().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/api/charges"))
        .json(&json!({
            "method": "invalid_method",
            "amount": -100,
            "description": ""
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn create_charge_with_unreachable_processor_returns_503() {
    let addr = spawn_app().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/api/charges"))
        .json(&json!({
            "method": "card",
            "amount": 100.0,
            "description": "Compra de prueba"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 503);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Connection error");
}

#[tokio::test]
async fn list_charges_rejects_out_of_range_limit() {
    let addr = spawn_app().await;
    let resp = reqwest::get(format!("http://{addr}/api/charges?limit=0"))
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn payment_methods_catalog() {
    let addr = spawn_app().await;
    let resp = reqwest::get(format!("http://{addr}/api/charges/methods/payment"))
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(body["data"].get("card").is_some());
    assert!(body["data"].get("bank_account").is_some());
    assert!(body["data"].get("store").is_some());
}

// =============================================================================
// Customers
// =============================================================================

#[tokio::test]
async fn create_customer_rejects_missing_fields() {
    let addr = spawn_app().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/api/customers"))
        .json(&json!({"name": "Juan"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn search_customer_requires_email_parameter() {
    let addr = spawn_app().await;
    let resp = reqwest::get(format!("http://{addr}/api/customers/search/email"))
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

// =============================================================================
// Checkouts
// =============================================================================

#[tokio::test]
async fn create_checkout_rejects_missing_amount() {
    let addr = spawn_app().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/api/checkouts"))
        .json(&json!({"description": "sin monto"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn update_checkout_requires_status() {
    let addr = spawn_app().await;
    let client = reqwest::Client::new();

    let resp = client
        .put(format!("http://{addr}/api/checkouts/ck_1"))
        .json(&json!({"expiration_date": "2026-12-31"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

// =============================================================================
// Webhook subscriptions
// =============================================================================

#[tokio::test]
async fn create_webhook_rejects_missing_url() {
    let addr = spawn_app().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/api/webhooks"))
        .json(&json!({"events": ["charge.succeeded"]}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn create_webhook_rejects_missing_events() {
    let addr = spawn_app().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/api/webhooks"))
        .json(&json!({"url": "https://example.com/webhook"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn create_webhook_rejects_unknown_event_type() {
    let addr = spawn_app().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/api/webhooks"))
        .json(&json!({
            "url": "https://example.com/webhook",
            "events": ["charge.exploded"]
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn event_types_catalog() {
    let addr = spawn_app().await;
    let resp = reqwest::get(format!("http://{addr}/api/webhooks/events/types"))
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    let types: Vec<String> = serde_json::from_value(body["data"].clone()).unwrap();
    assert!(types.contains(&"charge.succeeded".to_string()));
    assert!(types.contains(&"charge.failed".to_string()));
}

// =============================================================================
// Webhook receive
// =============================================================================

#[tokio::test]
async fn receive_rejects_missing_signature() {
    let addr = spawn_app().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/api/webhooks/receive"))
        .json(&json!({"type": "charge.succeeded", "id": "test_id"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn receive_rejects_invalid_signature() {
    let addr = spawn_app().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/api/webhooks/receive"))
        .header("x-openpay-signature", "test-signature")
        .json(&json!({"type": "charge.succeeded", "id": "test_id"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn receive_accepts_valid_signature() {
    let addr = spawn_app().await;
    let client = reqwest::Client::new();

    let raw = r#"{"type":"charge.succeeded","id":"evt_1","data":{"id":"tr_1","amount":100.0}}"#;

    let resp = client
        .post(format!("http://{addr}/api/webhooks/receive"))
        .header("x-openpay-signature", sign(raw))
        .header("content-type", "application/json")
        .body(raw)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn receive_rejects_tampered_body() {
    let addr = spawn_app().await;
    let client = reqwest::Client::new();

    let signature = sign(r#"{"type":"charge.succeeded"}"#);

    let resp = client
        .post(format!("http://{addr}/api/webhooks/receive"))
        .header("x-openpay-signature", signature)
        .header("content-type", "application/json")
        .body(r#"{"type":"charge.refunded"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
}

// =============================================================================
// Order processing
// =============================================================================

#[tokio::test]
async fn process_order_rejects_body_without_products() {
    let addr = spawn_app().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/api/orders/process"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn process_order_rejects_null_payload() {
    let addr = spawn_app().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/api/orders/process"))
        .json(&Value::Null)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn process_order_survives_dead_cms_and_relay() {
    let addr = spawn_app().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/api/orders/process"))
        .json(&json!({
            "id": 26,
            "NoOrden": "ORD-1759243942019-646",
            "Total": "1299.20000",
            "Subtotal": "1299.20000",
            "IVA": "207.87",
            "Estatus": "Pagado",
            "Nombre": "comprador2s",
            "Apellidos": "comprador2",
            "Email": "comprador2@mailinator.com",
            "Telefono": "4773804422",
            "Ciudad": "Jerécuaro",
            "Estado": "Guanajuato",
            "Codigo_Postal": "37420",
            "Productos": "[{\"id\":1,\"nombre\":\"BLOQUES DECORATIVO 3D TIPO TRIANGULO\",\"cantidad\":1,\"precioUnitario\":649.6,\"total\":649.6},{\"id\":3,\"nombre\":\"BLOQUES DECORATIVO 3D TIPO HOJAS\",\"cantidad\":1,\"precioUnitario\":649.6,\"total\":649.6}]"
        }))
        .send()
        .await
        .unwrap();

    // Catalog lookups and SMTP both fail, yet the order is processed:
    // lines degrade to supplier-less entries and no notices go out.
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);

    let products = body["data"]["productos"].as_array().unwrap();
    assert_eq!(products.len(), 2);
    assert!(products[0]["proveedor"].is_null());
    assert!(products[0].get("error").is_some());

    let notices = body["data"]["correosEnviados"].as_array().unwrap();
    assert!(notices.is_empty());

    assert_eq!(body["data"]["cliente"]["nombre"], "comprador2s");
}

#[tokio::test]
async fn process_order_recovers_payload_hidden_in_key() {
    let addr = spawn_app().await;
    let client = reqwest::Client::new();

    let hidden = r#"{"id": 9, "NoOrden": "ORD-9", "Nombre": "Juan", "Productos": "[{\"id\":1,\"nombre\":\"X\",\"cantidad\":1,\"precioUnitario\":10.0}]"}"#;

    let resp = client
        .post(format!("http://{addr}/api/orders/process"))
        .json(&json!({ hidden: "" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["cliente"]["nombre"], "Juan");
    assert_eq!(body["data"]["productos"].as_array().unwrap().len(), 1);
}
