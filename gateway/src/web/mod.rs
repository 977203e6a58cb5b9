//! Web server module: router, shared state and the resource handlers.
//!
//! Handlers are thin: validate the input shape, call one external client,
//! reshape the result into the `{success, message, data}` envelope.

pub mod charges;
pub mod checkouts;
pub mod customers;
pub mod orders;
pub mod signature;
pub mod validate;
pub mod webhooks;

use std::sync::Arc;

use axum::{
    http::{StatusCode, Uri},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::directus::DirectusClient;
use crate::mail::Mailer;
use crate::openpay::OpenpayClient;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub openpay: Arc<OpenpayClient>,
    pub directus: Arc<DirectusClient>,
    pub mailer: Arc<Mailer>,
}

impl AppState {
    pub fn new(
        config: Config,
        openpay: OpenpayClient,
        directus: DirectusClient,
        mailer: Mailer,
    ) -> Self {
        Self {
            config: Arc::new(config),
            openpay: Arc::new(openpay),
            directus: Arc::new(directus),
            mailer: Arc::new(mailer),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health))
        // Charges
        .route(
            "/api/charges",
            post(charges::create_charge).get(charges::list_charges),
        )
        .route("/api/charges/methods/payment", get(charges::payment_methods))
        .route("/api/charges/payment-link", post(charges::create_payment_link))
        .route("/api/charges/:charge_id", get(charges::get_charge))
        // Customers
        .route("/api/customers", post(customers::create_customer))
        .route(
            "/api/customers/create-or-find",
            post(customers::create_or_find_customer),
        )
        .route(
            "/api/customers/search/email",
            get(customers::find_customer_by_email),
        )
        .route("/api/customers/:customer_id", get(customers::get_customer))
        // Checkouts
        .route(
            "/api/checkouts",
            post(checkouts::create_checkout).get(checkouts::list_checkouts),
        )
        .route(
            "/api/checkouts/:checkout_id",
            get(checkouts::get_checkout).put(checkouts::update_checkout),
        )
        // Webhook subscriptions and the receive endpoint
        .route(
            "/api/webhooks",
            post(webhooks::create_webhook).get(webhooks::list_webhooks),
        )
        .route("/api/webhooks/events/types", get(webhooks::event_types))
        .route("/api/webhooks/receive", post(webhooks::receive_webhook))
        .route(
            "/api/webhooks/:webhook_id",
            get(webhooks::get_webhook)
                .put(webhooks::update_webhook)
                .delete(webhooks::delete_webhook),
        )
        // Orders
        .route("/api/orders/process", post(orders::process_order))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Root endpoint with service identification.
async fn service_info() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Openpay Middleware API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "active",
    }))
}

/// Fallback order id when the caller did not provide one.
pub(crate) fn generate_order_id() -> String {
    format!("ORD-{}", chrono::Utc::now().timestamp_millis())
}

/// 404 envelope for unknown routes.
async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Route not found",
            "message": format!("The route {uri} does not exist"),
        })),
    )
}
