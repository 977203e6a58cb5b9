//! HTTP client for the Openpay REST API.
//!
//! Authentication is HTTP Basic with the merchant's private key as the
//! username and an empty password. Vendor errors arrive as a JSON envelope
//! (`category`, `error_code`, `description`, `http_code`, `request_id`)
//! and are surfaced with the vendor's own http_code.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::config::Config;
use crate::error::ApiError;
use crate::openpay::types::{
    Charge, ChargeRequest, Checkout, CheckoutRequest, Customer, CustomerChargeRequest,
    CustomerRequest, ListQuery, OpenpayErrorBody, Webhook, WebhookRequest, WebhookUpdate,
};

/// Client for the Openpay REST API.
#[derive(Clone)]
pub struct OpenpayClient {
    http: Client,
    base_url: String,
    dashboard_url: String,
    private_key: String,
}

impl OpenpayClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .context("Failed to create Openpay HTTP client")?;

        Ok(Self {
            http,
            base_url: config.openpay_api_base(),
            dashboard_url: config.openpay_dashboard_base(),
            private_key: config.openpay_private_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send an authenticated request and decode vendor error envelopes.
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request
            .basic_auth(&self.private_key, Some(""))
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<OpenpayErrorBody>(&body) {
            Ok(err) if err.error_code != 0 || !err.description.is_empty() => {
                Err(ApiError::Openpay {
                    http_code: err.http_code.unwrap_or_else(|| status.as_u16()),
                    error_code: err.error_code,
                    category: err.category,
                    description: err.description,
                    request_id: err.request_id,
                })
            }
            _ => Err(ApiError::Upstream {
                status: status.as_u16(),
                body,
            }),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.http.get(self.url(path))).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Internal(e.into()))
    }

    async fn get_json_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, ApiError> {
        let response = self.send(self.http.get(self.url(path)).query(query)).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Internal(e.into()))
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.send(self.http.post(self.url(path)).json(body)).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Internal(e.into()))
    }

    // =========================================================================
    // Charges
    // =========================================================================

    pub async fn create_charge(&self, request: &ChargeRequest) -> Result<Charge, ApiError> {
        self.post_json("/charges", request).await
    }

    pub async fn get_charge(&self, charge_id: &str) -> Result<Charge, ApiError> {
        self.get_json(&format!("/charges/{charge_id}")).await
    }

    pub async fn list_charges(&self, filters: &ListQuery) -> Result<Vec<Charge>, ApiError> {
        self.get_json_query("/charges", filters).await
    }

    /// Create a charge against an existing customer.
    pub async fn create_customer_charge(
        &self,
        customer_id: &str,
        request: &CustomerChargeRequest,
    ) -> Result<Charge, ApiError> {
        self.post_json(&format!("/customers/{customer_id}/charges"), request)
            .await
    }

    /// Resolve the hosted payment URL for a charge.
    ///
    /// Unconfirmed redirect charges carry the URL in `payment_method.url`;
    /// otherwise fall back to the dashboard's manual payment document.
    pub async fn payment_link(&self, charge_id: &str) -> Result<String, ApiError> {
        let charge = self.get_charge(charge_id).await?;

        if let Some(url) = charge.payment_method.and_then(|m| m.url) {
            return Ok(url);
        }

        Ok(format!("{}/paynet-pdf/{}", self.dashboard_url, charge_id))
    }

    // =========================================================================
    // Customers
    // =========================================================================

    pub async fn create_customer(&self, request: &CustomerRequest) -> Result<Customer, ApiError> {
        self.post_json("/customers", request).await
    }

    pub async fn get_customer(&self, customer_id: &str) -> Result<Customer, ApiError> {
        self.get_json(&format!("/customers/{customer_id}")).await
    }

    pub async fn find_customer_by_email(&self, email: &str) -> Result<Option<Customer>, ApiError> {
        let customers: Vec<Customer> = self
            .get_json_query("/customers", &[("email", email)])
            .await?;
        Ok(customers.into_iter().next())
    }

    /// Look a customer up by email, creating it when absent.
    ///
    /// The boolean reports whether the customer already existed.
    pub async fn create_or_find_customer(
        &self,
        request: &CustomerRequest,
    ) -> Result<(Customer, bool), ApiError> {
        if let Some(existing) = self.find_customer_by_email(&request.email).await? {
            info!(
                customer_id = existing.id.as_deref().unwrap_or(""),
                email = %request.email,
                "customer_found_existing"
            );
            return Ok((existing, true));
        }

        info!(email = %request.email, "customer_creating");
        let created = self.create_customer(request).await?;
        Ok((created, false))
    }

    // =========================================================================
    // Checkouts
    // =========================================================================

    pub async fn create_checkout(&self, request: &CheckoutRequest) -> Result<Checkout, ApiError> {
        self.post_json("/checkouts", request).await
    }

    pub async fn get_checkout(&self, checkout_id: &str) -> Result<Checkout, ApiError> {
        self.get_json(&format!("/checkouts/{checkout_id}")).await
    }

    pub async fn list_checkouts(&self, filters: &ListQuery) -> Result<Vec<Checkout>, ApiError> {
        self.get_json_query("/checkouts", filters).await
    }

    /// Update a checkout's status, optionally moving its expiration date.
    pub async fn update_checkout(
        &self,
        checkout_id: &str,
        status: &str,
        expiration_date: Option<&str>,
    ) -> Result<Checkout, ApiError> {
        let mut body = json!({});
        if let Some(date) = expiration_date {
            body["expiration_date"] = json!(date);
        }

        let request = self
            .http
            .put(self.url(&format!("/checkouts/{checkout_id}")))
            .query(&[("status", status)])
            .json(&body);
        let response = self.send(request).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Internal(e.into()))
    }

    // =========================================================================
    // Webhook subscriptions
    // =========================================================================

    pub async fn create_webhook(&self, request: &WebhookRequest) -> Result<Webhook, ApiError> {
        self.post_json("/webhooks", request).await
    }

    pub async fn list_webhooks(&self) -> Result<Vec<Webhook>, ApiError> {
        self.get_json("/webhooks").await
    }

    pub async fn get_webhook(&self, webhook_id: &str) -> Result<Webhook, ApiError> {
        self.get_json(&format!("/webhooks/{webhook_id}")).await
    }

    pub async fn update_webhook(
        &self,
        webhook_id: &str,
        update: &WebhookUpdate,
    ) -> Result<Webhook, ApiError> {
        let request = self
            .http
            .put(self.url(&format!("/webhooks/{webhook_id}")))
            .json(update);
        let response = self.send(request).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Internal(e.into()))
    }

    pub async fn delete_webhook(&self, webhook_id: &str) -> Result<(), ApiError> {
        let request = self.http.delete(self.url(&format!("/webhooks/{webhook_id}")));
        self.send(request).await?;
        Ok(())
    }
}
