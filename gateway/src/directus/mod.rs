//! Directus CMS client: catalog lookups and best-effort event forwarding.
//!
//! Catalog lookups resolve a product's supplier and the supplier's
//! associated user (the email recipient). Forwarding pushes processor
//! events and created charges to Directus webhook endpoints; callers treat
//! forwarding failures as log-and-continue.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::ApiError;

/// Fields requested on every catalog lookup: the product, its supplier and
/// the supplier's associated user.
const PRODUCT_FIELDS: &str = "*,Proveedor.*,Proveedor.Usuario_asociado.*";

/// Directus item envelope.
#[derive(Debug, Deserialize)]
struct ItemEnvelope<T> {
    data: T,
}

/// User account associated with a supplier; primary email recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl SupplierUser {
    /// Display name for the email greeting: full name, else the address.
    pub fn display_name(&self) -> Option<String> {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            _ => self.email.clone(),
        }
    }
}

/// Supplier record attached to a catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: i64,
    #[serde(
        rename = "Nombre_comercial",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub trade_name: Option<String>,
    #[serde(
        rename = "Razon_social",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub legal_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(
        rename = "Usuario_asociado",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub user: Option<SupplierUser>,
}

impl Supplier {
    /// Trade name, else legal name, else a placeholder.
    pub fn display_name(&self) -> &str {
        self.trade_name
            .as_deref()
            .or(self.legal_name.as_deref())
            .unwrap_or("Sin nombre")
    }

    /// Notice recipient: the associated user's email, else the record's.
    pub fn notice_email(&self) -> Option<&str> {
        self.user
            .as_ref()
            .and_then(|u| u.email.as_deref())
            .or(self.email.as_deref())
    }
}

/// Catalog product as returned by Directus. Only the supplier is modeled;
/// remaining catalog fields ride along untyped for response echoing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogProduct {
    #[serde(rename = "Proveedor", default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<Supplier>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Client for the Directus CMS.
#[derive(Clone)]
pub struct DirectusClient {
    http: Client,
    base_url: String,
    token: String,
    event_webhook: Option<String>,
    charge_webhook: Option<String>,
}

impl DirectusClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .context("Failed to create Directus HTTP client")?;

        Ok(Self {
            http,
            base_url: config.directus_url.clone(),
            token: config.webhook_token.clone(),
            event_webhook: config.directus_event_webhook.clone(),
            charge_webhook: config.directus_charge_webhook.clone(),
        })
    }

    /// Fetch a catalog product with its supplier and associated user.
    pub async fn fetch_product(&self, product_id: i64) -> Result<CatalogProduct, ApiError> {
        let url = format!("{}/items/Productos/{}", self.base_url, product_id);

        let response = self
            .http
            .get(&url)
            .query(&[("fields", PRODUCT_FIELDS)])
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: ItemEnvelope<CatalogProduct> = response
            .json()
            .await
            .map_err(|e| ApiError::Internal(e.into()))?;

        Ok(envelope.data)
    }

    /// Forward a received processor event to the configured Directus
    /// endpoint. No-op with a warning when unconfigured.
    pub async fn forward_event(&self, payload: &Value) -> Result<(), ApiError> {
        match &self.event_webhook {
            Some(url) => self.forward(url, payload, "event").await,
            None => {
                warn!("directus_event_forward_unconfigured");
                Ok(())
            }
        }
    }

    /// Forward a created charge to the configured Directus endpoint.
    pub async fn forward_charge(&self, payload: &Value) -> Result<(), ApiError> {
        match &self.charge_webhook {
            Some(url) => self.forward(url, payload, "charge").await,
            None => {
                warn!("directus_charge_forward_unconfigured");
                Ok(())
            }
        }
    }

    async fn forward(&self, url: &str, payload: &Value, what: &'static str) -> Result<(), ApiError> {
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(payload)
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        info!(kind = what, status = status.as_u16(), "directus_forwarded");
        Ok(())
    }
}
