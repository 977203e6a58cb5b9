//! Configuration module for environment variable parsing.
//!
//! Reads all configuration from environment variables, matching the
//! deployment layout of the original middleware (.env driven).

use std::env;
use tracing::warn;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Openpay merchant identifier
    pub openpay_merchant_id: String,

    /// Openpay private key; doubles as the webhook HMAC signing key
    pub openpay_private_key: String,

    /// When true, talk to the production Openpay endpoints
    pub openpay_production: bool,

    /// Explicit Openpay host override (self-hosted mocks and tests)
    pub openpay_api_url: Option<String>,

    /// Directus base URL for catalog lookups
    pub directus_url: String,

    /// Bearer token for Directus calls
    pub webhook_token: String,

    /// Directus endpoint receiving forwarded processor events (optional)
    pub directus_event_webhook: Option<String>,

    /// Directus endpoint receiving forwarded created charges (optional)
    pub directus_charge_webhook: Option<String>,

    /// SMTP relay host
    pub smtp_host: String,

    /// SMTP relay port
    pub smtp_port: u16,

    /// When true, use implicit TLS; otherwise STARTTLS
    pub smtp_secure: bool,

    /// SMTP username
    pub smtp_user: String,

    /// SMTP password
    pub smtp_pass: String,

    /// From address for outbound notices (falls back to SMTP_USER)
    pub smtp_from: String,

    /// Outbound HTTP request timeout in milliseconds
    pub request_timeout_ms: u64,

    /// Fallback redirect URL for charges and checkouts
    pub default_redirect_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let smtp_user = env::var("SMTP_USER").unwrap_or_default();

        let config = Config {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),

            openpay_merchant_id: env::var("OPENPAY_MERCHANT_ID").unwrap_or_default(),

            openpay_private_key: env::var("OPENPAY_PRIVATE_KEY").unwrap_or_default(),

            openpay_production: parse_flag("OPENPAY_PRODUCTION"),

            openpay_api_url: env::var("OPENPAY_API_URL").ok(),

            directus_url: env::var("DIRECTUS_URL")
                .unwrap_or_default()
                .trim_end_matches('/')
                .to_string(),

            webhook_token: env::var("WEBHOOK_TOKEN").unwrap_or_default(),

            directus_event_webhook: env::var("WEBHOOK_DIRECTUS").ok(),

            directus_charge_webhook: env::var("WEBHOOK_CHARGE").ok(),

            smtp_host: env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string()),

            smtp_port: env::var("SMTP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(587),

            smtp_secure: parse_flag("SMTP_SECURE"),

            smtp_user: smtp_user.clone(),

            smtp_pass: env::var("SMTP_PASS").unwrap_or_default(),

            smtp_from: env::var("SMTP_FROM").unwrap_or(smtp_user),

            request_timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30_000),

            default_redirect_url: env::var("DEFAULT_REDIRECT_URL")
                .unwrap_or_else(|_| "https://armafa.com/Usuario/GetTransaction".to_string()),
        };

        if config.openpay_merchant_id.is_empty() || config.openpay_private_key.is_empty() {
            warn!("openpay_credentials_missing");
        }
        if config.directus_url.is_empty() {
            warn!("directus_url_missing");
        }

        config
    }

    /// Openpay API base URL including the merchant segment.
    pub fn openpay_api_base(&self) -> String {
        let host = match &self.openpay_api_url {
            Some(url) => url.trim_end_matches('/'),
            None if self.openpay_production => "https://api.openpay.mx",
            None => "https://sandbox-api.openpay.mx",
        };
        format!("{}/v1/{}", host, self.openpay_merchant_id)
    }

    /// Openpay dashboard base URL, used for manual payment-link fallbacks.
    pub fn openpay_dashboard_base(&self) -> String {
        if self.openpay_production {
            "https://dashboard.openpay.mx".to_string()
        } else {
            "https://sandbox-dashboard.openpay.mx".to_string()
        }
    }
}

/// Parse a boolean flag: only the literal string "true" enables it.
fn parse_flag(name: &str) -> bool {
    env::var(name).map(|v| v == "true").unwrap_or(false)
}
