//! Payment-gateway middleware.
//!
//! This library backs the `gateway-server` binary, a small HTTP service
//! that fronts the Openpay REST API and glues it to the rest of the shop:
//!
//! ```text
//! Clients → axum router → Openpay REST
//! Openpay → /api/webhooks/receive → signature check → Directus
//! Directus → /api/orders/process → catalog lookup → supplier emails (SMTP)
//! ```

pub mod config;
pub mod directus;
pub mod error;
pub mod events;
pub mod mail;
pub mod openpay;
pub mod orders;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use directus::DirectusClient;
pub use error::ApiError;
pub use mail::Mailer;
pub use openpay::OpenpayClient;
pub use web::{router, AppState};
