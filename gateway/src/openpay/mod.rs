//! Openpay REST API bindings: the client and its wire types.

pub mod client;
pub mod types;

pub use client::OpenpayClient;
pub use types::{
    Address, Charge, ChargeRequest, Checkout, CheckoutRequest, Customer, CustomerChargeRequest,
    CustomerRef, CustomerRequest, ListQuery, PaymentMethod, Webhook, WebhookRequest, WebhookUpdate,
};
