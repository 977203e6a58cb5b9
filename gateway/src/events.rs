//! Processor event types and the inbound event dispatcher.
//!
//! The event-type list backs both `GET /api/webhooks/events/types` and
//! webhook-creation validation. Dispatch is intentionally a set of logging
//! no-op handlers: downstream effects happen in the Directus forwarder.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

/// Every event type Openpay can deliver to a webhook subscription.
pub const WEBHOOK_EVENT_TYPES: &[&str] = &[
    "charge.refunded",
    "charge.failed",
    "charge.cancelled",
    "charge.created",
    "charge.succeeded",
    "charge.rescored.to.decline",
    "subscription.charge.failed",
    "payout.created",
    "payout.succeeded",
    "payout.failed",
    "transfer.succeeded",
    "fee.succeeded",
    "fee.refund.succeeded",
    "spei.received",
    "chargeback.created",
    "chargeback.rejected",
    "chargeback.accepted",
    "order.created",
    "order.activated",
    "order.payment.received",
    "order.completed",
    "order.expired",
    "order.cancelled",
    "order.payment.cancelled",
    "subscription.created",
    "subscription.updated",
    "subscription.cancelled",
    "subscription.succeeded",
    "subscription.failed",
];

/// Whether a string names a known webhook event type.
pub fn is_known_event_type(event: &str) -> bool {
    WEBHOOK_EVENT_TYPES.contains(&event)
}

/// Inbound event envelope as delivered to the receive endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Event type, e.g. "charge.succeeded"
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Event identifier
    #[serde(default)]
    pub id: Option<String>,
    /// Event resource payload (charge, payout, ...)
    #[serde(default)]
    pub data: Option<Value>,
}

impl EventEnvelope {
    fn resource_id(&self) -> &str {
        self.data
            .as_ref()
            .and_then(|d| d.get("id"))
            .and_then(Value::as_str)
            .unwrap_or("unknown")
    }
}

/// Dispatch an inbound event to its type-specific handler.
///
/// Handlers only log today; state changes live in the CMS that receives
/// the forwarded payload.
pub fn dispatch_event(envelope: &EventEnvelope) {
    let kind = envelope.kind.as_deref().unwrap_or("unknown");
    let resource_id = envelope.resource_id();

    match kind {
        "charge.succeeded" => info!(charge_id = %resource_id, "charge_succeeded"),
        "charge.failed" => info!(charge_id = %resource_id, "charge_failed"),
        "charge.cancelled" => info!(charge_id = %resource_id, "charge_cancelled"),
        "charge.refunded" => info!(charge_id = %resource_id, "charge_refunded"),
        "payout.created" => info!(payout_id = %resource_id, "payout_created"),
        "payout.succeeded" => info!(payout_id = %resource_id, "payout_succeeded"),
        "payout.failed" => info!(payout_id = %resource_id, "payout_failed"),
        other => warn!(event_type = %other, "event_type_unhandled"),
    }
}
