//! Webhook endpoints: subscription CRUD against the processor and the
//! receive endpoint for inbound events.
//!
//! The receive handler verifies the signature over the raw body, dispatches
//! the event to its logging handler and forwards the payload to the CMS.
//! Forwarding failures never fail the delivery: the processor retries
//! aggressively on non-2xx, and the CMS copy is best effort by design of
//! the original flow.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::error::ApiError;
use crate::events::{dispatch_event, EventEnvelope, WEBHOOK_EVENT_TYPES};
use crate::openpay::types::{WebhookRequest, WebhookUpdate};
use crate::web::signature::{is_signature_verification_enabled, verify_event_signature};
use crate::web::{validate, AppState};

const SIGNATURE_HEADER: &str = "x-openpay-signature";

#[derive(Debug, Deserialize)]
pub struct CreateWebhookBody {
    pub url: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub events: Option<Vec<String>>,
}

/// POST /api/webhooks
pub async fn create_webhook(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let body: CreateWebhookBody =
        serde_json::from_value(body).map_err(|e| ApiError::validation(e.to_string()))?;

    let url = body
        .url
        .ok_or_else(|| ApiError::validation("url and events (array) are required"))?;
    validate::validate_url(&url)?;

    let events = body
        .events
        .ok_or_else(|| ApiError::validation("url and events (array) are required"))?;
    validate::validate_events(&events)?;

    let request = WebhookRequest {
        url,
        user: body.user,
        password: body.password,
        events,
    };
    let webhook = state.openpay.create_webhook(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Webhook created successfully",
            "data": webhook,
        })),
    ))
}

/// GET /api/webhooks
pub async fn list_webhooks(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let webhooks = state.openpay.list_webhooks().await?;

    Ok(Json(json!({
        "success": true,
        "count": webhooks.len(),
        "data": webhooks,
    })))
}

/// GET /api/webhooks/:webhook_id
pub async fn get_webhook(
    State(state): State<AppState>,
    Path(webhook_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let webhook = state.openpay.get_webhook(&webhook_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": webhook,
    })))
}

/// PUT /api/webhooks/:webhook_id
pub async fn update_webhook(
    State(state): State<AppState>,
    Path(webhook_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let body: WebhookUpdate =
        serde_json::from_value(body).map_err(|e| ApiError::validation(e.to_string()))?;

    if let Some(url) = body.url.as_deref() {
        validate::validate_url(url)?;
    }
    if let Some(events) = body.events.as_deref() {
        validate::validate_events(events)?;
    }

    let webhook = state.openpay.update_webhook(&webhook_id, &body).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Webhook updated successfully",
        "data": webhook,
    })))
}

/// DELETE /api/webhooks/:webhook_id
pub async fn delete_webhook(
    State(state): State<AppState>,
    Path(webhook_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.openpay.delete_webhook(&webhook_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Webhook deleted successfully",
        "data": Value::Null,
    })))
}

/// GET /api/webhooks/events/types
pub async fn event_types() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "data": WEBHOOK_EVENT_TYPES,
        "description": "Available webhook event types",
    }))
}

/// POST /api/webhooks/receive
///
/// Inbound events from the processor. Signature first, then dispatch, then
/// best-effort CMS forwarding.
pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Response, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let Some(signature) = signature else {
        warn!("webhook_signature_header_missing");
        return Ok((
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "Missing required header",
                "message": format!("The {SIGNATURE_HEADER} header is required"),
            })),
        )
            .into_response());
    };

    if is_signature_verification_enabled(&state.config.openpay_private_key) {
        if !verify_event_signature(
            &state.config.openpay_private_key,
            body.as_bytes(),
            signature,
        ) {
            warn!("webhook_signature_invalid");
            return Ok((
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "Invalid signature",
                    "message": "The webhook signature is not valid",
                })),
            )
                .into_response());
        }
    } else {
        warn!("webhook_signature_verification_disabled");
    }

    let payload: Value = serde_json::from_str(&body)?;
    let envelope: EventEnvelope = serde_json::from_value(payload.clone()).unwrap_or_default();

    info!(
        event_type = envelope.kind.as_deref().unwrap_or("unknown"),
        event_id = envelope.id.as_deref().unwrap_or(""),
        body_length = body.len(),
        "webhook_received"
    );

    dispatch_event(&envelope);

    if let Err(e) = state.directus.forward_event(&payload).await {
        error!(
            event_type = envelope.kind.as_deref().unwrap_or("unknown"),
            error = %e,
            "event_forward_failed"
        );
    }

    Ok(Json(json!({
        "success": true,
        "message": "Webhook processed successfully",
    }))
    .into_response())
}
