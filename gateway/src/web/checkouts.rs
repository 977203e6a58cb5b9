//! Checkout endpoints.
//!
//! Creation branches on the customer block: a known customer gets a direct
//! customer charge, an anonymous request gets a hosted checkout link.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::error::ApiError;
use crate::openpay::types::{
    CheckoutRequest, Customer, CustomerChargeRequest, CustomerRequest, ListQuery,
};
use crate::web::{generate_order_id, validate, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateCheckoutBody {
    pub amount: Option<f64>,
    pub description: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub redirect_url: Option<String>,
    #[serde(default)]
    pub expiration_date: Option<String>,
    /// Accepts both booleans and the string forms "true"/"false".
    #[serde(default)]
    pub send_email: Option<Value>,
    #[serde(default)]
    pub source_id: Option<String>,
    /// Alias for source_id kept for older callers.
    #[serde(default)]
    pub card_id: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub device_session_id: Option<String>,
    #[serde(default)]
    pub confirm: Option<bool>,
    #[serde(default)]
    pub customer: Option<CustomerRequest>,
}

/// POST /api/checkouts
pub async fn create_checkout(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let body: CreateCheckoutBody =
        serde_json::from_value(body).map_err(|e| ApiError::validation(e.to_string()))?;

    let amount = validate::require_amount(body.amount)?;
    let description = validate::require_description(body.description.as_deref())?;
    let currency =
        validate::currency_or_default(body.currency.as_deref(), validate::CHECKOUT_CURRENCIES)?;

    let customer = match &body.customer {
        Some(request) => {
            validate::validate_customer(request)?;
            match state.openpay.create_or_find_customer(request).await {
                Ok((customer, _)) => Some(customer),
                Err(e) => {
                    return Err(ApiError::validation(format!(
                        "Failed to process customer: {e}"
                    )));
                }
            }
        }
        None => None,
    };

    let order_id = body.order_id.clone().unwrap_or_else(generate_order_id);

    let (data, message) = match customer {
        Some(ref customer) => {
            // Existing customer: create a charge directly against it.
            if let Some(method) = body.method.as_deref() {
                validate::require_method(Some(method))?;
            }

            let request = CustomerChargeRequest {
                amount,
                currency,
                description,
                order_id,
                source_id: body.source_id.clone().or_else(|| body.card_id.clone()),
                method: body.method.clone(),
                device_session_id: body.device_session_id.clone(),
                confirm: body.confirm.unwrap_or(false),
                send_email: validate::coerce_bool(body.send_email.as_ref(), false),
                redirect_url: body.redirect_url.clone(),
            };

            let customer_id = customer
                .id
                .as_deref()
                .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("customer without id")))?;
            let charge = state
                .openpay
                .create_customer_charge(customer_id, &request)
                .await?;

            info!(charge_id = %charge.id, customer_id = %customer_id, "customer_charge_created");

            let payment_url = charge
                .payment_method
                .as_ref()
                .and_then(|m| m.url.clone());
            (
                json!({
                    "id": charge.id,
                    "amount": charge.amount,
                    "currency": charge.currency,
                    "description": charge.description,
                    "order_id": charge.order_id,
                    "status": charge.status,
                    "payment_url": payment_url,
                    "expiration_date": charge.expires_at,
                    "creation_date": charge.creation_date,
                    "type": "charge",
                }),
                "Charge created successfully",
            )
        }
        None => {
            // Anonymous request: create a hosted checkout link.
            let request = CheckoutRequest {
                amount,
                currency,
                description,
                order_id,
                redirect_url: body
                    .redirect_url
                    .clone()
                    .unwrap_or_else(|| state.config.default_redirect_url.clone()),
                expiration_date: body.expiration_date.clone(),
                send_email: validate::coerce_bool(body.send_email.as_ref(), true),
                customer: body.customer.clone(),
            };

            let checkout = state.openpay.create_checkout(&request).await?;

            info!(checkout_id = %checkout.id, "checkout_created");

            let payment_url = checkout.payment_url.clone().or_else(|| {
                checkout
                    .payment_method
                    .as_ref()
                    .and_then(|m| m.url.clone())
            });
            (
                json!({
                    "id": checkout.id,
                    "amount": checkout.amount,
                    "currency": checkout.currency,
                    "description": checkout.description,
                    "order_id": checkout.order_id,
                    "status": checkout.status,
                    "payment_url": payment_url,
                    "expiration_date": checkout.expiration_date,
                    "creation_date": checkout.creation_date,
                    "type": "checkout",
                }),
                "Checkout created successfully",
            )
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": message,
            "data": data,
            "customer": customer_summary(customer.as_ref()),
        })),
    ))
}

/// GET /api/checkouts/:checkout_id
pub async fn get_checkout(
    State(state): State<AppState>,
    Path(checkout_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let checkout = state.openpay.get_checkout(&checkout_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": checkout,
    })))
}

/// GET /api/checkouts
pub async fn list_checkouts(
    State(state): State<AppState>,
    Query(filters): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    validate::validate_list_query(&filters)?;

    let checkouts = state.openpay.list_checkouts(&filters).await?;

    Ok(Json(json!({
        "success": true,
        "count": checkouts.len(),
        "data": checkouts,
    })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateCheckoutBody {
    pub status: Option<String>,
    #[serde(default)]
    pub expiration_date: Option<String>,
}

/// PUT /api/checkouts/:checkout_id
pub async fn update_checkout(
    State(state): State<AppState>,
    Path(checkout_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let body: UpdateCheckoutBody =
        serde_json::from_value(body).map_err(|e| ApiError::validation(e.to_string()))?;

    let status = body
        .status
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("the status field is required"))?;

    let checkout = state
        .openpay
        .update_checkout(&checkout_id, &status, body.expiration_date.as_deref())
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Checkout updated successfully",
        "data": checkout,
    })))
}

fn customer_summary(customer: Option<&Customer>) -> Value {
    match customer {
        Some(c) => json!({
            "id": c.id,
            "email": c.email,
            "name": c.name,
            "last_name": c.last_name,
        }),
        None => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_accepts_string_send_email() {
        let body: CreateCheckoutBody = serde_json::from_value(json!({
            "amount": 100.0,
            "description": "Checkout de prueba",
            "send_email": "true"
        }))
        .unwrap();

        assert!(validate::coerce_bool(body.send_email.as_ref(), false));
    }

    #[test]
    fn test_card_id_alias_deserializes() {
        let body: CreateCheckoutBody = serde_json::from_value(json!({
            "amount": 100.0,
            "description": "x",
            "card_id": "card_123"
        }))
        .unwrap();

        assert_eq!(body.source_id.or(body.card_id).as_deref(), Some("card_123"));
    }
}
