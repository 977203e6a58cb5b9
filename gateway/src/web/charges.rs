//! Charge endpoints: creation with hosted payment links, lookups, listing
//! and the static payment-method catalog.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::openpay::types::{
    Charge, ChargeRequest, Customer, CustomerRef, CustomerRequest, ListQuery,
};
use crate::web::{generate_order_id, validate, AppState};

/// Charge creation payload.
///
/// Required fields are `Option` so validation can answer with the precise
/// missing-field message instead of a deserializer error.
#[derive(Debug, Deserialize)]
pub struct CreateChargeBody {
    pub method: Option<String>,
    pub amount: Option<f64>,
    pub description: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub redirect_url: Option<String>,
    #[serde(default)]
    pub customer: Option<CustomerRequest>,
    #[serde(default)]
    pub send_email: Option<bool>,
    #[serde(default)]
    pub use_3d_secure: Option<bool>,
}

/// POST /api/charges
pub async fn create_charge(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let (charge, payment_link, customer) = charge_pipeline(&state, body).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Charge created successfully",
            "data": {
                "charge_id": charge.id,
                "amount": charge.amount,
                "currency": charge.currency,
                "description": charge.description,
                "status": charge.status,
                "order_id": charge.order_id,
                "creation_date": charge.creation_date,
                "payment_link": payment_link,
            },
            "customer": customer_summary(customer.as_ref()),
        })),
    ))
}

/// POST /api/charges/payment-link
///
/// Same pipeline as charge creation; the response additionally carries the
/// link's expiration.
pub async fn create_payment_link(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let (charge, payment_link, customer) = charge_pipeline(&state, body).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Payment link created successfully",
            "data": {
                "charge_id": charge.id,
                "amount": charge.amount,
                "currency": charge.currency,
                "description": charge.description,
                "status": charge.status,
                "order_id": charge.order_id,
                "creation_date": charge.creation_date,
                "payment_link": payment_link,
                "expires_at": charge.expires_at,
            },
            "customer": customer_summary(customer.as_ref()),
        })),
    ))
}

/// Shared creation pipeline: validate, resolve the customer, create the
/// unconfirmed charge, resolve its payment link and forward the result to
/// the CMS (best effort).
async fn charge_pipeline(
    state: &AppState,
    body: Value,
) -> Result<(Charge, String, Option<Customer>), ApiError> {
    let body: CreateChargeBody =
        serde_json::from_value(body).map_err(|e| ApiError::validation(e.to_string()))?;

    let method = validate::require_method(body.method.as_deref())?;
    let amount = validate::require_amount(body.amount)?;
    let description = validate::require_description(body.description.as_deref())?;
    let currency =
        validate::currency_or_default(body.currency.as_deref(), validate::CHARGE_CURRENCIES)?;

    let customer = match &body.customer {
        Some(request) => {
            validate::validate_customer(request)?;
            match state.openpay.create_or_find_customer(request).await {
                Ok((customer, existed)) => {
                    info!(
                        customer_id = customer.id.as_deref().unwrap_or(""),
                        existed = existed,
                        "charge_customer_resolved"
                    );
                    Some(customer)
                }
                Err(e) => {
                    return Err(ApiError::validation(format!(
                        "Failed to process customer: {e}"
                    )));
                }
            }
        }
        None => None,
    };

    let request = ChargeRequest {
        method,
        amount,
        description,
        currency,
        order_id: body.order_id.unwrap_or_else(generate_order_id),
        redirect_url: body
            .redirect_url
            .unwrap_or_else(|| state.config.default_redirect_url.clone()),
        send_email: body.send_email.unwrap_or(false),
        // Never confirm automatically: an unconfirmed charge is what carries
        // the hosted payment link.
        confirm: false,
        use_3d_secure: body.use_3d_secure.unwrap_or(true),
        customer: customer
            .as_ref()
            .and_then(|c| c.id.clone())
            .map(|id| CustomerRef { id }),
    };

    let charge = state.openpay.create_charge(&request).await?;
    let payment_link = state.openpay.payment_link(&charge.id).await?;

    info!(charge_id = %charge.id, status = %charge.status, "charge_created");

    let forwarded = json!({"charge": charge, "payment_link": payment_link});
    if let Err(e) = state.directus.forward_charge(&forwarded).await {
        warn!(charge_id = %charge.id, error = %e, "charge_forward_failed");
    }

    Ok((charge, payment_link, customer))
}

/// GET /api/charges/:charge_id
pub async fn get_charge(
    State(state): State<AppState>,
    Path(charge_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let charge = state.openpay.get_charge(&charge_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": charge,
    })))
}

/// GET /api/charges
pub async fn list_charges(
    State(state): State<AppState>,
    Query(filters): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    validate::validate_list_query(&filters)?;

    let charges = state.openpay.list_charges(&filters).await?;

    Ok(Json(json!({
        "success": true,
        "count": charges.len(),
        "data": charges,
    })))
}

/// GET /api/charges/methods/payment
pub async fn payment_methods() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "data": {
            "card": {
                "name": "Tarjeta de crédito/débito",
                "description": "Pago con tarjeta Visa, Mastercard, American Express",
                "supported": true,
            },
            "bank_account": {
                "name": "Transferencia bancaria",
                "description": "Pago mediante transferencia bancaria",
                "supported": true,
            },
            "store": {
                "name": "Pago en tienda",
                "description": "Pago en tiendas de conveniencia",
                "supported": true,
            },
        },
    }))
}

/// Customer summary block attached to creation responses.
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
    fn test_body_deserializes_with_missing_fields() {
        let body: CreateChargeBody = serde_json::from_value(json!({})).unwrap();
        assert!(body.method.is_none());
        assert!(body.amount.is_none());
    }

    #[test]
    fn test_customer_summary_null_without_customer() {
        assert_eq!(customer_summary(None), Value::Null);
    }

    #[test]
    fn test_customer_summary_fields() {
        let customer = Customer {
            id: Some("cus_1".to_string()),
            name: "Juan".to_string(),
            last_name: "Pérez".to_string(),
            email: "juan@ejemplo.com".to_string(),
            phone_number: None,
            address: None,
            creation_date: None,
        };

        let summary = customer_summary(Some(&customer));
        assert_eq!(summary["id"], "cus_1");
        assert_eq!(summary["email"], "juan@ejemplo.com");
    }
}
