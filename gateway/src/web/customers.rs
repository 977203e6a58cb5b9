//! Customer endpoints: creation, find-or-create and lookups.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::openpay::types::CustomerRequest;
use crate::web::{validate, AppState};

fn parse_customer(body: Value) -> Result<CustomerRequest, ApiError> {
    let request: CustomerRequest =
        serde_json::from_value(body).map_err(|e| ApiError::validation(e.to_string()))?;
    validate::validate_customer(&request)?;
    Ok(request)
}

/// POST /api/customers
pub async fn create_customer(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let request = parse_customer(body)?;
    let customer = state.openpay.create_customer(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Customer created successfully",
            "data": customer,
        })),
    ))
}

/// POST /api/customers/create-or-find
pub async fn create_or_find_customer(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let request = parse_customer(body)?;
    let (customer, existed) = state.openpay.create_or_find_customer(&request).await?;

    Ok(Json(json!({
        "success": true,
        "message": if existed { "Customer found" } else { "Customer created successfully" },
        "data": customer,
    })))
}

/// GET /api/customers/:customer_id
pub async fn get_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let customer = state.openpay.get_customer(&customer_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": customer,
    })))
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

/// GET /api/customers/search/email?email=
pub async fn find_customer_by_email(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let email = query
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::validation("the email parameter is required"))?;

    if !validate::is_valid_email(&email) {
        return Err(ApiError::validation("email is not a valid address"));
    }

    let customer = state.openpay.find_customer_by_email(&email).await?;

    Ok(Json(json!({
        "success": true,
        "found": customer.is_some(),
        "data": customer,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_customer_requires_fields() {
        assert!(parse_customer(json!({})).is_err());
        assert!(parse_customer(json!({"name": "Juan"})).is_err());
        assert!(parse_customer(json!({
            "name": "Juan",
            "last_name": "Pérez",
            "email": "no-es-email"
        }))
        .is_err());
    }

    #[test]
    fn test_parse_customer_accepts_valid_block() {
        let request = parse_customer(json!({
            "name": "Juan",
            "last_name": "Pérez",
            "email": "juan@ejemplo.com",
            "phone_number": "5551234567"
        }))
        .unwrap();

        assert_eq!(request.name, "Juan");
        assert_eq!(request.phone_number.as_deref(), Some("5551234567"));
    }
}
