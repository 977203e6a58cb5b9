//! Boundary validation for request payloads.
//!
//! Every rule mirrors the contract the service has always enforced at the
//! edge: allowed enums, length bounds, positive amounts, email shape and the
//! webhook event subset. Failures become 400 responses.

use serde_json::Value;

use crate::error::ApiError;
use crate::events::is_known_event_type;
use crate::openpay::types::{CustomerRequest, ListQuery};

pub const ALLOWED_METHODS: &[&str] = &["card", "bank_account", "store"];
pub const CHARGE_CURRENCIES: &[&str] = &["MXN", "USD"];
pub const CHECKOUT_CURRENCIES: &[&str] = &["MXN", "USD", "COP", "PEN"];
pub const LIST_STATUSES: &[&str] = &["in_progress", "completed", "failed", "cancelled", "refunded"];

const MAX_DESCRIPTION_LEN: usize = 250;
const MAX_NAME_LEN: usize = 50;

pub fn require_amount(amount: Option<f64>) -> Result<f64, ApiError> {
    match amount {
        Some(a) if a.is_finite() && a > 0.0 => Ok(a),
        Some(_) => Err(ApiError::validation("amount must be a positive number")),
        None => Err(ApiError::validation("amount is required")),
    }
}

pub fn require_description(description: Option<&str>) -> Result<String, ApiError> {
    match description {
        Some(d) if !d.is_empty() && d.chars().count() <= MAX_DESCRIPTION_LEN => Ok(d.to_string()),
        Some(_) => Err(ApiError::validation(format!(
            "description must be between 1 and {MAX_DESCRIPTION_LEN} characters"
        ))),
        None => Err(ApiError::validation("description is required")),
    }
}

pub fn require_method(method: Option<&str>) -> Result<String, ApiError> {
    match method {
        Some(m) if ALLOWED_METHODS.contains(&m) => Ok(m.to_string()),
        Some(m) => Err(ApiError::validation(format!(
            "method must be one of card, bank_account, store (got {m})"
        ))),
        None => Err(ApiError::validation("method is required")),
    }
}

/// Resolve the currency against an allowed set, defaulting to MXN.
pub fn currency_or_default(
    currency: Option<&str>,
    allowed: &[&str],
) -> Result<String, ApiError> {
    match currency {
        None => Ok("MXN".to_string()),
        Some(c) if allowed.contains(&c) => Ok(c.to_string()),
        Some(c) => Err(ApiError::validation(format!(
            "currency {c} is not supported"
        ))),
    }
}

/// Structural email check: non-empty local part, a domain with a dot.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || email.contains(char::is_whitespace) {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !tld.is_empty()
}

pub fn validate_customer(customer: &CustomerRequest) -> Result<(), ApiError> {
    if customer.name.is_empty() || customer.name.chars().count() > MAX_NAME_LEN {
        return Err(ApiError::validation(format!(
            "customer name must be between 1 and {MAX_NAME_LEN} characters"
        )));
    }
    if customer.last_name.is_empty() || customer.last_name.chars().count() > MAX_NAME_LEN {
        return Err(ApiError::validation(format!(
            "customer last_name must be between 1 and {MAX_NAME_LEN} characters"
        )));
    }
    if !is_valid_email(&customer.email) {
        return Err(ApiError::validation("customer email is not valid"));
    }
    Ok(())
}

pub fn validate_url(value: &str) -> Result<(), ApiError> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|_| ApiError::validation(format!("{value} is not a valid URL")))
}

/// Webhook subscriptions must name at least one known event type.
pub fn validate_events(events: &[String]) -> Result<(), ApiError> {
    if events.is_empty() {
        return Err(ApiError::validation("events must contain at least one event type"));
    }
    for event in events {
        if !is_known_event_type(event) {
            return Err(ApiError::validation(format!("unknown event type: {event}")));
        }
    }
    Ok(())
}

pub fn validate_list_query(query: &ListQuery) -> Result<(), ApiError> {
    if let Some(limit) = query.limit {
        if !(1..=100).contains(&limit) {
            return Err(ApiError::validation("limit must be between 1 and 100"));
        }
    }
    if let Some(status) = query.status.as_deref() {
        if !LIST_STATUSES.contains(&status) {
            return Err(ApiError::validation(format!("invalid status filter: {status}")));
        }
    }
    if let Some(email) = query.email.as_deref() {
        if !is_valid_email(email) {
            return Err(ApiError::validation("email filter is not a valid address"));
        }
    }
    Ok(())
}

/// Loose boolean coercion: accepts `true`/`false` and their string forms.
pub fn coerce_bool(value: Option<&Value>, default: bool) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s == "true",
        _ => default,
    }
}
