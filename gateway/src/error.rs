//! Service error type and HTTP status classification.
//!
//! Every handler returns `Result<_, ApiError>`. The `IntoResponse` impl is
//! the single place where errors become JSON envelopes:
//! validation -> 400, vendor errors -> the vendor's http_code,
//! connect failures -> 503, timeouts -> 504, the rest -> 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Boundary validation failure (missing/invalid request fields).
    #[error("{message}")]
    Validation {
        message: String,
        details: Option<Value>,
    },

    /// An error envelope returned by the Openpay API.
    #[error("{description}")]
    Openpay {
        http_code: u16,
        error_code: i64,
        category: String,
        description: String,
        request_id: Option<String>,
    },

    /// The upstream answered with a non-JSON or unrecognized error body.
    #[error("upstream returned status {status}")]
    Upstream { status: u16, body: String },

    /// Request body was not valid JSON for the expected shape.
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Could not reach an external service.
    #[error("could not connect to external service: {0}")]
    Connect(String),

    /// An external call exceeded the configured timeout.
    #[error("external service timed out: {0}")]
    Timeout(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            details: None,
        }
    }

    pub fn validation_with_details(message: impl Into<String>, details: Value) -> Self {
        ApiError::Validation {
            message: message.into(),
            details: Some(details),
        }
    }

    /// Classify a reqwest failure the way the original global handler
    /// classifies ETIMEDOUT / ECONNREFUSED.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(err.to_string())
        } else if err.is_connect() {
            ApiError::Connect(err.to_string())
        } else {
            ApiError::Internal(err.into())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation { message, details } => {
                let mut body = json!({
                    "error": "Validation error",
                    "message": message,
                });
                if let Some(details) = details {
                    body["details"] = details;
                }
                (StatusCode::BAD_REQUEST, body)
            }
            ApiError::Openpay {
                http_code,
                error_code,
                category,
                description,
                request_id,
            } => {
                let status = StatusCode::from_u16(http_code).unwrap_or(StatusCode::BAD_REQUEST);
                (
                    status,
                    json!({
                        "error": "Openpay error",
                        "message": description,
                        "code": error_code,
                        "category": category,
                        "request_id": request_id,
                    }),
                )
            }
            ApiError::Upstream { status, body } => {
                error!(status = status, body_preview = %truncate(&body, 200), "upstream_error_unrecognized");
                (
                    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                    json!({
                        "error": "Upstream error",
                        "message": "External service returned an unexpected response",
                    }),
                )
            }
            ApiError::Json(err) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "JSON syntax error",
                    "message": err.to_string(),
                }),
            ),
            ApiError::Connect(message) => {
                error!(error = %message, "external_connect_failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({
                        "error": "Connection error",
                        "message": "Could not connect to the external service",
                    }),
                )
            }
            ApiError::Timeout(message) => {
                error!(error = %message, "external_timeout");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    json!({
                        "error": "Timeout",
                        "message": "The operation took too long to complete",
                    }),
                )
            }
            ApiError::Internal(err) => {
                error!(error = %err, "internal_error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "Internal server error",
                        "message": "An internal error has occurred",
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

fn truncate(s: &str, max: usize) -> &str {
    let end = s
        .char_indices()
        .nth(max)
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_validation_maps_to_400() {
        assert_eq!(
            status_of(ApiError::validation("amount is required")),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_openpay_uses_vendor_http_code() {
        let err = ApiError::Openpay {
            http_code: 402,
            error_code: 3001,
            category: "request".to_string(),
            description: "The card was declined".to_string(),
            request_id: Some("req-1".to_string()),
        };
        assert_eq!(status_of(err), StatusCode::PAYMENT_REQUIRED);
    }

    #[test]
    fn test_openpay_invalid_http_code_falls_back_to_400() {
        let err = ApiError::Openpay {
            http_code: 0,
            error_code: 1000,
            category: "internal".to_string(),
            description: "boom".to_string(),
            request_id: None,
        };
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_connect_maps_to_503_and_timeout_to_504() {
        assert_eq!(
            status_of(ApiError::Connect("refused".to_string())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(ApiError::Timeout("deadline".to_string())),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn test_json_maps_to_400() {
        let err: serde_json::Error = serde_json::from_str::<Value>("not json").unwrap_err();
        assert_eq!(status_of(ApiError::Json(err)), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("abc", 10), "abc");
    }
}
