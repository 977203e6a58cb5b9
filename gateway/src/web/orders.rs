//! Order processing endpoint.
//!
//! Receives the denormalized order webhook, recovers the order object,
//! enriches product lines from the CMS catalog, groups them per supplier
//! and dispatches one fulfillment notice per supplier. Per-supplier email
//! failures are recorded in the response, never propagated.

use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::error::ApiError;
use crate::mail::{render_supplier_notice, Mailer};
use crate::orders::{
    enrich_lines, extract_customer, extract_summary, group_by_supplier, normalize_payload,
    parse_products, CustomerInfo, OrderSummary, SupplierGroup,
};
use crate::web::AppState;

/// Per-supplier dispatch outcome, echoed in the response.
#[derive(Debug, Serialize)]
pub struct NoticeOutcome {
    #[serde(rename = "proveedorId")]
    pub supplier_id: i64,
    #[serde(rename = "proveedorNombre")]
    pub supplier_name: String,
    #[serde(rename = "proveedorEmail", skip_serializing_if = "Option::is_none")]
    pub supplier_email: Option<String>,
    #[serde(rename = "usuarioAsociado", skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(rename = "exito")]
    pub sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// POST /api/orders/process
pub async fn process_order(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let payload =
        normalize_payload(body).ok_or_else(|| ApiError::validation("payload is required"))?;

    let lines = parse_products(payload.get("Productos"))?;
    let customer = extract_customer(&payload);
    let summary = extract_summary(&payload);

    info!(
        order_number = %summary.order_number,
        line_count = lines.len(),
        customer_email = %customer.email,
        "order_process_start"
    );

    // Probe the relay up front; a dead relay degrades to recorded failures.
    if !state.mailer.verify().await {
        warn!("smtp_unverified_continuing");
    }

    let enriched = enrich_lines(&state.directus, lines).await;
    let groups = group_by_supplier(&enriched);

    info!(
        enriched_count = enriched.len(),
        supplier_count = groups.len(),
        "order_suppliers_grouped"
    );

    let mut outcomes = Vec::with_capacity(groups.len());
    for group in &groups {
        outcomes.push(dispatch_notice(&state.mailer, group, &customer, &summary).await);
    }

    info!(
        order_number = %summary.order_number,
        notices_sent = outcomes.iter().filter(|o| o.sent).count(),
        notices_failed = outcomes.iter().filter(|o| !o.sent).count(),
        "order_process_complete"
    );

    Ok(Json(json!({
        "success": true,
        "message": "Order processed successfully",
        "data": {
            "cliente": customer,
            "productos": enriched,
            "correosEnviados": outcomes,
        },
    })))
}

/// Render and send one supplier's notice, reporting the outcome.
async fn dispatch_notice(
    mailer: &Mailer,
    group: &SupplierGroup,
    customer: &CustomerInfo,
    summary: &OrderSummary,
) -> NoticeOutcome {
    let supplier = &group.supplier;
    let supplier_name = supplier.display_name().to_string();
    let contact = supplier.user.as_ref().and_then(|u| u.display_name());

    let Some(email) = supplier.notice_email() else {
        warn!(supplier_id = supplier.id, "supplier_without_email");
        return NoticeOutcome {
            supplier_id: supplier.id,
            supplier_name,
            supplier_email: None,
            contact,
            sent: false,
            error: Some("Supplier has no email configured".to_string()),
        };
    };

    let subject = format!("Nuevo Pedido - {}", summary.order_number);
    let content = render_supplier_notice(group, customer, summary, Utc::now().date_naive());

    match mailer.send_notice(email, &subject, &content).await {
        Ok(()) => NoticeOutcome {
            supplier_id: supplier.id,
            supplier_name,
            supplier_email: Some(email.to_string()),
            contact,
            sent: true,
            error: None,
        },
        Err(e) => {
            error!(supplier_id = supplier.id, error = %e, "notice_send_failed");
            NoticeOutcome {
                supplier_id: supplier.id,
                supplier_name,
                supplier_email: Some(email.to_string()),
                contact,
                sent: false,
                error: Some(e.to_string()),
            }
        }
    }
}
