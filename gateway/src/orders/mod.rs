//! Order-processing pipeline: product parsing, customer extraction,
//! catalog enrichment and supplier grouping.
//!
//! The pipeline is deliberately degradation-friendly: a failed catalog
//! lookup produces a supplier-less line (logged), never an aborted order.

pub mod normalize;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::directus::{DirectusClient, Supplier};
use crate::error::ApiError;

pub use normalize::normalize_payload;

/// One product line as carried in the order payload's `Productos` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "cantidad")]
    pub quantity: u32,
    #[serde(rename = "precioUnitario")]
    pub unit_price: f64,
    #[serde(rename = "total", default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
}

impl OrderLine {
    /// Line total; payloads that omit it get quantity x unit price.
    pub fn line_total(&self) -> f64 {
        self.total.unwrap_or(self.unit_price * self.quantity as f64)
    }
}

/// A line after catalog enrichment. Catalog fields ride along untyped so
/// the response can echo the full product record.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedLine {
    #[serde(flatten)]
    pub line: OrderLine,
    #[serde(flatten)]
    pub catalog: serde_json::Map<String, Value>,
    #[serde(rename = "proveedor")]
    pub supplier: Option<Supplier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Customer block extracted from the order payload.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerInfo {
    #[serde(rename = "usuario")]
    pub user: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "apellidos")]
    pub last_name: String,
    pub email: String,
    #[serde(rename = "telefono")]
    pub phone: String,
    #[serde(rename = "direccion")]
    pub address: String,
    #[serde(rename = "ciudad")]
    pub city: String,
    #[serde(rename = "estado")]
    pub state: String,
    #[serde(rename = "codigoPostal")]
    pub postal_code: String,
    #[serde(rename = "referencias")]
    pub references: String,
}

/// Order header fields used in notices; kept as display text because the
/// upstream sends totals both as numbers and as strings.
#[derive(Debug, Clone)]
pub struct OrderSummary {
    pub order_number: String,
    pub status: String,
    pub subtotal: String,
    pub tax: String,
    pub total: String,
}

/// Parse the `Productos` field into order lines.
///
/// Accepts a JSON-encoded array string, a bare `{..},{..}` fragment
/// (wrapped into an array), or an actual array value.
pub fn parse_products(value: Option<&Value>) -> Result<Vec<OrderLine>, ApiError> {
    let value = value.ok_or_else(|| ApiError::validation("Productos not found in payload"))?;

    match value {
        Value::Array(_) => serde_json::from_value(value.clone())
            .map_err(|e| ApiError::validation(format!("invalid product list: {e}"))),
        Value::String(raw) => {
            if let Ok(lines) = serde_json::from_str::<Vec<OrderLine>>(raw) {
                return Ok(lines);
            }
            // Fragment without the enclosing brackets.
            serde_json::from_str(&format!("[{raw}]"))
                .map_err(|e| ApiError::validation(format!("invalid product list: {e}")))
        }
        _ => Err(ApiError::validation("Productos must be a list")),
    }
}

/// Extract the customer block from a normalized payload.
pub fn extract_customer(payload: &Value) -> CustomerInfo {
    CustomerInfo {
        user: field_text(payload, "Usuario"),
        name: field_text(payload, "Nombre"),
        last_name: field_text(payload, "Apellidos"),
        email: field_text(payload, "Email"),
        phone: field_text(payload, "Telefono"),
        address: field_text(payload, "Direccion"),
        city: field_text(payload, "Ciudad"),
        state: field_text(payload, "Estado"),
        postal_code: field_text(payload, "Codigo_Postal"),
        references: field_text(payload, "Referencias"),
    }
}

/// Extract the order header from a normalized payload.
pub fn extract_summary(payload: &Value) -> OrderSummary {
    OrderSummary {
        order_number: field_text(payload, "NoOrden"),
        status: field_text(payload, "Estatus"),
        subtotal: field_text(payload, "Subtotal"),
        tax: field_text(payload, "IVA"),
        total: field_text(payload, "Total"),
    }
}

/// Render a payload field as display text; numbers pass through, missing
/// fields become empty strings.
fn field_text(payload: &Value, key: &str) -> String {
    match payload.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Enrich order lines with their catalog records, concurrently.
///
/// Lookups that fail degrade to supplier-less lines carrying the original
/// error note for the response.
pub async fn enrich_lines(directus: &DirectusClient, lines: Vec<OrderLine>) -> Vec<EnrichedLine> {
    let lookups: Vec<_> = lines
        .iter()
        .map(|line| directus.fetch_product(line.id))
        .collect();
    let results = futures::future::join_all(lookups).await;

    lines
        .into_iter()
        .zip(results)
        .map(|(line, result)| match result {
            Ok(product) => {
                let mut catalog = product.extra;
                // The catalog record repeats the line's own fields; the
                // line's values win in the flattened response.
                for key in ["id", "nombre", "cantidad", "precioUnitario", "total"] {
                    catalog.remove(key);
                }
                EnrichedLine {
                    line,
                    catalog,
                    supplier: product.supplier,
                    error: None,
                }
            }
            Err(e) => {
                warn!(product_id = line.id, error = %e, "catalog_lookup_failed");
                EnrichedLine {
                    line,
                    catalog: serde_json::Map::new(),
                    supplier: None,
                    error: Some("No se pudo obtener información del proveedor".to_string()),
                }
            }
        })
        .collect()
}

/// Order lines batched per supplier.
#[derive(Debug, Clone)]
pub struct SupplierGroup {
    pub supplier: Supplier,
    pub lines: Vec<OrderLine>,
}

impl SupplierGroup {
    /// Subtotal across this supplier's lines.
    pub fn total(&self) -> f64 {
        self.lines.iter().map(OrderLine::line_total).sum()
    }
}

/// Group enriched lines by supplier id. Lines without a supplier are
/// excluded; ordering is stable (ascending supplier id).
pub fn group_by_supplier(enriched: &[EnrichedLine]) -> Vec<SupplierGroup> {
    let mut groups: BTreeMap<i64, SupplierGroup> = BTreeMap::new();

    for item in enriched {
        if let Some(supplier) = &item.supplier {
            groups
                .entry(supplier.id)
                .or_insert_with(|| SupplierGroup {
                    supplier: supplier.clone(),
                    lines: Vec::new(),
                })
                .lines
                .push(item.line.clone());
        }
    }

    groups.into_values().collect()
}
