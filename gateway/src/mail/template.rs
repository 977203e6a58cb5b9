//! Supplier notice rendering: HTML body plus plain-text alternative.
//!
//! The copy is the merchant's Spanish end-user text; layout is a cart-style
//! summary (header, order info, product table, customer block, the
//! multi-supplier delivery notice, footer).

use chrono::{Datelike, NaiveDate};

use crate::directus::Supplier;
use crate::orders::{CustomerInfo, OrderLine, OrderSummary, SupplierGroup};

/// Rendered notice bodies.
#[derive(Debug, Clone)]
pub struct EmailContent {
    pub html: String,
    pub text: String,
}

const NOTICE_BANNER: &str = "Tu pedido incluye productos de distintos proveedores. \
Por esta razón, los tiempos de entrega y el tipo de embalaje pueden variar, ya que cada \
proveedor es responsable del armado y envío de sus productos. Recibirás información de \
envío por separado para cada proveedor.";

const SPANISH_MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Render the notice for one supplier group.
pub fn render_supplier_notice(
    group: &SupplierGroup,
    customer: &CustomerInfo,
    order: &OrderSummary,
    today: NaiveDate,
) -> EmailContent {
    let supplier = &group.supplier;
    let greeting_name = supplier
        .user
        .as_ref()
        .and_then(|u| u.display_name())
        .unwrap_or_else(|| "Usuario asociado".to_string());

    EmailContent {
        html: render_html(supplier, &group.lines, customer, order, &greeting_name, group.total(), today),
        text: render_text(&group.lines, customer, order, &greeting_name, group.total(), today),
    }
}

fn render_html(
    supplier: &Supplier,
    lines: &[OrderLine],
    customer: &CustomerInfo,
    order: &OrderSummary,
    greeting_name: &str,
    supplier_total: f64,
    today: NaiveDate,
) -> String {
    let mut rows = String::new();
    for line in lines {
        rows.push_str(&format!(
            r#"<tr style="border-bottom: 1px solid #e0e0e0;">
  <td style="padding: 15px;">
    <div style="font-weight: 600; color: #333; margin-bottom: 5px;">{name}</div>
    <div style="color: #666; font-size: 14px;">Proveedor: {supplier_name}</div>
  </td>
  <td style="padding: 15px; text-align: right; color: #333;">${unit_price:.2}</td>
  <td style="padding: 15px; text-align: center; color: #333;">{quantity}</td>
  <td style="padding: 15px; text-align: right; color: #333; font-weight: 600;">${line_total:.2}</td>
</tr>
"#,
            name = esc(&line.name),
            supplier_name = esc(supplier.display_name()),
            unit_price = line.unit_price,
            quantity = line.quantity,
            line_total = line.line_total(),
        ));
    }

    let references_row = if customer.references.is_empty() {
        String::new()
    } else {
        format!(
            r#"<div><strong>Referencias:</strong> {}</div>"#,
            esc(&customer.references)
        )
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Nuevo Pedido - {order_number}</title>
</head>
<body style="margin: 0; padding: 0; background-color: #f5f5f5; font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;">
  <div style="max-width: 800px; margin: 0 auto; background-color: #ffffff;">
    <div style="background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); padding: 30px; text-align: center;">
      <h1 style="color: white; margin: 0; font-size: 28px;">Nuevo Pedido Recibido</h1>
      <p style="color: rgba(255,255,255,0.9); margin: 10px 0 0 0;">Estimado/a {greeting}</p>
    </div>
    <div style="padding: 20px 30px;">
      <div style="background-color: #f8f9fa; padding: 20px; border-radius: 12px;">
        <h2 style="color: #333; margin: 0 0 15px 0; font-size: 20px;">Información del Pedido</h2>
        <div><strong>Número de Orden:</strong> {order_number}</div>
        <div><strong>Estatus:</strong> {status}</div>
        <div><strong>Subtotal:</strong> ${subtotal}</div>
        <div><strong>IVA:</strong> ${tax}</div>
        <div style="font-size: 18px; font-weight: 600; border-top: 1px solid #ddd; padding-top: 15px; margin-top: 10px;"><strong>Total:</strong> ${total}</div>
      </div>
    </div>
    <div style="padding: 0 30px 20px 30px;">
      <h2 style="color: #333; margin: 0 0 20px 0; font-size: 20px;">Productos de su Proveedor</h2>
      <table style="width: 100%; border-collapse: collapse;">
        <thead>
          <tr style="background-color: #f8f9fa;">
            <th style="padding: 15px; text-align: left; border-bottom: 2px solid #e0e0e0;">Producto</th>
            <th style="padding: 15px; text-align: right; border-bottom: 2px solid #e0e0e0;">Precio</th>
            <th style="padding: 15px; text-align: center; border-bottom: 2px solid #e0e0e0;">Cantidad</th>
            <th style="padding: 15px; text-align: right; border-bottom: 2px solid #e0e0e0;">Total</th>
          </tr>
        </thead>
        <tbody>
{rows}        </tbody>
        <tfoot>
          <tr style="background-color: #f8f9fa; border-top: 2px solid #e0e0e0;">
            <td colspan="3" style="padding: 20px 15px; text-align: right; font-weight: 600;">Total Proveedor:</td>
            <td style="padding: 20px 15px; text-align: right; font-weight: 600; font-size: 18px;">${supplier_total:.2}</td>
          </tr>
        </tfoot>
      </table>
    </div>
    <div style="padding: 0 30px 20px 30px;">
      <h2 style="color: #333; margin: 0 0 20px 0; font-size: 20px;">Información del Cliente</h2>
      <div style="background-color: #f8f9fa; padding: 20px; border-radius: 12px;">
        <div><strong>Nombre:</strong> {customer_name} {customer_last_name}</div>
        <div><strong>Email:</strong> {customer_email}</div>
        <div><strong>Teléfono:</strong> {customer_phone}</div>
        <div><strong>Ciudad:</strong> {customer_city}, {customer_state}</div>
        <div><strong>Dirección:</strong> {customer_address}</div>
        <div><strong>Código Postal:</strong> {customer_postal_code}</div>
        {references_row}
      </div>
    </div>
    <div style="padding: 0 30px 30px 30px;">
      <div style="background-color: #fff3cd; border: 1px solid #ffeaa7; border-radius: 12px; padding: 20px; color: #856404;">
        <strong>Información importante:</strong> {notice}
      </div>
    </div>
    <div style="background-color: #f8f9fa; padding: 20px 30px; text-align: center; border-top: 1px solid #e0e0e0;">
      <p style="color: #666; margin: 0; font-size: 14px;">Este correo fue generado automáticamente por el sistema de pedidos.</p>
      <p style="color: #999; margin: 10px 0 0 0; font-size: 12px;">{date}</p>
    </div>
  </div>
</body>
</html>
"#,
        order_number = esc(&order.order_number),
        greeting = esc(greeting_name),
        status = esc(&order.status),
        subtotal = esc(&order.subtotal),
        tax = esc(&order.tax),
        total = esc(&order.total),
        rows = rows,
        supplier_total = supplier_total,
        customer_name = esc(&customer.name),
        customer_last_name = esc(&customer.last_name),
        customer_email = esc(&customer.email),
        customer_phone = esc(&customer.phone),
        customer_city = esc(&customer.city),
        customer_state = esc(&customer.state),
        customer_address = esc(&customer.address),
        customer_postal_code = esc(&customer.postal_code),
        references_row = references_row,
        notice = NOTICE_BANNER,
        date = spanish_date(today),
    )
}

fn render_text(
    lines: &[OrderLine],
    customer: &CustomerInfo,
    order: &OrderSummary,
    greeting_name: &str,
    supplier_total: f64,
    today: NaiveDate,
) -> String {
    let mut product_lines = String::new();
    for line in lines {
        product_lines.push_str(&format!(
            "- {} (Cantidad: {}, Precio: ${:.2}, Total: ${:.2})\n",
            line.name,
            line.quantity,
            line.unit_price,
            line.line_total()
        ));
    }

    let references = if customer.references.is_empty() {
        String::new()
    } else {
        format!("- Referencias: {}\n", customer.references)
    };

    format!(
        "Nuevo Pedido Recibido\n\
\n\
Estimado/a {greeting},\n\
\n\
Información del Pedido:\n\
- Número de Orden: {order_number}\n\
- Total: ${total}\n\
- Subtotal: ${subtotal}\n\
- IVA: ${tax}\n\
- Estatus: {status}\n\
\n\
Productos de su Proveedor:\n\
{product_lines}\
\n\
Total Proveedor: ${supplier_total:.2}\n\
\n\
Información del Cliente:\n\
- Nombre: {name} {last_name}\n\
- Email: {email}\n\
- Teléfono: {phone}\n\
- Dirección: {address}\n\
- Ciudad: {city}, {state}\n\
- Código Postal: {postal_code}\n\
{references}\
\n\
Información importante: {notice}\n\
\n\
Este correo fue generado automáticamente por el sistema de pedidos.\n\
{date}\n",
        greeting = greeting_name,
        order_number = order.order_number,
        total = order.total,
        subtotal = order.subtotal,
        tax = order.tax,
        status = order.status,
        product_lines = product_lines,
        supplier_total = supplier_total,
        name = customer.name,
        last_name = customer.last_name,
        email = customer.email,
        phone = customer.phone,
        address = customer.address,
        city = customer.city,
        state = customer.state,
        postal_code = customer.postal_code,
        references = references,
        notice = NOTICE_BANNER,
        date = spanish_date(today),
    )
}

/// "6 de agosto de 2026"
fn spanish_date(date: NaiveDate) -> String {
    let month = SPANISH_MONTHS[date.month0() as usize];
    format!("{} de {} de {}", date.day(), month, date.year())
}

/// Minimal HTML escaping for interpolated user text.
fn esc(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
