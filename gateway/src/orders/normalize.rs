//! Order payload normalization.
//!
//! Order webhooks arrive in several degenerate shapes depending on how the
//! upstream serialized the body. Some senders collapse the whole order into
//! a single object *key*, truncated at the `Productos` field, with the
//! product list riding as the key of a nested map. Strategies are tried in
//! order until one yields an order object:
//!
//! 1. object already carrying order fields -> as-is
//! 2. event envelope (`{event, payload, ...}`) -> unwrap `payload`
//! 3. a key that parses as a JSON object -> that object
//! 4. truncated-key shape -> rebuild the object and re-attach `Productos`
//! 5. an object-valued entry carrying order fields -> that value
//! 6. body is a JSON string -> parse and retry

use serde_json::{Map, Value};

/// Normalize an inbound order payload into a plain order object.
///
/// Returns `None` when the body is unrecoverable (null, array, number).
/// An object that matches no strategy is returned unchanged so that field
/// validation downstream produces the precise error.
pub fn normalize_payload(body: Value) -> Option<Value> {
    match body {
        Value::Object(map) => Some(normalize_object(map)),
        Value::String(raw) => serde_json::from_str::<Value>(&raw)
            .ok()
            .and_then(normalize_payload),
        _ => None,
    }
}

fn normalize_object(map: Map<String, Value>) -> Value {
    if looks_like_order(&map) {
        return Value::Object(map);
    }

    // Event envelope from the CMS: the order rides under "payload".
    if let Some(Value::Object(inner)) = map.get("payload") {
        return Value::Object(inner.clone());
    }

    // A key may itself be a complete JSON object.
    for key in map.keys() {
        if let Ok(parsed @ Value::Object(_)) = serde_json::from_str::<Value>(key) {
            return parsed;
        }
    }

    // Truncated-key shape: rebuild the order and re-attach the fragment.
    for (key, value) in &map {
        if let Some(rebuilt) = rebuild_truncated(key, value) {
            return rebuilt;
        }
    }

    // An entry's value may be the order object.
    for value in map.values() {
        if let Value::Object(inner) = value {
            if looks_like_order(inner) {
                return value.clone();
            }
        }
    }

    Value::Object(map)
}

/// Heuristic for "this object is the order itself".
fn looks_like_order(map: &Map<String, Value>) -> bool {
    map.contains_key("id") || map.contains_key("NoOrden")
}

/// Rebuild an order from the truncated-key shape.
///
/// The key is a JSON prefix cut at `"Productos": "`; the product-list
/// fragment is either the value itself (string) or the single key of the
/// nested map. The prefix is closed into a valid object and the fragment is
/// re-attached as the `Productos` string.
fn rebuild_truncated(key: &str, value: &Value) -> Option<Value> {
    let key = key.trim_start();
    if !key.starts_with('{') {
        return None;
    }

    let cut = key.rfind("\"Productos\"")?;
    let head = key[..cut].trim_end().trim_end_matches(',').trim_end();

    let mut order: Map<String, Value> = serde_json::from_str(&format!("{head}}}")).ok()?;

    let fragment = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Object(inner) => inner.keys().next()?.trim().to_string(),
        _ => return None,
    };

    order.insert("Productos".to_string(), Value::String(fragment));
    Some(Value::Object(order))
}
