//! Tolerant decoding of a persisted cart snapshot.

use serde_json::{Map, Value};

use resiply_types::{CartLine, Product};

use super::state::CartSnapshot;

/// Rebuild a snapshot from whatever JSON was persisted.
///
/// Non-string ids are stringified, bad quantities become one, lines
/// without an id are dropped and non-array shapes read as empty.
/// Duplicate ids are folded into one line and the selection is
/// restricted to ids that survived.
pub fn sanitize(value: Value) -> CartSnapshot {
    let Value::Object(mut root) = value else {
        tracing::warn!("Persisted cart is not an object; starting empty");
        return CartSnapshot::default();
    };

    let mut snapshot = CartSnapshot::default();

    if let Some(Value::Array(items)) = root.remove("items") {
        for item in items {
            let Some(line) = sanitize_line(item) else {
                tracing::warn!("Skipping malformed persisted cart line");
                continue;
            };
            match snapshot.items.iter_mut().find(|l| l.id() == line.id()) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity)
                }
                None => snapshot.items.push(line),
            }
        }
    }

    if let Some(Value::Array(ids)) = root.remove("selectedIds") {
        for id in ids.iter().filter_map(id_string) {
            if snapshot.line(&id).is_some() && !snapshot.is_selected(&id) {
                snapshot.selected_ids.push(id);
            }
        }
    }

    snapshot
}

fn sanitize_line(value: Value) -> Option<CartLine> {
    let Value::Object(obj) = value else {
        return None;
    };

    let id = obj.get("id").and_then(id_string)?;
    let mut product = Product::new(id, string_field(&obj, "title").unwrap_or_default(), 0);
    product.price = obj.get("price").and_then(integer).unwrap_or(0);
    product.original_price = obj.get("originalPrice").and_then(integer);
    product.image_url = string_field(&obj, "imageUrl").unwrap_or_default();
    product.subtitle = string_field(&obj, "subtitle");
    product.is_cold = obj.get("isCold").and_then(Value::as_bool);

    Some(CartLine::new(product, quantity(obj.get("quantity"))))
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn quantity(value: Option<&Value>) -> u32 {
    value
        .and_then(integer)
        .filter(|q| *q >= 1)
        .and_then(|q| u32::try_from(q).ok())
        .unwrap_or(1)
}
