//! Cache Key Module
//!
//! Derives order-stable cache keys from a method name and its params.

use serde_json::Value;

// == Cache Key ==
/// Builds the cache key for a call: `method(p1,p2,...)`.
///
/// Each param is written as canonical JSON with object keys sorted at every
/// depth, so structurally equal params always produce the same key.
pub fn cache_key(method: &str, params: &[Value]) -> String {
    let mut key = String::with_capacity(method.len() + 2);
    key.push_str(method);
    key.push('(');
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            key.push(',');
        }
        write_stable(&mut key, param);
    }
    key.push(')');
    key
}

/// Appends the canonical serialization of `value` to `out`.
fn write_stable(out: &mut String, value: &Value) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_stable(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (name, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_scalar(out, &Value::String(name.clone()));
                out.push(':');
                write_stable(out, item);
            }
            out.push('}');
        }
        scalar => write_scalar(out, scalar),
    }
}

/// Scalars already have a single JSON rendering.
fn write_scalar(out: &mut String, value: &Value) {
    out.push_str(&value.to_string());
}
