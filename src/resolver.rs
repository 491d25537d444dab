//! Responsive (desktop/tablet/phone) and state (normal/hover) value resolution

use crate::types::{Device, State};
use serde_json::Value;

/// True when a value carries nothing worth emitting.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.iter().all(is_blank),
        Value::Object(map) => map.values().all(is_blank),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Text of a scalar value, or `None` for blanks and nested structures.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Scalar text of `value[key]`.
pub fn field_text(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(scalar_text)
}

pub fn is_responsive(value: &Value) -> bool {
    value.as_object().map_or(false, |map| {
        Device::ALL
            .iter()
            .any(|d| map.contains_key(d.key()) || d.alias().map_or(false, |a| map.contains_key(a)))
    })
}

pub fn is_stateful(value: &Value) -> bool {
    value
        .as_object()
        .map_or(false, |map| State::ALL.iter().any(|s| map.contains_key(s.key())))
}

/// The value stored directly under a device key, without fallback.
pub fn device_entry(values: &Value, device: Device) -> Option<&Value> {
    values
        .get(device.key())
        .or_else(|| device.alias().and_then(|alias| values.get(alias)))
}

/// Resolve a responsive scalar for `device`.
///
/// Non-responsive scalars are returned as-is. For responsive structures the
/// device's own value wins; otherwise the device's fallback chain is walked
/// (phone: phone, tablet, desktop). Nested objects never resolve. Returns an
/// empty string when nothing resolves.
pub fn resolve_responsive(values: &Value, device: Device) -> String {
    if !is_responsive(values) {
        return scalar_text(values).unwrap_or_default();
    }

    device
        .fallback_chain()
        .iter()
        .filter_map(|&candidate| device_entry(values, candidate))
        .find_map(scalar_text)
        .unwrap_or_default()
}

/// Resolve a normal/hover structure for `state`.
///
/// Non-state values are returned unchanged. A missing hover falls back to
/// normal; a missing normal resolves to nothing.
pub fn resolve_state(values: &Value, state: State) -> Option<&Value> {
    if !is_stateful(values) {
        return Some(values);
    }

    match values.get(state.key()) {
        Some(found) => Some(found),
        None if state == State::Hover => values.get(State::Normal.key()),
        None => None,
    }
}

/// Resolve a value that may be state-nested, responsive, or both.
pub fn resolve(values: &Value, state: State, device: Device) -> String {
    resolve_state(values, state)
        .map(|v| resolve_responsive(v, device))
        .unwrap_or_default()
}
