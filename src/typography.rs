//! Per-element typography merged over element defaults

use crate::resolver::{is_blank, is_responsive, is_stateful, resolve_responsive, scalar_text};
use crate::schema::merge_values;
use crate::stylesheet::{Bucket, Declaration, DeclarationBuckets, StyleSheet};
use crate::types::{AttributeTree, Device, State, ATTR_DESIGN};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Typography settings a module exposes for one of its elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypographyField {
    pub key: String,
    pub label: String,
    pub selector: String,
    #[serde(default)]
    pub defaults: Value,
}

impl TypographyField {
    pub fn new(key: &str, label: &str, selector: &str, defaults: Value) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            selector: selector.to_string(),
            defaults,
        }
    }

    /// Attribute key the editor saves overrides under: `<key>_typography`.
    pub fn attr_key(&self) -> String {
        format!("{}_typography", self.key)
    }
}

/// Supported typography keys and the CSS property each writes.
const PROPERTIES: [(&str, &str); 10] = [
    ("font_family", "font-family"),
    ("font_size", "font-size"),
    ("font_weight", "font-weight"),
    ("font_style", "font-style"),
    ("line_height", "line-height"),
    ("letter_spacing", "letter-spacing"),
    ("text_transform", "text-transform"),
    ("text_decoration", "text-decoration"),
    ("text_align", "text-align"),
    ("color", "color"),
];

/// Saved overrides, from the design section or flattened into the tree.
fn overrides<'a>(attrs: &'a AttributeTree, attr_key: &str) -> Option<&'a Value> {
    attrs
        .get(ATTR_DESIGN)
        .and_then(|design| design.get(attr_key))
        .or_else(|| attrs.get(attr_key))
        .filter(|v| v.is_object())
}

/// Push one possibly state- and device-nested value into buckets.
///
/// Tablet and phone only receive a declaration when their resolved value
/// differs from what cascades down from the next wider device.
pub fn push_layered(buckets: &mut DeclarationBuckets, property: &str, value: &Value) {
    let (normal, hover) = if is_stateful(value) {
        (
            value.get(State::Normal.key()),
            value.get(State::Hover.key()).filter(|h| !is_blank(h)),
        )
    } else {
        (Some(value), None)
    };

    if let Some(normal) = normal {
        if is_responsive(normal) {
            for device in Device::ALL {
                let resolved = resolve_responsive(normal, device);
                let inherited = device.wider().map(|w| resolve_responsive(normal, w));
                if !resolved.is_empty() && inherited.as_deref() != Some(resolved.as_str()) {
                    buckets.push(Bucket::for_device(device), Declaration::new(property, resolved));
                }
            }
        } else if let Some(text) = scalar_text(normal) {
            buckets.push(Bucket::Desktop, Declaration::new(property, text));
        }
    }

    if let Some(hover) = hover {
        let text = resolve_responsive(hover, Device::Desktop);
        if !text.is_empty() {
            buckets.push(Bucket::Hover, Declaration::new(property, text));
        }
    }
}

/// Declarations for one merged typography value.
pub fn typography_buckets(values: &Map<String, Value>) -> DeclarationBuckets {
    let mut buckets = DeclarationBuckets::new();
    for (key, property) in PROPERTIES {
        if let Some(value) = values.get(key) {
            push_layered(&mut buckets, property, value);
        }
    }
    buckets
}

/// Typography rules for every field, scoped to `<instance> <element selector>`.
pub fn typography_rules(instance_selector: &str, attrs: &AttributeTree, fields: &[TypographyField]) -> StyleSheet {
    let mut sheet = StyleSheet::new();

    for field in fields {
        let merged = match overrides(attrs, &field.attr_key()) {
            Some(saved) => merge_values(&field.defaults, saved),
            None => field.defaults.clone(),
        };
        let values = match merged.as_object() {
            Some(values) if !is_blank(&merged) => values,
            _ => continue,
        };

        let selector = field.selector.trim();
        if selector.is_empty() {
            log::warn!("Typography field '{}' has no selector, skipping", field.key);
            continue;
        }

        let buckets = typography_buckets(values);
        log::trace!("Typography '{}': {} declarations", field.key, buckets.len());
        sheet.push_rules(buckets.into_rules(&format!("{} {}", instance_selector, selector)));
    }

    sheet
}
