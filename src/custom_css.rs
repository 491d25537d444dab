//! Author-supplied per-element overrides: custom CSS targets and inner elements
//!
//! Authors are trusted page-builder users. The sanitizer below is
//! defence-in-depth, not a security boundary: it removes characters that could
//! break out of a declaration or the surrounding `<style>` element and drops
//! property names that are not plain CSS identifiers.

use crate::resolver::{is_blank, scalar_text};
use crate::stylesheet::{Bucket, CssRule, Declaration, DeclarationBuckets, StyleSheet};
use crate::types::{AttributeTree, ATTR_CUSTOM_CSS, ATTR_ELEMENTS};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// A module sub-element authors may style directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomCssTarget {
    pub element_key: String,
    pub label: String,
    pub selector: String,
    #[serde(default)]
    pub description: String,
}

impl CustomCssTarget {
    pub fn new(element_key: &str, label: &str, selector: &str, description: &str) -> Self {
        Self {
            element_key: element_key.to_string(),
            label: label.to_string(),
            selector: selector.to_string(),
            description: description.to_string(),
        }
    }
}

/// A named inner element styled through `attrs.elements`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InnerElement {
    pub key: String,
    pub selector: String,
}

impl InnerElement {
    pub fn new(key: &str, selector: &str) -> Self {
        Self {
            key: key.to_string(),
            selector: selector.to_string(),
        }
    }
}

const LAYER_KEYS: [&str; 4] = ["normal", "hover", "tablet", "phone"];

/// Keys that name a state or device layer and are never CSS properties.
const STATE_KEYS: [&str; 5] = ["normal", "hover", "tablet", "phone", "active"];

fn property_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^-?[a-z][a-z0-9-]*$").expect("property pattern is valid"))
}

fn unsafe_chars() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"[<>"'{};]"#).expect("sanitizer pattern is valid"))
}

/// Strip `< > " '` plus the rule-injection characters `{ } ;` from a value.
pub fn sanitize_value(value: &str) -> String {
    unsafe_chars().replace_all(value, "").trim().to_string()
}

/// Convert an attribute key to a CSS property name.
///
/// `font_size` -> `font-size`, `backgroundColor` -> `background-color`,
/// `webkit_line_clamp` -> `-webkit-line-clamp`. Returns `None` when the result
/// is not a plain CSS identifier.
pub fn css_property_name(key: &str) -> Option<String> {
    let known = match key {
        "font_size" => Some("font-size"),
        "font_weight" => Some("font-weight"),
        "font_family" => Some("font-family"),
        "font_style" => Some("font-style"),
        "line_height" => Some("line-height"),
        "letter_spacing" => Some("letter-spacing"),
        "text_align" => Some("text-align"),
        "text_transform" => Some("text-transform"),
        "text_decoration" => Some("text-decoration"),
        "background_color" => Some("background-color"),
        "border_radius" => Some("border-radius"),
        "border_width" => Some("border-width"),
        "border_style" => Some("border-style"),
        "border_color" => Some("border-color"),
        "box_shadow" => Some("box-shadow"),
        "z_index" => Some("z-index"),
        "max_width" => Some("max-width"),
        "min_width" => Some("min-width"),
        "max_height" => Some("max-height"),
        "min_height" => Some("min-height"),
        _ => None,
    };
    if let Some(name) = known {
        return Some(name.to_string());
    }

    let mut name = String::with_capacity(key.len() + 2);
    for (i, ch) in key.trim().chars().enumerate() {
        match ch {
            '_' => name.push('-'),
            c if c.is_ascii_uppercase() => {
                if i > 0 {
                    name.push('-');
                }
                name.push(c.to_ascii_lowercase());
            }
            c => name.push(c),
        }
    }
    for vendor in ["webkit-", "moz-", "ms-"] {
        if name.starts_with(vendor) {
            name.insert(0, '-');
        }
    }

    if property_pattern().is_match(&name) {
        Some(name)
    } else {
        log::warn!("Dropping custom CSS property with invalid name '{}'", key);
        None
    }
}

/// Declarations from a flat property/value map, blanks and invalid names dropped.
pub fn declarations_from_map(styles: &Map<String, Value>) -> Vec<Declaration> {
    styles
        .iter()
        .filter_map(|(property, value)| {
            let text = scalar_text(value)?;
            let name = css_property_name(property)?;
            let clean = sanitize_value(&text);
            if clean.is_empty() {
                None
            } else {
                Some(Declaration::new(name, clean))
            }
        })
        .collect()
}

/// Declarations from a flat map read as the normal state. A state or device
/// key with a scalar value is a malformed layer and is skipped.
fn flat_declarations(styles: &Map<String, Value>) -> Vec<Declaration> {
    let properties: Map<String, Value> = styles
        .iter()
        .filter(|(key, _)| !STATE_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    declarations_from_map(&properties)
}

fn layer<'a>(styles: &'a Value, key: &str) -> Option<&'a Map<String, Value>> {
    styles.get(key).and_then(Value::as_object)
}

/// Rules for every custom CSS target that has a non-empty entry in
/// `attrs.custom_css`. A flat map is the normal state; otherwise the
/// `normal`/`hover`/`tablet`/`phone` layers are read.
pub fn custom_css_rules(instance_selector: &str, attrs: &AttributeTree, targets: &[CustomCssTarget]) -> StyleSheet {
    let mut sheet = StyleSheet::new();
    let custom = match attrs.get(ATTR_CUSTOM_CSS).and_then(Value::as_object) {
        Some(custom) if !custom.is_empty() => custom,
        _ => return sheet,
    };

    for target in targets {
        let styles = match custom.get(&target.element_key) {
            Some(styles) if styles.is_object() && !is_blank(styles) => styles,
            _ => continue,
        };
        let selector = target.selector.trim();
        if selector.is_empty() {
            log::warn!("Custom CSS target '{}' has no selector, skipping", target.element_key);
            continue;
        }

        let layered = LAYER_KEYS.iter().any(|k| styles.get(*k).map_or(false, Value::is_object));
        let mut buckets = DeclarationBuckets::new();
        if layered {
            for (key, bucket) in LAYER_KEYS.iter().zip(Bucket::ALL) {
                if let Some(map) = layer(styles, key) {
                    buckets.extend(bucket, declarations_from_map(map));
                }
            }
        } else if let Some(map) = styles.as_object() {
            buckets.extend(Bucket::Desktop, flat_declarations(map));
        }

        sheet.push_rules(buckets.into_rules(&format!("{} {}", instance_selector, selector)));
    }

    sheet
}

/// Rules for inner elements styled through `attrs.elements`: the flat map or
/// `normal` layer, then `hover` (`:hover`) and `active` (`.active`).
pub fn inner_element_rules(instance_selector: &str, attrs: &AttributeTree, elements: &[InnerElement]) -> StyleSheet {
    let mut sheet = StyleSheet::new();
    let data = match attrs.get(ATTR_ELEMENTS).and_then(Value::as_object) {
        Some(data) => data,
        None => return sheet,
    };

    for element in elements {
        let styles = match data.get(&element.key) {
            Some(styles) if !is_blank(styles) => styles,
            _ => continue,
        };
        let full = format!("{} {}", instance_selector, element.selector);

        let normal = match layer(styles, "normal") {
            Some(map) => Some(declarations_from_map(map)),
            None if ["hover", "active"].iter().all(|k| styles.get(*k).is_none()) => {
                styles.as_object().map(flat_declarations)
            }
            None => None,
        };
        if let Some(declarations) = normal {
            sheet.push_rule(CssRule::new(full.as_str(), declarations));
        }
        if let Some(map) = layer(styles, "hover") {
            sheet.push_rule(CssRule::new(format!("{}:hover", full), declarations_from_map(map)));
        }
        if let Some(map) = layer(styles, "active") {
            sheet.push_rule(CssRule::new(format!("{}.active", full), declarations_from_map(map)));
        }
    }

    sheet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::to_tree;
    use crate::types::CssFormat;
    use serde_json::json;

    fn quote_target() -> Vec<CustomCssTarget> {
        vec![CustomCssTarget::new("quote_text", "Quote Text", ".quote", "The quote")]
    }

    #[test]
    fn test_property_names() {
        assert_eq!(css_property_name("font_size").as_deref(), Some("font-size"));
        assert_eq!(css_property_name("backgroundColor").as_deref(), Some("background-color"));
        assert_eq!(css_property_name("webkit_line_clamp").as_deref(), Some("-webkit-line-clamp"));
        assert_eq!(css_property_name("color").as_deref(), Some("color"));
        assert_eq!(css_property_name("color:red;x"), None);
        assert_eq!(css_property_name(""), None);
    }

    #[test]
    fn test_sanitize_value() {
        assert_eq!(sanitize_value("<b>red</b>"), "bred/b");
        assert_eq!(sanitize_value("red; } body { display: none"), "red  body  display: none");
        assert_eq!(sanitize_value("\"Inter\", sans-serif"), "Inter, sans-serif");
    }

    #[test]
    fn test_hover_value_sanitized() {
        let attrs = to_tree(json!({ "custom_css": { "quote_text": { "hover": { "color": "<b>red</b>" } } } }));
        let sheet = custom_css_rules("#mod-1", &attrs, &quote_target());
        assert_eq!(sheet.to_css(CssFormat::Standard), "#mod-1 .quote:hover { color: bred/b; }\n");
    }

    #[test]
    fn test_flat_map_is_normal_state() {
        let attrs = to_tree(json!({ "custom_css": { "quote_text": { "font_size": "20px", "color": "" } } }));
        let sheet = custom_css_rules("#m", &attrs, &quote_target());
        let rule = sheet.find_rule("#m .quote", None).unwrap();
        assert_eq!(rule.declarations, vec![Declaration::new("font-size", "20px")]);
    }

    #[test]
    fn test_scalar_layer_keys_are_not_properties() {
        let attrs = to_tree(json!({ "custom_css": { "quote_text": { "hover": "red", "phone": "12px" } } }));
        assert!(custom_css_rules("#m", &attrs, &quote_target()).is_empty());

        let mixed = to_tree(json!({ "custom_css": { "quote_text": { "color": "blue", "tablet": "9px" } } }));
        let sheet = custom_css_rules("#m", &mixed, &quote_target());
        assert_eq!(sheet.to_css(CssFormat::Standard), "#m .quote { color: blue; }\n");

        let elements = vec![InnerElement::new("button", ".tb4-btn")];
        let inner = to_tree(json!({ "elements": { "button": { "phone": "12px", "normal": "x" } } }));
        assert!(inner_element_rules("#m", &inner, &elements).is_empty());
    }

    #[test]
    fn test_layers_and_media() {
        let attrs = to_tree(json!({ "custom_css": { "quote_text": {
            "normal": { "color": "#111" },
            "tablet": { "font_size": "16px" },
            "phone": { "font_size": "14px" }
        } } }));
        let sheet = custom_css_rules("#m", &attrs, &quote_target());
        assert_eq!(
            sheet.to_css(CssFormat::Standard),
            "#m .quote { color: #111; }\n\
             @media (max-width: 980px) { #m .quote { font-size: 16px; } }\n\
             @media (max-width: 767px) { #m .quote { font-size: 14px; } }\n"
        );
    }

    #[test]
    fn test_targets_without_entries_or_selectors_skipped() {
        let targets = vec![
            CustomCssTarget::new("quote_text", "Quote", ".quote", ""),
            CustomCssTarget::new("broken", "Broken", "", ""),
        ];
        let attrs = to_tree(json!({ "custom_css": {
            "broken": { "color": "red" },
            "unknown": { "color": "blue" },
            "quote_text": { "color": "" }
        } }));
        assert!(custom_css_rules("#m", &attrs, &targets).is_empty());
        assert!(custom_css_rules("#m", &to_tree(json!({})), &targets).is_empty());
    }

    #[test]
    fn test_inner_elements() {
        let elements = vec![InnerElement::new("button", ".tb4-btn")];
        let attrs = to_tree(json!({ "elements": { "button": {
            "normal": { "background_color": "#2563eb" },
            "hover": { "background_color": "#1d4ed8" },
            "active": { "color": "#fff" }
        } } }));
        let sheet = inner_element_rules("#m", &attrs, &elements);
        let selectors: Vec<_> = sheet.rules().map(|r| r.selector.as_str()).collect();
        assert_eq!(selectors, vec!["#m .tb4-btn", "#m .tb4-btn:hover", "#m .tb4-btn.active"]);

        let flat = to_tree(json!({ "elements": { "button": { "color": "red" } } }));
        let sheet = inner_element_rules("#m", &flat, &elements);
        assert_eq!(sheet.to_css(CssFormat::Standard), "#m .tb4-btn { color: red; }\n");
    }
}
