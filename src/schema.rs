//! Static field schema shared by every module kind, and typed default merging

use crate::resolver::{is_responsive, is_stateful};
use crate::types::{AttributeTree, Device, FieldType, State, Tab};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::OnceLock;

/// Static definition of one attribute field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub tab: Tab,
    #[serde(default)]
    pub responsive: bool,
    #[serde(default)]
    pub hover: bool,
    #[serde(default)]
    pub default: Value,
    /// CSS property written by scalar (`number`/`select`) fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_property: Option<String>,
}

impl FieldDefinition {
    fn new(key: &str, label: &str, field_type: FieldType, tab: Tab, default: Value) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            field_type,
            tab,
            responsive: false,
            hover: false,
            default,
            css_property: None,
        }
    }

    fn responsive(mut self) -> Self {
        self.responsive = true;
        self
    }

    fn hover(mut self) -> Self {
        self.hover = true;
        self
    }

    fn writes(mut self, property: &str) -> Self {
        self.css_property = Some(property.to_string());
        self
    }

    /// Bring a saved value into the field's declared shape.
    ///
    /// A hover-capable field saved without `normal`/`hover` keys is treated as
    /// its normal state; a responsive field saved without device keys is
    /// treated as its desktop value.
    pub fn normalize(&self, value: &Value) -> Value {
        let mut value = value.clone();
        if self.hover && value.is_object() && !is_stateful(&value) {
            value = json!({ "normal": value });
        }
        if self.responsive {
            value = if self.hover {
                map_states(&value, wrap_desktop)
            } else {
                wrap_desktop(&value)
            };
        }
        value
    }
}

fn wrap_desktop(value: &Value) -> Value {
    if value.is_null() || is_responsive(value) {
        value.clone()
    } else {
        json!({ "desktop": value })
    }
}

fn map_states(value: &Value, f: impl Fn(&Value) -> Value) -> Value {
    match value.as_object() {
        Some(map) if is_stateful(value) => {
            let mut out = map.clone();
            for state in State::ALL {
                if let Some(inner) = map.get(state.key()) {
                    out.insert(state.key().to_string(), f(inner));
                }
            }
            Value::Object(out)
        }
        _ => f(value),
    }
}

fn spacing_default() -> Value {
    let side = json!({ "top": "", "right": "", "bottom": "", "left": "" });
    json!({ "desktop": side, "tablet": side, "phone": side })
}

fn border_default() -> Value {
    let edge = json!({ "width": "", "style": "solid", "color": "", "radius": "" });
    let devices = json!({ "desktop": edge, "tablet": edge, "phone": edge });
    json!({ "normal": devices, "hover": devices })
}

/// The advanced field set every module kind carries, in processing order.
pub fn advanced_fields() -> &'static [FieldDefinition] {
    static FIELDS: OnceLock<Vec<FieldDefinition>> = OnceLock::new();
    FIELDS.get_or_init(|| {
        use FieldType::*;
        vec![
            FieldDefinition::new("css_id", "CSS ID", Text, Tab::Advanced, json!("")),
            FieldDefinition::new("css_class", "CSS Classes", Text, Tab::Advanced, json!("")),
            FieldDefinition::new("margin", "Margin", Spacing, Tab::Design, spacing_default()).responsive(),
            FieldDefinition::new("padding", "Padding", Spacing, Tab::Design, spacing_default()).responsive(),
            FieldDefinition::new(
                "background",
                "Background",
                Background,
                Tab::Design,
                json!({
                    "normal": { "color": "", "image": "", "size": "cover", "position": "center" },
                    "hover": { "color": "", "image": "", "size": "cover", "position": "center" }
                }),
            )
            .hover(),
            FieldDefinition::new("border", "Border", Border, Tab::Design, border_default())
                .hover()
                .responsive(),
            FieldDefinition::new(
                "box_shadow",
                "Box Shadow",
                BoxShadow,
                Tab::Design,
                json!({
                    "normal": { "horizontal": "", "vertical": "", "blur": "", "spread": "", "color": "" },
                    "hover": { "horizontal": "", "vertical": "", "blur": "", "spread": "", "color": "" }
                }),
            )
            .hover(),
            FieldDefinition::new(
                "transform",
                "Transform",
                Transform,
                Tab::Advanced,
                json!({
                    "normal": { "scale": "", "rotate": "", "translateX": "", "translateY": "" },
                    "hover": { "scale": "", "rotate": "", "translateX": "", "translateY": "" }
                }),
            )
            .hover(),
            FieldDefinition::new(
                "transition",
                "Transition",
                Transition,
                Tab::Advanced,
                json!({ "duration": "300", "timing": "ease", "delay": "0" }),
            ),
            FieldDefinition::new(
                "visibility",
                "Visibility",
                Visibility,
                Tab::Advanced,
                json!({ "desktop": true, "tablet": true, "phone": true }),
            ),
            FieldDefinition::new("z_index", "Z-Index", Number, Tab::Advanced, json!(""))
                .responsive()
                .writes("z-index"),
            FieldDefinition::new("overflow", "Overflow", Select, Tab::Advanced, json!("visible"))
                .writes("overflow"),
            FieldDefinition::new(
                "position",
                "Position",
                Position,
                Tab::Advanced,
                json!({
                    "desktop": { "type": "relative", "top": "", "right": "", "bottom": "", "left": "" },
                    "tablet": { "type": "", "top": "", "right": "", "bottom": "", "left": "" },
                    "phone": { "type": "", "top": "", "right": "", "bottom": "", "left": "" }
                }),
            )
            .responsive(),
            FieldDefinition::new(
                "animation",
                "Animation",
                Animation,
                Tab::Advanced,
                json!({
                    "type": "",
                    "duration": "400",
                    "delay": "0",
                    "easing": "ease",
                    "iteration": "1",
                    "direction": "normal",
                    "fill_mode": "forwards",
                    "trigger": "load",
                    "scroll_offset": "100"
                }),
            ),
            FieldDefinition::new("custom_css", "Custom CSS", CustomCss, Tab::Advanced, json!({})),
        ]
    })
}

pub fn field(key: &str) -> Option<&'static FieldDefinition> {
    advanced_fields().iter().find(|f| f.key == key)
}

pub fn fields_by_tab(tab: Tab) -> impl Iterator<Item = &'static FieldDefinition> {
    advanced_fields().iter().filter(move |f| f.tab == tab)
}

/// Defaults of the advanced field set as an attribute tree.
pub fn advanced_defaults() -> AttributeTree {
    advanced_fields()
        .iter()
        .map(|f| (f.key.clone(), f.default.clone()))
        .collect()
}

/// Deep-merge `over` onto `base`. Objects merge per key; scalars and arrays
/// from `over` replace wholesale; `null` in `over` keeps the base value.
pub fn merge_values(base: &Value, over: &Value) -> Value {
    match (base, over) {
        (_, Value::Null) => base.clone(),
        (Value::Object(b), Value::Object(o)) => {
            let mut out = b.clone();
            for (key, value) in o {
                let merged = match b.get(key) {
                    Some(existing) => merge_values(existing, value),
                    None => value.clone(),
                };
                out.insert(key.clone(), merged);
            }
            Value::Object(out)
        }
        _ => over.clone(),
    }
}

/// Merge a saved value over a field default according to the field's shape.
pub fn merge_field(def: &FieldDefinition, default: &Value, saved: &Value) -> Value {
    if saved.is_null() {
        return default.clone();
    }
    if !def.field_type.is_structured() && !def.responsive && !def.hover {
        return match (default, saved) {
            (Value::Object(_), Value::Object(_)) => merge_values(default, saved),
            _ => saved.clone(),
        };
    }

    let saved = def.normalize(saved);
    let default = def.normalize(default);
    match (&default, &saved) {
        (Value::Object(d), Value::Object(s)) => {
            let mut out = d.clone();
            for (key, value) in s {
                let merged = match d.get(key) {
                    Some(existing) => merge_layer(key, existing, value),
                    None => value.clone(),
                };
                out.insert(key.clone(), merged);
            }
            Value::Object(out)
        }
        _ => saved,
    }
}

/// Merge one `normal`/`hover`/device layer, descending into the next layer
/// when the key names one, and merging leaf sub-fields otherwise.
fn merge_layer(key: &str, default: &Value, saved: &Value) -> Value {
    let is_layer = State::ALL.iter().any(|s| s.key() == key) || Device::from_key(key).is_some();
    match (default, saved) {
        (Value::Object(d), Value::Object(s)) if is_layer => {
            let mut out = d.clone();
            for (inner_key, value) in s {
                let merged = match d.get(inner_key) {
                    Some(existing) => merge_layer(inner_key, existing, value),
                    None => value.clone(),
                };
                out.insert(inner_key.clone(), merged);
            }
            Value::Object(out)
        }
        (_, Value::Null) => default.clone(),
        _ => saved.clone(),
    }
}

/// Merge saved settings over `defaults`, field by field.
pub fn merge_attrs(defaults: &AttributeTree, saved: &AttributeTree) -> AttributeTree {
    let mut merged = defaults.clone();
    for (key, value) in saved {
        let combined = match (field(key), defaults.get(key)) {
            (Some(def), Some(default)) => merge_field(def, default, value),
            (None, Some(default)) => merge_values(default, value),
            (_, None) => value.clone(),
        };
        merged.insert(key.clone(), combined);
    }
    merged
}

pub fn to_tree(value: Value) -> AttributeTree {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
