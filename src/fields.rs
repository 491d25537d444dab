//! Field-type builders: structured field values -> bucketed declarations
//!
//! Every builder is fail-soft. Values of the wrong shape, blank sub-fields and
//! invalid combinations contribute nothing rather than an error.

use crate::resolver::{device_entry, field_text, is_blank, is_responsive, resolve_responsive, scalar_text};
use crate::schema::FieldDefinition;
use crate::stylesheet::{Bucket, Declaration, DeclarationBuckets};
use crate::types::{Device, FieldType, State};
use serde_json::Value;

const DEFAULT_SHADOW_COLOR: &str = "rgba(0,0,0,0.1)";
const NEUTRAL_SCALE: &str = "1";
const DEFAULT_POSITION: &str = "relative";

/// Dispatch a field value to the builder for its type.
pub fn build_field(def: &FieldDefinition, value: &Value, buckets: &mut DeclarationBuckets) {
    if is_blank(value) {
        log::trace!("Field '{}' is blank, skipping", def.key);
        return;
    }

    match def.field_type {
        FieldType::Spacing => build_spacing(&def.key, value, def.responsive, buckets),
        FieldType::Background => build_background(value, def.hover, buckets),
        FieldType::Border => build_border(value, def.responsive, def.hover, buckets),
        FieldType::BoxShadow => build_box_shadow(value, def.hover, buckets),
        FieldType::Transform => build_transform(value, def.hover, buckets),
        FieldType::Transition => build_transition(value, buckets),
        FieldType::Position => build_position(value, def.responsive, buckets),
        FieldType::Number | FieldType::Select => build_scalar(def, value, buckets),
        // Handled by their own subsystems, or not style-bearing.
        FieldType::Text | FieldType::Visibility | FieldType::Animation | FieldType::CustomCss => {}
    }
}

/// Split a hover-capable value into its normal and hover parts.
fn split_states(value: &Value, hover_enabled: bool) -> (&Value, Option<&Value>) {
    if !hover_enabled {
        return (value, None);
    }
    let normal = value.get(State::Normal.key()).unwrap_or(value);
    let hover = value.get(State::Hover.key()).filter(|h| !is_blank(h));
    (normal, hover)
}

/// Run `build` per device when the value is responsive, otherwise once into desktop.
fn per_device<F>(value: &Value, responsive: bool, buckets: &mut DeclarationBuckets, build: F)
where
    F: Fn(&Value) -> Vec<Declaration>,
{
    if responsive && is_responsive(value) {
        for device in Device::ALL {
            if let Some(entry) = device_entry(value, device).filter(|e| e.is_object()) {
                buckets.extend(Bucket::for_device(device), build(entry));
            }
        }
    } else if value.is_object() {
        buckets.extend(Bucket::Desktop, build(value));
    }
}

/// Append `unit` to bare numbers: `300` -> `300ms`, `0.5s` stays as is.
pub fn with_unit(value: &str, unit: &str) -> String {
    if !value.is_empty() && value.parse::<f64>().is_ok() {
        format!("{}{}", value, unit)
    } else {
        value.to_string()
    }
}

// --- SPACING ---

pub fn build_spacing(property: &str, value: &Value, responsive: bool, buckets: &mut DeclarationBuckets) {
    per_device(value, responsive, buckets, |entry| {
        spacing_declaration(property, entry).into_iter().collect()
    });
}

/// `margin`/`padding` 4-value shorthand; `None` when every side is empty.
pub fn spacing_declaration(property: &str, sides: &Value) -> Option<Declaration> {
    let values: Vec<Option<String>> = ["top", "right", "bottom", "left"]
        .iter()
        .map(|side| field_text(sides, side))
        .collect();

    if values.iter().all(Option::is_none) {
        return None;
    }

    let shorthand = values
        .into_iter()
        .map(|v| v.unwrap_or_else(|| "0".to_string()))
        .collect::<Vec<_>>()
        .join(" ");
    Some(Declaration::new(property, shorthand))
}

// --- BACKGROUND ---

pub fn build_background(value: &Value, hover_enabled: bool, buckets: &mut DeclarationBuckets) {
    let (normal, hover) = split_states(value, hover_enabled);
    if let Some(decl) = background_declaration(normal) {
        buckets.push(Bucket::Desktop, decl);
    }
    if let Some(decl) = hover.and_then(background_declaration) {
        buckets.push(Bucket::Hover, decl);
    }
}

pub fn background_declaration(value: &Value) -> Option<Declaration> {
    if let Some(image) = field_text(value, "image") {
        let size = field_text(value, "size").unwrap_or_else(|| "cover".to_string());
        let position = field_text(value, "position").unwrap_or_else(|| "center".to_string());
        return Some(Declaration::new(
            "background",
            format!("url('{}') {}/{} no-repeat", image.replace('\'', "%27"), position, size),
        ));
    }

    field_text(value, "color").map(|color| Declaration::new("background-color", color))
}

// --- BORDER ---

pub fn build_border(value: &Value, responsive: bool, hover_enabled: bool, buckets: &mut DeclarationBuckets) {
    let (normal, hover) = split_states(value, hover_enabled);
    per_device(normal, responsive, buckets, border_declarations);

    // Hover borders are not media-scoped; the desktop layer stands for all devices.
    if let Some(hover) = hover {
        let layer = if responsive {
            device_entry(hover, Device::Desktop).unwrap_or(hover)
        } else {
            hover
        };
        if layer.is_object() {
            buckets.extend(Bucket::Hover, border_declarations(layer));
        }
    }
}

/// `border` needs both width and color; `border-radius` stands alone.
pub fn border_declarations(value: &Value) -> Vec<Declaration> {
    let mut decls = Vec::new();
    let width = field_text(value, "width");
    let color = field_text(value, "color");

    match (width, color) {
        (Some(width), Some(color)) => {
            let style = field_text(value, "style").unwrap_or_else(|| "solid".to_string());
            decls.push(Declaration::new("border", format!("{} {} {}", width, style, color)));
        }
        (Some(_), None) | (None, Some(_)) => {
            log::trace!("Incomplete border (needs width and color), omitting shorthand");
        }
        (None, None) => {}
    }

    if let Some(radius) = field_text(value, "radius") {
        decls.push(Declaration::new("border-radius", radius));
    }
    decls
}

// --- BOX SHADOW ---

pub fn build_box_shadow(value: &Value, hover_enabled: bool, buckets: &mut DeclarationBuckets) {
    let (normal, hover) = split_states(value, hover_enabled);
    if let Some(decl) = box_shadow_declaration(normal) {
        buckets.push(Bucket::Desktop, decl);
    }
    if let Some(decl) = hover.and_then(box_shadow_declaration) {
        buckets.push(Bucket::Hover, decl);
    }
}

pub fn box_shadow_declaration(value: &Value) -> Option<Declaration> {
    let horizontal = field_text(value, "horizontal");
    let vertical = field_text(value, "vertical");
    let blur = field_text(value, "blur");
    let color = field_text(value, "color");

    if horizontal.is_none() && vertical.is_none() && blur.is_none() && color.is_none() {
        return None;
    }

    let zero = || "0".to_string();
    Some(Declaration::new(
        "box-shadow",
        format!(
            "{} {} {} {} {}",
            horizontal.unwrap_or_else(zero),
            vertical.unwrap_or_else(zero),
            blur.unwrap_or_else(zero),
            field_text(value, "spread").unwrap_or_else(zero),
            color.unwrap_or_else(|| DEFAULT_SHADOW_COLOR.to_string()),
        ),
    ))
}

// --- TRANSFORM ---

pub fn build_transform(value: &Value, hover_enabled: bool, buckets: &mut DeclarationBuckets) {
    let (normal, hover) = split_states(value, hover_enabled);
    if let Some(decl) = transform_declaration(normal) {
        buckets.push(Bucket::Desktop, decl);
    }
    if let Some(decl) = hover.and_then(transform_declaration) {
        buckets.push(Bucket::Hover, decl);
    }
}

pub fn transform_declaration(value: &Value) -> Option<Declaration> {
    let lookup = |keys: &[&str]| keys.iter().find_map(|k| field_text(value, k));
    let mut functions = Vec::new();

    if let Some(scale) = lookup(&["scale"]).filter(|s| s != NEUTRAL_SCALE) {
        functions.push(format!("scale({})", scale));
    }
    if let Some(rotate) = lookup(&["rotate"]) {
        functions.push(format!("rotate({})", rotate));
    }
    if let Some(x) = lookup(&["translateX", "translate_x"]) {
        functions.push(format!("translateX({})", x));
    }
    if let Some(y) = lookup(&["translateY", "translate_y"]) {
        functions.push(format!("translateY({})", y));
    }

    if functions.is_empty() {
        None
    } else {
        Some(Declaration::new("transform", functions.join(" ")))
    }
}

// --- TRANSITION ---

pub fn build_transition(value: &Value, buckets: &mut DeclarationBuckets) {
    if let Some(decl) = transition_declaration(value) {
        buckets.push(Bucket::Desktop, decl);
    }
}

pub fn transition_declaration(value: &Value) -> Option<Declaration> {
    if !value.is_object() {
        return None;
    }
    let duration = field_text(value, "duration").unwrap_or_else(|| "300".to_string());
    let timing = field_text(value, "timing").unwrap_or_else(|| "ease".to_string());
    let delay = field_text(value, "delay").unwrap_or_else(|| "0".to_string());

    Some(Declaration::new(
        "transition",
        format!("all {} {} {}", with_unit(&duration, "ms"), timing, with_unit(&delay, "ms")),
    ))
}

// --- POSITION ---

pub fn build_position(value: &Value, responsive: bool, buckets: &mut DeclarationBuckets) {
    per_device(value, responsive, buckets, position_declarations);
}

pub fn position_declarations(value: &Value) -> Vec<Declaration> {
    let kind = match field_text(value, "type") {
        Some(kind) if kind != DEFAULT_POSITION => kind,
        _ => return Vec::new(),
    };

    let mut decls = vec![Declaration::new("position", kind)];
    for side in ["top", "right", "bottom", "left"] {
        if let Some(offset) = field_text(value, side) {
            decls.push(Declaration::new(side, offset));
        }
    }
    decls
}

// --- SCALAR (z-index, overflow) ---

/// Scalar fields write their `css_property` unless the value equals the field default.
pub fn build_scalar(def: &FieldDefinition, value: &Value, buckets: &mut DeclarationBuckets) {
    let property = match &def.css_property {
        Some(property) => property.as_str(),
        None => return,
    };
    let default = scalar_text(&def.default);

    if def.responsive && is_responsive(value) {
        let mut previous: Option<String> = None;
        for device in Device::ALL {
            let resolved = resolve_responsive(value, device);
            let inherited = match device {
                Device::Desktop => default.clone(),
                _ => previous.clone(),
            };
            if !resolved.is_empty() && Some(&resolved) != inherited.as_ref() {
                buckets.push(Bucket::for_device(device), Declaration::new(property, resolved.clone()));
            }
            previous = Some(resolved).filter(|r| !r.is_empty());
        }
    } else if let Some(text) = scalar_text(value) {
        if Some(&text) != default.as_ref() {
            buckets.push(Bucket::Desktop, Declaration::new(property, text));
        }
    }
}
