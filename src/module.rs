//! Module-kind descriptors and the kind -> descriptor registry

use crate::animation::{data_attributes, escape_attr, AnimationSpec};
use crate::custom_css::{CustomCssTarget, InnerElement};
use crate::error::{CompilerError, Result};
use crate::resolver::scalar_text;
use crate::schema::{advanced_defaults, merge_attrs, to_tree};
use crate::typography::TypographyField;
use crate::types::{AttributeTree, ATTR_ANIMATION, ATTR_CSS_CLASS, ATTR_CSS_ID};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Static description of one module kind: everything the style compiler
/// needs to know about it besides the instance's own attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub kind: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub typography_fields: Vec<TypographyField>,
    #[serde(default)]
    pub custom_css_targets: Vec<CustomCssTarget>,
    #[serde(default)]
    pub inner_elements: Vec<InnerElement>,
    #[serde(default)]
    pub content_defaults: AttributeTree,
}

impl ModuleDescriptor {
    pub fn new(kind: &str, name: &str, category: &str) -> Self {
        Self {
            kind: kind.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            typography_fields: Vec::new(),
            custom_css_targets: Vec::new(),
            inner_elements: Vec::new(),
            content_defaults: AttributeTree::new(),
        }
    }

    pub fn with_typography(mut self, fields: Vec<TypographyField>) -> Self {
        self.typography_fields = fields;
        self
    }

    pub fn with_custom_css(mut self, targets: Vec<CustomCssTarget>) -> Self {
        self.custom_css_targets = targets;
        self
    }

    pub fn with_inner_elements(mut self, elements: Vec<InnerElement>) -> Self {
        self.inner_elements = elements;
        self
    }

    pub fn with_content_defaults(mut self, defaults: serde_json::Value) -> Self {
        self.content_defaults = to_tree(defaults);
        self
    }

    /// Advanced field defaults overlaid with this kind's content defaults.
    pub fn defaults(&self) -> AttributeTree {
        let mut defaults = advanced_defaults();
        for (key, value) in &self.content_defaults {
            defaults.insert(key.clone(), value.clone());
        }
        defaults
    }

    pub fn merge_with_defaults(&self, saved: &AttributeTree) -> AttributeTree {
        merge_attrs(&self.defaults(), saved)
    }
}

/// Attributes for a module's root element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrapperAttributes {
    pub id: String,
    pub class: String,
    /// Animation trigger attributes, already escaped.
    pub data: Option<String>,
}

impl WrapperAttributes {
    /// Render as ` id="..." class="..." data-...` for insertion into an open tag.
    pub fn to_html(&self) -> String {
        let mut html = format!(" id=\"{}\" class=\"{}\"", escape_attr(&self.id), escape_attr(&self.class));
        if let Some(data) = &self.data {
            html.push(' ');
            html.push_str(data);
        }
        html
    }
}

fn css_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^-?[_a-zA-Z][_a-zA-Z0-9-]*$").expect("css id pattern is valid"))
}

/// True when `id` can be used unescaped in an `#id` selector.
pub fn is_valid_css_id(id: &str) -> bool {
    css_id_pattern().is_match(id)
}

/// Root element attributes: the author's `css_id` (or the instance id), the
/// module classes plus `css_class`, and animation data attributes.
pub fn wrapper_attributes(kind: &str, instance_id: &str, attrs: &AttributeTree, prefix: &str) -> WrapperAttributes {
    let id = match attrs.get(ATTR_CSS_ID).and_then(scalar_text) {
        Some(css_id) if is_valid_css_id(&css_id) => css_id,
        Some(css_id) => {
            log::warn!("Ignoring css_id '{}': not a CSS identifier, using '{}'", css_id, instance_id);
            instance_id.to_string()
        }
        None => instance_id.to_string(),
    };

    let mut classes = vec![format!("{}-module", prefix), format!("{}-module--{}", prefix, kind)];
    if let Some(extra) = attrs.get(ATTR_CSS_CLASS).and_then(scalar_text) {
        classes.push(extra);
    }

    let data = attrs
        .get(ATTR_ANIMATION)
        .map(AnimationSpec::from_value)
        .and_then(|spec| data_attributes(&spec, prefix));

    WrapperAttributes {
        id,
        class: classes.join(" "),
        data,
    }
}

/// Strip the legacy `tb4_` prefix from a module type.
pub fn normalize_kind(kind: &str) -> &str {
    let kind = kind.trim();
    kind.strip_prefix("tb4_").unwrap_or(kind)
}

#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    descriptors: BTreeMap<String, ModuleDescriptor>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in module kinds.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for descriptor in builtin_descriptors() {
            registry.register(descriptor);
        }
        registry
    }

    pub fn register(&mut self, descriptor: ModuleDescriptor) {
        if self.descriptors.contains_key(&descriptor.kind) {
            log::warn!("Module kind '{}' registered twice, replacing", descriptor.kind);
        }
        self.descriptors.insert(descriptor.kind.clone(), descriptor);
    }

    pub fn get(&self, kind: &str) -> Option<&ModuleDescriptor> {
        self.descriptors.get(normalize_kind(kind))
    }

    pub fn require(&self, kind: &str) -> Result<&ModuleDescriptor> {
        self.get(kind).ok_or_else(|| CompilerError::unknown_module(kind))
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(String::as_str)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.descriptors.values()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

fn builtin_descriptors() -> Vec<ModuleDescriptor> {
    vec![
        ModuleDescriptor::new("text", "Text", "content")
            .with_typography(vec![TypographyField::new(
                "body",
                "Body Typography",
                ".tb4-text",
                json!({ "font_size": { "desktop": "16px" }, "line_height": { "desktop": "1.7" } }),
            )])
            .with_custom_css(vec![CustomCssTarget::new(
                "text_content",
                "Text Content",
                ".tb4-text",
                "Rich text wrapper",
            )])
            .with_content_defaults(json!({ "text": "" })),
        ModuleDescriptor::new("button", "Button", "content")
            .with_typography(vec![TypographyField::new(
                "button",
                "Button Typography",
                ".tb4-button",
                json!({ "font_size": { "desktop": "15px", "phone": "14px" }, "font_weight": "600" }),
            )])
            .with_custom_css(vec![
                CustomCssTarget::new("button_wrapper", "Button Wrapper", ".tb4-button-wrapper", "Alignment wrapper"),
                CustomCssTarget::new("button_element", "Button", ".tb4-button", "The button link itself"),
                CustomCssTarget::new("button_icon", "Button Icon", ".tb4-button__icon", "Optional icon"),
            ])
            .with_inner_elements(vec![InnerElement::new("button", ".tb4-button")])
            .with_content_defaults(json!({ "text": "Click Here", "url": "#", "alignment": "left" })),
        ModuleDescriptor::new("testimonial", "Testimonial", "content")
            .with_typography(vec![
                TypographyField::new(
                    "quote",
                    "Quote Typography",
                    ".tb4-testimonial__text",
                    json!({
                        "font_size": { "desktop": "18px", "tablet": "16px", "mobile": "15px" },
                        "font_style": "normal",
                        "line_height": { "desktop": "1.6" },
                        "color": "#374151"
                    }),
                ),
                TypographyField::new(
                    "author_name",
                    "Author Name Typography",
                    ".tb4-testimonial__name",
                    json!({
                        "font_size": { "desktop": "16px", "tablet": "15px", "mobile": "14px" },
                        "font_weight": "600",
                        "color": "#111827"
                    }),
                ),
                TypographyField::new(
                    "author_title",
                    "Author Title Typography",
                    ".tb4-testimonial__title",
                    json!({
                        "font_size": { "desktop": "14px", "tablet": "13px", "mobile": "12px" },
                        "color": "#6b7280"
                    }),
                ),
            ])
            .with_custom_css(vec![
                CustomCssTarget::new("testimonial_container", "Testimonial Container", ".tb4-testimonial", "Main testimonial wrapper element"),
                CustomCssTarget::new("testimonial_quote", "Quote Block", ".tb4-testimonial__quote", "Quote container element"),
                CustomCssTarget::new("testimonial_text", "Quote Text", ".tb4-testimonial__text", "The actual quote text content"),
                CustomCssTarget::new("testimonial_marks", "Quote Marks", ".tb4-testimonial__marks", "Decorative quotation marks"),
                CustomCssTarget::new("testimonial_author", "Author Section", ".tb4-testimonial__author", "Author information container"),
                CustomCssTarget::new("testimonial_avatar", "Author Avatar", ".tb4-testimonial__avatar", "Author image or initials"),
                CustomCssTarget::new("testimonial_name", "Author Name", ".tb4-testimonial__name", "Author name text"),
                CustomCssTarget::new("testimonial_title", "Author Title", ".tb4-testimonial__title", "Author job title/position"),
            ])
            .with_content_defaults(json!({ "quote": "", "author": "", "author_title": "", "rating": 5 })),
        ModuleDescriptor::new("cta", "CTA", "content")
            .with_typography(vec![
                TypographyField::new(
                    "title",
                    "Title Typography",
                    ".tb4-cta__title",
                    json!({
                        "font_size": { "desktop": "28px", "tablet": "24px", "mobile": "20px" },
                        "font_weight": "700",
                        "line_height": { "desktop": "1.3" },
                        "color": "#ffffff"
                    }),
                ),
                TypographyField::new(
                    "description",
                    "Description Typography",
                    ".tb4-cta__description",
                    json!({
                        "font_size": { "desktop": "16px", "tablet": "15px", "mobile": "14px" },
                        "line_height": { "desktop": "1.6" },
                        "color": "rgba(255, 255, 255, 0.9)"
                    }),
                ),
                TypographyField::new(
                    "button",
                    "Button Typography",
                    ".tb4-cta__btn",
                    json!({
                        "font_size": { "desktop": "15px", "tablet": "14px", "mobile": "14px" },
                        "font_weight": "600"
                    }),
                ),
            ])
            .with_custom_css(vec![
                CustomCssTarget::new("cta_container", "CTA Container", ".tb4-cta", "Main CTA wrapper element"),
                CustomCssTarget::new("cta_content", "CTA Content", ".tb4-cta__content", "Content area containing title and description"),
                CustomCssTarget::new("cta_title", "CTA Title", ".tb4-cta__title", "Main heading/title element"),
                CustomCssTarget::new("cta_description", "CTA Description", ".tb4-cta__description", "Description text paragraph"),
                CustomCssTarget::new("cta_buttons", "Buttons Container", ".tb4-cta__buttons", "Container holding all buttons"),
                CustomCssTarget::new("cta_primary_button", "Primary Button", ".tb4-cta__btn--primary", "Primary call-to-action button"),
                CustomCssTarget::new("cta_secondary_button", "Secondary Button", ".tb4-cta__btn--secondary", "Secondary action button"),
            ])
            .with_content_defaults(json!({ "title": "", "description": "", "button_text": "Get Started", "button_url": "#" })),
        ModuleDescriptor::new("slider", "Slider", "interactive")
            .with_inner_elements(vec![
                InnerElement::new("main", ".tb4-slider"),
                InnerElement::new("track", ".tb4-slider-track"),
                InnerElement::new("slide", ".tb4-slide"),
                InnerElement::new("arrows", ".tb4-slider-arrows"),
                InnerElement::new("dots", ".tb4-slider-dots"),
            ])
            .with_content_defaults(json!({ "autoplay": true, "speed": "5000", "show_arrows": true, "show_dots": true })),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_registry() {
        let registry = ModuleRegistry::builtin();
        assert_eq!(registry.len(), 5);
        assert!(registry.get("testimonial").is_some());
        assert!(registry.get("tb4_cta").is_some());
        assert!(registry.get("carousel").is_none());
        assert!(matches!(registry.require("carousel"), Err(CompilerError::UnknownModule { .. })));
    }

    #[test]
    fn test_descriptor_defaults() {
        let registry = ModuleRegistry::builtin();
        let button = registry.get("button").unwrap();
        let defaults = button.defaults();
        assert_eq!(defaults["text"], "Click Here");
        assert_eq!(defaults["overflow"], "visible");

        let merged = button.merge_with_defaults(&to_tree(json!({
            "text": "Buy now",
            "padding": { "desktop": { "top": "12px" } }
        })));
        assert_eq!(merged["text"], "Buy now");
        assert_eq!(merged["padding"]["desktop"]["top"], "12px");
        assert_eq!(merged["padding"]["desktop"]["left"], "");
        assert_eq!(merged["url"], "#");
    }

    #[test]
    fn test_wrapper_attributes() {
        let attrs = to_tree(json!({
            "css_id": "hero-cta",
            "css_class": "wide",
            "animation": { "type": "fade", "trigger": "scroll" }
        }));
        let wrapper = wrapper_attributes("cta", "tb4_module_1", &attrs, "tb4");
        assert_eq!(wrapper.id, "hero-cta");
        assert_eq!(wrapper.class, "tb4-module tb4-module--cta wide");
        assert_eq!(
            wrapper.to_html(),
            " id=\"hero-cta\" class=\"tb4-module tb4-module--cta wide\" data-tb4-animation=\"fade\" data-tb4-offset=\"100\""
        );

        let plain = wrapper_attributes("text", "tb4_module_2", &AttributeTree::new(), "tb4");
        assert_eq!(plain.id, "tb4_module_2");
        assert!(plain.data.is_none());
    }

    #[test]
    fn test_invalid_css_id_falls_back() {
        for bad in ["a, body", "hero section", "1st", "x{y}", "a.b"] {
            let attrs = to_tree(json!({ "css_id": bad }));
            let wrapper = wrapper_attributes("text", "tb4_module_4", &attrs, "tb4");
            assert_eq!(wrapper.id, "tb4_module_4", "accepted '{}'", bad);
        }
        assert!(is_valid_css_id("hero-cta"));
        assert!(is_valid_css_id("_main"));
        assert!(is_valid_css_id("-x1"));
        assert!(!is_valid_css_id(""));
    }
}
