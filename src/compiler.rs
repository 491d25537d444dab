//! Style compiler: one module instance's attribute tree -> scoped CSS
//!
//! The compiler is stateless apart from the [`RenderContext`] threaded through
//! each call. Every rule it produces is scoped under `#<instance_id>`, either
//! alone or combined with an element selector from the module descriptor.
//!
//! Output order for one instance:
//! 1. keyframes for an animation family not yet emitted in this render
//! 2. instance rules: base, `:hover`, tablet media, phone media
//! 3. inner element rules
//! 4. typography rules
//! 5. visibility rules
//! 6. the scroll-trigger animation rule
//! 7. custom CSS target rules

use crate::animation::{bind, data_attributes, AnimationSpec};
use crate::context::RenderContext;
use crate::custom_css::{custom_css_rules, inner_element_rules, CustomCssTarget, InnerElement};
use crate::fields::build_field;
use crate::module::ModuleDescriptor;
use crate::schema::advanced_fields;
use crate::stylesheet::{DeclarationBuckets, StyleSheet};
use crate::typography::{typography_rules, TypographyField};
use crate::types::{AttributeTree, ATTR_ANIMATION, ATTR_VISIBILITY};
use crate::visibility::visibility_rules;
use crate::CompilerOptions;

/// Result of compiling one instance.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStyle {
    pub stylesheet: StyleSheet,
    pub css: String,
    /// Animation data attributes for the module's root element.
    pub html_attributes: Option<String>,
}

impl CompiledStyle {
    pub fn is_empty(&self) -> bool {
        self.stylesheet.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct StyleCompiler {
    options: CompilerOptions,
}

impl StyleCompiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Compile an instance of a registered module kind.
    pub fn compile(
        &self,
        instance_id: &str,
        attrs: &AttributeTree,
        descriptor: &ModuleDescriptor,
        ctx: &mut RenderContext,
    ) -> CompiledStyle {
        self.compile_with(
            instance_id,
            attrs,
            &descriptor.typography_fields,
            &descriptor.custom_css_targets,
            &descriptor.inner_elements,
            ctx,
        )
    }

    /// Compile with explicit per-kind element definitions.
    pub fn compile_with(
        &self,
        instance_id: &str,
        attrs: &AttributeTree,
        typography_fields: &[TypographyField],
        custom_css_targets: &[CustomCssTarget],
        inner_elements: &[InnerElement],
        ctx: &mut RenderContext,
    ) -> CompiledStyle {
        let prefix = self.options.animation_prefix.as_str();
        let selector = format!("#{}", instance_id.trim());
        let mut sheet = StyleSheet::new();
        let mut buckets = DeclarationBuckets::new();

        for def in advanced_fields() {
            if let Some(value) = attrs.get(&def.key) {
                build_field(def, value, &mut buckets);
            }
        }

        let mut scroll_rule = None;
        let mut html_attributes = None;
        if let Some(value) = attrs.get(ATTR_ANIMATION) {
            let spec = AnimationSpec::from_value(value);
            if let Some(kind) = spec.animation_kind() {
                if ctx.claim_keyframes(kind) {
                    sheet.push_keyframes(kind.keyframes(prefix));
                }
                scroll_rule = bind(&selector, &spec, kind, prefix, &mut buckets);
                html_attributes = data_attributes(&spec, prefix);
            }
        }

        sheet.push_rules(buckets.into_rules(&selector));
        sheet.append(inner_element_rules(&selector, attrs, inner_elements));
        sheet.append(typography_rules(&selector, attrs, typography_fields));
        if let Some(visibility) = attrs.get(ATTR_VISIBILITY) {
            sheet.push_rules(visibility_rules(&selector, visibility));
        }
        if let Some(rule) = scroll_rule {
            sheet.push_rule(rule);
        }
        sheet.append(custom_css_rules(&selector, attrs, custom_css_targets));

        ctx.record_compile();
        if self.options.debug_mode {
            log::debug!("Compiled {}: {} blocks", selector, sheet.len());
        }

        let css = sheet.to_css(self.options.format);
        CompiledStyle {
            stylesheet: sheet,
            css,
            html_attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ModuleRegistry;
    use crate::schema::to_tree;
    use crate::stylesheet::Declaration;
    use crate::types::CssFormat;
    use serde_json::json;

    fn compile(attrs: serde_json::Value, ctx: &mut RenderContext) -> CompiledStyle {
        StyleCompiler::default().compile_with("mod-1", &to_tree(attrs), &[], &[], &[], ctx)
    }

    #[test]
    fn test_padding_only_desktop() {
        let mut ctx = RenderContext::new();
        let out = compile(
            json!({ "padding": { "desktop": { "top": "20px", "right": "20px", "bottom": "20px", "left": "20px" } } }),
            &mut ctx,
        );
        assert!(out.css.contains("#mod-1 { padding: 20px 20px 20px 20px; }"));
        assert!(!out.css.contains("@media"));
        assert!(out.html_attributes.is_none());
    }

    #[test]
    fn test_background_hover() {
        let mut ctx = RenderContext::new();
        let out = compile(
            json!({ "background": { "normal": { "color": "#112233" }, "hover": { "color": "#334455" } } }),
            &mut ctx,
        );
        let base = out.stylesheet.find_rule("#mod-1", None).unwrap();
        assert_eq!(base.declarations, vec![Declaration::new("background-color", "#112233")]);
        let hover = out.stylesheet.find_rule("#mod-1:hover", None).unwrap();
        assert_eq!(hover.declarations, vec![Declaration::new("background-color", "#334455")]);
    }

    #[test]
    fn test_custom_css_sanitized() {
        let mut ctx = RenderContext::new();
        let targets = vec![CustomCssTarget::new("quote_text", "Quote Text", ".quote", "")];
        let attrs = to_tree(json!({ "custom_css": { "quote_text": { "hover": { "color": "<b>red</b>" } } } }));
        let out = StyleCompiler::default().compile_with("mod-1", &attrs, &[], &targets, &[], &mut ctx);
        assert_eq!(out.css, "#mod-1 .quote:hover { color: bred/b; }\n");
    }

    #[test]
    fn test_idempotent_within_context() {
        let registry = ModuleRegistry::builtin();
        let descriptor = registry.get("testimonial").unwrap();
        let attrs = descriptor.merge_with_defaults(&to_tree(json!({
            "margin": { "desktop": { "bottom": "30px" }, "phone": { "bottom": "10px" } },
            "border": { "normal": { "desktop": { "width": "1px", "style": "solid", "color": "#eee", "radius": "8px" } } },
            "visibility": { "phone": false },
            "animation": { "type": "fade" }
        })));

        let compiler = StyleCompiler::default();
        let mut ctx = RenderContext::new();
        let first = compiler.compile("mod-1", &attrs, descriptor, &mut ctx);
        let second = compiler.compile("mod-1", &attrs, descriptor, &mut ctx);
        let third = compiler.compile("mod-1", &attrs, descriptor, &mut ctx);

        assert!(first.css.starts_with("@keyframes tb4-fade"));
        assert!(!second.css.contains("@keyframes"));
        assert_eq!(second.css, third.css);
        assert_eq!(ctx.compiled_instances(), 3);
    }

    #[test]
    fn test_keyframes_once_per_context() {
        let attrs = json!({ "animation": { "type": "slide-up", "trigger": "scroll" } });
        let mut ctx = RenderContext::new();

        let first = compile(attrs.clone(), &mut ctx);
        assert_eq!(first.stylesheet.keyframes().count(), 1);
        assert_eq!(
            first.html_attributes.as_deref(),
            Some("data-tb4-animation=\"slide-up\" data-tb4-offset=\"100\"")
        );
        let animated = first.stylesheet.find_rule("#mod-1.tb4-animated", None).unwrap();
        assert_eq!(animated.declarations[0].property, "animation");

        let second = compile(attrs.clone(), &mut ctx);
        assert_eq!(second.stylesheet.keyframes().count(), 0);

        let mut fresh = RenderContext::new();
        assert_eq!(compile(attrs, &mut fresh).stylesheet.keyframes().count(), 1);
    }

    #[test]
    fn test_library_after_compile_keeps_family_unique() {
        let mut ctx = RenderContext::new();
        let compiled = compile(json!({ "animation": { "type": "fade" } }), &mut ctx);
        let library = crate::animation::keyframes_css(&mut ctx, "tb4", CssFormat::Standard);

        let page = format!("{}{}", compiled.css, library);
        assert_eq!(page.matches("@keyframes tb4-fade ").count(), 1);
        assert_eq!(page.matches("@keyframes ").count(), crate::animation::AnimationKind::ALL.len());
    }

    #[test]
    fn test_section_order() {
        let registry = ModuleRegistry::builtin();
        let descriptor = registry.get("testimonial").unwrap();
        let attrs = to_tree(json!({
            "padding": { "desktop": { "top": "4px" } },
            "visibility": { "desktop": false },
            "custom_css": { "testimonial_name": { "color": "red" } }
        }));
        let mut ctx = RenderContext::new();
        let out = StyleCompiler::default().compile("m", &attrs, descriptor, &mut ctx);
        let selectors: Vec<_> = out.stylesheet.rules().map(|r| r.selector.as_str()).collect();

        let base = selectors.iter().position(|s| *s == "#m").unwrap();
        let quote = selectors.iter().position(|s| *s == "#m .tb4-testimonial__text").unwrap();
        let custom = selectors.iter().rposition(|s| *s == "#m .tb4-testimonial__name").unwrap();
        assert!(base < quote);
        assert!(quote < custom);
        assert!(out.css.contains("@media (min-width: 981px) { #m { display: none !important; } }"));
    }

    #[test]
    fn test_malformed_input_is_fail_soft() {
        let mut ctx = RenderContext::new();
        let out = compile(
            json!({
                "padding": "lots",
                "margin": { "desktop": { "top": "", "right": "", "bottom": "", "left": "" } },
                "border": { "normal": { "desktop": { "width": "2px", "style": "solid", "color": "" } } },
                "box_shadow": [1, 2, 3],
                "animation": { "type": "wobble" },
                "custom_css": "color: red",
                "visibility": null
            }),
            &mut ctx,
        );
        assert!(out.is_empty());
        assert_eq!(out.css, "");
        assert!(out.html_attributes.is_none());
    }

    #[test]
    fn test_compact_format() {
        let options = CompilerOptions {
            format: CssFormat::Compact,
            ..CompilerOptions::default()
        };
        let mut ctx = RenderContext::new();
        let attrs = to_tree(json!({ "z_index": { "desktop": "2" } }));
        let out = StyleCompiler::new(options).compile_with("m", &attrs, &[], &[], &[], &mut ctx);
        assert_eq!(out.css, "#m{z-index:2}");
    }
}
