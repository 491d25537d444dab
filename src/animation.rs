//! Entrance/attention animations: keyframe library, per-instance binding and
//! trigger data attributes for the client-side observer

use crate::context::RenderContext;
use crate::custom_css::sanitize_value;
use crate::fields::with_unit;
use crate::resolver::field_text;
use crate::stylesheet::{Bucket, CssRule, Declaration, DeclarationBuckets, Keyframes, StyleSheet};
use crate::types::CssFormat;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Keyframe families shipped with the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationKind {
    Fade,
    FadeOut,
    SlideUp,
    SlideDown,
    SlideLeft,
    SlideRight,
    ZoomIn,
    ZoomOut,
    Bounce,
    Flip,
    Rotate,
    Pulse,
}

type Frame = (&'static str, &'static [(&'static str, &'static str)]);

impl AnimationKind {
    pub const ALL: [AnimationKind; 12] = [
        AnimationKind::Fade,
        AnimationKind::FadeOut,
        AnimationKind::SlideUp,
        AnimationKind::SlideDown,
        AnimationKind::SlideLeft,
        AnimationKind::SlideRight,
        AnimationKind::ZoomIn,
        AnimationKind::ZoomOut,
        AnimationKind::Bounce,
        AnimationKind::Flip,
        AnimationKind::Rotate,
        AnimationKind::Pulse,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AnimationKind::Fade => "fade",
            AnimationKind::FadeOut => "fade-out",
            AnimationKind::SlideUp => "slide-up",
            AnimationKind::SlideDown => "slide-down",
            AnimationKind::SlideLeft => "slide-left",
            AnimationKind::SlideRight => "slide-right",
            AnimationKind::ZoomIn => "zoom-in",
            AnimationKind::ZoomOut => "zoom-out",
            AnimationKind::Bounce => "bounce",
            AnimationKind::Flip => "flip",
            AnimationKind::Rotate => "rotate",
            AnimationKind::Pulse => "pulse",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    fn frames(self) -> &'static [Frame] {
        match self {
            AnimationKind::Fade => &[("from", &[("opacity", "0")]), ("to", &[("opacity", "1")])],
            AnimationKind::FadeOut => &[("from", &[("opacity", "1")]), ("to", &[("opacity", "0")])],
            AnimationKind::SlideUp => &[
                ("from", &[("opacity", "0"), ("transform", "translateY(30px)")]),
                ("to", &[("opacity", "1"), ("transform", "translateY(0)")]),
            ],
            AnimationKind::SlideDown => &[
                ("from", &[("opacity", "0"), ("transform", "translateY(-30px)")]),
                ("to", &[("opacity", "1"), ("transform", "translateY(0)")]),
            ],
            AnimationKind::SlideLeft => &[
                ("from", &[("opacity", "0"), ("transform", "translateX(30px)")]),
                ("to", &[("opacity", "1"), ("transform", "translateX(0)")]),
            ],
            AnimationKind::SlideRight => &[
                ("from", &[("opacity", "0"), ("transform", "translateX(-30px)")]),
                ("to", &[("opacity", "1"), ("transform", "translateX(0)")]),
            ],
            AnimationKind::ZoomIn => &[
                ("from", &[("opacity", "0"), ("transform", "scale(0.8)")]),
                ("to", &[("opacity", "1"), ("transform", "scale(1)")]),
            ],
            AnimationKind::ZoomOut => &[
                ("from", &[("opacity", "0"), ("transform", "scale(1.2)")]),
                ("to", &[("opacity", "1"), ("transform", "scale(1)")]),
            ],
            AnimationKind::Bounce => &[
                ("0%, 20%, 50%, 80%, 100%", &[("transform", "translateY(0)")]),
                ("40%", &[("transform", "translateY(-20px)")]),
                ("60%", &[("transform", "translateY(-10px)")]),
            ],
            AnimationKind::Flip => &[
                ("from", &[("opacity", "0"), ("transform", "perspective(400px) rotateY(90deg)")]),
                ("to", &[("opacity", "1"), ("transform", "perspective(400px) rotateY(0)")]),
            ],
            AnimationKind::Rotate => &[
                ("from", &[("opacity", "0"), ("transform", "rotate(-180deg)")]),
                ("to", &[("opacity", "1"), ("transform", "rotate(0)")]),
            ],
            AnimationKind::Pulse => &[
                ("0%", &[("transform", "scale(1)")]),
                ("50%", &[("transform", "scale(1.05)")]),
                ("100%", &[("transform", "scale(1)")]),
            ],
        }
    }

    pub fn keyframes(self, prefix: &str) -> Keyframes {
        Keyframes {
            name: keyframe_name(prefix, self),
            frames: self
                .frames()
                .iter()
                .map(|(frame, decls)| {
                    let decls = decls.iter().map(|(p, v)| Declaration::new(*p, *v)).collect();
                    (frame.to_string(), decls)
                })
                .collect(),
        }
    }
}

pub fn keyframe_name(prefix: &str, kind: AnimationKind) -> String {
    format!("{}-{}", prefix, kind.name())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    #[default]
    Load,
    Scroll,
    Hover,
}

impl Trigger {
    fn from_name(name: &str) -> Self {
        match name {
            "scroll" => Trigger::Scroll,
            "hover" => Trigger::Hover,
            _ => Trigger::Load,
        }
    }
}

/// Animation settings of one module instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub duration: String,
    pub delay: String,
    pub easing: String,
    pub iteration: String,
    pub direction: String,
    pub fill_mode: String,
    pub trigger: Trigger,
    pub scroll_offset: String,
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self {
            kind: String::new(),
            duration: "400".to_string(),
            delay: "0".to_string(),
            easing: "ease".to_string(),
            iteration: "1".to_string(),
            direction: "normal".to_string(),
            fill_mode: "forwards".to_string(),
            trigger: Trigger::Load,
            scroll_offset: "100".to_string(),
        }
    }
}

impl AnimationSpec {
    /// Read a spec from an attribute value, filling blanks with defaults.
    pub fn from_value(value: &Value) -> Self {
        let defaults = Self::default();
        let text = |key: &str, fallback: String| {
            field_text(value, key)
                .map(|v| sanitize_value(&v))
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
        };

        Self {
            kind: text("type", defaults.kind),
            duration: text("duration", defaults.duration),
            delay: text("delay", defaults.delay),
            easing: text("easing", defaults.easing),
            iteration: text("iteration", defaults.iteration),
            direction: text("direction", defaults.direction),
            fill_mode: text("fill_mode", defaults.fill_mode),
            trigger: field_text(value, "trigger")
                .map(|t| Trigger::from_name(&t))
                .unwrap_or_default(),
            scroll_offset: text("scroll_offset", defaults.scroll_offset),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.kind.is_empty()
    }

    /// The keyframe family, if the type names a known one.
    pub fn animation_kind(&self) -> Option<AnimationKind> {
        if !self.is_enabled() {
            return None;
        }
        let kind = AnimationKind::from_name(&self.kind);
        if kind.is_none() {
            log::warn!("Unknown animation type '{}', ignoring", self.kind);
        }
        kind
    }

    /// `animation` shorthand: name duration easing delay iteration direction fill-mode.
    pub fn shorthand(&self, kind: AnimationKind, prefix: &str) -> String {
        format!(
            "{} {} {} {} {} {} {}",
            keyframe_name(prefix, kind),
            with_unit(&self.duration, "ms"),
            self.easing,
            with_unit(&self.delay, "ms"),
            self.iteration,
            self.direction,
            self.fill_mode
        )
    }
}

/// Emit the keyframe library once per render context, skipping families an
/// earlier compile already emitted. Later calls on the same context return an
/// empty string until the context is reset.
pub fn keyframes_css(ctx: &mut RenderContext, prefix: &str, format: CssFormat) -> String {
    let mut sheet = StyleSheet::new();
    for kind in ctx.claim_library() {
        sheet.push_keyframes(kind.keyframes(prefix));
    }
    sheet.to_css(format)
}

/// Every keyframe family as a stylesheet.
pub fn library(prefix: &str) -> StyleSheet {
    let mut sheet = StyleSheet::new();
    for kind in AnimationKind::ALL {
        sheet.push_keyframes(kind.keyframes(prefix));
    }
    sheet
}

/// Bind an instance to its animation.
///
/// Load-triggered animations run on the base rule and hover-triggered ones on
/// `:hover`. Scroll-triggered instances start hidden and animate once the
/// observer adds the `<prefix>-animated` class; that rule is returned
/// separately because it has its own selector.
pub fn bind(
    selector: &str,
    spec: &AnimationSpec,
    kind: AnimationKind,
    prefix: &str,
    buckets: &mut DeclarationBuckets,
) -> Option<CssRule> {
    let animation = Declaration::new("animation", spec.shorthand(kind, prefix));
    match spec.trigger {
        Trigger::Load => {
            buckets.push(Bucket::Desktop, animation);
            None
        }
        Trigger::Hover => {
            buckets.push(Bucket::Hover, animation);
            None
        }
        Trigger::Scroll => {
            buckets.push(Bucket::Desktop, Declaration::new("opacity", "0"));
            Some(CssRule::new(format!("{}.{}-animated", selector, prefix), vec![animation]))
        }
    }
}

/// HTML attributes for the module root, e.g. `data-tb4-animation="fade" data-tb4-offset="100"`.
pub fn data_attributes(spec: &AnimationSpec, prefix: &str) -> Option<String> {
    let kind = spec.animation_kind()?;
    let mut attrs = vec![format!(
        "data-{}-animation=\"{}\"",
        prefix,
        escape_attr(kind.name())
    )];
    if spec.trigger == Trigger::Scroll {
        attrs.push(format!(
            "data-{}-offset=\"{}\"",
            prefix,
            escape_attr(&spec.scroll_offset)
        ));
    }
    Some(attrs.join(" "))
}

/// Escape text for use inside a double-quoted HTML attribute.
pub fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_spec_defaults_fill_blanks() {
        let spec = AnimationSpec::from_value(&json!({ "type": "fade", "duration": "" }));
        assert_eq!(spec.duration, "400");
        assert_eq!(spec.fill_mode, "forwards");
        assert_eq!(spec.trigger, Trigger::Load);
        assert_eq!(spec.animation_kind(), Some(AnimationKind::Fade));
    }

    #[test]
    fn test_disabled_and_unknown_types() {
        assert!(!AnimationSpec::from_value(&json!({})).is_enabled());
        let spec = AnimationSpec::from_value(&json!({ "type": "wobble" }));
        assert!(spec.is_enabled());
        assert_eq!(spec.animation_kind(), None);
        assert_eq!(data_attributes(&spec, "tb4"), None);
    }

    #[test]
    fn test_shorthand() {
        let spec = AnimationSpec::from_value(&json!({
            "type": "slide-up", "duration": "600", "delay": "100", "easing": "ease-out",
            "iteration": "infinite", "direction": "alternate", "fill_mode": "both"
        }));
        assert_eq!(
            spec.shorthand(AnimationKind::SlideUp, "tb4"),
            "tb4-slide-up 600ms ease-out 100ms infinite alternate both"
        );
    }

    #[test]
    fn test_keyframes_once_per_context() {
        let mut ctx = RenderContext::new();
        let first = keyframes_css(&mut ctx, "tb4", CssFormat::Standard);
        assert!(first.contains("@keyframes tb4-fade { from { opacity: 0; } to { opacity: 1; } }"));
        assert!(first.contains("@keyframes tb4-pulse"));

        assert_eq!(keyframes_css(&mut ctx, "tb4", CssFormat::Standard), "");

        ctx.reset();
        assert!(!keyframes_css(&mut ctx, "tb4", CssFormat::Standard).is_empty());
    }

    #[test]
    fn test_bind_triggers() {
        let kind = AnimationKind::Fade;

        let mut buckets = DeclarationBuckets::new();
        let spec = AnimationSpec::from_value(&json!({ "type": "fade" }));
        assert!(bind("#m", &spec, kind, "tb4", &mut buckets).is_none());
        assert_eq!(buckets.get(Bucket::Desktop)[0].property, "animation");

        let mut buckets = DeclarationBuckets::new();
        let spec = AnimationSpec::from_value(&json!({ "type": "fade", "trigger": "hover" }));
        assert!(bind("#m", &spec, kind, "tb4", &mut buckets).is_none());
        assert_eq!(buckets.get(Bucket::Hover).len(), 1);

        let mut buckets = DeclarationBuckets::new();
        let spec = AnimationSpec::from_value(&json!({ "type": "fade", "trigger": "scroll" }));
        let rule = bind("#m", &spec, kind, "tb4", &mut buckets).unwrap();
        assert_eq!(rule.selector, "#m.tb4-animated");
        assert_eq!(buckets.get(Bucket::Desktop), &[Declaration::new("opacity", "0")]);
    }

    #[test]
    fn test_data_attributes() {
        let spec = AnimationSpec::from_value(&json!({ "type": "zoom-in" }));
        assert_eq!(data_attributes(&spec, "tb4").as_deref(), Some("data-tb4-animation=\"zoom-in\""));

        let spec = AnimationSpec::from_value(&json!({
            "type": "zoom-in", "trigger": "scroll", "scroll_offset": 150
        }));
        assert_eq!(
            data_attributes(&spec, "tb4").as_deref(),
            Some("data-tb4-animation=\"zoom-in\" data-tb4-offset=\"150\"")
        );
    }

    #[test]
    fn test_escape_attr() {
        assert_eq!(escape_attr("a\"b<c>&'"), "a&quot;b&lt;c&gt;&amp;&#039;");
    }
}
