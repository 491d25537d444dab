//! Structured CSS: declarations, per-breakpoint buckets, rules and serialization
//!
//! Builders never concatenate CSS text. They push `(property, value)` pairs
//! into a [`DeclarationBuckets`], which the assembler turns into rules in a
//! fixed order: base, `:hover`, tablet media block, phone media block.
//! Serialization happens once, at the end of a compile.

use crate::types::{CssFormat, Device};
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }
}

/// One of the four collection targets of a compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Desktop,
    Hover,
    Tablet,
    Phone,
}

impl Bucket {
    /// Emission order.
    pub const ALL: [Bucket; 4] = [Bucket::Desktop, Bucket::Hover, Bucket::Tablet, Bucket::Phone];

    pub fn for_device(device: Device) -> Self {
        match device {
            Device::Desktop => Bucket::Desktop,
            Device::Tablet => Bucket::Tablet,
            Device::Phone => Bucket::Phone,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeclarationBuckets {
    desktop: Vec<Declaration>,
    hover: Vec<Declaration>,
    tablet: Vec<Declaration>,
    phone: Vec<Declaration>,
}

impl DeclarationBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bucket: Bucket, declaration: Declaration) {
        self.slot_mut(bucket).push(declaration);
    }

    pub fn extend(&mut self, bucket: Bucket, declarations: impl IntoIterator<Item = Declaration>) {
        self.slot_mut(bucket).extend(declarations);
    }

    pub fn get(&self, bucket: Bucket) -> &[Declaration] {
        match bucket {
            Bucket::Desktop => &self.desktop,
            Bucket::Hover => &self.hover,
            Bucket::Tablet => &self.tablet,
            Bucket::Phone => &self.phone,
        }
    }

    pub fn is_empty(&self) -> bool {
        Bucket::ALL.iter().all(|&b| self.get(b).is_empty())
    }

    pub fn len(&self) -> usize {
        Bucket::ALL.iter().map(|&b| self.get(b).len()).sum()
    }

    fn slot_mut(&mut self, bucket: Bucket) -> &mut Vec<Declaration> {
        match bucket {
            Bucket::Desktop => &mut self.desktop,
            Bucket::Hover => &mut self.hover,
            Bucket::Tablet => &mut self.tablet,
            Bucket::Phone => &mut self.phone,
        }
    }

    /// Turn the buckets into rules for `selector`. Empty buckets produce nothing.
    pub fn into_rules(self, selector: &str) -> Vec<CssRule> {
        let DeclarationBuckets { desktop, hover, tablet, phone } = self;
        let candidates = [
            CssRule::new(selector, desktop),
            CssRule::new(format!("{}:hover", selector), hover),
            CssRule::new(selector, tablet).within(Device::Tablet.breakpoint().media_query()),
            CssRule::new(selector, phone).within(Device::Phone.breakpoint().media_query()),
        ];

        candidates.into_iter().filter(|r| !r.is_empty()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssRule {
    /// Media condition, e.g. `(max-width: 980px)`.
    pub media: Option<String>,
    pub selector: String,
    pub declarations: Vec<Declaration>,
}

impl CssRule {
    pub fn new(selector: impl Into<String>, declarations: Vec<Declaration>) -> Self {
        Self {
            media: None,
            selector: selector.into(),
            declarations,
        }
    }

    pub fn within(mut self, media: Option<String>) -> Self {
        self.media = media;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    fn write(&self, out: &mut String, format: CssFormat) {
        match format {
            CssFormat::Standard => {
                if let Some(media) = &self.media {
                    let _ = write!(out, "@media {} {{ ", media);
                }
                let _ = write!(out, "{} {{ ", self.selector);
                for decl in &self.declarations {
                    let _ = write!(out, "{}: {}; ", decl.property, decl.value);
                }
                out.push('}');
                if self.media.is_some() {
                    out.push_str(" }");
                }
                out.push('\n');
            }
            CssFormat::Compact => {
                if let Some(media) = &self.media {
                    let _ = write!(out, "@media {}{{", media);
                }
                out.push_str(&self.selector);
                out.push('{');
                write_compact_declarations(out, &self.declarations);
                out.push('}');
                if self.media.is_some() {
                    out.push('}');
                }
            }
        }
    }
}

/// An `@keyframes` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyframes {
    pub name: String,
    /// `(frame selector, declarations)`, e.g. `("from", [opacity: 0])`.
    pub frames: Vec<(String, Vec<Declaration>)>,
}

impl Keyframes {
    fn write(&self, out: &mut String, format: CssFormat) {
        match format {
            CssFormat::Standard => {
                let _ = write!(out, "@keyframes {} {{ ", self.name);
                for (frame, decls) in &self.frames {
                    let _ = write!(out, "{} {{ ", frame);
                    for decl in decls {
                        let _ = write!(out, "{}: {}; ", decl.property, decl.value);
                    }
                    out.push_str("} ");
                }
                out.push_str("}\n");
            }
            CssFormat::Compact => {
                let _ = write!(out, "@keyframes {}{{", self.name);
                for (frame, decls) in &self.frames {
                    let _ = write!(out, "{}{{", frame.replace(", ", ","));
                    write_compact_declarations(out, decls);
                    out.push('}');
                }
                out.push('}');
            }
        }
    }
}

fn write_compact_declarations(out: &mut String, declarations: &[Declaration]) {
    for (i, decl) in declarations.iter().enumerate() {
        if i > 0 {
            out.push(';');
        }
        let _ = write!(out, "{}:{}", decl.property, decl.value);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CssBlock {
    Rule(CssRule),
    Keyframes(Keyframes),
}

/// Ordered collection of CSS blocks produced by one or more compiles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheet {
    blocks: Vec<CssBlock>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule. Rules without declarations are dropped.
    pub fn push_rule(&mut self, rule: CssRule) {
        if !rule.is_empty() {
            self.blocks.push(CssBlock::Rule(rule));
        }
    }

    pub fn push_rules(&mut self, rules: impl IntoIterator<Item = CssRule>) {
        for rule in rules {
            self.push_rule(rule);
        }
    }

    pub fn push_keyframes(&mut self, keyframes: Keyframes) {
        self.blocks.push(CssBlock::Keyframes(keyframes));
    }

    pub fn append(&mut self, other: StyleSheet) {
        self.blocks.extend(other.blocks);
    }

    pub fn blocks(&self) -> &[CssBlock] {
        &self.blocks
    }

    pub fn rules(&self) -> impl Iterator<Item = &CssRule> {
        self.blocks.iter().filter_map(|b| match b {
            CssBlock::Rule(rule) => Some(rule),
            CssBlock::Keyframes(_) => None,
        })
    }

    pub fn keyframes(&self) -> impl Iterator<Item = &Keyframes> {
        self.blocks.iter().filter_map(|b| match b {
            CssBlock::Keyframes(k) => Some(k),
            CssBlock::Rule(_) => None,
        })
    }

    /// First rule matching a selector and media condition.
    pub fn find_rule(&self, selector: &str, media: Option<&str>) -> Option<&CssRule> {
        self.rules()
            .find(|r| r.selector == selector && r.media.as_deref() == media)
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn to_css(&self, format: CssFormat) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            match block {
                CssBlock::Rule(rule) => rule.write(&mut out, format),
                CssBlock::Keyframes(k) => k.write(&mut out, format),
            }
        }
        out
    }
}
