//! Page documents and whole-page rendering

use crate::animation::keyframes_css;
use crate::compiler::StyleCompiler;
use crate::context::RenderContext;
use crate::error::{CompilerError, Result};
use crate::module::{normalize_kind, wrapper_attributes, ModuleRegistry, WrapperAttributes};
use crate::types::AttributeTree;
use crate::CompilerOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A saved page: an ordered list of module instances.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageDocument {
    #[serde(default)]
    pub modules: Vec<ModuleInstance>,
}

/// One module occurrence as saved by the editor, split by tab.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleInstance {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: AttributeTree,
    #[serde(default)]
    pub design: AttributeTree,
    #[serde(default)]
    pub advanced: AttributeTree,
}

impl ModuleInstance {
    /// Content, design and advanced sections flattened into one tree. Later
    /// sections win on key collisions.
    pub fn attributes(&self) -> AttributeTree {
        let mut attrs = self.content.clone();
        for section in [&self.design, &self.advanced] {
            for (key, value) in section {
                attrs.insert(key.clone(), value.clone());
            }
        }
        attrs
    }
}

impl PageDocument {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CompilerError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let source = fs::read_to_string(path)?;
        Self::from_str(&source).map_err(|e| CompilerError::page(path.display().to_string(), e.to_string()))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Module types in this page that the registry does not know.
    pub fn unknown_kinds(&self, registry: &ModuleRegistry) -> Vec<String> {
        self.modules
            .iter()
            .filter(|m| registry.get(&m.kind).is_none())
            .map(|m| m.kind.clone())
            .collect()
    }
}

/// One compiled module of a rendered page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedInstance {
    pub instance_id: String,
    pub kind: String,
    pub wrapper: WrapperAttributes,
    pub css: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderedPage {
    /// Stylesheet for the whole page, keyframes first.
    pub css: String,
    pub instances: Vec<RenderedInstance>,
    /// Module types that were skipped because no descriptor is registered.
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PageRenderer {
    registry: ModuleRegistry,
    compiler: StyleCompiler,
    id_prefix: String,
    include_keyframes: bool,
}

impl PageRenderer {
    pub fn new(registry: ModuleRegistry, options: CompilerOptions) -> Self {
        Self {
            registry,
            id_prefix: options.id_prefix.clone(),
            include_keyframes: options.include_keyframes,
            compiler: StyleCompiler::new(options),
        }
    }

    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }

    /// Emit the full keyframe library at the top of every page instead of
    /// only the families the page uses.
    pub fn with_keyframe_library(mut self, include: bool) -> Self {
        self.include_keyframes = include;
        self
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Render a page with a fresh render context.
    pub fn render(&self, page: &PageDocument) -> RenderedPage {
        let mut ctx = RenderContext::new();
        self.render_with(page, &mut ctx)
    }

    pub fn render_with(&self, page: &PageDocument, ctx: &mut RenderContext) -> RenderedPage {
        let options = self.compiler.options();
        let mut rendered = RenderedPage::default();

        if self.include_keyframes {
            rendered.css.push_str(&keyframes_css(ctx, &options.animation_prefix, options.format));
        }

        for (index, module) in page.modules.iter().enumerate() {
            let descriptor = match self.registry.get(&module.kind) {
                Some(descriptor) => descriptor,
                None => {
                    log::warn!("Skipping module {} with unknown type '{}'", index + 1, module.kind);
                    rendered.skipped.push(module.kind.clone());
                    continue;
                }
            };

            let generated_id = format!("{}_module_{}", self.id_prefix, index + 1);
            let attrs = descriptor.merge_with_defaults(&module.attributes());
            let kind = normalize_kind(&module.kind);
            let wrapper = wrapper_attributes(kind, &generated_id, &attrs, &options.animation_prefix);

            // Rules are scoped to whatever id the root element ends up carrying.
            let compiled = self.compiler.compile(&wrapper.id, &attrs, descriptor, ctx);
            rendered.css.push_str(&compiled.css);
            rendered.instances.push(RenderedInstance {
                instance_id: wrapper.id.clone(),
                kind: kind.to_string(),
                wrapper,
                css: compiled.css,
            });
        }

        log::info!(
            "Rendered {} modules ({} skipped), {} bytes of CSS",
            rendered.instances.len(),
            rendered.skipped.len(),
            rendered.css.len()
        );
        rendered
    }
}

impl Default for PageRenderer {
    fn default() -> Self {
        Self::new(ModuleRegistry::builtin(), CompilerOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const PAGE: &str = r#"{
        "modules": [
            {
                "type": "tb4_button",
                "content": { "text": "Go" },
                "design": { "padding": { "desktop": { "top": "8px", "bottom": "8px" } } },
                "advanced": { "animation": { "type": "fade" } }
            },
            { "type": "carousel" },
            {
                "type": "cta",
                "advanced": { "css_id": "signup", "animation": { "type": "fade", "trigger": "scroll" } }
            }
        ]
    }"#;

    #[test]
    fn test_parse_page() {
        let page = PageDocument::from_str(PAGE).unwrap();
        assert_eq!(page.modules.len(), 3);
        assert_eq!(page.modules[0].kind, "tb4_button");
        assert_eq!(page.modules[0].attributes()["text"], "Go");
        assert_eq!(page.unknown_kinds(&ModuleRegistry::builtin()), vec!["carousel".to_string()]);
    }

    #[test]
    fn test_render_page() {
        let page = PageDocument::from_str(PAGE).unwrap();
        let rendered = PageRenderer::default().render(&page);

        assert_eq!(rendered.instances.len(), 2);
        assert_eq!(rendered.skipped, vec!["carousel".to_string()]);
        assert_eq!(rendered.instances[0].instance_id, "tb4_module_1");
        assert_eq!(rendered.instances[0].kind, "button");
        assert_eq!(rendered.instances[1].instance_id, "signup");
        assert!(rendered.css.contains("#tb4_module_1 { padding: 8px 0 8px 0;"));
        assert!(rendered.css.contains("#signup.tb4-animated"));
        assert_eq!(rendered.css.matches("@keyframes tb4-fade").count(), 1);
        assert_eq!(
            rendered.instances[1].wrapper.data.as_deref(),
            Some("data-tb4-animation=\"fade\" data-tb4-offset=\"100\"")
        );
    }

    #[test]
    fn test_each_render_gets_fresh_keyframes() {
        let page = PageDocument::from_str(PAGE).unwrap();
        let renderer = PageRenderer::default();
        let first = renderer.render(&page);
        let second = renderer.render(&page);
        assert_eq!(first.css, second.css);
        assert!(second.css.contains("@keyframes tb4-fade"));
    }

    #[test]
    fn test_keyframe_library_up_front() {
        let page = PageDocument::from_str(PAGE).unwrap();
        let rendered = PageRenderer::default()
            .with_keyframe_library(true)
            .with_id_prefix("page")
            .render(&page);
        assert!(rendered.css.starts_with("@keyframes tb4-fade"));
        assert_eq!(rendered.css.matches("@keyframes tb4-fade ").count(), 1);
        assert!(rendered.css.contains("@keyframes tb4-pulse"));
        assert_eq!(rendered.instances[0].instance_id, "page_module_1");
    }

    #[test]
    fn test_selector_css_id_is_not_trusted() {
        let source = r#"{
            "modules": [
                {
                    "type": "text",
                    "design": { "padding": { "desktop": { "top": "5px" } } },
                    "advanced": { "css_id": "a, body" }
                }
            ]
        }"#;
        let rendered = PageRenderer::default().render(&PageDocument::from_str(source).unwrap());

        assert_eq!(rendered.instances[0].instance_id, "tb4_module_1");
        assert!(rendered.css.contains("#tb4_module_1 { padding: 5px 0 0 0;"));
        assert!(!rendered.css.contains("body"));
        assert!(rendered.instances[0].wrapper.to_html().starts_with(" id=\"tb4_module_1\""));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(PAGE.as_bytes()).unwrap();
        assert_eq!(PageDocument::from_file(file.path()).unwrap().modules.len(), 3);

        let mut broken = NamedTempFile::new().unwrap();
        broken.write_all(b"{ \"modules\": [ { } ] }").unwrap();
        assert!(matches!(PageDocument::from_file(broken.path()), Err(CompilerError::Page { .. })));

        assert!(matches!(
            PageDocument::from_file("/nonexistent/page.json"),
            Err(CompilerError::FileNotFound { .. })
        ));
    }
}
