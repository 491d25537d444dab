//! Page-Builder Module Style Compiler
//!
//! Turns the attribute tree of a page-builder module instance (spacing,
//! backgrounds, borders, shadows, transforms, typography, visibility,
//! animation and author custom CSS) into CSS scoped to that instance.
//!
//! # Features
//!
//! - Responsive values per device with a fixed fallback chain
//!   (phone -> tablet -> desktop)
//! - Hover states with fallback to the normal state
//! - Structured field builders that skip blank or invalid input
//! - Typography, inner elements and custom CSS targets per module kind
//! - Keyframes emitted once per render, tracked by an explicit [`RenderContext`]
//! - Whole-page rendering from saved page documents
//!
//! # Basic Usage
//!
//! ```rust
//! use modstyle::{RenderContext, StyleCompiler, ModuleRegistry, schema::to_tree};
//! use serde_json::json;
//!
//! let registry = ModuleRegistry::builtin();
//! let button = registry.get("button").unwrap();
//! let attrs = to_tree(json!({ "padding": { "desktop": { "top": "20px" } } }));
//!
//! let mut ctx = RenderContext::new();
//! let compiled = StyleCompiler::default().compile("mod-1", &attrs, button, &mut ctx);
//! assert!(compiled.css.contains("#mod-1 { padding: 20px 0 0 0; }"));
//! ```
//!
//! # Compilation Pipeline
//!
//! 1. **Merge**: saved attributes are merged over field and module defaults
//! 2. **Fields**: every advanced field is built into four declaration buckets
//!    (desktop, hover, tablet, phone)
//! 3. **Elements**: inner elements, typography and custom CSS targets are
//!    built as rules scoped below the instance selector
//! 4. **Serialize**: blocks are written once, in a fixed order

pub mod types;
pub mod error;
pub mod resolver;
pub mod stylesheet;
pub mod schema;
pub mod fields;
pub mod visibility;
pub mod context;
pub mod animation;
pub mod custom_css;
pub mod typography;
pub mod module;
pub mod compiler;
pub mod page;
pub mod cli;

use serde::Serialize;
use std::fs;
use std::path::Path;
use std::time::Instant;

// Re-export commonly used types and functions
pub use error::{CompilerError, Result};
pub use types::*;
pub use animation::{keyframes_css, AnimationKind, AnimationSpec, Trigger};
pub use compiler::{CompiledStyle, StyleCompiler};
pub use context::RenderContext;
pub use custom_css::{CustomCssTarget, InnerElement};
pub use module::{wrapper_attributes, ModuleDescriptor, ModuleRegistry, WrapperAttributes};
pub use page::{ModuleInstance, PageDocument, PageRenderer, RenderedInstance, RenderedPage};
pub use resolver::{resolve, resolve_responsive, resolve_state};
pub use schema::{advanced_fields, FieldDefinition};
pub use stylesheet::{CssRule, Declaration, DeclarationBuckets, StyleSheet};
pub use typography::TypographyField;
pub use cli::EnhancedCli;

/// Compiler version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Compilation options and settings
#[derive(Debug, Clone, PartialEq)]
pub struct CompilerOptions {
    /// Enable debug logging of per-instance compile summaries
    pub debug_mode: bool,

    /// Prefix of keyframe names, animation classes and data attributes
    pub animation_prefix: String,

    /// Output layout of the generated CSS
    pub format: CssFormat,

    /// Prefix of generated instance ids, e.g. `tb4_module_3`
    pub id_prefix: String,

    /// Emit the full keyframe library at the top of each page
    pub include_keyframes: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            debug_mode: false,
            animation_prefix: DEFAULT_ANIMATION_PREFIX.to_string(),
            format: CssFormat::Standard,
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            include_keyframes: false,
        }
    }
}

/// Compilation statistics and metrics
#[derive(Debug, Clone, Default, Serialize)]
pub struct CompilationStats {
    /// Page document size in bytes
    pub source_size: u64,

    /// Generated CSS size in bytes
    pub output_size: u64,

    /// Number of modules compiled
    pub module_count: usize,

    /// Number of modules skipped for unknown types
    pub skipped_count: usize,

    /// Number of `@keyframes` blocks emitted
    pub keyframes_count: usize,

    /// Compilation time in milliseconds
    pub compile_time_ms: u64,
}

/// Compile a page document file to a stylesheet with default options
pub fn compile_page_file(input_path: &str, output_path: &str) -> Result<CompilationStats> {
    compile_page_file_with_options(input_path, output_path, CompilerOptions::default())
}

/// Compile with custom options
pub fn compile_page_file_with_options(
    input_path: &str,
    output_path: &str,
    options: CompilerOptions,
) -> Result<CompilationStats> {
    let start_time = Instant::now();

    if options.debug_mode {
        log::info!("{} v{}", NAME, VERSION);
        log::info!("Compiling '{}' to '{}'...", input_path, output_path);
        log::debug!("Compiler options: {:?}", options);
    }

    if !Path::new(input_path).exists() {
        return Err(CompilerError::FileNotFound {
            path: input_path.to_string(),
        });
    }
    let source = fs::read_to_string(input_path)?;

    let (rendered, mut stats) = compile_page_source(&source, options.clone())
        .map_err(|e| match e {
            CompilerError::Json(json) => CompilerError::page(input_path, json.to_string()),
            other => other,
        })?;

    fs::write(output_path, &rendered.css)?;
    stats.compile_time_ms = start_time.elapsed().as_millis() as u64;

    if options.debug_mode {
        log::info!("Compilation successful!");
        log::info!("Modules: {} ({} skipped)", stats.module_count, stats.skipped_count);
        log::info!("Output size: {} bytes", stats.output_size);
        log::debug!("Full stats: {:?}", stats);
    }

    Ok(stats)
}

/// Compile page document JSON with the built-in module registry
pub fn compile_page_source(source: &str, options: CompilerOptions) -> Result<(RenderedPage, CompilationStats)> {
    let start_time = Instant::now();
    let page = PageDocument::from_str(source)?;

    if options.debug_mode {
        log::debug!("Page has {} modules", page.modules.len());
    }

    let rendered = PageRenderer::new(ModuleRegistry::builtin(), options).render(&page);
    let stats = CompilationStats {
        source_size: source.len() as u64,
        output_size: rendered.css.len() as u64,
        module_count: rendered.instances.len(),
        skipped_count: rendered.skipped.len(),
        keyframes_count: rendered.css.matches("@keyframes ").count(),
        compile_time_ms: start_time.elapsed().as_millis() as u64,
    };

    Ok((rendered, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PAGE: &str = r#"{
        "modules": [
            { "type": "text", "design": { "margin": { "desktop": { "bottom": "24px" } } } },
            { "type": "button", "advanced": { "visibility": { "phone": false }, "animation": { "type": "pulse" } } }
        ]
    }"#;

    #[test]
    fn test_compiler_options_default() {
        let options = CompilerOptions::default();
        assert!(!options.debug_mode);
        assert_eq!(options.animation_prefix, "tb4");
        assert_eq!(options.format, CssFormat::Standard);
        assert_eq!(options.id_prefix, "tb4");
        assert!(!options.include_keyframes);
    }

    #[test]
    fn test_compile_page_source() {
        let (rendered, stats) = compile_page_source(PAGE, CompilerOptions::default()).unwrap();
        assert_eq!(stats.module_count, 2);
        assert_eq!(stats.keyframes_count, 1);
        assert!(rendered.css.contains("#tb4_module_1 { margin: 0 0 24px 0;"));
        assert!(rendered
            .css
            .contains("@media (max-width: 767px) { #tb4_module_2 { display: none !important; } }"));
    }

    #[test]
    fn test_compile_page_file() {
        let temp_dir = TempDir::new().unwrap();
        let input_path = temp_dir.path().join("page.json");
        let output_path = temp_dir.path().join("page.css");
        fs::write(&input_path, PAGE).unwrap();

        let options = CompilerOptions {
            debug_mode: true,
            include_keyframes: true,
            ..CompilerOptions::default()
        };
        let stats = compile_page_file_with_options(
            input_path.to_str().unwrap(),
            output_path.to_str().unwrap(),
            options,
        )
        .unwrap();

        let css = fs::read_to_string(&output_path).unwrap();
        assert_eq!(stats.output_size, css.len() as u64);
        assert_eq!(stats.keyframes_count, AnimationKind::ALL.len());
        assert!(css.starts_with("@keyframes tb4-fade"));
    }

    #[test]
    fn test_invalid_page_reports_file() {
        let temp_dir = TempDir::new().unwrap();
        let input_path = temp_dir.path().join("broken.json");
        fs::write(&input_path, "{ not json").unwrap();

        let err = compile_page_file(input_path.to_str().unwrap(), "/dev/null").unwrap_err();
        assert!(matches!(err, CompilerError::Page { .. }));
        assert!(err.to_string().contains("broken.json"));

        assert!(matches!(
            compile_page_file("/nonexistent/page.json", "/dev/null"),
            Err(CompilerError::FileNotFound { .. })
        ));
    }
}
