//! Template rendering functionality for stencil, backed by MiniJinja.
//! The environment runs with strict undefined behavior so that a template
//! referencing a missing context key fails instead of printing nothing.

use crate::error::{Error, Result};
use minijinja::{Environment, UndefinedBehavior};

/// Engine options honored from the context's `_jinja2_env_vars` mapping.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub trim_blocks: bool,
    pub lstrip_blocks: bool,
    pub keep_trailing_newline: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { trim_blocks: false, lstrip_blocks: false, keep_trailing_newline: true }
    }
}

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Renders a one-off template string with the given context.
    ///
    /// # Arguments
    /// * `template` - Template string to render
    /// * `context` - Context variables for rendering
    ///
    /// # Returns
    /// * `Result<String>` - Rendered template string
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String>;

    /// Renders template source under a name, so engine diagnostics point
    /// at the originating file rather than an anonymous string.
    fn render_named(
        &self,
        name: &str,
        source: &str,
        context: &serde_json::Value,
    ) -> Result<String>;
}

/// MiniJinja-based template rendering engine.
pub struct MiniJinjaRenderer {
    /// MiniJinja environment instance
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    /// Creates a new renderer with default options.
    pub fn new() -> Self {
        Self::with_options(RenderOptions::default())
    }

    /// Creates a renderer honoring the given engine options.
    pub fn with_options(options: RenderOptions) -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_trim_blocks(options.trim_blocks);
        env.set_lstrip_blocks(options.lstrip_blocks);
        env.set_keep_trailing_newline(options.keep_trailing_newline);
        env.add_filter("snake_case", |value: String| cruet::to_snake_case(&value));
        env.add_filter("camel_case", |value: String| cruet::to_camel_case(&value));
        env.add_filter("pascal_case", |value: String| cruet::to_pascal_case(&value));
        env.add_filter("kebab_case", |value: String| cruet::to_kebab_case(&value));
        env.add_filter("title_case", |value: String| cruet::to_title_case(&value));
        Self { env }
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        MiniJinjaRenderer::new()
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    /// Renders a template string using MiniJinja.
    ///
    /// # Errors
    /// * `Error::UndefinedVariable` if the template references a missing key
    /// * `Error::TemplateSyntax` for any other engine failure
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String> {
        self.env.render_str(template, context).map_err(Error::from_render)
    }

    fn render_named(
        &self,
        name: &str,
        source: &str,
        context: &serde_json::Value,
    ) -> Result<String> {
        self.env
            .render_named_str(name, source, context)
            .map_err(Error::from_render)
    }
}
