//! The generation context: a key-value mapping rooted under a single
//! context key, plus the reserved sub-keys that steer the walk.
//!
//! Reserved sub-keys:
//! - `_copy_without_render`: glob patterns for paths that are copied
//!   verbatim instead of rendered
//! - `_new_lines`: forces a line-ending style on all rendered output
//! - `_jinja2_env_vars`: engine options, named for Jinja2 compatibility

use crate::error::{Error, Result};
use crate::renderer::RenderOptions;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

pub const COPY_WITHOUT_RENDER_KEY: &str = "_copy_without_render";
pub const NEW_LINES_KEY: &str = "_new_lines";
pub const ENV_VARS_KEY: &str = "_jinja2_env_vars";

/// The context key used when none is configured.
pub const DEFAULT_CONTEXT_KEY: &str = "stencil";

/// Immutable-during-generation context mapping.
///
/// Templates address values as `{{ <context_key>.<name> }}`, so the input
/// mapping must carry the context key at its top level; construction fails
/// otherwise. Copy-only glob patterns are compiled once here, before any
/// filesystem mutation.
pub struct Context {
    input: serde_json::Value,
    context_key: String,
    copy_globs: GlobSet,
}

impl Context {
    pub fn new(input: serde_json::Value, context_key: &str) -> Result<Self> {
        let values = input.get(context_key).ok_or_else(|| {
            Error::Config(format!(
                "context key '{}' is missing from the input mapping",
                context_key
            ))
        })?;
        let copy_globs = build_copy_globs(values)?;
        Ok(Self { input, context_key: context_key.to_string(), copy_globs })
    }

    pub fn context_key(&self) -> &str {
        &self.context_key
    }

    /// The full input mapping, rooted under the context key. This is also
    /// the render context handed to the template engine.
    pub fn render_context(&self) -> &serde_json::Value {
        &self.input
    }

    fn values(&self) -> &serde_json::Value {
        &self.input[self.context_key.as_str()]
    }

    /// Whether `path` is copied verbatim instead of rendered. `path` is
    /// the normalized, template-root-relative path text; matching happens
    /// against the unrendered form, once per candidate entry.
    pub fn is_copy_only(&self, path: &str) -> bool {
        self.copy_globs.is_match(path)
    }

    /// The `_new_lines` override, when configured.
    pub fn new_lines(&self) -> Option<&str> {
        self.values().get(NEW_LINES_KEY).and_then(|value| value.as_str())
    }

    /// Engine options from `_jinja2_env_vars`; defaults when absent.
    pub fn render_options(&self) -> RenderOptions {
        let mut options = RenderOptions::default();
        if let Some(vars) = self.values().get(ENV_VARS_KEY).and_then(|value| value.as_object()) {
            if let Some(flag) = vars.get("trim_blocks").and_then(|value| value.as_bool()) {
                options.trim_blocks = flag;
            }
            if let Some(flag) = vars.get("lstrip_blocks").and_then(|value| value.as_bool()) {
                options.lstrip_blocks = flag;
            }
            if let Some(flag) =
                vars.get("keep_trailing_newline").and_then(|value| value.as_bool())
            {
                options.keep_trailing_newline = flag;
            }
        }
        options
    }
}

/// Compiles `_copy_without_render` into a glob set. An absent key means no
/// exclusions; a malformed pattern is a configuration error.
fn build_copy_globs(values: &serde_json::Value) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    if let Some(patterns) = values.get(COPY_WITHOUT_RENDER_KEY).and_then(|value| value.as_array())
    {
        for pattern in patterns {
            let pattern = pattern.as_str().ok_or_else(|| {
                Error::Config(format!(
                    "'{}' patterns must be strings, got: {}",
                    COPY_WITHOUT_RENDER_KEY, pattern
                ))
            })?;
            let glob = GlobBuilder::new(&escape_template_markers(pattern))
                // fnmatch semantics: '*' and '?' cross path separators
                .literal_separator(false)
                .backslash_escape(true)
                .build()
                .map_err(|e| {
                    Error::Config(format!(
                        "invalid '{}' pattern '{}': {}",
                        COPY_WITHOUT_RENDER_KEY, pattern, e
                    ))
                })?;
            builder.add(glob);
        }
    }
    builder
        .build()
        .map_err(|e| Error::Config(format!("invalid '{}' patterns: {}", COPY_WITHOUT_RENDER_KEY, e)))
}

/// Patterns match the literal unrendered path, so `{` and `}` are escaped:
/// globset would otherwise read `{{name}}` as a nested alternation.
fn escape_template_markers(pattern: &str) -> String {
    pattern.replace('{', "\\{").replace('}', "\\}")
}
