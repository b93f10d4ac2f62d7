//! Context-file handling for stencil templates.
//! A template repository ships a context file next to its template root;
//! this module discovers it, parses it (JSON and YAML formats) and folds
//! stdin answers over its defaults.

use crate::context::DEFAULT_CONTEXT_KEY;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use log::debug;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Supported context file names, in probe order.
pub const CONTEXT_FILES: [&str; 3] = ["stencil.json", "stencil.yml", "stencil.yaml"];

/// Locates the context file within a template repository.
pub fn find_context_file(repo_dir: &Path) -> Option<PathBuf> {
    CONTEXT_FILES.iter().map(|name| repo_dir.join(name)).find(|path| path.exists())
}

/// The context key a context file defines: its stem, so `stencil.yaml`
/// namespaces its values under `stencil`.
pub fn context_key_of(context_file: &Path) -> String {
    context_file
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(DEFAULT_CONTEXT_KEY)
        .to_string()
}

/// Loads and parses a context file, preserving document key order.
pub fn load_context_file(path: &Path) -> Result<IndexMap<String, serde_json::Value>> {
    debug!("Loading context from {}", path.display());
    let content = std::fs::read_to_string(path)?;
    parse_context(&content)
}

/// Parses context content. JSON is tried first, then YAML.
pub fn parse_context(content: &str) -> Result<IndexMap<String, serde_json::Value>> {
    match serde_json::from_str(content) {
        Ok(value) => Ok(value),
        Err(_) => serde_yaml::from_str(content)
            .map_err(|e| Error::Config(format!("invalid context file format: {}", e))),
    }
}

/// Resolves raw defaults the way a non-interactive run answers prompts:
/// an answer wins over the document value, the first element of a list is
/// its default, and private keys (leading '_') pass through untouched.
pub fn resolve_defaults(
    raw: IndexMap<String, serde_json::Value>,
    answers: &serde_json::Value,
) -> IndexMap<String, serde_json::Value> {
    let mut resolved = IndexMap::new();
    for (key, value) in raw {
        if let Some(answer) = answers.get(&key) {
            resolved.insert(key, answer.clone());
            continue;
        }
        let value = match value {
            serde_json::Value::Array(items) if !key.starts_with('_') => {
                items.into_iter().next().unwrap_or(serde_json::Value::Null)
            }
            other => other,
        };
        resolved.insert(key, value);
    }
    resolved
}

/// Reads a JSON mapping of answers from stdin (`--stdin`).
pub fn read_stdin_answers() -> Result<serde_json::Value> {
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    if buffer.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }
    serde_json::from_str(buffer.trim())
        .map_err(|e| Error::Config(format!("failed to parse stdin answers as JSON: {}", e)))
}
