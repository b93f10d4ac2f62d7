//! Context operators, applied before generation.
//! A context value shaped as `{"type": "<operator>", ...}` is replaced by
//! the named operator's output. Dispatch goes through a registration table
//! built once at process start.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use std::process::Command;

/// Uniform contract implemented by every operator.
pub trait Operator {
    /// Executes the operator against its argument mapping and the context
    /// resolved so far, returning the value stored under the key.
    fn execute(&self, args: &serde_json::Map<String, Value>, context: &Value) -> Result<Value>;
}

/// Registration table mapping type tags to operator implementations.
pub struct OperatorRegistry {
    table: HashMap<&'static str, Box<dyn Operator>>,
}

impl OperatorRegistry {
    /// The built-in operator set.
    pub fn builtin() -> Self {
        let mut table: HashMap<&'static str, Box<dyn Operator>> = HashMap::new();
        table.insert("command", Box::new(CommandOperator));
        table.insert("listdir", Box::new(ListdirOperator));
        table.insert("json", Box::new(JsonOperator));
        Self { table }
    }

    pub fn get(&self, kind: &str) -> Option<&dyn Operator> {
        self.table.get(kind).map(|operator| operator.as_ref())
    }

    /// Replaces every operator-tagged value in `raw` with its output.
    /// Keys run in document order, so earlier results are visible to
    /// later operators through the growing context.
    pub fn apply(
        &self,
        raw: IndexMap<String, Value>,
    ) -> Result<IndexMap<String, Value>> {
        let mut resolved = IndexMap::new();
        for (key, value) in raw {
            let output = match &value {
                Value::Object(args) => match args.get("type").and_then(Value::as_str) {
                    Some(kind) => {
                        let operator = self.get(kind).ok_or_else(|| {
                            Error::Config(format!(
                                "unknown operator type '{}' for key '{}'",
                                kind, key
                            ))
                        })?;
                        let context = serde_json::to_value(&resolved)
                            .map_err(|e| Error::Config(e.to_string()))?;
                        Some(operator.execute(args, &context)?)
                    }
                    None => None,
                },
                _ => None,
            };
            resolved.insert(key, output.unwrap_or(value));
        }
        Ok(resolved)
    }
}

/// Runs a shell command and returns its captured stdout.
struct CommandOperator;

impl Operator for CommandOperator {
    fn execute(&self, args: &serde_json::Map<String, Value>, _context: &Value) -> Result<Value> {
        let command = args.get("command").and_then(Value::as_str).ok_or_else(|| {
            Error::Config("'command' operator requires a 'command' string".to_string())
        })?;
        let output = shell(command).output()?;
        if !output.status.success() {
            return Err(Error::Config(format!(
                "command '{}' failed: {}",
                command,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(Value::String(String::from_utf8_lossy(&output.stdout).to_string()))
    }
}

#[cfg(unix)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

/// Lists the contents of a directory.
///
/// Arguments: `path` (required), `sort` and `ignore_hidden_files`
/// (optional booleans).
struct ListdirOperator;

impl Operator for ListdirOperator {
    fn execute(&self, args: &serde_json::Map<String, Value>, _context: &Value) -> Result<Value> {
        let path = args.get("path").and_then(Value::as_str).ok_or_else(|| {
            Error::Config("'listdir' operator requires a 'path' string".to_string())
        })?;
        let sort = args.get("sort").and_then(Value::as_bool).unwrap_or(false);
        let ignore_hidden =
            args.get("ignore_hidden_files").and_then(Value::as_bool).unwrap_or(false);

        let mut names = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if ignore_hidden && name.starts_with('.') {
                continue;
            }
            names.push(name);
        }
        if sort {
            names.sort();
        }
        Ok(Value::Array(names.into_iter().map(Value::String).collect()))
    }
}

/// Writes `contents` to `path` as JSON, or reads `path` when no contents
/// are given.
struct JsonOperator;

impl Operator for JsonOperator {
    fn execute(&self, args: &serde_json::Map<String, Value>, _context: &Value) -> Result<Value> {
        let path = args.get("path").and_then(Value::as_str).ok_or_else(|| {
            Error::Config("'json' operator requires a 'path' string".to_string())
        })?;
        match args.get("contents") {
            Some(contents) => {
                let rendered = serde_json::to_string_pretty(contents)
                    .map_err(|e| Error::Config(e.to_string()))?;
                std::fs::write(path, rendered)?;
                Ok(contents.clone())
            }
            None => {
                let content = std::fs::read_to_string(path)?;
                serde_json::from_str(&content)
                    .map_err(|e| Error::Config(format!("invalid JSON in '{}': {}", path, e)))
            }
        }
    }
}
