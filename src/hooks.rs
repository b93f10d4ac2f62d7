//! Pre and post generation hook execution.
//! Hooks are optional scripts in the template repository's `hooks/`
//! directory, resolved by name with any extension:
//! - hooks/pre_gen_project.*
//! - hooks/post_gen_project.*

use crate::context::Context;
use crate::error::{Error, Result};
use log::debug;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

pub const PRE_GEN_HOOK: &str = "pre_gen_project";
pub const POST_GEN_HOOK: &str = "post_gen_project";

/// Payload serialized to the hook's stdin.
#[derive(Serialize)]
pub struct HookPayload<'a> {
    pub template_dir: &'a str,
    pub project_dir: &'a str,
    pub context: &'a serde_json::Value,
}

/// Finds the hook script for `hook_name` inside `<repo_dir>/hooks`.
/// Any extension is accepted; editor backups (`*~`) are not hooks.
pub fn find_hook(repo_dir: &Path, hook_name: &str) -> Option<PathBuf> {
    let hooks_dir = repo_dir.join("hooks");
    let entries = std::fs::read_dir(hooks_dir).ok()?;
    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            let stem = path.file_stem().and_then(|s| s.to_str());
            !name.ends_with('~') && (name == hook_name || stem == Some(hook_name))
        })
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

/// Runs a named hook if the template ships one; absence is a no-op.
///
/// The script is resolved against the template repository and executed
/// with the generated project directory as its working directory; the
/// full context arrives as JSON on stdin. The caller owns any cleanup on
/// failure - this function only reports it.
pub fn run_hook(
    repo_dir: &Path,
    hook_name: &str,
    project_dir: &Path,
    context: &Context,
) -> Result<()> {
    let Some(script_path) = find_hook(repo_dir, hook_name) else {
        debug!("No {} hook found, skipping", hook_name);
        return Ok(());
    };

    ensure_runnable(&script_path, hook_name)?;

    debug!("Running {} hook from {}", hook_name, script_path.display());

    let template_dir = repo_dir.display().to_string();
    let project_dir_text = project_dir.display().to_string();
    let payload = HookPayload {
        template_dir: &template_dir,
        project_dir: &project_dir_text,
        context: context.render_context(),
    };
    let payload = serde_json::to_string(&payload).map_err(|e| Error::Hook {
        hook: hook_name.to_string(),
        reason: format!("failed to serialize context: {}", e),
    })?;

    let mut child = Command::new(&script_path)
        .current_dir(project_dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| spawn_error(hook_name, &script_path, e))?;

    if let Some(mut stdin) = child.stdin.take() {
        // A hook that never reads stdin closes the pipe early.
        if let Err(e) = stdin.write_all(payload.as_bytes()) {
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(Error::Io(e));
            }
        }
    }

    let status = child.wait()?;
    if !status.success() {
        return Err(Error::Hook {
            hook: hook_name.to_string(),
            reason: format!("script exited with {}", status),
        });
    }
    Ok(())
}

/// An empty file has no shebang to dispatch on; surface that before the
/// spawn turns it into an opaque OS error.
fn ensure_runnable(script_path: &Path, hook_name: &str) -> Result<()> {
    let metadata = std::fs::metadata(script_path)?;
    if metadata.len() == 0 {
        return Err(Error::Hook {
            hook: hook_name.to_string(),
            reason: format!(
                "script '{}' is empty, nothing to execute (missing shebang line?)",
                script_path.display()
            ),
        });
    }
    Ok(())
}

fn spawn_error(hook_name: &str, script_path: &Path, err: std::io::Error) -> Error {
    const ENOEXEC: i32 = 8;
    let reason = if err.raw_os_error() == Some(ENOEXEC) {
        format!(
            "the OS cannot execute '{}', check its shebang line",
            script_path.display()
        )
    } else {
        format!("failed to spawn '{}': {}", script_path.display(), err)
    };
    Error::Hook { hook: hook_name.to_string(), reason }
}
