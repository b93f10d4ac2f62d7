//! Core file-tree generation.
//! Walks a template tree top-down and materializes the output project:
//! every path and text file is rendered, copy-only entries and binary
//! files are copied verbatim, and hooks run around the walk. If a render
//! step fails on a missing input value, output created by this run is
//! deleted wholesale so no partial tree is left behind.

use crate::context::Context;
use crate::error::{Error, Result};
use crate::hooks::{self, POST_GEN_HOOK, PRE_GEN_HOOK};
use crate::renderer::{MiniJinjaRenderer, TemplateRenderer};
use content_inspector::ContentType;
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Flags steering a generation run.
#[derive(Debug, Clone, Copy)]
pub struct GenerateFlags {
    /// Reuse the output directory when it already exists
    pub overwrite_if_exists: bool,
    /// Leave files that already exist in the output untouched
    pub skip_if_file_exists: bool,
    /// Execute pre/post generation hooks
    pub accept_hooks: bool,
}

impl Default for GenerateFlags {
    fn default() -> Self {
        Self { overwrite_if_exists: false, skip_if_file_exists: false, accept_hooks: true }
    }
}

/// Outcome of materializing a single file.
#[derive(Debug, PartialEq, Eq)]
pub enum FileOutcome {
    /// The file was written (rendered or copied) at the given path.
    Written(PathBuf),
    /// Nothing was written: the rendered name resolved to a directory, or
    /// the target already exists and skip-if-exists is on.
    Skipped,
}

/// Locates the template root inside a repository: the top-level directory
/// whose name carries template markers.
///
/// When no directory carries markers, a lone candidate (non-`hooks`)
/// directory is taken as the intended root and fails the templated-name
/// precondition downstream. `Ok(None)` means there is no tree to render
/// at all and generation degenerates to hooks-only mode.
pub fn find_template_root(repo_dir: &Path) -> Result<Option<PathBuf>> {
    let mut candidates = Vec::new();
    for entry in fs::read_dir(repo_dir)? {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name == "hooks" {
            continue;
        }
        candidates.push((name, entry.path()));
    }
    candidates.sort();

    if let Some((_, path)) = candidates.iter().find(|(name, _)| is_templated_name(name)) {
        return Ok(Some(path.clone()));
    }
    match candidates.as_slice() {
        [(_, path)] => Ok(Some(path.clone())),
        _ => Ok(None),
    }
}

/// Ensures that `dirname` is a templated directory name.
pub fn ensure_dir_is_templated(dirname: &str) -> Result<()> {
    if is_templated_name(dirname) {
        Ok(())
    } else {
        Err(Error::NonTemplatedInput { template_dir: dirname.to_string() })
    }
}

fn is_templated_name(name: &str) -> bool {
    name.contains("{{") && name.contains("}}")
}

/// Renders a directory name and creates the directory under `output_dir`.
///
/// Returns the concrete path and whether creation actually happened; the
/// flag gates whether failure cleanup may delete the directory later.
pub fn render_and_create_dir(
    dirname: &str,
    context: &Context,
    renderer: &dyn TemplateRenderer,
    output_dir: &Path,
    overwrite_if_exists: bool,
) -> Result<(PathBuf, bool)> {
    let rendered = renderer.render(dirname, context.render_context())?;
    let dir_to_create = output_dir.join(rendered);

    debug!("Rendered dir name '{}' as {}", dirname, dir_to_create.display());

    let existed = dir_to_create.exists();
    if existed {
        if !overwrite_if_exists {
            return Err(Error::OutputDirExists {
                output_dir: dir_to_create.display().to_string(),
            });
        }
        debug!("Output directory {} already exists, overwriting it", dir_to_create.display());
    } else {
        fs::create_dir_all(&dir_to_create)?;
    }
    Ok((dir_to_create, !existed))
}

/// Materializes one file: renders its output path, then either copies the
/// bytes verbatim (binary input) or renders the content, reproducing the
/// source file's line-ending convention and permission bits.
pub fn generate_file(
    project_dir: &Path,
    template_dir: &Path,
    infile: &Path,
    context: &Context,
    renderer: &dyn TemplateRenderer,
    skip_if_file_exists: bool,
) -> Result<FileOutcome> {
    let infile_text = normalize_path(infile);
    debug!("Processing file {}", infile_text);

    // The output path is resolved before any content is touched.
    let outfile_rel = renderer.render(&infile_text, context.render_context())?;
    let outfile = project_dir.join(outfile_rel);

    if outfile.is_dir() {
        debug!("The resulting file name is empty: {}", outfile.display());
        return Ok(FileOutcome::Skipped);
    }
    if skip_if_file_exists && outfile.exists() {
        debug!("The resulting file already exists: {}", outfile.display());
        return Ok(FileOutcome::Skipped);
    }

    let source_path = template_dir.join(infile);
    let raw = fs::read(&source_path)?;

    let sample_len = raw.len().min(8192);
    if content_inspector::inspect(&raw[..sample_len]) == ContentType::BINARY {
        debug!("Copying binary {} to {} without rendering", infile_text, outfile.display());
        fs::write(&outfile, &raw)?;
        copy_permissions(&source_path, &outfile)?;
        return Ok(FileOutcome::Written(outfile));
    }

    let text = match String::from_utf8(raw) {
        Ok(text) => text,
        Err(err) => {
            // Sniffing missed it: not valid text after all, copy the bytes.
            debug!("Copying non-text {} to {} without rendering", infile_text, outfile.display());
            fs::write(&outfile, err.as_bytes())?;
            copy_permissions(&source_path, &outfile)?;
            return Ok(FileOutcome::Written(outfile));
        }
    };

    // The source's convention from its first line, unless overridden.
    let newline = match context.new_lines() {
        Some(newline) => Some(newline.to_string()),
        None => detect_newline(&text).map(str::to_string),
    };

    let normalized = text.replace("\r\n", "\n");
    let rendered = renderer.render_named(&infile_text, &normalized, context.render_context())?;
    let output = match newline.as_deref() {
        Some(newline) if newline != "\n" => rendered.replace('\n', newline),
        _ => rendered,
    };

    debug!("Writing contents to file {}", outfile.display());
    fs::write(&outfile, output)?;
    copy_permissions(&source_path, &outfile)?;
    Ok(FileOutcome::Written(outfile))
}

/// Line-ending convention of the first line; `None` when the file has no
/// newline at all.
fn detect_newline(text: &str) -> Option<&'static str> {
    let first = text.find('\n')?;
    if text[..first].ends_with('\r') {
        Some("\r\n")
    } else {
        Some("\n")
    }
}

fn copy_permissions(source: &Path, target: &Path) -> Result<()> {
    let permissions = fs::metadata(source)?.permissions();
    fs::set_permissions(target, permissions)?;
    Ok(())
}

/// Template-root-relative path as forward-slash text; template lookup and
/// glob matching both want POSIX-style separators.
fn normalize_path(path: &Path) -> String {
    path.iter().map(|part| part.to_string_lossy()).collect::<Vec<_>>().join("/")
}

/// Verbatim copy of an entire subtree; nothing beneath is rendered.
fn copy_dir_all(source: &Path, target: &Path) -> Result<()> {
    for entry in WalkDir::new(source) {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        let rel = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| Error::Config(e.to_string()))?;
        let dest = target.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)?;
        } else {
            fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}

/// Processes one directory level: children are split into copy-only and
/// render-eligible sets, copy-only subtrees are copied wholesale, render
/// directories are created and recursed into, and files are materialized
/// last. Recursion receives the pre-filtered list of child directories,
/// so the walk never descends beneath a copy-only directory.
fn walk_level(
    rel_dir: &Path,
    template_dir: &Path,
    project_dir: &Path,
    context: &Context,
    renderer: &dyn TemplateRenderer,
    flags: GenerateFlags,
) -> Result<()> {
    let mut subdirs = Vec::new();
    let mut files = Vec::new();
    for entry in fs::read_dir(template_dir.join(rel_dir))? {
        let entry = entry?;
        let name = PathBuf::from(entry.file_name());
        if entry.path().is_dir() {
            subdirs.push(name);
        } else {
            files.push(name);
        }
    }
    // Deterministic traversal: a later collision on the same output path
    // resolves first-write-wins in this order.
    subdirs.sort();
    files.sort();

    let mut render_dirs = Vec::new();
    for dir_name in subdirs {
        let rel = rel_dir.join(&dir_name);
        let rel_text = normalize_path(&rel);
        if context.is_copy_only(&rel_text) {
            let outdir_rel = renderer
                .render(&rel_text, context.render_context())
                .map_err(|e| {
                    e.with_undefined_message(format!("unable to create directory '{}'", rel_text))
                })?;
            let outdir = project_dir.join(outdir_rel);
            debug!("Copying dir {} to {} without rendering", rel_text, outdir.display());
            copy_dir_all(&template_dir.join(&rel), &outdir)?;
        } else {
            render_dirs.push((rel, rel_text));
        }
    }

    for (_, rel_text) in &render_dirs {
        render_and_create_dir(rel_text, context, renderer, project_dir, flags.overwrite_if_exists)
            .map_err(|e| {
                e.with_undefined_message(format!("unable to create directory '{}'", rel_text))
            })?;
    }

    for (rel, _) in &render_dirs {
        walk_level(rel, template_dir, project_dir, context, renderer, flags)?;
    }

    for file_name in files {
        let rel = rel_dir.join(&file_name);
        let rel_text = normalize_path(&rel);
        if context.is_copy_only(&rel_text) {
            let outfile_rel = renderer
                .render(&rel_text, context.render_context())
                .map_err(|e| {
                    e.with_undefined_message(format!("unable to create file '{}'", rel_text))
                })?;
            let outfile = project_dir.join(outfile_rel);
            debug!("Copying file {} to {} without rendering", rel_text, outfile.display());
            fs::copy(template_dir.join(&rel), &outfile)?;
            continue;
        }
        generate_file(
            project_dir,
            template_dir,
            &rel,
            context,
            renderer,
            flags.skip_if_file_exists,
        )
        .map_err(|e| e.with_undefined_message(format!("unable to create file '{}'", rel_text)))?;
    }

    Ok(())
}

/// Generates a project from a template repository.
///
/// Returns the generated project path, or `None` when the repository has
/// no template tree (hooks still run in that case, with `.` standing in
/// for both directories).
///
/// # Errors
/// * `Error::NonTemplatedInput` if the template root's name has no markers
/// * `Error::OutputDirExists` if the target exists without overwrite
/// * `Error::TemplateSyntax` on malformed markup, leaving output in place
/// * `Error::UndefinedVariable` on a missing input value, after deleting
///   any output directory this run created
/// * `Error::Hook` when a hook fails, with the same conditional cleanup
pub fn generate_files(
    repo_dir: &Path,
    context: &Context,
    output_dir: &Path,
    flags: GenerateFlags,
) -> Result<Option<PathBuf>> {
    let Some(template_dir) = find_template_root(repo_dir)? else {
        debug!("No project directory will be created");
        if flags.accept_hooks {
            run_hook_guarded(repo_dir, PRE_GEN_HOOK, Path::new("."), context, false)?;
            run_hook_guarded(repo_dir, POST_GEN_HOOK, Path::new("."), context, false)?;
        }
        return Ok(None);
    };

    let unrendered_dir = template_dir
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            Error::Config(format!(
                "invalid template directory name under '{}'",
                repo_dir.display()
            ))
        })?
        .to_string();
    ensure_dir_is_templated(&unrendered_dir)?;

    let renderer = MiniJinjaRenderer::with_options(context.render_options());

    let (project_dir, created) = render_and_create_dir(
        &unrendered_dir,
        context,
        &renderer,
        output_dir,
        flags.overwrite_if_exists,
    )
    .map_err(|e| {
        e.with_undefined_message(format!(
            "unable to create project directory '{}'",
            unrendered_dir
        ))
    })?;

    debug!("Project directory is {}", project_dir.display());

    // Output created by this run may be removed when generation fails;
    // a pre-existing directory never is.
    let delete_project_on_failure = created;

    if flags.accept_hooks {
        run_hook_guarded(repo_dir, PRE_GEN_HOOK, &project_dir, context, delete_project_on_failure)?;
    }

    if let Err(err) = walk_level(
        Path::new(""),
        &template_dir,
        &project_dir,
        context,
        &renderer,
        flags,
    ) {
        if delete_project_on_failure && err.triggers_cleanup() {
            remove_tree(&project_dir);
        }
        return Err(err);
    }

    if flags.accept_hooks {
        run_hook_guarded(
            repo_dir,
            POST_GEN_HOOK,
            &project_dir,
            context,
            delete_project_on_failure,
        )?;
    }

    debug!("Resulting project directory created at {}", project_dir.display());
    Ok(Some(project_dir))
}

/// Runs a hook; when it fails and this run owns the output directory, the
/// generated tree is deleted before the error propagates.
fn run_hook_guarded(
    repo_dir: &Path,
    hook_name: &str,
    project_dir: &Path,
    context: &Context,
    delete_project_on_failure: bool,
) -> Result<()> {
    if let Err(err) = hooks::run_hook(repo_dir, hook_name, project_dir, context) {
        if delete_project_on_failure {
            remove_tree(project_dir);
        }
        warn!("Stopping generation because {} hook script didn't exit successfully", hook_name);
        return Err(err);
    }
    Ok(())
}

fn remove_tree(path: &Path) {
    if let Err(err) = fs::remove_dir_all(path) {
        warn!("Failed to clean up '{}': {}", path.display(), err);
    }
}
