//! Stencil's main application entry point and orchestration logic.
//! Handles command-line argument parsing and coordinates context loading,
//! operator application and project generation.

use std::path::{Path, PathBuf};

use stencil::{
    cli::{get_args, Args},
    config,
    context::Context,
    error::{default_error_handler, Error, Result},
    generate::{generate_files, GenerateFlags},
    operators::OperatorRegistry,
};

/// Main application entry point.
fn main() {
    let args = get_args();

    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Resolves the template repository path. Template acquisition beyond a
/// local directory (cloning, checkout) is not stencil's concern.
fn resolve_template_dir(template: &Path) -> Result<PathBuf> {
    if !template.exists() {
        return Err(Error::Config(format!(
            "template path '{}' does not exist",
            template.display()
        )));
    }
    Ok(template.to_path_buf())
}

/// Main application logic execution.
///
/// # Flow
/// 1. Resolves the template repository
/// 2. Loads the context file and derives the context key
/// 3. Overlays stdin answers, applies operators, resolves defaults
/// 4. Generates the project tree (hooks included unless disabled)
fn run(args: Args) -> Result<()> {
    let repo_dir = resolve_template_dir(&args.template)?;

    let context_file = config::find_context_file(&repo_dir).ok_or_else(|| {
        Error::Config(format!(
            "no context file found in '{}' (tried: {})",
            repo_dir.display(),
            config::CONTEXT_FILES.join(", ")
        ))
    })?;
    let context_key = config::context_key_of(&context_file);
    let raw = config::load_context_file(&context_file)?;

    let answers =
        if args.stdin { config::read_stdin_answers()? } else { serde_json::Value::Null };

    let registry = OperatorRegistry::builtin();
    let augmented = registry.apply(raw)?;
    let resolved = config::resolve_defaults(augmented, &answers);

    let mut input = serde_json::Map::new();
    input.insert(
        context_key.clone(),
        serde_json::to_value(resolved).map_err(|e| Error::Config(e.to_string()))?,
    );
    let context = Context::new(serde_json::Value::Object(input), &context_key)?;

    let flags = GenerateFlags {
        overwrite_if_exists: args.force,
        skip_if_file_exists: args.skip_if_file_exists,
        accept_hooks: !args.no_hooks,
    };

    match generate_files(&repo_dir, &context, &args.output_dir, flags)? {
        Some(project_dir) => {
            println!("Project generated in {}.", project_dir.display())
        }
        None => println!("No project directory was created (hooks-only template)."),
    }
    Ok(())
}
