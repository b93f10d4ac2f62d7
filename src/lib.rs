//! Stencil is a project-scaffolding engine: given a template directory
//! tree with templated names and contents plus a key-value context, it
//! materializes a concrete project directory, running optional pre/post
//! generation hooks along the way.

/// Command-line interface module for the stencil application
pub mod cli;

/// Context-file discovery and parsing
/// Supports JSON and YAML formats (stencil.json, stencil.yml, stencil.yaml)
pub mod config;

/// The generation context and its reserved keys
pub mod context;

/// Error types and handling for the stencil application
pub mod error;

/// Core file-tree generation
/// Walks the template tree and materializes the output project
pub mod generate;

/// Pre and post generation hook execution
/// Handles execution of scripts in:
/// - hooks/pre_gen_project
/// - hooks/post_gen_project
pub mod hooks;

/// Context operators, applied before generation
pub mod operators;

/// Template rendering backed by MiniJinja
pub mod renderer;
