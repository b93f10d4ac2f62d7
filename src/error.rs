//! Error handling for the stencil application.
//! Defines the error types and results used throughout the application.

use std::io;
use thiserror::Error;

/// Error types for stencil operations.
///
/// Template-engine failures are split into two variants because they are
/// handled differently: a syntax error is a template authoring defect and
/// propagates as-is, while an undefined variable is a missing input value
/// and makes the orchestrator delete output it created during the run.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The template's top-level directory name carries no template markers
    #[error("template directory '{template_dir}' is not templated: its name must contain '{{{{' and '}}}}'")]
    NonTemplatedInput { template_dir: String },

    /// The target directory exists and overwriting was not requested
    #[error("'{output_dir}' directory already exists")]
    OutputDirExists { output_dir: String },

    /// Malformed template markup in a path or file. The engine error is
    /// kept as the source so line/column detail survives to the user.
    #[error("template syntax error: {source:#}")]
    TemplateSyntax {
        #[source]
        source: minijinja::Error,
    },

    /// A template referenced a context key that does not exist
    #[error("{message}: {source}")]
    UndefinedVariable {
        message: String,
        #[source]
        source: minijinja::Error,
    },

    /// A pre/post generation hook could not run or exited unsuccessfully
    #[error("hook '{hook}' failed: {reason}")]
    Hook { hook: String, reason: String },

    /// Represents errors in context files, patterns or operator usage
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Classifies a template-engine error: a strict-mode undefined lookup
    /// becomes `UndefinedVariable`, everything else `TemplateSyntax`.
    pub fn from_render(err: minijinja::Error) -> Self {
        match err.kind() {
            minijinja::ErrorKind::UndefinedError => Error::UndefinedVariable {
                message: "undefined variable".to_string(),
                source: err,
            },
            _ => Error::TemplateSyntax { source: err },
        }
    }

    /// Replaces the message of an undefined-variable error so it names the
    /// entry that failed; other variants pass through untouched.
    pub fn with_undefined_message(self, message: impl Into<String>) -> Self {
        match self {
            Error::UndefinedVariable { source, .. } => {
                Error::UndefinedVariable { message: message.into(), source }
            }
            other => other,
        }
    }

    /// Whether this failure class deletes a freshly-created output tree.
    pub fn triggers_cleanup(&self) -> bool {
        matches!(self, Error::UndefinedVariable { .. } | Error::Hook { .. })
    }
}

/// Convenience type alias for Results with stencil's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
pub fn default_error_handler(err: Error) {
    eprintln!("{}", err);
    std::process::exit(1);
}
