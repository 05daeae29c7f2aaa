//! Error types for deployment.

use thiserror::Error;

/// Errors that can occur while provisioning a host.
#[derive(Debug, Error)]
pub enum DeployError {
    /// ssh binary not found in PATH.
    #[error("ssh not found in PATH")]
    SshNotFound,

    /// A remote command exited with a failure status.
    #[error("remote command failed: {command}\n{stderr}")]
    CommandFailed {
        /// The command as issued.
        command: String,
        /// Captured standard error.
        stderr: String,
    },

    /// A config template failed to render.
    #[error("template error: {0}")]
    Template(String),

    /// Reading user input failed.
    #[error("prompt error: {0}")]
    Prompt(String),

    /// The operator interrupted a prompt.
    #[error("aborted by user")]
    Aborted,

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for deployment operations.
pub type Result<T> = std::result::Result<T, DeployError>;

impl From<handlebars::RenderError> for DeployError {
    fn from(e: handlebars::RenderError) -> Self {
        DeployError::Template(e.to_string())
    }
}

impl From<handlebars::TemplateError> for DeployError {
    fn from(e: handlebars::TemplateError) -> Self {
        DeployError::Template(e.to_string())
    }
}

impl From<rustyline::error::ReadlineError> for DeployError {
    fn from(e: rustyline::error::ReadlineError) -> Self {
        match e {
            rustyline::error::ReadlineError::Interrupted | rustyline::error::ReadlineError::Eof => {
                DeployError::Aborted
            }
            other => DeployError::Prompt(other.to_string()),
        }
    }
}
