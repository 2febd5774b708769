//! CLI error types with exit code handling
//!
//! Every command returns [`Result`]; `main` renders the error through miette
//! and exits with the code of its variant.

use kubeforge_core::CoreError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// At least one document failed validation
    #[error("Validation failed with {errors} error(s) and {warnings} warning(s)")]
    #[diagnostic(code(kubeforge::cli::validation))]
    ValidationFailed {
        errors: usize,
        warnings: usize,
        #[help]
        help: Option<String>,
    },

    /// Input could not be read as manifests
    #[error("{message}")]
    #[diagnostic(code(kubeforge::cli::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Invalid arguments
    #[error("{message}")]
    #[diagnostic(code(kubeforge::cli::usage))]
    Usage {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("IO error: {message}")]
    #[diagnostic(code(kubeforge::cli::io))]
    Io { message: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(kubeforge::cli::config))]
    Config { message: String },

    #[error("{message}")]
    #[diagnostic(code(kubeforge::cli::error))]
    Other { message: String },
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::ValidationFailed { .. } => exit_codes::VALIDATION_ERROR,
            CliError::Parse { .. } => exit_codes::PARSE_ERROR,
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Config { .. } | CliError::Other { .. } => exit_codes::ERROR,
        }
    }

    pub fn validation_failed(errors: usize, warnings: usize, strict: bool) -> Self {
        let help = (strict && errors == 0)
            .then(|| "warnings count as failures in strict mode".to_string());
        Self::ValidationFailed {
            errors,
            warnings,
            help,
        }
    }

    pub fn usage(message: impl Into<String>, help: Option<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help,
        }
    }

    /// Prefix the message with the input it came from
    pub fn in_file(self, file: &str) -> Self {
        match self {
            CliError::Parse { message, help } => CliError::Parse {
                message: format!("{}: {}", file, message),
                help,
            },
            CliError::Io { message } => CliError::Io {
                message: format!("{}: {}", file, message),
            },
            other => other,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Other {
            message: format!("Failed to encode JSON: {}", err),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::UnknownKind {
                suggestion: Some(ref s),
                ..
            } => CliError::Parse {
                message,
                help: Some(format!("did you mean `{}`?", s)),
            },
            CoreError::MissingKind { .. } => CliError::Parse {
                message,
                help: Some("every document needs a `kind` field, e.g. `kind: Deployment`".to_string()),
            },
            CoreError::YamlParse(_)
            | CoreError::JsonParse(_)
            | CoreError::UnknownKind { .. }
            | CoreError::InvalidResource { .. }
            | CoreError::DocumentCount { .. } => CliError::Parse {
                message,
                help: None,
            },
            CoreError::DuplicateNode { .. } => CliError::Parse {
                message,
                help: Some("resource names must be unique per kind and namespace".to_string()),
            },
            CoreError::InvalidConfig { .. } => CliError::Config { message },
            CoreError::Io(_) => CliError::Io { message },
            CoreError::SecretDecode { .. } | CoreError::InvalidSchema { .. } => {
                CliError::Other { message }
            }
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
