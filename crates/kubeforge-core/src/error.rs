//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to convert document: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Document {index} has no `kind` field")]
    MissingKind { index: usize },

    #[error("Document {index} has unsupported kind '{kind}'{}", hint(.suggestion))]
    UnknownKind {
        index: usize,
        kind: String,
        suggestion: Option<String>,
    },

    #[error("Document {index} is not a valid {kind}: {message}")]
    InvalidResource {
        index: usize,
        kind: String,
        message: String,
    },

    #[error("Expected exactly one document, found {count}")]
    DocumentCount { count: usize },

    #[error("Duplicate graph node '{id}': two resources share kind, namespace and name")]
    DuplicateNode { id: String },

    #[error("Invalid base64 in secret key '{key}': {message}")]
    SecretDecode { key: String, message: String },

    #[error("Invalid schema for {kind}: {message}")]
    InvalidSchema { kind: String, message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean `{}`?)", s),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_kind_message_with_suggestion() {
        let err = CoreError::UnknownKind {
            index: 0,
            kind: "Deploymnet".to_string(),
            suggestion: Some("Deployment".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Document 0 has unsupported kind 'Deploymnet' (did you mean `Deployment`?)"
        );
    }

    #[test]
    fn test_unknown_kind_message_without_suggestion() {
        let err = CoreError::UnknownKind {
            index: 2,
            kind: "Widget".to_string(),
            suggestion: None,
        };
        assert_eq!(err.to_string(), "Document 2 has unsupported kind 'Widget'");
    }
}
