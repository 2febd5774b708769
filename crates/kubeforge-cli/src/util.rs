//! Input helpers shared by the commands

use std::io::Read;
use std::path::{Path, PathBuf};

use kubeforge_core::{Resource, codec};
use serde_json::Value as JsonValue;

use crate::error::{CliError, Result};

/// A manifest document together with where it came from
pub struct SourceDocument {
    pub file: String,
    pub index: usize,
    pub document: JsonValue,
}

impl SourceDocument {
    /// `Kind/name` as written in the document, with `?` for missing parts
    pub fn label(&self) -> String {
        let kind = self
            .document
            .get("kind")
            .and_then(JsonValue::as_str)
            .unwrap_or("?");
        let name = self
            .document
            .pointer("/metadata/name")
            .and_then(JsonValue::as_str)
            .unwrap_or("?");
        format!("{}/{}", kind, name)
    }
}

fn display_name(path: &Path) -> String {
    if is_stdin(path) {
        "<stdin>".to_string()
    } else {
        path.display().to_string()
    }
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Read a file, or standard input for `-`
pub fn read_input(path: &Path) -> Result<String> {
    let read = if is_stdin(path) {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).map(|_| text)
    } else {
        std::fs::read_to_string(path)
    };
    read.map_err(|e| CliError::from(e).in_file(&display_name(path)))
}

/// Every document of every input, in order
pub fn load_documents(files: &[PathBuf]) -> Result<Vec<SourceDocument>> {
    let mut documents = Vec::new();
    for path in files {
        let file = display_name(path);
        let text = read_input(path)?;
        let parsed = codec::parse_documents(&text)
            .map_err(|e| CliError::from(e).in_file(&file))?;
        documents.extend(
            parsed
                .into_iter()
                .enumerate()
                .map(|(index, document)| SourceDocument {
                    file: file.clone(),
                    index,
                    document,
                }),
        );
    }
    tracing::debug!(files = files.len(), documents = documents.len(), "loaded input");
    Ok(documents)
}

/// A resource adopted from an input document
pub struct LoadedResource {
    /// Input file and document, e.g. `app.yaml#1 Deployment/web`
    pub source: String,
    pub resource: Resource,
    /// Fields of the document the model does not carry
    pub dropped: Vec<String>,
}

/// Every resource of every input, adopted into the typed model
pub fn load_resources(files: &[PathBuf]) -> Result<Vec<LoadedResource>> {
    load_documents(files)?
        .into_iter()
        .map(|doc| {
            let source = format!("{}#{} {}", doc.file, doc.index, doc.label());
            let (resource, dropped) = codec::adopt_reporting(doc.index, doc.document)
                .map_err(|e| CliError::from(e).in_file(&doc.file))?;
            Ok(LoadedResource {
                source,
                resource,
                dropped,
            })
        })
        .collect()
}
