//! Validate command - structural and best-practice checks on manifests

use console::style;
use kubeforge_core::{ForgeConfig, ValidationErrorInfo, Validator};
use serde::Serialize;
use std::path::PathBuf;

use crate::display::ValidationReport;
use crate::error::{CliError, Result};
use crate::util;

#[derive(Serialize)]
struct DocumentOutcome<'a> {
    file: &'a str,
    index: usize,
    kind: Option<&'a str>,
    name: Option<&'a str>,
    valid: bool,
    errors: &'a [ValidationErrorInfo],
    warnings: &'a [ValidationErrorInfo],
}

pub fn run(files: &[PathBuf], json_output: bool, strict: bool, config: &ForgeConfig) -> Result<()> {
    let strict = strict || config.lint.strict;
    let validator = Validator::with_config(&config.lint)?;
    let documents = util::load_documents(files)?;

    let results: Vec<_> = documents
        .iter()
        .map(|d| validator.validate_document(&d.document))
        .collect();

    let mut report = ValidationReport::new();
    for (doc, result) in documents.iter().zip(&results) {
        let source = format!("{}#{} {}", doc.file, doc.index, doc.label());
        report.add_document(&source, &result.errors, &result.warnings);
    }
    let (errors, warnings) = report.summary();
    let failed = errors > 0 || (strict && warnings > 0);

    if json_output {
        let outcomes: Vec<_> = documents
            .iter()
            .zip(&results)
            .map(|(doc, result)| DocumentOutcome {
                file: &doc.file,
                index: doc.index,
                kind: doc.document.get("kind").and_then(|k| k.as_str()),
                name: doc
                    .document
                    .pointer("/metadata/name")
                    .and_then(|n| n.as_str()),
                valid: result.valid,
                errors: &result.errors,
                warnings: &result.warnings,
            })
            .collect();
        let output = serde_json::json!({
            "valid": !failed,
            "documents": outcomes,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "{} Validating {} document(s) from {} input(s)",
            style("→").blue(),
            documents.len(),
            files.len()
        );
        report.display();
        println!();
        report.print_summary();
    }

    if failed {
        return Err(CliError::validation_failed(errors, warnings, strict));
    }
    Ok(())
}
