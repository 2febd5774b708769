//! Resource validation
//!
//! Validation runs in three independent layers:
//! - [`schema`]: per-kind JSON Schema checks producing hard errors
//! - [`consistency`]: cross-field checks producing hard errors
//! - [`heuristics`]: best-practice checks producing warnings
//!
//! Issues are returned as data; a failing resource is never a Rust error.
//! Documents of an unknown kind are accepted with a single warning.

pub mod consistency;
pub mod heuristics;
pub mod schema;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

use crate::config::LintConfig;
use crate::error::{CoreError, Result};
use crate::model::{Kind, Resource};
use crate::suggestions;

pub use schema::SchemaRegistry;

/// Identifies the check that produced an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Rule {
    Schema,
    Consistency,
    UnknownKind,
    MissingLabels,
    MissingAppLabel,
    MissingResourceLimits,
    MissingResourceRequests,
    MissingProbes,
    LatestImageTag,
    UntaggedImage,
    SingleReplica,
    LoadBalancerCost,
    MissingIngressClass,
}

impl Rule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::Schema => "schema",
            Rule::Consistency => "consistency",
            Rule::UnknownKind => "unknownKind",
            Rule::MissingLabels => "missingLabels",
            Rule::MissingAppLabel => "missingAppLabel",
            Rule::MissingResourceLimits => "missingResourceLimits",
            Rule::MissingResourceRequests => "missingResourceRequests",
            Rule::MissingProbes => "missingProbes",
            Rule::LatestImageTag => "latestImageTag",
            Rule::UntaggedImage => "untaggedImage",
            Rule::SingleReplica => "singleReplica",
            Rule::LoadBalancerCost => "loadBalancerCost",
            Rule::MissingIngressClass => "missingIngressClass",
        }
    }

    /// Structural rules produce errors and cannot be disabled
    pub fn is_structural(&self) -> bool {
        matches!(self, Rule::Schema | Rule::Consistency)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validation issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationErrorInfo {
    pub rule: Rule,
    /// Dot/bracket field path, `(root)` for the document itself
    pub path: String,
    pub message: String,
}

impl ValidationErrorInfo {
    pub fn new(rule: Rule, path: String, message: String) -> Self {
        let path = if path.is_empty() {
            "(root)".to_string()
        } else {
            path
        };
        Self {
            rule,
            path,
            message,
        }
    }
}

impl fmt::Display for ValidationErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} [{}]", self.path, self.message, self.rule)
    }
}

/// Outcome of validating one resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// `true` iff `errors` is empty; warnings never affect it
    pub valid: bool,
    pub errors: Vec<ValidationErrorInfo>,
    pub warnings: Vec<ValidationErrorInfo>,
}

impl ValidationResult {
    fn new(errors: Vec<ValidationErrorInfo>, warnings: Vec<ValidationErrorInfo>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// No errors and no warnings
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// Validator with compiled schemas
pub struct Validator {
    schemas: SchemaRegistry,
    disabled: Vec<Rule>,
}

impl Validator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            schemas: SchemaRegistry::new()?,
            disabled: Vec::new(),
        })
    }

    /// A validator that drops warnings of the rules `config` disables
    pub fn with_config(config: &LintConfig) -> Result<Self> {
        config.check()?;
        Ok(Self {
            schemas: SchemaRegistry::new()?,
            disabled: config.disabled_rules.clone(),
        })
    }

    /// Validate a typed resource
    pub fn validate(&self, resource: &Resource) -> ValidationResult {
        match serde_json::to_value(resource) {
            Ok(document) => self.validate_document(&document),
            Err(e) => ValidationResult::new(
                vec![ValidationErrorInfo::new(
                    Rule::Schema,
                    String::new(),
                    format!("resource cannot be represented as a document: {}", e),
                )],
                Vec::new(),
            ),
        }
    }

    /// Validate a loosely-typed document as parsed from YAML
    pub fn validate_document(&self, document: &JsonValue) -> ValidationResult {
        let kind = match document_kind(document) {
            Ok(kind) => kind,
            Err(warning) => {
                tracing::debug!(reason = %warning.message, "skipping schema checks");
                return ValidationResult::new(Vec::new(), self.enabled(vec![warning]));
            }
        };

        let mut errors = self.schemas.check(kind, document);
        errors.extend(consistency::check(kind, document));
        let warnings = self.enabled(heuristics::check(kind, document));

        tracing::debug!(
            kind = %kind,
            errors = errors.len(),
            warnings = warnings.len(),
            "validated document"
        );
        ValidationResult::new(errors, warnings)
    }

    fn enabled(&self, warnings: Vec<ValidationErrorInfo>) -> Vec<ValidationErrorInfo> {
        warnings
            .into_iter()
            .filter(|w| !self.disabled.contains(&w.rule))
            .collect()
    }
}

/// The document's kind, or the `unknownKind` warning to report instead
fn document_kind(document: &JsonValue) -> std::result::Result<Kind, ValidationErrorInfo> {
    let Some(name) = document.get("kind").and_then(JsonValue::as_str) else {
        return Err(ValidationErrorInfo::new(
            Rule::UnknownKind,
            "kind".to_string(),
            "document has no kind, structural checks were skipped".to_string(),
        ));
    };

    name.parse::<Kind>().map_err(|_| {
        let hint = suggestions::suggest_kind(name)
            .map(|s| format!(" (did you mean '{}'?)", s))
            .unwrap_or_default();
        ValidationErrorInfo::new(
            Rule::UnknownKind,
            "kind".to_string(),
            format!(
                "unknown kind '{}'{}, structural checks were skipped",
                name, hint
            ),
        )
    })
}

impl LintConfig {
    /// Reject configurations that try to silence structural rules
    pub fn check(&self) -> Result<()> {
        if let Some(rule) = self.disabled_rules.iter().find(|r| r.is_structural()) {
            return Err(CoreError::InvalidConfig {
                message: format!("rule '{}' reports errors and cannot be disabled", rule),
            });
        }
        Ok(())
    }
}
