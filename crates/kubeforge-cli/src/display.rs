//! Display formatting for CLI output
//!
//! Provides structured display for:
//! - Validation issues grouped by document
//! - The relationship graph, layer by layer

use console::style;
use kubeforge_core::graph::layout;
use kubeforge_core::{Rule, ResourceGraph, ValidationErrorInfo};
use std::collections::BTreeMap;

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

/// A validation issue with location information
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub severity: Severity,
    /// Input file and document, e.g. `app.yaml#1 Deployment/web`
    pub source: String,
    pub rule: Rule,
    pub path: String,
    pub message: String,
}

/// Grouped validation results for display
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
    pub validated_count: usize,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one document
    pub fn add_document(
        &mut self,
        source: &str,
        errors: &[ValidationErrorInfo],
        warnings: &[ValidationErrorInfo],
    ) {
        self.validated_count += 1;
        let tagged = errors
            .iter()
            .map(|e| (Severity::Error, e))
            .chain(warnings.iter().map(|w| (Severity::Warning, w)));
        for (severity, info) in tagged {
            self.issues.push(ValidationIssue {
                severity,
                source: source.to_string(),
                rule: info.rule,
                path: info.path.clone(),
                message: info.message.clone(),
            });
        }
    }

    /// Display issues grouped by document
    pub fn display(&self) {
        let mut by_source: BTreeMap<&str, Vec<&ValidationIssue>> = BTreeMap::new();
        for issue in &self.issues {
            by_source.entry(&issue.source).or_default().push(issue);
        }

        for (source, issues) in by_source {
            println!();
            println!("{}", style(source).cyan().bold());

            for issue in issues {
                let icon = match issue.severity {
                    Severity::Error => style("✗").red(),
                    Severity::Warning => style("⚠").yellow(),
                };
                println!(
                    "  {} {} at {} {}",
                    icon,
                    issue.message,
                    style(&issue.path).dim(),
                    style(format!("[{}]", issue.rule)).dim()
                );
            }
        }
    }

    /// (errors, warnings)
    pub fn summary(&self) -> (usize, usize) {
        let errors = self
            .issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count();
        (errors, self.issues.len() - errors)
    }

    pub fn print_summary(&self) {
        let (errors, warnings) = self.summary();
        if errors > 0 {
            println!(
                "{} Validation failed: {} error(s), {} warning(s) in {} document(s)",
                style("✗").red().bold(),
                errors,
                warnings,
                self.validated_count
            );
        } else if warnings > 0 {
            println!(
                "{} Validation passed with {} warning(s) in {} document(s)",
                style("⚠").yellow().bold(),
                warnings,
                self.validated_count
            );
        } else {
            println!(
                "{} Validation passed! {} document(s)",
                style("✓").green().bold(),
                self.validated_count
            );
        }
    }
}

fn layer_title(layer: u32) -> &'static str {
    match layer {
        0 => "ingress",
        1 => "services",
        2 => "workloads",
        _ => "config & storage",
    }
}

/// Print nodes layer by layer, each followed by its outgoing edges
pub fn print_graph(graph: &ResourceGraph) {
    for (layer, ids) in layout::layers(&graph.nodes) {
        println!(
            "{} {}",
            style(format!("Layer {}", layer)).cyan().bold(),
            style(format!("({})", layer_title(layer))).dim()
        );
        for id in ids {
            println!("  {}", style(id).bold());
            for edge in graph.edges_from(id) {
                println!(
                    "    {} {} {}",
                    style("→").blue(),
                    edge.target,
                    style(format!("[{}: {}]", edge.edge_type, edge.description)).dim()
                );
            }
        }
    }
    println!();
    println!(
        "{} {} node(s), {} edge(s)",
        style("✓").green().bold(),
        graph.nodes.len(),
        graph.edges.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(rule: Rule) -> ValidationErrorInfo {
        ValidationErrorInfo::new(rule, "spec".to_string(), "msg".to_string())
    }

    #[test]
    fn test_summary_counts() {
        let mut report = ValidationReport::new();
        report.add_document("a.yaml#0 Service/web", &[info(Rule::Schema)], &[]);
        report.add_document(
            "a.yaml#1 Deployment/web",
            &[],
            &[info(Rule::SingleReplica), info(Rule::MissingProbes)],
        );
        assert_eq!(report.summary(), (1, 2));
        assert_eq!(report.validated_count, 2);
        assert_eq!(report.issues[1].rule, Rule::SingleReplica);
    }
}
