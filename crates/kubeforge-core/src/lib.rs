//! Kubeforge Core - document engine for Kubernetes manifests
//!
//! This crate provides:
//! - `Resource`: the typed model of every supported manifest kind
//! - `codec`: canonical YAML serialization and kind-dispatched parsing
//! - `Validator`: structural schema checks and best-practice warnings
//! - `GraphBuilder`: inferred relationships between resources, laid out in layers
//! - `templates`: fresh default resources per kind

// The per-kind schema literals nest deeper than the default `json!` limit
#![recursion_limit = "256"]

pub mod codec;
pub mod config;
pub mod error;
pub mod graph;
pub mod model;
pub mod suggestions;
pub mod templates;
pub mod validate;

pub use codec::{parse_resource, parse_resources, to_yaml, to_yaml_all};
pub use config::{ForgeConfig, LayoutConfig, LintConfig};
pub use error::{CoreError, Result};
pub use graph::{EdgeType, GraphBuilder, GraphEdge, GraphNode, ResourceGraph, build_graph};
pub use model::{Kind, Resource};
pub use validate::{Rule, ValidationErrorInfo, ValidationResult, Validator};
