//! Relationship graph
//!
//! Infers typed edges between resources from selectors and by-name
//! references, then lays the nodes out in layers (ingress, services and
//! autoscalers, workloads, configuration and storage).
//!
//! References are matched by name or label equality only; namespaces are
//! not compared. A reference that resolves to nothing produces no edge.

pub mod layout;
pub mod refs;

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use crate::config::LayoutConfig;
use crate::error::{CoreError, Result};
use crate::model::{Kind, Resource};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    /// `<Kind>/<namespace>/<name>`
    pub id: String,
    pub resource_type: Kind,
    pub resource: Resource,
    pub namespace: String,
    pub layer: u32,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeType {
    Selector,
    IngressBackend,
    ConfigmapRef,
    SecretRef,
    PvcRef,
    HpaTarget,
}

impl EdgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::Selector => "selector",
            EdgeType::IngressBackend => "ingress-backend",
            EdgeType::ConfigmapRef => "configmap-ref",
            EdgeType::SecretRef => "secret-ref",
            EdgeType::PvcRef => "pvc-ref",
            EdgeType::HpaTarget => "hpa-target",
        }
    }

    /// Edge type for a by-name reference to a resource of `kind`
    fn for_reference(kind: Kind) -> Option<Self> {
        match kind {
            Kind::ConfigMap => Some(EdgeType::ConfigmapRef),
            Kind::Secret => Some(EdgeType::SecretRef),
            Kind::PersistentVolumeClaim => Some(EdgeType::PvcRef),
            _ => None,
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub edge_type: EdgeType,
    pub description: String,
}

/// Nodes in input order and edges in discovery order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResourceGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl ResourceGraph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edges_from<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a GraphEdge> {
        self.edges.iter().filter(move |e| e.source == id)
    }

    pub fn edges_of_type(&self, edge_type: EdgeType) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(move |e| e.edge_type == edge_type)
    }
}

pub fn node_id(resource: &Resource) -> String {
    format!(
        "{}/{}/{}",
        resource.kind(),
        resource.namespace(),
        resource.name()
    )
}

/// Builds [`ResourceGraph`]s with a fixed layout
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    layout: LayoutConfig,
}

impl GraphBuilder {
    pub fn new(layout: LayoutConfig) -> Self {
        Self { layout }
    }

    /// Build the graph of `resources`
    ///
    /// Fails only when two resources share kind, namespace and name.
    pub fn build(&self, resources: &[Resource]) -> Result<ResourceGraph> {
        let mut nodes = Vec::with_capacity(resources.len());
        let mut ids = HashSet::new();
        for resource in resources {
            let id = node_id(resource);
            if !ids.insert(id.clone()) {
                return Err(CoreError::DuplicateNode { id });
            }
            nodes.push(GraphNode {
                id,
                resource_type: resource.kind(),
                resource: resource.clone(),
                namespace: resource.namespace().to_string(),
                layer: resource.kind().layer(),
                position: Position::default(),
            });
        }

        let mut edges = EdgeSet::default();
        for (index, resource) in resources.iter().enumerate() {
            let source = &nodes[index].id;
            match resource {
                Resource::Service(service) => {
                    let selector = service.spec.selector.as_ref();
                    for (target, workload) in resources.iter().enumerate() {
                        if !workload.kind().exposes_pod_labels() {
                            continue;
                        }
                        if let Some(selector) = selector.filter(|s| selects(s, workload)) {
                            edges.push(
                                EdgeType::Selector,
                                source,
                                &nodes[target].id,
                                describe_selector(selector),
                                "",
                            );
                        }
                    }
                }
                Resource::Ingress(ingress) => {
                    for rule in &ingress.spec.rules {
                        for path in rule.paths() {
                            let backend = &path.backend.service.name;
                            let Some(target) = find(resources, &[Kind::Service], backend) else {
                                tracing::debug!(ingress = %source, service = %backend, "unresolved ingress backend");
                                continue;
                            };
                            let suffix = format!("@{}{}", rule.host.as_deref().unwrap_or(""), path.path);
                            edges.push(
                                EdgeType::IngressBackend,
                                source,
                                &nodes[target].id,
                                path.path.clone(),
                                &suffix,
                            );
                        }
                    }
                    for tls in ingress.spec.tls.iter().flatten() {
                        let Some(secret) = tls.secret_name.as_deref() else {
                            continue;
                        };
                        match find(resources, &[Kind::Secret], secret) {
                            Some(target) => edges.push(
                                EdgeType::SecretRef,
                                source,
                                &nodes[target].id,
                                "tls".to_string(),
                                "",
                            ),
                            None => {
                                tracing::debug!(ingress = %source, secret, "unresolved tls secret")
                            }
                        }
                    }
                }
                Resource::HorizontalPodAutoscaler(hpa) => {
                    let target_ref = &hpa.spec.scale_target_ref;
                    let kind = match target_ref.kind.parse::<Kind>() {
                        Ok(kind @ (Kind::Deployment | Kind::StatefulSet)) => Some(kind),
                        _ => None,
                    };
                    match kind.and_then(|k| find(resources, &[k], &target_ref.name)) {
                        Some(target) => edges.push(
                            EdgeType::HpaTarget,
                            source,
                            &nodes[target].id,
                            format!(
                                "{}-{} replicas",
                                hpa.spec.min_replicas.unwrap_or(1),
                                hpa.spec.max_replicas
                            ),
                            "",
                        ),
                        None => tracing::debug!(
                            hpa = %source,
                            target = %format!("{}/{}", target_ref.kind, target_ref.name),
                            "unresolved scale target"
                        ),
                    }
                }
                _ => {}
            }

            if let Some(pod) = resource.pod_spec() {
                for reference in refs::pod_references(pod) {
                    let Some(edge_type) = EdgeType::for_reference(reference.kind) else {
                        continue;
                    };
                    match find(resources, &[reference.kind], &reference.name) {
                        Some(target) => edges.push(
                            edge_type,
                            source,
                            &nodes[target].id,
                            reference.via,
                            "",
                        ),
                        None => tracing::debug!(
                            workload = %source,
                            kind = %reference.kind,
                            name = %reference.name,
                            "unresolved reference"
                        ),
                    }
                }
            }
        }

        layout::assign_positions(&mut nodes, &self.layout);

        let edges = edges.into_vec();
        tracing::debug!(nodes = nodes.len(), edges = edges.len(), "built resource graph");
        Ok(ResourceGraph { nodes, edges })
    }
}

/// Build a graph with the default layout
pub fn build_graph(resources: &[Resource]) -> Result<ResourceGraph> {
    GraphBuilder::default().build(resources)
}

/// Edges keyed by id, first occurrence wins
#[derive(Default)]
struct EdgeSet {
    edges: IndexMap<String, GraphEdge>,
}

impl EdgeSet {
    fn push(
        &mut self,
        edge_type: EdgeType,
        source: &str,
        target: &str,
        description: String,
        suffix: &str,
    ) {
        let id = format!("{}:{}->{}{}", edge_type, source, target, suffix);
        if self.edges.contains_key(&id) {
            return;
        }
        self.edges.insert(
            id.clone(),
            GraphEdge {
                id,
                source: source.to_string(),
                target: target.to_string(),
                edge_type,
                description,
            },
        );
    }

    fn into_vec(self) -> Vec<GraphEdge> {
        self.edges.into_values().collect()
    }
}

/// Whether a non-empty `selector` is a subset of the workload's pod labels
fn selects(selector: &IndexMap<String, String>, workload: &Resource) -> bool {
    let Some(labels) = workload.pod_template_labels() else {
        return false;
    };
    !selector.is_empty() && selector.iter().all(|(k, v)| labels.get(k) == Some(v))
}

fn describe_selector(selector: &IndexMap<String, String>) -> String {
    selector
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}

/// Index of the first resource of one of `kinds` named `name`
fn find(resources: &[Resource], kinds: &[Kind], name: &str) -> Option<usize> {
    resources
        .iter()
        .position(|r| kinds.contains(&r.kind()) && r.name() == name)
}
