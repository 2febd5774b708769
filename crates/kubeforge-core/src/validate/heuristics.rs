//! Best-practice checks
//!
//! Every check here produces warnings only. They run on the raw document
//! whether or not it passed the structural schema, and each one looks at
//! its own field so several may fire for the same resource.

use serde_json::Value as JsonValue;

use super::schema::pointer_to_path;
use super::{Rule, ValidationErrorInfo};
use crate::model::Kind;

const APP_LABELS: &[&str] = &["app", "app.kubernetes.io/name"];

pub fn check(kind: Kind, document: &JsonValue) -> Vec<ValidationErrorInfo> {
    let mut warnings = Vec::new();

    labels(document, &mut warnings);

    if let Some(pointer) = kind.pod_spec_pointer() {
        let base = pointer_to_path(pointer);
        let containers = document
            .pointer(pointer)
            .and_then(|pod| pod.get("containers"))
            .and_then(JsonValue::as_array);
        for (i, container) in containers.into_iter().flatten().enumerate() {
            container_checks(container, &format!("{}.containers[{}]", base, i), &mut warnings);
        }
    }

    match kind {
        Kind::Deployment | Kind::StatefulSet => {
            if document.pointer("/spec/replicas").and_then(JsonValue::as_i64) == Some(1) {
                warn(
                    &mut warnings,
                    Rule::SingleReplica,
                    "spec.replicas",
                    "a single replica has no redundancy during restarts or node failure",
                );
            }
        }
        Kind::Service => {
            if document.pointer("/spec/type").and_then(JsonValue::as_str) == Some("LoadBalancer") {
                warn(
                    &mut warnings,
                    Rule::LoadBalancerCost,
                    "spec.type",
                    "LoadBalancer services provision a cloud load balancer, which is billed separately",
                );
            }
        }
        Kind::Ingress => {
            let class = document
                .pointer("/spec/ingressClassName")
                .and_then(JsonValue::as_str);
            if class.is_none_or(str::is_empty) {
                warn(
                    &mut warnings,
                    Rule::MissingIngressClass,
                    "spec.ingressClassName",
                    "no ingressClassName set, the cluster default controller will be used",
                );
            }
        }
        _ => {}
    }

    tracing::trace!(kind = %kind, count = warnings.len(), "heuristic checks done");
    warnings
}

fn warn(warnings: &mut Vec<ValidationErrorInfo>, rule: Rule, path: impl Into<String>, message: &str) {
    warnings.push(ValidationErrorInfo::new(rule, path.into(), message.to_string()));
}

fn is_empty_or_missing(value: Option<&JsonValue>) -> bool {
    match value {
        None | Some(JsonValue::Null) => true,
        Some(JsonValue::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}

fn labels(document: &JsonValue, warnings: &mut Vec<ValidationErrorInfo>) {
    let labels = document.pointer("/metadata/labels");
    if is_empty_or_missing(labels) {
        warn(
            warnings,
            Rule::MissingLabels,
            "metadata.labels",
            "resource has no labels",
        );
    }

    let has_app_label = labels
        .and_then(JsonValue::as_object)
        .is_some_and(|map| APP_LABELS.iter().any(|key| map.contains_key(*key)));
    if !has_app_label {
        warn(
            warnings,
            Rule::MissingAppLabel,
            "metadata.labels",
            "add an 'app' or 'app.kubernetes.io/name' label so tools can group this resource",
        );
    }
}

fn container_checks(container: &JsonValue, path: &str, warnings: &mut Vec<ValidationErrorInfo>) {
    let name = container
        .get("name")
        .and_then(JsonValue::as_str)
        .unwrap_or("?");
    let resources = container.get("resources");

    if is_empty_or_missing(resources.and_then(|r| r.get("limits"))) {
        warn(
            warnings,
            Rule::MissingResourceLimits,
            format!("{}.resources.limits", path),
            &format!("container '{}' has no resource limits", name),
        );
    }
    if is_empty_or_missing(resources.and_then(|r| r.get("requests"))) {
        warn(
            warnings,
            Rule::MissingResourceRequests,
            format!("{}.resources.requests", path),
            &format!("container '{}' has no resource requests", name),
        );
    }
    let has_probe = |key: &str| container.get(key).is_some_and(|v| !v.is_null());
    if !has_probe("livenessProbe") && !has_probe("readinessProbe") {
        warn(
            warnings,
            Rule::MissingProbes,
            path,
            &format!("container '{}' has neither a liveness nor a readiness probe", name),
        );
    }

    if let Some(image) = container.get("image").and_then(JsonValue::as_str) {
        match image_tag(image) {
            ImageTag::Latest => warn(
                warnings,
                Rule::LatestImageTag,
                format!("{}.image", path),
                &format!("image '{}' uses the mutable 'latest' tag", image),
            ),
            ImageTag::Missing => warn(
                warnings,
                Rule::UntaggedImage,
                format!("{}.image", path),
                &format!("image '{}' has no tag and resolves to 'latest'", image),
            ),
            ImageTag::Pinned => {}
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum ImageTag {
    Pinned,
    Latest,
    Missing,
}

/// Classify an image reference. A digest counts as pinned; the tag is a
/// `:` after the last `/`, so registry ports are not mistaken for tags.
fn image_tag(image: &str) -> ImageTag {
    if image.contains('@') {
        return ImageTag::Pinned;
    }
    let last = image.rsplit('/').next().unwrap_or(image);
    match last.split_once(':') {
        Some((_, "latest")) => ImageTag::Latest,
        Some((_, tag)) if !tag.is_empty() => ImageTag::Pinned,
        _ => ImageTag::Missing,
    }
}
