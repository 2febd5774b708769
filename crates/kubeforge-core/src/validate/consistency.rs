//! Cross-field checks that JSON Schema cannot express

use std::collections::HashSet;

use serde_json::Value as JsonValue;

use super::schema::{pointer_to_path, push_segment};
use super::{Rule, ValidationErrorInfo};
use crate::model::{Kind, is_base64};

const CRON_MACROS: &[&str] = &[
    "@yearly",
    "@annually",
    "@monthly",
    "@weekly",
    "@daily",
    "@midnight",
    "@hourly",
];

pub fn check(kind: Kind, document: &JsonValue) -> Vec<ValidationErrorInfo> {
    let mut errors = Vec::new();

    if kind.exposes_pod_labels() {
        selector_matches_template(document, &mut errors);
    }
    if let Some(pointer) = kind.pod_spec_pointer() {
        if let Some(pod) = document.pointer(pointer) {
            pod_spec(pod, &pointer_to_path(pointer), &mut errors);
        }
    }

    match kind {
        Kind::CronJob => cron_schedule(document, &mut errors),
        Kind::HorizontalPodAutoscaler => replica_bounds(document, &mut errors),
        Kind::Secret => secret_data(document, &mut errors),
        _ => {}
    }

    errors
}

fn error(errors: &mut Vec<ValidationErrorInfo>, path: String, message: String) {
    errors.push(ValidationErrorInfo::new(Rule::Consistency, path, message));
}

fn selector_matches_template(document: &JsonValue, errors: &mut Vec<ValidationErrorInfo>) {
    let Some(selector) = document
        .pointer("/spec/selector/matchLabels")
        .and_then(JsonValue::as_object)
    else {
        return;
    };
    let labels = document.pointer("/spec/template/metadata/labels");

    for (key, value) in selector {
        if labels.and_then(|l| l.get(key)) != Some(value) {
            let mut path = "spec.selector.matchLabels".to_string();
            push_segment(&mut path, key);
            error(
                errors,
                path,
                format!(
                    "selector {}={} does not match the pod template labels",
                    key,
                    value.as_str().unwrap_or_default()
                ),
            );
        }
    }
}

fn pod_spec(pod: &JsonValue, base: &str, errors: &mut Vec<ValidationErrorInfo>) {
    let volumes: HashSet<&str> = pod
        .get("volumes")
        .and_then(JsonValue::as_array)
        .into_iter()
        .flatten()
        .filter_map(|v| v.get("name").and_then(JsonValue::as_str))
        .collect();

    let mut names = HashSet::new();
    for field in ["containers", "initContainers"] {
        let Some(containers) = pod.get(field).and_then(JsonValue::as_array) else {
            continue;
        };
        for (i, container) in containers.iter().enumerate() {
            let path = format!("{}.{}[{}]", base, field, i);

            if let Some(name) = container.get("name").and_then(JsonValue::as_str) {
                if !names.insert(name) {
                    error(
                        errors,
                        format!("{}.name", path),
                        format!("container name '{}' is used more than once", name),
                    );
                }
            }

            let mounts = container
                .get("volumeMounts")
                .and_then(JsonValue::as_array)
                .into_iter()
                .flatten();
            for (j, mount) in mounts.enumerate() {
                let Some(name) = mount.get("name").and_then(JsonValue::as_str) else {
                    continue;
                };
                if !volumes.contains(name) {
                    error(
                        errors,
                        format!("{}.volumeMounts[{}].name", path, j),
                        format!("volume mount '{}' does not name a pod volume", name),
                    );
                }
            }
        }
    }
}

fn cron_schedule(document: &JsonValue, errors: &mut Vec<ValidationErrorInfo>) {
    let Some(schedule) = document.pointer("/spec/schedule").and_then(JsonValue::as_str) else {
        return;
    };
    let schedule = schedule.trim();
    if CRON_MACROS.contains(&schedule) {
        return;
    }
    let fields = schedule.split_whitespace().count();
    if fields != 5 {
        error(
            errors,
            "spec.schedule".to_string(),
            format!("schedule '{}' has {} fields, expected 5", schedule, fields),
        );
    }
}

fn replica_bounds(document: &JsonValue, errors: &mut Vec<ValidationErrorInfo>) {
    let min = document.pointer("/spec/minReplicas").and_then(JsonValue::as_i64);
    let max = document.pointer("/spec/maxReplicas").and_then(JsonValue::as_i64);
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            error(
                errors,
                "spec.minReplicas".to_string(),
                format!("minReplicas ({}) is greater than maxReplicas ({})", min, max),
            );
        }
    }
}

fn secret_data(document: &JsonValue, errors: &mut Vec<ValidationErrorInfo>) {
    let Some(data) = document.get("data").and_then(JsonValue::as_object) else {
        return;
    };
    for (key, value) in data {
        if value.as_str().is_some_and(|v| !is_base64(v)) {
            let mut path = "data".to_string();
            push_segment(&mut path, key);
            error(
                errors,
                path,
                format!("value of '{}' is not valid base64", key),
            );
        }
    }
}
