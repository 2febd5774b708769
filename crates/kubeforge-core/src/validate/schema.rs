//! Structural schemas
//!
//! One JSON Schema (draft 7) document per [`Kind`]. Documents are built once
//! and compiled by [`SchemaRegistry`]; only the fields this crate models are
//! constrained, anything else a manifest carries is accepted as-is.

use indexmap::IndexMap;
use jsonschema::error::ValidationErrorKind;
use once_cell::sync::Lazy;
use serde_json::{Value as JsonValue, json};

use super::{Rule, ValidationErrorInfo};
use crate::error::{CoreError, Result};
use crate::model::Kind;

const DNS_SUBDOMAIN: &str = r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$";
const DNS_LABEL: &str = r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$";
const QUANTITY: &str = r"^(\+|-)?(([0-9]+(\.[0-9]*)?)|(\.[0-9]+))(([KMGTPE]i)|[numkMGTPE]|([eE](\+|-)?(([0-9]+(\.[0-9]*)?)|(\.[0-9]+))))?$";

static DEFINITIONS: Lazy<IndexMap<Kind, JsonValue>> =
    Lazy::new(|| Kind::ALL.iter().map(|&k| (k, build_definition(k))).collect());

/// The raw schema document for `kind`
pub fn definition(kind: Kind) -> &'static JsonValue {
    &DEFINITIONS[&kind]
}

/// Compiled schemas for every supported kind
pub struct SchemaRegistry {
    compiled: IndexMap<Kind, jsonschema::Validator>,
}

impl SchemaRegistry {
    pub fn new() -> Result<Self> {
        let mut compiled = IndexMap::new();
        for kind in Kind::ALL {
            let validator = jsonschema::validator_for(definition(kind)).map_err(|e| {
                CoreError::InvalidSchema {
                    kind: kind.to_string(),
                    message: e.to_string(),
                }
            })?;
            compiled.insert(kind, validator);
        }
        tracing::debug!(count = compiled.len(), "compiled resource schemas");
        Ok(Self { compiled })
    }

    /// Every structural violation in `document`, in schema evaluation order
    pub fn check(&self, kind: Kind, document: &JsonValue) -> Vec<ValidationErrorInfo> {
        let Some(validator) = self.compiled.get(&kind) else {
            return Vec::new();
        };
        if validator.is_valid(document) {
            return Vec::new();
        }

        validator
            .iter_errors(document)
            .map(|e| {
                let mut path = pointer_to_path(&e.instance_path.to_string());
                if let ValidationErrorKind::Required { property } = &e.kind {
                    if let Some(property) = property.as_str() {
                        push_segment(&mut path, property);
                    }
                }
                ValidationErrorInfo::new(Rule::Schema, path, format_validation_error(&e))
            })
            .collect()
    }
}

fn format_validation_error(error: &jsonschema::ValidationError) -> String {
    error.to_string().replace('"', "'")
}

/// Convert a JSON pointer into dot/bracket notation
///
/// `/spec/template/spec/containers/0/image` becomes
/// `spec.template.spec.containers[0].image`. Keys that contain `.` or `/`
/// are written as `['key']`.
pub fn pointer_to_path(pointer: &str) -> String {
    let mut path = String::new();
    for segment in pointer.split('/').skip(1) {
        let segment = segment.replace("~1", "/").replace("~0", "~");
        if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
            path.push('[');
            path.push_str(&segment);
            path.push(']');
        } else {
            push_segment(&mut path, &segment);
        }
    }
    path
}

/// Append a mapping key to a dot/bracket path
pub fn push_segment(path: &mut String, key: &str) {
    if key.contains(['.', '/']) {
        path.push_str("['");
        path.push_str(key);
        path.push_str("']");
        return;
    }
    if !path.is_empty() {
        path.push('.');
    }
    path.push_str(key);
}

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

fn non_negative() -> JsonValue {
    json!({ "type": "integer", "minimum": 0 })
}

fn port() -> JsonValue {
    json!({ "type": "integer", "minimum": 1, "maximum": 65535 })
}

fn int_or_string_port() -> JsonValue {
    json!({ "anyOf": [port(), { "type": "string", "minLength": 1 }] })
}

fn string_map() -> JsonValue {
    json!({ "type": "object", "additionalProperties": { "type": "string" } })
}

fn quantity() -> JsonValue {
    json!({ "anyOf": [{ "type": "number" }, { "type": "string", "pattern": QUANTITY }] })
}

fn quantity_map() -> JsonValue {
    json!({ "type": "object", "additionalProperties": quantity() })
}

fn string_list() -> JsonValue {
    json!({ "type": "array", "items": { "type": "string" } })
}

fn protocol() -> JsonValue {
    json!({ "enum": ["TCP", "UDP", "SCTP"] })
}

fn metadata() -> JsonValue {
    json!({
        "type": "object",
        "required": ["name"],
        "properties": {
            "name": { "type": "string", "minLength": 1, "maxLength": 253, "pattern": DNS_SUBDOMAIN },
            "namespace": { "type": "string", "maxLength": 63, "pattern": DNS_LABEL },
            "labels": string_map(),
            "annotations": string_map()
        }
    })
}

fn key_selector() -> JsonValue {
    json!({
        "type": "object",
        "required": ["name", "key"],
        "properties": {
            "name": { "type": "string", "minLength": 1 },
            "key": { "type": "string", "minLength": 1 },
            "optional": { "type": "boolean" }
        }
    })
}

fn object_reference() -> JsonValue {
    json!({
        "type": "object",
        "required": ["name"],
        "properties": {
            "name": { "type": "string", "minLength": 1 },
            "optional": { "type": "boolean" }
        }
    })
}

fn probe() -> JsonValue {
    json!({
        "type": "object",
        "properties": {
            "httpGet": {
                "type": "object",
                "required": ["port"],
                "properties": {
                    "path": { "type": "string" },
                    "port": int_or_string_port(),
                    "scheme": { "enum": ["HTTP", "HTTPS"] }
                }
            },
            "tcpSocket": {
                "type": "object",
                "required": ["port"],
                "properties": { "port": int_or_string_port() }
            },
            "exec": {
                "type": "object",
                "required": ["command"],
                "properties": { "command": string_list() }
            },
            "initialDelaySeconds": non_negative(),
            "periodSeconds": { "type": "integer", "minimum": 1 },
            "timeoutSeconds": { "type": "integer", "minimum": 1 },
            "failureThreshold": { "type": "integer", "minimum": 1 },
            "successThreshold": { "type": "integer", "minimum": 1 }
        }
    })
}

fn container() -> JsonValue {
    json!({
        "type": "object",
        "required": ["name", "image"],
        "properties": {
            "name": { "type": "string", "maxLength": 63, "pattern": DNS_LABEL },
            "image": { "type": "string", "minLength": 1 },
            "imagePullPolicy": { "enum": ["Always", "IfNotPresent", "Never"] },
            "ports": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["containerPort"],
                    "properties": {
                        "name": { "type": "string", "maxLength": 15 },
                        "containerPort": port(),
                        "protocol": protocol()
                    }
                }
            },
            "resources": {
                "type": "object",
                "properties": {
                    "requests": quantity_map(),
                    "limits": quantity_map()
                }
            },
            "env": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["name"],
                    "not": { "required": ["value", "valueFrom"] },
                    "properties": {
                        "name": { "type": "string", "minLength": 1 },
                        "value": { "type": "string" },
                        "valueFrom": {
                            "type": "object",
                            "minProperties": 1,
                            "maxProperties": 1,
                            "properties": {
                                "configMapKeyRef": key_selector(),
                                "secretKeyRef": key_selector(),
                                "fieldRef": {
                                    "type": "object",
                                    "required": ["fieldPath"],
                                    "properties": { "fieldPath": { "type": "string" } }
                                }
                            }
                        }
                    }
                }
            },
            "envFrom": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "configMapRef": object_reference(),
                        "secretRef": object_reference(),
                        "prefix": { "type": "string" }
                    }
                }
            },
            "volumeMounts": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["name", "mountPath"],
                    "properties": {
                        "name": { "type": "string", "minLength": 1 },
                        "mountPath": { "type": "string", "minLength": 1 },
                        "subPath": { "type": "string" },
                        "readOnly": { "type": "boolean" }
                    }
                }
            },
            "command": string_list(),
            "args": string_list(),
            "livenessProbe": probe(),
            "readinessProbe": probe(),
            "startupProbe": probe()
        }
    })
}

fn volume() -> JsonValue {
    json!({
        "type": "object",
        "required": ["name"],
        "properties": {
            "name": { "type": "string", "maxLength": 63, "pattern": DNS_LABEL },
            "persistentVolumeClaim": {
                "type": "object",
                "required": ["claimName"],
                "properties": {
                    "claimName": { "type": "string", "minLength": 1 },
                    "readOnly": { "type": "boolean" }
                }
            },
            "configMap": object_reference(),
            "secret": {
                "type": "object",
                "required": ["secretName"],
                "properties": { "secretName": { "type": "string", "minLength": 1 } }
            },
            "emptyDir": { "type": "object" },
            "hostPath": {
                "type": "object",
                "required": ["path"],
                "properties": { "path": { "type": "string", "minLength": 1 } }
            }
        }
    })
}

fn pod_template(restart_policies: &[&str]) -> JsonValue {
    json!({
        "type": "object",
        "required": ["spec"],
        "properties": {
            "metadata": {
                "type": "object",
                "properties": { "labels": string_map(), "annotations": string_map() }
            },
            "spec": {
                "type": "object",
                "required": ["containers"],
                "properties": {
                    "serviceAccountName": { "type": "string" },
                    "restartPolicy": { "enum": restart_policies },
                    "containers": { "type": "array", "minItems": 1, "items": container() },
                    "initContainers": { "type": "array", "items": container() },
                    "volumes": { "type": "array", "items": volume() },
                    "nodeSelector": string_map()
                }
            }
        }
    })
}

fn selector() -> JsonValue {
    json!({
        "type": "object",
        "required": ["matchLabels"],
        "properties": {
            "matchLabels": { "type": "object", "minProperties": 1, "additionalProperties": { "type": "string" } }
        }
    })
}

fn job_spec() -> JsonValue {
    json!({
        "type": "object",
        "required": ["template"],
        "properties": {
            "completions": non_negative(),
            "parallelism": non_negative(),
            "backoffLimit": non_negative(),
            "template": pod_template(&["OnFailure", "Never"])
        }
    })
}

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

fn document(kind: Kind, body: JsonValue, required: &[&str]) -> JsonValue {
    let mut required_fields = vec!["apiVersion", "kind", "metadata"];
    required_fields.extend_from_slice(required);

    let mut properties = json!({
        "apiVersion": { "type": "string", "minLength": 1 },
        "kind": { "const": kind.as_str() },
        "metadata": metadata()
    });
    if let (Some(props), JsonValue::Object(extra)) = (properties.as_object_mut(), body) {
        props.extend(extra);
    }

    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": kind.as_str(),
        "type": "object",
        "required": required_fields,
        "properties": properties
    })
}

fn build_definition(kind: Kind) -> JsonValue {
    let always = ["Always"];
    match kind {
        Kind::Deployment => document(
            kind,
            json!({
                "spec": {
                    "type": "object",
                    "required": ["selector", "template"],
                    "properties": {
                        "replicas": non_negative(),
                        "selector": selector(),
                        "strategy": {
                            "type": "object",
                            "properties": { "type": { "enum": ["RollingUpdate", "Recreate"] } }
                        },
                        "template": pod_template(&always)
                    }
                }
            }),
            &["spec"],
        ),
        Kind::StatefulSet => document(
            kind,
            json!({
                "spec": {
                    "type": "object",
                    "required": ["selector", "template"],
                    "properties": {
                        "serviceName": { "type": "string" },
                        "replicas": non_negative(),
                        "selector": selector(),
                        "template": pod_template(&always)
                    }
                }
            }),
            &["spec"],
        ),
        Kind::DaemonSet => document(
            kind,
            json!({
                "spec": {
                    "type": "object",
                    "required": ["selector", "template"],
                    "properties": {
                        "selector": selector(),
                        "template": pod_template(&always)
                    }
                }
            }),
            &["spec"],
        ),
        Kind::Job => document(kind, json!({ "spec": job_spec() }), &["spec"]),
        Kind::CronJob => document(
            kind,
            json!({
                "spec": {
                    "type": "object",
                    "required": ["schedule", "jobTemplate"],
                    "properties": {
                        "schedule": { "type": "string", "minLength": 1 },
                        "concurrencyPolicy": { "enum": ["Allow", "Forbid", "Replace"] },
                        "suspend": { "type": "boolean" },
                        "jobTemplate": {
                            "type": "object",
                            "required": ["spec"],
                            "properties": { "spec": job_spec() }
                        }
                    }
                }
            }),
            &["spec"],
        ),
        Kind::Service => document(
            kind,
            json!({
                "spec": {
                    "type": "object",
                    "required": ["ports"],
                    "properties": {
                        "type": { "enum": ["ClusterIP", "NodePort", "LoadBalancer"] },
                        "selector": string_map(),
                        "ports": {
                            "type": "array",
                            "minItems": 1,
                            "items": {
                                "type": "object",
                                "required": ["port"],
                                "properties": {
                                    "name": { "type": "string" },
                                    "protocol": protocol(),
                                    "port": port(),
                                    "targetPort": int_or_string_port(),
                                    "nodePort": { "type": "integer", "minimum": 30000, "maximum": 32767 }
                                }
                            }
                        }
                    }
                }
            }),
            &["spec"],
        ),
        Kind::Ingress => document(
            kind,
            json!({
                "spec": {
                    "type": "object",
                    "properties": {
                        "ingressClassName": { "type": "string" },
                        "tls": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "hosts": string_list(),
                                    "secretName": { "type": "string" }
                                }
                            }
                        },
                        "rules": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "host": { "type": "string" },
                                    "http": {
                                        "type": "object",
                                        "required": ["paths"],
                                        "properties": {
                                            "paths": {
                                                "type": "array",
                                                "minItems": 1,
                                                "items": {
                                                    "type": "object",
                                                    "required": ["path", "pathType", "backend"],
                                                    "properties": {
                                                        "path": { "type": "string", "pattern": "^/" },
                                                        "pathType": { "enum": ["Exact", "Prefix", "ImplementationSpecific"] },
                                                        "backend": {
                                                            "type": "object",
                                                            "required": ["service"],
                                                            "properties": {
                                                                "service": {
                                                                    "type": "object",
                                                                    "required": ["name", "port"],
                                                                    "properties": {
                                                                        "name": { "type": "string", "minLength": 1 },
                                                                        "port": {
                                                                            "type": "object",
                                                                            "minProperties": 1,
                                                                            "properties": {
                                                                                "number": port(),
                                                                                "name": { "type": "string" }
                                                                            }
                                                                        }
                                                                    }
                                                                }
                                                            }
                                                        }
                                                    }
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }),
            &["spec"],
        ),
        Kind::ConfigMap => document(
            kind,
            json!({
                "data": string_map(),
                "immutable": { "type": "boolean" }
            }),
            &[],
        ),
        Kind::Secret => document(
            kind,
            json!({
                "type": { "type": "string" },
                "data": string_map(),
                "stringData": string_map()
            }),
            &[],
        ),
        Kind::PersistentVolumeClaim => document(
            kind,
            json!({
                "spec": {
                    "type": "object",
                    "required": ["accessModes", "resources"],
                    "properties": {
                        "accessModes": {
                            "type": "array",
                            "minItems": 1,
                            "items": { "enum": ["ReadWriteOnce", "ReadOnlyMany", "ReadWriteMany", "ReadWriteOncePod"] }
                        },
                        "storageClassName": { "type": "string" },
                        "resources": {
                            "type": "object",
                            "required": ["requests"],
                            "properties": {
                                "requests": {
                                    "type": "object",
                                    "required": ["storage"],
                                    "additionalProperties": quantity()
                                }
                            }
                        }
                    }
                }
            }),
            &["spec"],
        ),
        Kind::HorizontalPodAutoscaler => document(
            kind,
            json!({
                "spec": {
                    "type": "object",
                    "required": ["scaleTargetRef", "maxReplicas"],
                    "properties": {
                        "scaleTargetRef": {
                            "type": "object",
                            "required": ["apiVersion", "kind", "name"],
                            "properties": {
                                "apiVersion": { "type": "string" },
                                "kind": { "type": "string", "minLength": 1 },
                                "name": { "type": "string", "minLength": 1 }
                            }
                        },
                        "minReplicas": { "type": "integer", "minimum": 1 },
                        "maxReplicas": { "type": "integer", "minimum": 1 },
                        "metrics": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "required": ["type"],
                                "properties": {
                                    "type": { "enum": ["Resource", "Pods", "Object", "External", "ContainerResource"] },
                                    "resource": {
                                        "type": "object",
                                        "required": ["name", "target"],
                                        "properties": {
                                            "name": { "type": "string" },
                                            "target": {
                                                "type": "object",
                                                "required": ["type"],
                                                "properties": {
                                                    "type": { "enum": ["Utilization", "AverageValue", "Value"] },
                                                    "averageUtilization": { "type": "integer", "minimum": 1 },
                                                    "averageValue": quantity()
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }),
            &["spec"],
        ),
    }
}
