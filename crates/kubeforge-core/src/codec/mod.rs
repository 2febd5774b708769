//! YAML codec
//!
//! Serialization is bespoke so that output is canonical: keys follow the
//! model's declaration order, `apiVersion` and `kind` lead every document,
//! and comments attached to a resource are written as a `#` block above it.
//! Parsing goes through `serde_yaml` into a loose document tree first, the
//! `kind` field then selects the typed variant.

pub mod emitter;

use serde::Deserialize;
use serde_json::Value as JsonValue;
use serde_yaml::{Mapping, Value as YamlValue};

use crate::error::{CoreError, Result};
use crate::model::{Kind, Resource};
use crate::suggestions;
use crate::validate::schema::push_segment;

/// Separator placed between documents in a multi-resource export
pub const DOCUMENT_SEPARATOR: &str = "\n---\n";

/// Serialize one resource to canonical YAML
pub fn to_yaml(resource: &Resource) -> Result<String> {
    let mut out = String::new();

    if let Some(comment) = resource.comment() {
        for line in comment.lines() {
            if line.trim().is_empty() {
                out.push_str("#\n");
            } else {
                out.push_str("# ");
                out.push_str(line);
                out.push('\n');
            }
        }
        out.push('\n');
    }

    out.push_str(&emitter::emit(&to_document(resource)?));
    Ok(out)
}

/// Serialize resources as one multi-document YAML stream
pub fn to_yaml_all(resources: &[Resource]) -> Result<String> {
    let documents = resources
        .iter()
        .map(|r| to_yaml(r).map(|doc| doc.trim_end_matches('\n').to_string()))
        .collect::<Result<Vec<_>>>()?;

    let mut out = documents.join(DOCUMENT_SEPARATOR);
    if !out.is_empty() {
        out.push('\n');
    }
    Ok(out)
}

/// The semantic manifest tree of a resource, `apiVersion` and `kind` first
pub fn to_document(resource: &Resource) -> Result<YamlValue> {
    let value = serde_yaml::to_value(resource)?;
    let YamlValue::Mapping(fields) = value else {
        return Ok(value);
    };

    let mut ordered = Mapping::new();
    for key in ["apiVersion", "kind"] {
        if let Some(v) = fields.get(key) {
            ordered.insert(YamlValue::from(key), v.clone());
        }
    }
    for (key, v) in fields {
        if !matches!(key.as_str(), Some("apiVersion" | "kind")) {
            ordered.insert(key, v);
        }
    }
    Ok(YamlValue::Mapping(ordered))
}

/// Split YAML text into loosely-typed documents, skipping empty ones
pub fn parse_documents(text: &str) -> Result<Vec<JsonValue>> {
    let mut documents = Vec::new();
    if text.trim().is_empty() {
        return Ok(documents);
    }
    for document in serde_yaml::Deserializer::from_str(text) {
        let value = JsonValue::deserialize(document)?;
        if !value.is_null() {
            documents.push(value);
        }
    }
    tracing::debug!(count = documents.len(), "parsed YAML documents");
    Ok(documents)
}

/// Read the `kind` of a loose document
pub fn detect_kind(index: usize, document: &JsonValue) -> Result<Kind> {
    let kind = document
        .get("kind")
        .and_then(|k| k.as_str())
        .ok_or(CoreError::MissingKind { index })?;

    kind.parse::<Kind>().map_err(|_| CoreError::UnknownKind {
        index,
        kind: kind.to_string(),
        suggestion: suggestions::suggest_kind(kind),
    })
}

/// Adopt a loose document into the typed model
///
/// `index` is the document's position in its stream and is only used for
/// error messages.
pub fn adopt(index: usize, document: JsonValue) -> Result<Resource> {
    let kind = detect_kind(index, &document)?;
    serde_json::from_value(document).map_err(|e| CoreError::InvalidResource {
        index,
        kind: kind.to_string(),
        message: e.to_string(),
    })
}

/// Parse text holding exactly one resource
pub fn parse_resource(text: &str) -> Result<Resource> {
    let mut documents = parse_documents(text)?;
    if documents.len() != 1 {
        return Err(CoreError::DocumentCount {
            count: documents.len(),
        });
    }
    adopt(0, documents.remove(0))
}

/// Parse every resource in a multi-document stream
///
/// Fails on the first document that cannot be adopted; nothing is returned
/// for the documents before it.
pub fn parse_resources(text: &str) -> Result<Vec<Resource>> {
    parse_documents(text)?
        .into_iter()
        .enumerate()
        .map(|(index, document)| adopt(index, document))
        .collect()
}

/// Adopt a loose document and list the fields the model does not carry
///
/// Those fields are lost on export; callers should tell the user.
pub fn adopt_reporting(index: usize, document: JsonValue) -> Result<(Resource, Vec<String>)> {
    let resource = adopt(index, document.clone())?;
    let dropped = dropped_fields(&document, &resource)?;
    if !dropped.is_empty() {
        tracing::debug!(index, count = dropped.len(), "document has unmodeled fields");
    }
    Ok((resource, dropped))
}

/// Dot/bracket paths present in `document` but absent from `resource`
///
/// Explicit nulls count as absent.
pub fn dropped_fields(document: &JsonValue, resource: &Resource) -> Result<Vec<String>> {
    let kept = serde_json::to_value(resource)?;
    let mut dropped = Vec::new();
    collect_dropped(document, &kept, String::new(), &mut dropped);
    Ok(dropped)
}

fn collect_dropped(original: &JsonValue, kept: &JsonValue, path: String, out: &mut Vec<String>) {
    match (original, kept) {
        (JsonValue::Object(fields), JsonValue::Object(kept_fields)) => {
            for (key, value) in fields {
                if value.is_null() {
                    continue;
                }
                let mut child = path.clone();
                push_segment(&mut child, key);
                match kept_fields.get(key) {
                    Some(kept_value) => collect_dropped(value, kept_value, child, out),
                    None => out.push(child),
                }
            }
        }
        (JsonValue::Array(items), JsonValue::Array(kept_items)) => {
            for (i, (item, kept_item)) in items.iter().zip(kept_items).enumerate() {
                collect_dropped(item, kept_item, format!("{}[{}]", path, i), out);
            }
        }
        _ => {}
    }
}

/// File name for a single exported resource, e.g. `web-deployment.yaml`
pub fn export_file_name(resource: &Resource) -> String {
    format!(
        "{}-{}.yaml",
        resource.name(),
        resource.kind().as_str().to_lowercase()
    )
}

/// File name for a combined export of `count` resources
pub fn combined_file_name(count: usize) -> String {
    format!("k8s-resources-{}.yaml", count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;
    use crate::templates;
    use indexmap::IndexMap;

    #[test]
    fn test_config_map_output_is_canonical() {
        let resource = Resource::ConfigMap(ConfigMap {
            api_version: "v1".to_string(),
            metadata: ObjectMeta::new("cfg", "default").with_label("app", "web"),
            data: Some(IndexMap::from([
                ("FOO".to_string(), "bar".to_string()),
                ("PORT".to_string(), "8080".to_string()),
            ])),
            immutable: None,
            comment: None,
        });

        let expected = "\
apiVersion: v1
kind: ConfigMap
metadata:
  name: cfg
  namespace: default
  labels:
    app: web
data:
  FOO: bar
  PORT: \"8080\"
";
        assert_eq!(to_yaml(&resource).unwrap(), expected);
    }

    #[test]
    fn test_absent_fields_are_omitted() {
        let resource = templates::config_map("cfg", "default");
        let yaml = to_yaml(&resource).unwrap();
        assert!(!yaml.contains("immutable"));
        assert!(!yaml.contains("annotations"));
        assert!(!yaml.contains("null"));
    }

    #[test]
    fn test_empty_collections_are_emitted() {
        let resource = Resource::ConfigMap(ConfigMap {
            api_version: "v1".to_string(),
            metadata: ObjectMeta {
                labels: Some(IndexMap::new()),
                ..ObjectMeta::new("empty", "default")
            },
            data: Some(IndexMap::new()),
            immutable: None,
            comment: None,
        });
        let yaml = to_yaml(&resource).unwrap();
        assert!(yaml.contains("  labels: {}\n"));
        assert!(yaml.contains("data: {}\n"));

        let mut service = templates::service("web", "default");
        if let Resource::Service(s) = &mut service {
            s.spec.ports.clear();
        }
        assert!(to_yaml(&service).unwrap().contains("  ports: []\n"));
    }

    #[test]
    fn test_comment_block_precedes_document() {
        let resource =
            templates::config_map("cfg", "default").with_comment("Generated config\n\nDo not edit");
        let yaml = to_yaml(&resource).unwrap();
        assert!(yaml.starts_with("# Generated config\n#\n# Do not edit\n\napiVersion: v1\n"));

        // The comment is not part of the manifest
        let parsed = parse_resource(&yaml).unwrap();
        assert_eq!(parsed.comment(), None);
        assert_eq!(parsed, templates::config_map("cfg", "default"));
    }

    #[test]
    fn test_multiline_config_value_uses_block_scalar() {
        let resource = Resource::ConfigMap(ConfigMap {
            api_version: "v1".to_string(),
            metadata: ObjectMeta::new("nginx-conf", "default"),
            data: Some(IndexMap::from([(
                "nginx.conf".to_string(),
                "server {\n  listen 80;\n}\n".to_string(),
            )])),
            immutable: None,
            comment: None,
        });
        let yaml = to_yaml(&resource).unwrap();
        assert!(yaml.contains("  nginx.conf: |\n    server {\n      listen 80;\n    }\n"));
        assert_eq!(parse_resource(&yaml).unwrap(), resource);
    }

    #[test]
    fn test_round_trip_every_template_without_secret_data() {
        for kind in Kind::ALL {
            let resource = match templates::new_resource(kind, "demo", "staging") {
                Resource::Secret(secret) => Resource::Secret(Secret {
                    data: None,
                    ..secret
                }),
                other => other,
            };
            let yaml = to_yaml(&resource).unwrap();
            let parsed = parse_resource(&yaml).unwrap();
            assert_eq!(parsed, resource, "{} did not round trip:\n{}", kind, yaml);
        }
    }

    #[test]
    fn test_secret_is_encoded_once_per_serialize() {
        let resource = templates::secret("creds", "default");
        let first = to_yaml(&resource).unwrap();
        let second = to_yaml(&resource).unwrap();
        assert_eq!(first, second);
        assert!(first.contains("  password: Y2hhbmdlbWU=\n"));
    }

    #[test]
    fn test_imported_secret_is_not_double_encoded() {
        let exported = to_yaml(&templates::secret("creds", "default")).unwrap();
        let imported = parse_resource(&exported).unwrap();
        let Resource::Secret(secret) = &imported else {
            panic!("expected a Secret");
        };
        let value = &secret.data.as_ref().unwrap()["password"];
        assert_eq!(value, &SecretValue::Encoded("Y2hhbmdlbWU=".to_string()));
        assert_eq!(value.decode("password").unwrap(), "changeme");
        assert_eq!(to_yaml(&imported).unwrap(), exported);
    }

    #[test]
    fn test_multi_document_separator() {
        let resources = vec![
            templates::config_map("a", "default"),
            templates::config_map("b", "default"),
        ];
        let yaml = to_yaml_all(&resources).unwrap();
        assert_eq!(yaml.matches("\n---\n").count(), 1);
        assert!(yaml.ends_with("LOG_LEVEL: info\n"));
        assert_eq!(parse_resources(&yaml).unwrap(), resources);
    }

    #[test]
    fn test_empty_stream() {
        assert_eq!(to_yaml_all(&[]).unwrap(), "");
        assert!(parse_resources("").unwrap().is_empty());
        assert!(parse_resources("  \n").unwrap().is_empty());

        let leading = "---\napiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: a\n";
        assert_eq!(parse_resources(leading).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_missing_kind() {
        let err = parse_resource("apiVersion: v1\nmetadata:\n  name: x\n").unwrap_err();
        assert!(matches!(err, CoreError::MissingKind { index: 0 }));
    }

    #[test]
    fn test_parse_unknown_kind_suggests() {
        let text = "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: a\n---\nkind: Servce\n";
        let err = parse_resources(text).unwrap_err();
        match err {
            CoreError::UnknownKind {
                index,
                kind,
                suggestion,
            } => {
                assert_eq!(index, 1);
                assert_eq!(kind, "Servce");
                assert_eq!(suggestion.as_deref(), Some("Service"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_malformed_yaml() {
        let err = parse_documents("kind: [unterminated\n").unwrap_err();
        assert!(matches!(err, CoreError::YamlParse(_)));
    }

    #[test]
    fn test_parse_known_kind_with_bad_shape() {
        let text = "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\nspec:\n  replicas: three\n";
        let err = parse_resource(text).unwrap_err();
        assert!(matches!(err, CoreError::InvalidResource { ref kind, .. } if kind == "Deployment"));
    }

    #[test]
    fn test_parse_resource_rejects_streams() {
        let yaml = to_yaml_all(&[
            templates::config_map("a", "default"),
            templates::config_map("b", "default"),
        ])
        .unwrap();
        assert!(matches!(
            parse_resource(&yaml),
            Err(CoreError::DocumentCount { count: 2 })
        ));
    }

    #[test]
    fn test_unicode_line_breaks_round_trip() {
        for value in ["a\u{2028}b", "a\u{2029}b", "x\u{85}y\n", "one\ntwo\u{2028}\n"] {
            let resource = Resource::ConfigMap(ConfigMap {
                api_version: "v1".to_string(),
                metadata: ObjectMeta::new("breaks", "default"),
                data: Some(IndexMap::from([("k".to_string(), value.to_string())])),
                immutable: None,
                comment: None,
            });
            let yaml = to_yaml(&resource).unwrap();
            assert_eq!(parse_resource(&yaml).unwrap(), resource, "{:?} did not round trip", value);
        }
    }

    #[test]
    fn test_imported_key_order_is_kept() {
        let text = "\
apiVersion: v1
kind: ConfigMap
metadata:
  name: cfg
  labels:
    zone: eu
    app: web
data:
  ZETA: \"1\"
  ALPHA: \"2\"
";
        let resource = parse_resource(text).unwrap();
        let yaml = to_yaml(&resource).unwrap();
        assert!(yaml.contains("  labels:\n    zone: eu\n    app: web\n"), "{}", yaml);
        assert!(yaml.contains("data:\n  ZETA: \"1\"\n  ALPHA: \"2\"\n"), "{}", yaml);
    }

    #[test]
    fn test_unmodeled_fields_are_reported() {
        let text = "\
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
spec:
  selector:
    matchLabels:
      app: web
  template:
    metadata:
      labels:
        app: web
    spec:
      tolerations:
        - key: dedicated
      containers:
        - name: web
          image: nginx:1.27
          securityContext:
            runAsNonRoot: true
          livenessProbe: null
";
        let document = parse_documents(text).unwrap().remove(0);
        let (resource, dropped) = adopt_reporting(0, document).unwrap();
        assert_eq!(resource.name(), "web");
        assert_eq!(
            dropped,
            vec![
                "spec.template.spec.tolerations",
                "spec.template.spec.containers[0].securityContext",
            ]
        );
    }

    #[test]
    fn test_modeled_document_drops_nothing() {
        let yaml = to_yaml(&templates::deployment("web", "default")).unwrap();
        let document = parse_documents(&yaml).unwrap().remove(0);
        let (_, dropped) = adopt_reporting(0, document).unwrap();
        assert!(dropped.is_empty(), "{:?}", dropped);
    }

    #[test]
    fn test_export_file_names() {
        let resource = templates::deployment("web", "default");
        assert_eq!(export_file_name(&resource), "web-deployment.yaml");
        assert_eq!(
            export_file_name(&templates::horizontal_pod_autoscaler("web", "default")),
            "web-horizontalpodautoscaler.yaml"
        );
        assert_eq!(combined_file_name(4), "k8s-resources-4.yaml");
    }
}
