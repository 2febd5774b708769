//! Integration tests for CLI commands

use std::io::Write;
use std::process::{Command, Stdio};

/// Helper to run kubeforge with the fixture configuration
fn kubeforge(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_kubeforge"))
        .args(args)
        .env("KUBEFORGE_CONFIG", fixture("config.yaml"))
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute kubeforge")
}

/// Run kubeforge with `input` on stdin
fn kubeforge_stdin(args: &[&str], input: &str) -> std::process::Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_kubeforge"))
        .args(args)
        .env("KUBEFORGE_CONFIG", fixture("config.yaml"))
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn kubeforge");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("Failed to write stdin");
    child.wait_with_output().expect("Failed to wait for kubeforge")
}

/// Get the fixtures path
fn fixtures_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/../../fixtures")
}

fn fixture(name: &str) -> String {
    format!("{}/{}", fixtures_path(), name)
}

mod validate_command {
    use super::*;

    #[test]
    fn test_validate_clean_stack() {
        let output = kubeforge(&["validate", &fixture("app-stack.yaml")]);

        assert!(output.status.success(), "Expected success for a clean stack");
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Validating 8 document(s) from 1 input(s)"));
        assert!(stdout.contains("Validation passed! 8 document(s)"));
    }

    #[test]
    fn test_validate_invalid_exits_with_validation_code() {
        let output = kubeforge(&["validate", &fixture("invalid.yaml")]);

        assert_eq!(output.status.code(), Some(2));
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Validation failed"));
        assert!(stdout.contains("spec.type"));
        assert!(stdout.contains("spec.replicas"));
        assert!(stdout.contains("spec.template.spec.containers[0].image"));
    }

    #[test]
    fn test_validate_json_output() {
        let output = kubeforge(&["validate", &fixture("invalid.yaml"), "--json"]);

        assert_eq!(output.status.code(), Some(2));
        let stdout = String::from_utf8_lossy(&output.stdout);
        let json: serde_json::Value =
            serde_json::from_str(&stdout).expect("Output should be valid JSON");

        assert_eq!(json["valid"], false);
        let documents = json["documents"].as_array().unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0]["kind"], "Deployment");
        assert_eq!(documents[0]["name"], "broken");
        assert_eq!(documents[0]["valid"], false);
        assert_eq!(documents[1]["index"], 1);

        let service_errors = documents[1]["errors"].as_array().unwrap();
        assert!(
            service_errors
                .iter()
                .any(|e| e["rule"] == "schema" && e["path"] == "spec.type")
        );
    }

    #[test]
    fn test_warnings_pass_unless_strict() {
        let output = kubeforge(&["validate", &fixture("warnings.yaml")]);
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Validation passed with 2 warning(s)"));
        assert!(stdout.contains("[latestImageTag]"));
        assert!(stdout.contains("[singleReplica]"));

        let output = kubeforge(&["validate", &fixture("warnings.yaml"), "--strict"]);
        assert_eq!(output.status.code(), Some(2));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("strict mode"));
    }

    #[test]
    fn test_disabled_rules_from_config() {
        let output = Command::new(env!("CARGO_BIN_EXE_kubeforge"))
            .args(["validate", &fixture("warnings.yaml")])
            .args(["--config", &fixture("lenient.yaml")])
            .output()
            .expect("Failed to execute kubeforge");

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Validation passed!"));
    }

    #[test]
    fn test_unknown_kind_is_a_warning() {
        let output = kubeforge(&["validate", &fixture("unknown-kind.yaml"), "--json"]);

        assert!(output.status.success());
        let json: serde_json::Value =
            serde_json::from_slice(&output.stdout).expect("Output should be valid JSON");
        let document = &json["documents"][0];
        assert_eq!(document["valid"], true);
        assert_eq!(document["warnings"][0]["rule"], "unknownKind");
        assert_eq!(document["warnings"][0]["path"], "kind");
    }

    #[test]
    fn test_validate_from_stdin() {
        let manifest = "apiVersion: v1\nkind: Service\nmetadata:\n  name: web\nspec:\n  type: Magic\n  ports:\n    - port: 80\n";
        let output = kubeforge_stdin(&["validate", "-"], manifest);

        assert_eq!(output.status.code(), Some(2));
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("<stdin>#0 Service/web"));
    }

    #[test]
    fn test_malformed_yaml_is_a_parse_error() {
        let output = kubeforge(&["validate", &fixture("malformed.yaml")]);

        assert_eq!(output.status.code(), Some(3));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("YAML"));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let output = kubeforge(&["validate", &fixture("does-not-exist.yaml")]);
        assert_eq!(output.status.code(), Some(5));
    }
}

mod graph_command {
    use super::*;

    #[test]
    fn test_graph_text() {
        let output = kubeforge(&["graph", &fixture("app-stack.yaml")]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Layer 0"));
        assert!(stdout.contains("Ingress/default/web"));
        assert!(stdout.contains("[selector: app=web]"));
        assert!(stdout.contains("8 node(s), 7 edge(s)"));
    }

    #[test]
    fn test_graph_json() {
        let output = kubeforge(&["graph", &fixture("app-stack.yaml"), "--format", "json"]);

        assert!(output.status.success());
        let json: serde_json::Value =
            serde_json::from_slice(&output.stdout).expect("Output should be valid JSON");

        let nodes = json["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 8);
        assert_eq!(nodes[0]["id"], "Ingress/default/web");
        assert_eq!(nodes[0]["layer"], 0);

        let edges: Vec<(String, String, String)> = json["edges"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| {
                (
                    e["edgeType"].as_str().unwrap().to_string(),
                    e["source"].as_str().unwrap().to_string(),
                    e["target"].as_str().unwrap().to_string(),
                )
            })
            .collect();
        let expected = [
            ("ingress-backend", "Ingress/default/web", "Service/default/web"),
            ("secret-ref", "Ingress/default/web", "Secret/default/web-tls"),
            ("selector", "Service/default/web", "Deployment/default/web"),
            ("configmap-ref", "Deployment/default/web", "ConfigMap/default/web-config"),
            ("secret-ref", "Deployment/default/web", "Secret/default/db"),
            ("pvc-ref", "Deployment/default/web", "PersistentVolumeClaim/default/web-data"),
            ("hpa-target", "HorizontalPodAutoscaler/default/web", "Deployment/default/web"),
        ];
        assert_eq!(edges.len(), expected.len());
        for (edge_type, source, target) in expected {
            assert!(
                edges
                    .iter()
                    .any(|e| e.0 == edge_type && e.1 == source && e.2 == target),
                "missing {} edge {} -> {}",
                edge_type,
                source,
                target
            );
        }
    }

    #[test]
    fn test_graph_rejects_unknown_kind() {
        let output = kubeforge(&["graph", &fixture("typo-kind.yaml")]);

        assert_eq!(output.status.code(), Some(3));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Servce"));
        assert!(stderr.contains("Service"));
    }
}

mod export_command {
    use super::*;

    #[test]
    fn test_export_to_stdout() {
        let output = kubeforge(&["export", &fixture("app-stack.yaml")]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.starts_with("apiVersion: networking.k8s.io/v1\nkind: Ingress\n"));
        assert_eq!(stdout.matches("\n---\n").count(), 7);
        assert!(stdout.contains("password: c2VjcmV0"));
    }

    #[test]
    fn test_export_combined_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = kubeforge(&[
            "export",
            &fixture("app-stack.yaml"),
            "-o",
            dir.path().to_str().unwrap(),
        ]);

        assert!(output.status.success());
        let written = std::fs::read_to_string(dir.path().join("k8s-resources-8.yaml")).unwrap();
        assert!(written.contains("kind: HorizontalPodAutoscaler"));
    }

    #[test]
    fn test_export_split_files() {
        let dir = tempfile::tempdir().unwrap();
        let output = kubeforge(&[
            "export",
            &fixture("app-stack.yaml"),
            "-o",
            dir.path().to_str().unwrap(),
            "--split",
        ]);

        assert!(output.status.success());
        for name in [
            "web-ingress.yaml",
            "web-service.yaml",
            "web-deployment.yaml",
            "web-config-configmap.yaml",
            "db-secret.yaml",
            "web-data-persistentvolumeclaim.yaml",
            "web-horizontalpodautoscaler.yaml",
        ] {
            assert!(dir.path().join(name).exists(), "missing {}", name);
        }
        let deployment = std::fs::read_to_string(dir.path().join("web-deployment.yaml")).unwrap();
        assert!(deployment.starts_with("apiVersion: apps/v1\nkind: Deployment\n"));
    }

    #[test]
    fn test_export_lists_dropped_fields() {
        let manifest = "\
apiVersion: v1
kind: ConfigMap
metadata:
  name: settings
  labels:
    zone: eu
    app: web
  finalizers:
    - keep
data:
  ZETA: one
  ALPHA: two
";
        let output = kubeforge_stdin(&["export", "-"], manifest);

        assert!(output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("<stdin>#0 ConfigMap/settings: metadata.finalizers"));

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(!stdout.contains("finalizers"));
        assert!(stdout.contains("    zone: eu\n    app: web\n"));
        assert!(stdout.contains("  ZETA: one\n  ALPHA: two\n"));
    }

    #[test]
    fn test_clean_export_reports_nothing() {
        let output = kubeforge(&["export", &fixture("app-stack.yaml")]);
        assert!(output.status.success());
        assert!(!String::from_utf8_lossy(&output.stderr).contains("dropped"));
    }

    #[test]
    fn test_split_requires_output() {
        let output = kubeforge(&["export", &fixture("app-stack.yaml"), "--split"]);
        assert_eq!(output.status.code(), Some(64));
    }

    #[test]
    fn test_export_empty_input() {
        let output = kubeforge_stdin(&["export", "-"], "\n");
        assert_eq!(output.status.code(), Some(64));
    }
}

mod new_command {
    use super::*;

    #[test]
    fn test_new_deployment() {
        let output = kubeforge(&["new", "Deployment", "api", "-n", "shop"]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.starts_with("apiVersion: apps/v1\nkind: Deployment\n"));
        assert!(stdout.contains("name: api"));
        assert!(stdout.contains("namespace: shop"));
    }

    #[test]
    fn test_new_with_comment() {
        let output = kubeforge(&["new", "ConfigMap", "settings", "--comment", "App settings"]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.starts_with("# App settings\n"));
        assert!(stdout.contains("kind: ConfigMap"));
    }

    #[test]
    fn test_new_output_validates() {
        let created = kubeforge(&["new", "CronJob", "nightly"]);
        assert!(created.status.success());

        let stdout = String::from_utf8_lossy(&created.stdout);
        let output = kubeforge_stdin(&["validate", "-", "--json"], &stdout);
        let json: serde_json::Value =
            serde_json::from_slice(&output.stdout).expect("Output should be valid JSON");
        assert_eq!(json["documents"][0]["errors"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_new_unknown_kind_suggests() {
        let output = kubeforge(&["new", "Deploymnet", "api"]);

        assert_eq!(output.status.code(), Some(64));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Deployment"));
    }
}

mod kinds_command {
    use super::*;

    #[test]
    fn test_kinds_lists_every_kind() {
        let output = kubeforge(&["kinds"]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        for kind in [
            "Deployment",
            "StatefulSet",
            "DaemonSet",
            "Job",
            "CronJob",
            "Service",
            "Ingress",
            "ConfigMap",
            "Secret",
            "PersistentVolumeClaim",
            "HorizontalPodAutoscaler",
        ] {
            assert!(stdout.contains(kind), "missing {}", kind);
        }
        assert!(stdout.contains("autoscaling/v2"));
    }
}

mod cli_usage {
    use super::*;

    #[test]
    fn test_help_succeeds() {
        let output = kubeforge(&["--help"]);
        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains("validate"));
    }

    #[test]
    fn test_unknown_subcommand() {
        let output = kubeforge(&["frobnicate"]);
        assert_eq!(output.status.code(), Some(64));
    }

    #[test]
    fn test_broken_config_is_reported() {
        let mut config = tempfile::NamedTempFile::new().unwrap();
        write!(config, "lint:\n  disabledRules:\n    - schema\n").unwrap();

        let output = Command::new(env!("CARGO_BIN_EXE_kubeforge"))
            .args(["kinds", "--config", config.path().to_str().unwrap()])
            .output()
            .expect("Failed to execute kubeforge");

        assert_eq!(output.status.code(), Some(1));
        assert!(String::from_utf8_lossy(&output.stderr).contains("Configuration error"));
    }
}
