//! Default resource templates
//!
//! Every function builds a fresh value; nothing here is shared or cached, so
//! callers may edit what they get back freely.

use indexmap::IndexMap;

use crate::model::*;

const DEFAULT_IMAGE: &str = "nginx:1.27";

fn app_labels(name: &str) -> IndexMap<String, String> {
    IndexMap::from([("app".to_string(), name.to_string())])
}

fn meta(name: &str, namespace: &str) -> ObjectMeta {
    ObjectMeta {
        name: name.to_string(),
        namespace: namespace.to_string(),
        labels: Some(app_labels(name)),
        annotations: None,
    }
}

fn quantities(pairs: &[(&str, &str)]) -> IndexMap<String, Quantity> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), Quantity::new(*v)))
        .collect()
}

/// A container with requests, limits and HTTP probes on port 80
pub fn container(name: &str) -> Container {
    let probe = Probe {
        initial_delay_seconds: Some(5),
        period_seconds: Some(10),
        ..Probe::new(ProbeHandler::HttpGet(HttpGetAction {
            path: Some("/".to_string()),
            port: IntOrString::Int(80),
            scheme: None,
        }))
    };

    Container {
        name: name.to_string(),
        image: DEFAULT_IMAGE.to_string(),
        image_pull_policy: Some(ImagePullPolicy::IfNotPresent),
        ports: Some(vec![ContainerPort {
            name: Some("http".to_string()),
            container_port: 80,
            protocol: Some(Protocol::Tcp),
        }]),
        resources: Some(ResourceRequirements {
            requests: Some(quantities(&[("cpu", "100m"), ("memory", "128Mi")])),
            limits: Some(quantities(&[("cpu", "500m"), ("memory", "256Mi")])),
        }),
        liveness_probe: Some(probe.clone()),
        readiness_probe: Some(probe),
        ..Default::default()
    }
}

fn pod_template(name: &str, restart_policy: Option<RestartPolicy>) -> PodTemplateSpec {
    PodTemplateSpec {
        metadata: TemplateMeta {
            labels: Some(app_labels(name)),
            annotations: None,
        },
        spec: PodSpec {
            restart_policy,
            containers: vec![container(name)],
            ..Default::default()
        },
    }
}

fn selector(name: &str) -> LabelSelector {
    LabelSelector {
        match_labels: Some(app_labels(name)),
    }
}

pub fn deployment(name: &str, namespace: &str) -> Resource {
    Resource::Deployment(Deployment {
        api_version: Kind::Deployment.default_api_version().to_string(),
        metadata: meta(name, namespace),
        spec: DeploymentSpec {
            replicas: Some(2),
            selector: selector(name),
            strategy: None,
            template: pod_template(name, None),
        },
        comment: None,
    })
}

pub fn stateful_set(name: &str, namespace: &str) -> Resource {
    Resource::StatefulSet(StatefulSet {
        api_version: Kind::StatefulSet.default_api_version().to_string(),
        metadata: meta(name, namespace),
        spec: StatefulSetSpec {
            service_name: Some(name.to_string()),
            replicas: Some(3),
            selector: selector(name),
            template: pod_template(name, None),
        },
        comment: None,
    })
}

pub fn daemon_set(name: &str, namespace: &str) -> Resource {
    Resource::DaemonSet(DaemonSet {
        api_version: Kind::DaemonSet.default_api_version().to_string(),
        metadata: meta(name, namespace),
        spec: DaemonSetSpec {
            selector: selector(name),
            template: pod_template(name, None),
        },
        comment: None,
    })
}

fn job_spec(name: &str) -> JobSpec {
    let mut template = pod_template(name, Some(RestartPolicy::OnFailure));
    // Batch containers exit, so HTTP probes make no sense for them
    for container in &mut template.spec.containers {
        container.ports = None;
        container.liveness_probe = None;
        container.readiness_probe = None;
        container.command = Some(vec!["echo".to_string(), "done".to_string()]);
    }

    JobSpec {
        completions: Some(1),
        parallelism: None,
        backoff_limit: Some(3),
        template,
    }
}

pub fn job(name: &str, namespace: &str) -> Resource {
    Resource::Job(Job {
        api_version: Kind::Job.default_api_version().to_string(),
        metadata: meta(name, namespace),
        spec: job_spec(name),
        comment: None,
    })
}

pub fn cron_job(name: &str, namespace: &str) -> Resource {
    Resource::CronJob(CronJob {
        api_version: Kind::CronJob.default_api_version().to_string(),
        metadata: meta(name, namespace),
        spec: CronJobSpec {
            schedule: "0 * * * *".to_string(),
            concurrency_policy: Some(ConcurrencyPolicy::Forbid),
            suspend: None,
            job_template: JobTemplateSpec {
                metadata: None,
                spec: job_spec(name),
            },
        },
        comment: None,
    })
}

pub fn service(name: &str, namespace: &str) -> Resource {
    Resource::Service(Service {
        api_version: Kind::Service.default_api_version().to_string(),
        metadata: meta(name, namespace),
        spec: ServiceSpec {
            service_type: Some(ServiceType::ClusterIp),
            selector: Some(app_labels(name)),
            ports: vec![ServicePort {
                name: Some("http".to_string()),
                protocol: Some(Protocol::Tcp),
                port: 80,
                target_port: Some(IntOrString::String("http".to_string())),
                node_port: None,
            }],
        },
        comment: None,
    })
}

pub fn ingress(name: &str, namespace: &str) -> Resource {
    Resource::Ingress(Ingress {
        api_version: Kind::Ingress.default_api_version().to_string(),
        metadata: meta(name, namespace),
        spec: IngressSpec {
            ingress_class_name: Some("nginx".to_string()),
            tls: None,
            rules: vec![IngressRule {
                host: Some(format!("{}.example.com", name)),
                http: Some(HttpIngressRuleValue {
                    paths: vec![HttpIngressPath {
                        path: "/".to_string(),
                        path_type: PathType::Prefix,
                        backend: IngressBackend {
                            service: IngressServiceBackend {
                                name: name.to_string(),
                                port: ServiceBackendPort {
                                    number: Some(80),
                                    name: None,
                                },
                            },
                        },
                    }],
                }),
            }],
        },
        comment: None,
    })
}

pub fn config_map(name: &str, namespace: &str) -> Resource {
    Resource::ConfigMap(ConfigMap {
        api_version: Kind::ConfigMap.default_api_version().to_string(),
        metadata: meta(name, namespace),
        data: Some(IndexMap::from([(
            "LOG_LEVEL".to_string(),
            "info".to_string(),
        )])),
        immutable: None,
        comment: None,
    })
}

pub fn secret(name: &str, namespace: &str) -> Resource {
    Resource::Secret(Secret {
        api_version: Kind::Secret.default_api_version().to_string(),
        metadata: meta(name, namespace),
        secret_type: Some("Opaque".to_string()),
        data: Some(IndexMap::from([(
            "password".to_string(),
            SecretValue::plain("changeme"),
        )])),
        string_data: None,
        comment: None,
    })
}

pub fn persistent_volume_claim(name: &str, namespace: &str) -> Resource {
    Resource::PersistentVolumeClaim(PersistentVolumeClaim {
        api_version: Kind::PersistentVolumeClaim
            .default_api_version()
            .to_string(),
        metadata: meta(name, namespace),
        spec: PersistentVolumeClaimSpec {
            access_modes: vec![AccessMode::ReadWriteOnce],
            storage_class_name: None,
            resources: VolumeResourceRequirements {
                requests: quantities(&[("storage", "1Gi")]),
            },
        },
        comment: None,
    })
}

pub fn horizontal_pod_autoscaler(name: &str, namespace: &str) -> Resource {
    Resource::HorizontalPodAutoscaler(HorizontalPodAutoscaler {
        api_version: Kind::HorizontalPodAutoscaler
            .default_api_version()
            .to_string(),
        metadata: meta(name, namespace),
        spec: HorizontalPodAutoscalerSpec {
            scale_target_ref: CrossVersionObjectReference {
                api_version: Kind::Deployment.default_api_version().to_string(),
                kind: Kind::Deployment.as_str().to_string(),
                name: name.to_string(),
            },
            min_replicas: Some(2),
            max_replicas: 10,
            metrics: Some(vec![MetricSpec {
                metric_type: "Resource".to_string(),
                resource: Some(ResourceMetricSource {
                    name: "cpu".to_string(),
                    target: MetricTarget {
                        target_type: "Utilization".to_string(),
                        average_utilization: Some(80),
                        average_value: None,
                    },
                }),
            }]),
        },
        comment: None,
    })
}

/// Default template for any supported kind
pub fn new_resource(kind: Kind, name: &str, namespace: &str) -> Resource {
    match kind {
        Kind::Deployment => deployment(name, namespace),
        Kind::StatefulSet => stateful_set(name, namespace),
        Kind::DaemonSet => daemon_set(name, namespace),
        Kind::Job => job(name, namespace),
        Kind::CronJob => cron_job(name, namespace),
        Kind::Service => service(name, namespace),
        Kind::Ingress => ingress(name, namespace),
        Kind::ConfigMap => config_map(name, namespace),
        Kind::Secret => secret(name, namespace),
        Kind::PersistentVolumeClaim => persistent_volume_claim(name, namespace),
        Kind::HorizontalPodAutoscaler => horizontal_pod_autoscaler(name, namespace),
    }
}
