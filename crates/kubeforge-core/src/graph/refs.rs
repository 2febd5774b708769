//! References from a pod spec to ConfigMaps, Secrets and PVCs

use crate::model::{EnvFromRef, EnvValue, EnvVarSource, Kind, PodSpec, VolumeSource};

/// A by-name reference to another resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Kind of the referenced resource
    pub kind: Kind,
    pub name: String,
    /// Where the reference was found, e.g. `env DB_URL`
    pub via: String,
}

/// Every reference in `pod`, in discovery order
///
/// Containers come before init containers; within a container `env`
/// precedes `envFrom`. Volumes follow all containers. A `(kind, name)` pair
/// is reported once, at its first occurrence.
pub fn pod_references(pod: &PodSpec) -> Vec<Reference> {
    let mut found: Vec<Reference> = Vec::new();
    let mut push = |kind: Kind, name: &str, via: String| {
        if !found.iter().any(|r| r.kind == kind && r.name == name) {
            found.push(Reference {
                kind,
                name: name.to_string(),
                via,
            });
        }
    };

    for container in pod.all_containers() {
        for var in container.env.iter().flatten() {
            let EnvValue::ValueFrom(source) = &var.source else {
                continue;
            };
            match source {
                EnvVarSource::ConfigMapKeyRef(sel) => {
                    push(Kind::ConfigMap, &sel.name, format!("env {}", var.name))
                }
                EnvVarSource::SecretKeyRef(sel) => {
                    push(Kind::Secret, &sel.name, format!("env {}", var.name))
                }
                EnvVarSource::FieldRef(_) => {}
            }
        }

        for from in container.env_from.iter().flatten() {
            match &from.source {
                EnvFromRef::ConfigMapRef(r) => push(Kind::ConfigMap, &r.name, "envFrom".to_string()),
                EnvFromRef::SecretRef(r) => push(Kind::Secret, &r.name, "envFrom".to_string()),
            }
        }
    }

    for volume in pod.volumes() {
        let via = format!("volume {}", volume.name);
        match &volume.source {
            VolumeSource::ConfigMap(v) => push(Kind::ConfigMap, &v.name, via),
            VolumeSource::Secret(v) => push(Kind::Secret, &v.secret_name, via),
            VolumeSource::PersistentVolumeClaim(v) => {
                push(Kind::PersistentVolumeClaim, &v.claim_name, via)
            }
            VolumeSource::EmptyDir(_) | VolumeSource::HostPath(_) => {}
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;

    fn key_ref(name: &str) -> KeySelector {
        KeySelector {
            name: name.to_string(),
            key: "k".to_string(),
            optional: None,
        }
    }

    #[test]
    fn test_discovery_order_and_dedup() {
        let app = Container {
            name: "app".to_string(),
            image: "app:1".to_string(),
            env: Some(vec![
                EnvVar::literal("MODE", "prod"),
                EnvVar {
                    name: "TOKEN".to_string(),
                    source: EnvValue::ValueFrom(EnvVarSource::SecretKeyRef(key_ref("api"))),
                },
            ]),
            env_from: Some(vec![EnvFromSource {
                source: EnvFromRef::ConfigMapRef(LocalObjectReference {
                    name: "cfg".to_string(),
                    optional: None,
                }),
                prefix: None,
            }]),
            ..Default::default()
        };
        let init = Container {
            name: "init".to_string(),
            image: "init:1".to_string(),
            env: Some(vec![EnvVar {
                name: "SETTING".to_string(),
                source: EnvValue::ValueFrom(EnvVarSource::ConfigMapKeyRef(key_ref("cfg"))),
            }]),
            ..Default::default()
        };
        let pod = PodSpec {
            containers: vec![app],
            init_containers: Some(vec![init]),
            volumes: Some(vec![
                Volume {
                    name: "data".to_string(),
                    source: VolumeSource::PersistentVolumeClaim(PvcVolumeSource {
                        claim_name: "data-pvc".to_string(),
                        read_only: None,
                    }),
                },
                Volume {
                    name: "scratch".to_string(),
                    source: VolumeSource::EmptyDir(EmptyDirVolumeSource::default()),
                },
            ]),
            ..Default::default()
        };

        let refs = pod_references(&pod);
        let summary: Vec<(Kind, &str, &str)> = refs
            .iter()
            .map(|r| (r.kind, r.name.as_str(), r.via.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (Kind::Secret, "api", "env TOKEN"),
                (Kind::ConfigMap, "cfg", "envFrom"),
                (Kind::PersistentVolumeClaim, "data-pvc", "volume data"),
            ]
        );
    }

    #[test]
    fn test_field_refs_are_not_references() {
        let pod = PodSpec {
            containers: vec![Container {
                name: "app".to_string(),
                image: "app:1".to_string(),
                env: Some(vec![EnvVar {
                    name: "POD".to_string(),
                    source: EnvValue::ValueFrom(EnvVarSource::FieldRef(ObjectFieldSelector {
                        api_version: None,
                        field_path: "metadata.name".to_string(),
                    })),
                }]),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(pod_references(&pod).is_empty());
    }
}
