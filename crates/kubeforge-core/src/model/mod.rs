//! Resource model
//!
//! A [`Resource`] is one manifest of a supported [`Kind`]. The enum is
//! internally tagged on `kind`, so matching on the variant is the only way
//! to reach kind-specific fields. Values are plain data: every edit builds a
//! new value and two resources with equal fields are interchangeable.

mod kind;
mod meta;
mod pod;
mod resources;
mod secret;

pub use kind::{Kind, ParseKindError};
pub use meta::{DEFAULT_NAMESPACE, ObjectMeta};
pub use pod::{
    ConfigMapVolumeSource, Container, ContainerPort, EmptyDirVolumeSource, EnvFromRef,
    EnvFromSource, EnvValue, EnvVar, EnvVarSource, ExecAction, HostPathVolumeSource,
    HttpGetAction, ImagePullPolicy, IntOrString, KeySelector, LocalObjectReference,
    ObjectFieldSelector, PodSpec, PodTemplateSpec, Probe, ProbeHandler, Protocol,
    PvcVolumeSource, Quantity, ResourceRequirements, RestartPolicy, SecretVolumeSource,
    TcpSocketAction, TemplateMeta, Volume, VolumeMount, VolumeSource,
};
pub use resources::{
    AccessMode, ConcurrencyPolicy, ConfigMap, CronJob, CronJobSpec, CrossVersionObjectReference,
    DaemonSet, DaemonSetSpec, Deployment, DeploymentSpec, DeploymentStrategy,
    HorizontalPodAutoscaler, HorizontalPodAutoscalerSpec, HttpIngressPath, HttpIngressRuleValue,
    Ingress, IngressBackend, IngressRule, IngressServiceBackend, IngressSpec, IngressTls, Job,
    JobSpec, JobTemplateSpec, LabelSelector, MetricSpec, MetricTarget, PathType,
    PersistentVolumeClaim, PersistentVolumeClaimSpec, ResourceMetricSource, Secret,
    ServiceBackendPort, Service, ServicePort, ServiceSpec, ServiceType, StatefulSet,
    StatefulSetSpec, VolumeResourceRequirements,
};
pub use secret::{SecretValue, is_base64};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Resource {
    Deployment(Deployment),
    StatefulSet(StatefulSet),
    DaemonSet(DaemonSet),
    Job(Job),
    CronJob(CronJob),
    Service(Service),
    Ingress(Ingress),
    ConfigMap(ConfigMap),
    Secret(Secret),
    PersistentVolumeClaim(PersistentVolumeClaim),
    HorizontalPodAutoscaler(HorizontalPodAutoscaler),
}

impl Resource {
    pub fn kind(&self) -> Kind {
        match self {
            Resource::Deployment(_) => Kind::Deployment,
            Resource::StatefulSet(_) => Kind::StatefulSet,
            Resource::DaemonSet(_) => Kind::DaemonSet,
            Resource::Job(_) => Kind::Job,
            Resource::CronJob(_) => Kind::CronJob,
            Resource::Service(_) => Kind::Service,
            Resource::Ingress(_) => Kind::Ingress,
            Resource::ConfigMap(_) => Kind::ConfigMap,
            Resource::Secret(_) => Kind::Secret,
            Resource::PersistentVolumeClaim(_) => Kind::PersistentVolumeClaim,
            Resource::HorizontalPodAutoscaler(_) => Kind::HorizontalPodAutoscaler,
        }
    }

    pub fn api_version(&self) -> &str {
        match self {
            Resource::Deployment(r) => &r.api_version,
            Resource::StatefulSet(r) => &r.api_version,
            Resource::DaemonSet(r) => &r.api_version,
            Resource::Job(r) => &r.api_version,
            Resource::CronJob(r) => &r.api_version,
            Resource::Service(r) => &r.api_version,
            Resource::Ingress(r) => &r.api_version,
            Resource::ConfigMap(r) => &r.api_version,
            Resource::Secret(r) => &r.api_version,
            Resource::PersistentVolumeClaim(r) => &r.api_version,
            Resource::HorizontalPodAutoscaler(r) => &r.api_version,
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Resource::Deployment(r) => &r.metadata,
            Resource::StatefulSet(r) => &r.metadata,
            Resource::DaemonSet(r) => &r.metadata,
            Resource::Job(r) => &r.metadata,
            Resource::CronJob(r) => &r.metadata,
            Resource::Service(r) => &r.metadata,
            Resource::Ingress(r) => &r.metadata,
            Resource::ConfigMap(r) => &r.metadata,
            Resource::Secret(r) => &r.metadata,
            Resource::PersistentVolumeClaim(r) => &r.metadata,
            Resource::HorizontalPodAutoscaler(r) => &r.metadata,
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata().name
    }

    pub fn namespace(&self) -> &str {
        &self.metadata().namespace
    }

    /// Leading comment rendered by the serializer, never part of the manifest
    pub fn comment(&self) -> Option<&str> {
        let comment = match self {
            Resource::Deployment(r) => &r.comment,
            Resource::StatefulSet(r) => &r.comment,
            Resource::DaemonSet(r) => &r.comment,
            Resource::Job(r) => &r.comment,
            Resource::CronJob(r) => &r.comment,
            Resource::Service(r) => &r.comment,
            Resource::Ingress(r) => &r.comment,
            Resource::ConfigMap(r) => &r.comment,
            Resource::Secret(r) => &r.comment,
            Resource::PersistentVolumeClaim(r) => &r.comment,
            Resource::HorizontalPodAutoscaler(r) => &r.comment,
        };
        comment.as_deref()
    }

    /// A copy of this resource carrying `comment`
    pub fn with_comment(self, comment: impl Into<String>) -> Self {
        let comment = Some(comment.into());
        match self {
            Resource::Deployment(r) => Resource::Deployment(Deployment { comment, ..r }),
            Resource::StatefulSet(r) => Resource::StatefulSet(StatefulSet { comment, ..r }),
            Resource::DaemonSet(r) => Resource::DaemonSet(DaemonSet { comment, ..r }),
            Resource::Job(r) => Resource::Job(Job { comment, ..r }),
            Resource::CronJob(r) => Resource::CronJob(CronJob { comment, ..r }),
            Resource::Service(r) => Resource::Service(Service { comment, ..r }),
            Resource::Ingress(r) => Resource::Ingress(Ingress { comment, ..r }),
            Resource::ConfigMap(r) => Resource::ConfigMap(ConfigMap { comment, ..r }),
            Resource::Secret(r) => Resource::Secret(Secret { comment, ..r }),
            Resource::PersistentVolumeClaim(r) => {
                Resource::PersistentVolumeClaim(PersistentVolumeClaim { comment, ..r })
            }
            Resource::HorizontalPodAutoscaler(r) => {
                Resource::HorizontalPodAutoscaler(HorizontalPodAutoscaler { comment, ..r })
            }
        }
    }

    /// The pod spec run by a workload, including a CronJob's nested job template
    pub fn pod_spec(&self) -> Option<&PodSpec> {
        match self {
            Resource::Deployment(r) => Some(&r.spec.template.spec),
            Resource::StatefulSet(r) => Some(&r.spec.template.spec),
            Resource::DaemonSet(r) => Some(&r.spec.template.spec),
            Resource::Job(r) => Some(&r.spec.template.spec),
            Resource::CronJob(r) => Some(&r.spec.job_template.spec.template.spec),
            Resource::Service(_)
            | Resource::Ingress(_)
            | Resource::ConfigMap(_)
            | Resource::Secret(_)
            | Resource::PersistentVolumeClaim(_)
            | Resource::HorizontalPodAutoscaler(_) => None,
        }
    }

    /// Pod-template labels that a Service selector may match
    pub fn pod_template_labels(&self) -> Option<&IndexMap<String, String>> {
        let meta = match self {
            Resource::Deployment(r) => &r.spec.template.metadata,
            Resource::StatefulSet(r) => &r.spec.template.metadata,
            Resource::DaemonSet(r) => &r.spec.template.metadata,
            Resource::Job(_)
            | Resource::CronJob(_)
            | Resource::Service(_)
            | Resource::Ingress(_)
            | Resource::ConfigMap(_)
            | Resource::Secret(_)
            | Resource::PersistentVolumeClaim(_)
            | Resource::HorizontalPodAutoscaler(_) => return None,
        };
        meta.labels.as_ref()
    }

    /// Short display form, e.g. `Deployment/web`
    pub fn display_name(&self) -> String {
        format!("{}/{}", self.kind(), self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates;

    #[test]
    fn test_kind_matches_variant() {
        for kind in Kind::ALL {
            let resource = templates::new_resource(kind, "demo", "default");
            assert_eq!(resource.kind(), kind);
            assert_eq!(resource.api_version(), kind.default_api_version());
            assert_eq!(resource.name(), "demo");
        }
    }

    #[test]
    fn test_with_comment_keeps_fields() {
        let resource = templates::config_map("settings", "prod");
        let commented = resource.clone().with_comment("managed by kubeforge");
        assert_eq!(commented.comment(), Some("managed by kubeforge"));
        assert_eq!(commented.name(), resource.name());
        assert_eq!(commented.namespace(), "prod");
        assert_eq!(resource.comment(), None);
    }

    #[test]
    fn test_pod_spec_reaches_into_cronjob() {
        let cron = templates::cron_job("nightly", "default");
        let spec = cron.pod_spec().unwrap();
        assert_eq!(spec.containers.len(), 1);
        assert!(templates::service("web", "default").pod_spec().is_none());
    }

    #[test]
    fn test_pod_template_labels_only_for_selectable_workloads() {
        let deploy = templates::deployment("web", "default");
        assert_eq!(
            deploy.pod_template_labels().and_then(|l| l.get("app")),
            Some(&"web".to_string())
        );
        assert!(templates::job("migrate", "default").pod_template_labels().is_none());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(templates::secret("creds", "default").display_name(), "Secret/creds");
    }
}
