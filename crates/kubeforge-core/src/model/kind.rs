//! The closed set of supported manifest kinds

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::suggestions;

/// Discriminant of a [`Resource`](crate::Resource)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Kind {
    Deployment,
    StatefulSet,
    DaemonSet,
    Job,
    CronJob,
    Service,
    Ingress,
    ConfigMap,
    Secret,
    PersistentVolumeClaim,
    HorizontalPodAutoscaler,
}

impl Kind {
    /// Every supported kind, in the order they are listed to users
    pub const ALL: [Kind; 11] = [
        Kind::Deployment,
        Kind::StatefulSet,
        Kind::DaemonSet,
        Kind::Job,
        Kind::CronJob,
        Kind::Service,
        Kind::Ingress,
        Kind::ConfigMap,
        Kind::Secret,
        Kind::PersistentVolumeClaim,
        Kind::HorizontalPodAutoscaler,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Deployment => "Deployment",
            Kind::StatefulSet => "StatefulSet",
            Kind::DaemonSet => "DaemonSet",
            Kind::Job => "Job",
            Kind::CronJob => "CronJob",
            Kind::Service => "Service",
            Kind::Ingress => "Ingress",
            Kind::ConfigMap => "ConfigMap",
            Kind::Secret => "Secret",
            Kind::PersistentVolumeClaim => "PersistentVolumeClaim",
            Kind::HorizontalPodAutoscaler => "HorizontalPodAutoscaler",
        }
    }

    /// The apiVersion new resources of this kind are created with
    pub fn default_api_version(&self) -> &'static str {
        match self {
            Kind::Deployment | Kind::StatefulSet | Kind::DaemonSet => "apps/v1",
            Kind::Job | Kind::CronJob => "batch/v1",
            Kind::Service | Kind::ConfigMap | Kind::Secret | Kind::PersistentVolumeClaim => "v1",
            Kind::Ingress => "networking.k8s.io/v1",
            Kind::HorizontalPodAutoscaler => "autoscaling/v2",
        }
    }

    /// Layout layer in the relationship graph
    ///
    /// Ingress sits in front, then services and autoscalers, then workloads,
    /// then the configuration and storage they consume.
    pub fn layer(&self) -> u32 {
        match self {
            Kind::Ingress => 0,
            Kind::Service | Kind::HorizontalPodAutoscaler => 1,
            Kind::Deployment | Kind::StatefulSet | Kind::DaemonSet | Kind::Job | Kind::CronJob => 2,
            Kind::ConfigMap | Kind::Secret | Kind::PersistentVolumeClaim => 3,
        }
    }

    /// Kinds that run containers
    pub fn is_workload(&self) -> bool {
        matches!(
            self,
            Kind::Deployment | Kind::StatefulSet | Kind::DaemonSet | Kind::Job | Kind::CronJob
        )
    }

    /// Kinds whose pod-template labels a Service selector can target
    pub fn exposes_pod_labels(&self) -> bool {
        matches!(self, Kind::Deployment | Kind::StatefulSet | Kind::DaemonSet)
    }

    /// JSON pointer to the pod spec inside a manifest of this kind
    pub fn pod_spec_pointer(&self) -> Option<&'static str> {
        match self {
            Kind::Deployment | Kind::StatefulSet | Kind::DaemonSet | Kind::Job => {
                Some("/spec/template/spec")
            }
            Kind::CronJob => Some("/spec/jobTemplate/spec/template/spec"),
            Kind::Service
            | Kind::Ingress
            | Kind::ConfigMap
            | Kind::Secret
            | Kind::PersistentVolumeClaim
            | Kind::HorizontalPodAutoscaler => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A kind name outside the supported set
#[derive(Debug, Clone, Error)]
#[error("unsupported kind '{kind}'")]
pub struct ParseKindError {
    pub kind: String,
    pub suggestion: Option<String>,
}

impl FromStr for Kind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kind::ALL
            .iter()
            .find(|k| k.as_str() == s)
            .copied()
            .ok_or_else(|| ParseKindError {
                kind: s.to_string(),
                suggestion: suggestions::suggest_kind(s),
            })
    }
}
