// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Object specifications for the Octant dashboard bundle.
//!
//! Pure functions: the same arguments always produce the same objects. Nothing
//! here validates input; the API server is the one to reject a malformed object.

use crate::constants::{octant, rbac, service as svc};
use crate::error::{Result, StackError};
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, EnvVar, PodSpec, PodTemplateSpec, Service, ServiceAccount,
    ServicePort, ServiceSpec,
};
use k8s_openapi::api::rbac::v1::{ClusterRoleBinding, RoleRef, Subject};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::BTreeMap;

pub type Labels = BTreeMap<String, String>;

/// Build a label map from key/value pairs
pub fn labels<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Labels {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Arguments of the dashboard Deployment
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentArgs {
    pub replicas: i32,
    pub image: String,
    /// Pod labels, also used as the Deployment's selector
    pub labels: Labels,
    pub namespace: String,
    pub container_port: i32,
    /// Address the dashboard binds to (`host:port`)
    pub listener_addr: String,
    pub disable_open_browser: String,
    /// Optional allowlist of accepted Host headers
    pub accepted_hosts: Option<String>,
}

/// Arguments of the dashboard Service
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceArgs {
    /// Selector, must match the pod labels of the Deployment to route to
    pub labels: Labels,
    pub namespace: String,
}

pub fn service_account(name: &str, namespace: &str) -> ServiceAccount {
    ServiceAccount {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Bind a ServiceAccount to a ClusterRole
pub fn cluster_role_binding(
    name: &str,
    namespace: &str,
    service_account: &str,
    cluster_role: &str,
) -> ClusterRoleBinding {
    ClusterRoleBinding {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        role_ref: RoleRef {
            api_group: rbac::API_GROUP.to_string(),
            kind: rbac::ROLE_KIND.to_string(),
            name: cluster_role.to_string(),
        },
        subjects: Some(vec![Subject {
            kind: rbac::SUBJECT_KIND.to_string(),
            name: service_account.to_string(),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        }]),
    }
}

/// The dashboard Deployment, running as `service_account`
pub fn deployment(name: &str, args: &DeploymentArgs, service_account: &str) -> Deployment {
    let container = Container {
        name: name.to_string(),
        image: Some(args.image.clone()),
        image_pull_policy: Some("Always".to_string()),
        ports: Some(vec![ContainerPort {
            name: Some(svc::TARGET_PORT_NAME.to_string()),
            container_port: args.container_port,
            ..Default::default()
        }]),
        command: Some(octant::SHELL.iter().map(|s| s.to_string()).collect()),
        args: Some(vec![octant::LAUNCH.to_string()]),
        env: Some(vec![
            env_var(octant::ENV_LISTENER_ADDR, Some(&args.listener_addr)),
            env_var(octant::ENV_ACCEPTED_HOSTS, args.accepted_hosts.as_deref()),
            env_var(octant::ENV_DISABLE_OPEN_BROWSER, Some(&args.disable_open_browser)),
        ]),
        ..Default::default()
    };

    Deployment {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(args.namespace.clone()),
            labels: Some(args.labels.clone()),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(args.replicas),
            selector: LabelSelector {
                match_labels: Some(args.labels.clone()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(args.labels.clone()),
                    namespace: Some(args.namespace.clone()),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    service_account_name: Some(service_account.to_string()),
                    containers: vec![container],
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn env_var(name: &str, value: Option<&str>) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value: value.map(str::to_string),
        ..Default::default()
    }
}

/// The dashboard Service: port 80 to the pods' `http` port, behind a load balancer
pub fn service(name: &str, args: &ServiceArgs) -> Service {
    Service {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(args.namespace.clone()),
            labels: Some(args.labels.clone()),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            type_: Some(svc::TYPE.to_string()),
            ports: Some(vec![ServicePort {
                port: svc::PORT,
                protocol: Some(svc::PROTOCOL.to_string()),
                target_port: Some(IntOrString::String(svc::TARGET_PORT_NAME.to_string())),
                ..Default::default()
            }]),
            selector: Some(args.labels.clone()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Pod labels of a Deployment's template
pub fn pod_labels(deployment: &Deployment) -> Labels {
    deployment
        .spec
        .as_ref()
        .and_then(|s| s.template.metadata.as_ref())
        .and_then(|m| m.labels.clone())
        .unwrap_or_default()
}

/// Check that a Service selector routes to the pods of `deployment`.
///
/// The selector must be non-empty and every entry must be carried by the pod labels.
pub fn validate_selector(service: &str, selector: &Labels, deployment: &Deployment) -> Result<()> {
    let pods = pod_labels(deployment);
    let matches = !selector.is_empty() && selector.iter().all(|(k, v)| pods.get(k) == Some(v));

    if matches {
        Ok(())
    } else {
        Err(StackError::SelectorMismatch {
            service: service.to_string(),
            deployment: deployment.metadata.name.clone().unwrap_or_default(),
        })
    }
}
