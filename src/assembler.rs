// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The stack declared by this program: a namespace, NGINX behind a load
//! balancer, and the Octant dashboard.

use crate::config::Config;
use crate::constants::{octant, service as svc};
use crate::dashboard::{self, specs, DeploymentArgs, Labels, ServiceArgs};
use crate::engine::{ResourceOptions, Stack};
use crate::error::Result;
use crate::kubernetes::{self, Provider};
use crate::output::Output;
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, Namespace, PodSpec, PodTemplateSpec, Service, ServicePort,
    ServiceSpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use tracing::{info, instrument};

const NGINX_IMAGE: &str = "nginx";
const NGINX_REPLICAS: i32 = 2;
const NGINX_PORT: i32 = 80;

/// The cluster the stack is deployed to
pub struct Cluster {
    pub provider: Provider,
    /// Credentials for the cluster, as a kubeconfig document
    pub kubeconfig: Output<String>,
}

impl Cluster {
    /// Connect to the configured cluster
    pub async fn connect(config: &Config) -> Result<Self> {
        let access = kubernetes::connect(config).await?;
        Ok(Self {
            provider: Provider::new(access.client, config.project_name.clone()),
            kubeconfig: Output::known(access.kubeconfig),
        })
    }
}

/// Declare every resource of the stack and its outputs
#[instrument(skip(config, cluster), fields(project = %config.project_name))]
pub fn assemble(config: &Config, cluster: &Cluster) -> Stack {
    let project = config.project_name.clone();
    let provider = &cluster.provider;
    let timeout = config.load_balancer_timeout;
    let mut stack = Stack::new(&project);

    stack.export_secret("kubeconfig", cluster.kubeconfig.clone());

    let namespace = stack.register_cluster(
        &project,
        Output::known(namespace_spec(&project)),
        ResourceOptions::new(provider),
    );
    let namespace_name = namespace.metadata_name();
    stack.export("namespaceName", namespace_name.clone());

    // NGINX
    let nginx_labels = specs::labels([("app", "nginx")]);
    let nginx_deployment = {
        let (project, labels) = (project.clone(), nginx_labels.clone());
        stack.register_namespaced(
            "nginx",
            namespace_name.apply(move |ns| nginx_deployment_spec(&project, &ns, &labels)),
            ResourceOptions::new(provider),
        )
    };
    let nginx_service = {
        let (project, labels) = (project.clone(), nginx_labels);
        let spec = namespace_name
            .zip(nginx_deployment.live())
            .and_then(move |(ns, deployment)| async move {
                specs::validate_selector(&project, &labels, &deployment)?;
                Ok(nginx_service_spec(&project, &ns, &labels))
            });
        stack.register_namespaced(&config.project_name, spec, ResourceOptions::new(provider))
    };
    stack.export("nginxUrl", nginx_service.load_balancer_hostname(provider, timeout));

    // Octant
    let octant_labels = specs::labels([("app", "octant")]);
    let octant_args = {
        let labels = octant_labels.clone();
        namespace_name.apply(move |namespace| DeploymentArgs {
            replicas: 1,
            image: octant::IMAGE.to_string(),
            labels,
            namespace,
            container_port: octant::CONTAINER_PORT,
            listener_addr: octant::LISTENER_ADDR.to_string(),
            disable_open_browser: octant::DISABLE_OPEN_BROWSER.to_string(),
            accepted_hosts: None,
        })
    };
    let octant = dashboard::create_deployment(&mut stack, "octant", octant_args, provider);

    let octant_service_args = namespace_name
        .zip(octant.deployment.live())
        .and_then(move |(namespace, deployment)| async move {
            specs::validate_selector("octant", &octant_labels, &deployment)?;
            Ok(ServiceArgs {
                labels: octant_labels,
                namespace,
            })
        });
    let octant_service =
        dashboard::create_service(&mut stack, "octant", octant_service_args, provider);
    stack.export("octantUrl", octant_service.load_balancer_hostname(provider, timeout));

    info!(
        "Declared {} resources in stack {}",
        stack.resource_ids().count(),
        stack.name()
    );
    stack
}

fn namespace_spec(name: &str) -> Namespace {
    Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn nginx_deployment_spec(container_name: &str, namespace: &str, labels: &Labels) -> Deployment {
    Deployment {
        metadata: ObjectMeta {
            name: Some("nginx".to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(labels.clone()),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(NGINX_REPLICAS),
            selector: LabelSelector {
                match_labels: Some(labels.clone()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels.clone()),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![Container {
                        name: container_name.to_string(),
                        image: Some(NGINX_IMAGE.to_string()),
                        ports: Some(vec![ContainerPort {
                            name: Some(svc::TARGET_PORT_NAME.to_string()),
                            container_port: NGINX_PORT,
                            ..Default::default()
                        }]),
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn nginx_service_spec(name: &str, namespace: &str, labels: &Labels) -> Service {
    Service {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(labels.clone()),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            type_: Some(svc::TYPE.to_string()),
            ports: Some(vec![ServicePort {
                port: svc::PORT,
                target_port: Some(IntOrString::String(svc::TARGET_PORT_NAME.to_string())),
                ..Default::default()
            }]),
            selector: Some(labels.clone()),
            ..Default::default()
        }),
        ..Default::default()
    }
}
