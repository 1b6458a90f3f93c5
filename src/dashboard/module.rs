// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Registration of the dashboard bundle on a stack.

use crate::constants::octant::CLUSTER_ROLE;
use crate::dashboard::specs::{self, DeploymentArgs, ServiceArgs};
use crate::engine::{Deployed, ResourceOptions, Stack};
use crate::kubernetes::provider::Provider;
use crate::output::Output;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Service, ServiceAccount};
use k8s_openapi::api::rbac::v1::ClusterRoleBinding;
use tracing::debug;

/// Handles to the objects making up one dashboard deployment
#[derive(Clone, Debug)]
pub struct Dashboard {
    pub service_account: Deployed<ServiceAccount>,
    pub cluster_role_binding: Deployed<ClusterRoleBinding>,
    pub deployment: Deployed<Deployment>,
}

/// Register a dashboard Deployment, running under its own ServiceAccount.
///
/// The ServiceAccount is bound to `cluster-admin`: the dashboard can read and
/// change everything in the cluster.
pub fn create_deployment(
    stack: &mut Stack,
    name: &str,
    args: Output<DeploymentArgs>,
    provider: &Provider,
) -> Dashboard {
    debug!("Declaring dashboard {}", name);

    let owned = name.to_string();
    let service_account = stack.register_namespaced(
        name,
        args.apply(move |a| specs::service_account(&owned, &a.namespace)),
        ResourceOptions::new(provider),
    );
    let account_name = service_account.metadata_name();

    // Cluster-scoped, so qualified by namespace to stay unique across stacks
    let owned = name.to_string();
    let cluster_role_binding = stack.register_cluster(
        name,
        args.zip(&account_name).apply(move |(a, account)| {
            let binding = format!("{}-{}", owned, a.namespace);
            specs::cluster_role_binding(&binding, &a.namespace, &account, CLUSTER_ROLE)
        }),
        ResourceOptions::new(provider),
    );

    let owned = name.to_string();
    let deployment = stack.register_namespaced(
        name,
        args.zip(&account_name)
            .apply(move |(a, account)| specs::deployment(&owned, &a, &account)),
        ResourceOptions::new(provider),
    );

    Dashboard {
        service_account,
        cluster_role_binding,
        deployment,
    }
}

/// Register the Service exposing a dashboard.
///
/// Not chained to [`create_deployment`]: the caller decides which pods it selects.
pub fn create_service(
    stack: &mut Stack,
    name: &str,
    args: Output<ServiceArgs>,
    provider: &Provider,
) -> Deployed<Service> {
    let owned = name.to_string();
    stack.register_namespaced(
        name,
        args.apply(move |a| specs::service(&owned, &a)),
        ResourceOptions::new(provider),
    )
}
