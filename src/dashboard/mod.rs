// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The Octant dashboard: a Deployment with its own ServiceAccount and
//! ClusterRoleBinding, and a LoadBalancer Service in front of it.

pub mod module;
pub mod specs;

pub use module::{create_deployment, create_service, Dashboard};
pub use specs::{DeploymentArgs, Labels, ServiceArgs};
