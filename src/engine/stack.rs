// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource registrations and the apply of a whole stack.

use crate::error::{Result, StackError};
use crate::kubernetes::provider::{service_hostname, ManagedObject, Provider};
use crate::output::Output;
use futures::future;
use k8s_openapi::api::core::v1::Service;
use k8s_openapi::{ClusterResourceScope, NamespaceResourceScope};
use kube::{Resource, ResourceExt};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tracing::{debug, error, info, instrument};

/// Value printed in place of secret outputs
pub const REDACTED: &str = "[secret]";

/// Options accepted by every resource registration
#[derive(Clone)]
pub struct ResourceOptions {
    pub provider: Provider,
    /// Outputs that must resolve before the resource is applied
    pub depends_on: Vec<Output<()>>,
}

impl ResourceOptions {
    pub fn new(provider: &Provider) -> Self {
        Self {
            provider: provider.clone(),
            depends_on: Vec::new(),
        }
    }

    pub fn depends_on(mut self, dependency: Output<()>) -> Self {
        self.depends_on.push(dependency);
        self
    }
}

/// Handle to a registered resource
#[derive(Clone, Debug)]
pub struct Deployed<K> {
    name: String,
    live: Output<K>,
}

impl<K: ManagedObject> Deployed<K> {
    /// Logical name the resource was registered under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The object as returned by the cluster after apply
    pub fn live(&self) -> &Output<K> {
        &self.live
    }

    /// Name of the live object
    pub fn metadata_name(&self) -> Output<String> {
        self.live.apply(|object| object.name_any())
    }

    /// Namespace of the live object (empty for cluster-scoped objects)
    pub fn namespace(&self) -> Output<String> {
        self.live.apply(|object| object.namespace().unwrap_or_default())
    }

    /// Resolves once the object has been applied
    pub fn ready(&self) -> Output<()> {
        self.live.apply(|_| ())
    }
}

impl Deployed<Service> {
    /// External address of the Service's load balancer, once the cloud provider assigned one
    pub fn load_balancer_hostname(&self, provider: &Provider, timeout: Duration) -> Output<String> {
        let provider = provider.clone();
        self.live.and_then(move |service| async move {
            if let Some(hostname) = service_hostname(&service) {
                return Ok(hostname);
            }
            let namespace = service.namespace().unwrap_or_default();
            provider
                .load_balancer_hostname(&namespace, &service.name_any(), timeout)
                .await
        })
    }
}

/// Program outputs, in key order
#[derive(Debug, Clone, Default)]
pub struct StackOutputs {
    values: BTreeMap<String, String>,
    secrets: BTreeSet<String>,
}

impl StackOutputs {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Outputs as a JSON object, with secret values replaced unless `show_secrets` is set
    pub fn to_json(&self, show_secrets: bool) -> Value {
        let map: Map<String, Value> = self
            .values
            .iter()
            .map(|(key, value)| {
                let shown = if self.secrets.contains(key) && !show_secrets {
                    REDACTED
                } else {
                    value.as_str()
                };
                (key.clone(), json!(shown))
            })
            .collect();
        Value::Object(map)
    }
}

/// A named set of resource registrations and exported outputs
pub struct Stack {
    name: String,
    resources: Vec<(String, Output<()>)>,
    exports: Vec<(String, Output<String>)>,
    secrets: BTreeSet<String>,
}

impl Stack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resources: Vec::new(),
            exports: Vec::new(),
            secrets: BTreeSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifiers (`Kind/name`) of the registered resources, in registration order
    pub fn resource_ids(&self) -> impl Iterator<Item = &str> {
        self.resources.iter().map(|(id, _)| id.as_str())
    }

    /// Register a namespaced object built from `spec`
    pub fn register_namespaced<K>(
        &mut self,
        name: &str,
        spec: Output<K>,
        opts: ResourceOptions,
    ) -> Deployed<K>
    where
        K: ManagedObject + Resource<Scope = NamespaceResourceScope>,
    {
        let ResourceOptions {
            provider,
            depends_on,
        } = opts;
        let live = Output::all(depends_on)
            .zip(&spec)
            .and_then(move |(_, object)| async move { provider.apply_namespaced(object).await });
        self.track(name, live)
    }

    /// Register a cluster-scoped object built from `spec`
    pub fn register_cluster<K>(
        &mut self,
        name: &str,
        spec: Output<K>,
        opts: ResourceOptions,
    ) -> Deployed<K>
    where
        K: ManagedObject + Resource<Scope = ClusterResourceScope>,
    {
        let ResourceOptions {
            provider,
            depends_on,
        } = opts;
        let live = Output::all(depends_on)
            .zip(&spec)
            .and_then(move |(_, object)| async move { provider.apply_cluster(object).await });
        self.track(name, live)
    }

    fn track<K: ManagedObject>(&mut self, name: &str, live: Output<K>) -> Deployed<K> {
        let id = format!("{}/{}", K::kind(&()), name);
        debug!("Registered {}", id);
        self.resources.push((id, live.apply(|_| ())));
        Deployed {
            name: name.to_string(),
            live,
        }
    }

    /// Publish an output of the program
    pub fn export(&mut self, key: &str, value: Output<String>) {
        self.exports.push((key.to_string(), value));
    }

    /// Publish an output that is redacted when printed
    pub fn export_secret(&mut self, key: &str, value: Output<String>) {
        self.secrets.insert(key.to_string());
        self.export(key, value);
    }

    /// Apply every registered resource, then resolve the exports.
    ///
    /// Independent resources are applied concurrently. The first failure aborts
    /// the apply; resources already applied are left in place.
    #[instrument(skip(self), fields(stack = %self.name))]
    pub async fn up(self) -> Result<StackOutputs> {
        info!("Applying {} resources", self.resources.len());

        future::try_join_all(self.resources.iter().map(|(id, ready)| async move {
            ready.resolve().await.map_err(|e| {
                error!("{} failed: {}", id, e);
                StackError::Resource {
                    id: id.clone(),
                    source: e.into_shared(),
                }
            })
        }))
        .await?;

        info!("All resources applied, resolving {} outputs", self.exports.len());

        let values = future::try_join_all(self.exports.iter().map(|(key, value)| async move {
            value
                .resolve()
                .await
                .map(|v| (key.clone(), v))
                .map_err(|e| StackError::Export {
                    key: key.clone(),
                    source: e.into_shared(),
                })
        }))
        .await?;

        Ok(StackOutputs {
            values: values.into_iter().collect(),
            secrets: self.secrets,
        })
    }
}
