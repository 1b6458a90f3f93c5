// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Applying, watching and deleting stack objects on the target cluster

use crate::constants::{labels, FIELD_MANAGER};
use crate::error::{Result, StackError};
use k8s_openapi::api::core::v1::Service;
use k8s_openapi::{ClusterResourceScope, NamespaceResourceScope};
use kube::{
    api::{DeleteParams, ListParams, Patch, PatchParams},
    runtime::wait::await_condition,
    Api, Client, Resource, ResourceExt,
};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Objects the provider knows how to apply and delete
pub trait ManagedObject:
    Resource<DynamicType = ()> + Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<K> ManagedObject for K where
    K: Resource<DynamicType = ()> + Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

/// Handle to the cluster that stack objects are applied to.
///
/// Passed explicitly to every resource registration.
#[derive(Clone)]
pub struct Provider {
    client: Client,
    stack: String,
}

impl Provider {
    pub fn new(client: Client, stack: impl Into<String>) -> Self {
        Self {
            client,
            stack: stack.into(),
        }
    }

    pub fn stack(&self) -> &str {
        &self.stack
    }

    /// Label selector matching every object owned by this stack
    pub fn stack_selector(&self) -> String {
        format!("{}={}", labels::STACK, self.stack)
    }

    /// Apply a namespaced object (create or update)
    pub async fn apply_namespaced<K>(&self, object: K) -> Result<K>
    where
        K: ManagedObject + Resource<Scope = NamespaceResourceScope>,
    {
        let Some(namespace) = object.namespace() else {
            return Err(StackError::InvalidObject(format!(
                "{} {} has no namespace",
                K::kind(&()),
                object.name_any()
            )));
        };
        let api: Api<K> = Api::namespaced(self.client.clone(), &namespace);
        self.apply(api, object).await
    }

    /// Apply a cluster-scoped object (create or update)
    pub async fn apply_cluster<K>(&self, object: K) -> Result<K>
    where
        K: ManagedObject + Resource<Scope = ClusterResourceScope>,
    {
        let api: Api<K> = Api::all(self.client.clone());
        self.apply(api, object).await
    }

    #[instrument(skip(self, api, object), fields(kind = %K::kind(&()), name = %object.name_any()))]
    async fn apply<K: ManagedObject>(&self, api: Api<K>, mut object: K) -> Result<K> {
        let name = object.name_any();
        if name.is_empty() {
            return Err(StackError::InvalidObject(format!("{} without a name", K::kind(&()))));
        }
        self.stamp(&mut object);

        info!("Applying {} {}", K::kind(&()), name);
        let pp = PatchParams::apply(FIELD_MANAGER).force();
        let live = api.patch(&name, &pp, &Patch::Apply(&object)).await?;
        debug!("Applied {} {}", K::kind(&()), name);

        Ok(live)
    }

    /// Mark an object as owned by this stack. Only top-level metadata is touched.
    pub fn stamp<K: Resource>(&self, object: &mut K) {
        let object_labels = object.labels_mut();
        object_labels.insert(labels::MANAGED_BY.to_string(), FIELD_MANAGER.to_string());
        object_labels.insert(labels::STACK.to_string(), self.stack.clone());
    }

    /// Wait until a LoadBalancer Service is assigned an external address
    #[instrument(skip(self))]
    pub async fn load_balancer_hostname(
        &self,
        namespace: &str,
        name: &str,
        timeout: Duration,
    ) -> Result<String> {
        let services: Api<Service> = Api::namespaced(self.client.clone(), namespace);
        let has_address = |svc: Option<&Service>| svc.and_then(service_hostname).is_some();

        info!("Waiting for load balancer of service {}/{}", namespace, name);
        let service = tokio::time::timeout(timeout, await_condition(services, name, has_address))
            .await
            .map_err(|_| {
                StackError::Timeout(format!(
                    "no load balancer for service {}/{} after {} seconds",
                    namespace,
                    name,
                    timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                StackError::MissingStatus(format!(
                    "failed to watch service {}/{}: {}",
                    namespace, name, e
                ))
            })?;

        service
            .as_ref()
            .and_then(service_hostname)
            .ok_or_else(|| {
                StackError::MissingStatus(format!(
                    "service {}/{} was deleted before it received a load balancer",
                    namespace, name
                ))
            })
    }

    /// Delete every namespaced object of kind `K` owned by this stack
    pub async fn delete_namespaced<K>(&self) -> Result<usize>
    where
        K: ManagedObject + Resource<Scope = NamespaceResourceScope>,
    {
        let all: Api<K> = Api::all(self.client.clone());
        let owned = all
            .list(&ListParams::default().labels(&self.stack_selector()))
            .await?;

        let mut deleted = 0;
        for object in owned.items {
            let namespace = object.namespace().unwrap_or_default();
            let api: Api<K> = Api::namespaced(self.client.clone(), &namespace);
            if self.delete(&api, &object.name_any()).await? {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    /// Delete every cluster-scoped object of kind `K` owned by this stack
    pub async fn delete_cluster<K>(&self) -> Result<usize>
    where
        K: ManagedObject + Resource<Scope = ClusterResourceScope>,
    {
        let api: Api<K> = Api::all(self.client.clone());
        let owned = api
            .list(&ListParams::default().labels(&self.stack_selector()))
            .await?;

        let mut deleted = 0;
        for object in owned.items {
            if self.delete(&api, &object.name_any()).await? {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    async fn delete<K: ManagedObject>(&self, api: &Api<K>, name: &str) -> Result<bool> {
        match api.delete(name, &DeleteParams::background()).await {
            Ok(_) => {
                info!("Deleted {} {}", K::kind(&()), name);
                Ok(true)
            }
            Err(kube::Error::Api(err)) if err.code == 404 => {
                debug!("{} {} already gone", K::kind(&()), name);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// The external address of a LoadBalancer Service, preferring the hostname over the IP
pub fn service_hostname(service: &Service) -> Option<String> {
    let ingress = service
        .status
        .as_ref()?
        .load_balancer
        .as_ref()?
        .ingress
        .as_ref()?;
    let first = ingress.first()?;
    first.hostname.clone().or_else(|| first.ip.clone())
}
