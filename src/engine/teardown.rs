// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Removal of every object a stack applied

use crate::error::Result;
use crate::kubernetes::provider::Provider;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Namespace, Service, ServiceAccount};
use k8s_openapi::api::rbac::v1::ClusterRoleBinding;
use tracing::{info, instrument};

/// Delete every object labelled with the provider's stack, dependents first.
///
/// Returns the number of objects deleted.
#[instrument(skip(provider), fields(stack = %provider.stack()))]
pub async fn destroy(provider: &Provider) -> Result<usize> {
    info!("Destroying stack {}", provider.stack());

    let mut deleted = provider.delete_namespaced::<Service>().await?;
    deleted += provider.delete_namespaced::<Deployment>().await?;
    deleted += provider.delete_cluster::<ClusterRoleBinding>().await?;
    deleted += provider.delete_namespaced::<ServiceAccount>().await?;
    deleted += provider.delete_cluster::<Namespace>().await?;

    info!("Deleted {} objects", deleted);
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{empty_list_json, MockService};
    use serde_json::json;

    fn list_of(api_version: &str, kind: &str, items: Vec<serde_json::Value>) -> String {
        json!({
            "apiVersion": api_version,
            "kind": format!("{}List", kind),
            "metadata": {},
            "items": items
        })
        .to_string()
    }

    fn item(api_version: &str, kind: &str, name: &str, namespace: Option<&str>) -> serde_json::Value {
        let mut metadata = json!({ "name": name });
        if let Some(ns) = namespace {
            metadata["namespace"] = json!(ns);
        }
        json!({ "apiVersion": api_version, "kind": kind, "metadata": metadata })
    }

    #[tokio::test]
    async fn test_destroy_deletes_dependents_first() {
        let svc = item("v1", "Service", "octant", Some("demo"));
        let crb = item("rbac.authorization.k8s.io/v1", "ClusterRoleBinding", "octant-demo", None);
        let ns = item("v1", "Namespace", "demo", None);

        let mock = MockService::new()
            .on_get("/api/v1/services", 200, &list_of("v1", "Service", vec![svc.clone()]))
            .on_get("/apis/apps/v1/deployments", 200, &empty_list_json("apps/v1", "DeploymentList"))
            .on_get(
                "/apis/rbac.authorization.k8s.io/v1/clusterrolebindings",
                200,
                &list_of("rbac.authorization.k8s.io/v1", "ClusterRoleBinding", vec![crb.clone()]),
            )
            .on_get("/api/v1/serviceaccounts", 200, &empty_list_json("v1", "ServiceAccountList"))
            .on_get("/api/v1/namespaces", 200, &list_of("v1", "Namespace", vec![ns.clone()]))
            .on_delete("/api/v1/namespaces/demo/services/octant", 200, &svc.to_string())
            .on_delete(
                "/apis/rbac.authorization.k8s.io/v1/clusterrolebindings/octant-demo",
                200,
                &crb.to_string(),
            )
            .on_delete("/api/v1/namespaces/demo", 200, &ns.to_string());
        let provider = Provider::new(mock.clone().into_client(), "demo");

        let deleted = destroy(&provider).await.unwrap();

        assert_eq!(deleted, 3);
        let deletes: Vec<String> = mock
            .requests()
            .into_iter()
            .filter(|r| r.method == "DELETE")
            .map(|r| r.path)
            .collect();
        assert_eq!(
            deletes,
            vec![
                "/api/v1/namespaces/demo/services/octant",
                "/apis/rbac.authorization.k8s.io/v1/clusterrolebindings/octant-demo",
                "/api/v1/namespaces/demo",
            ]
        );
    }

    #[tokio::test]
    async fn test_destroy_fails_when_listing_fails() {
        // Nothing registered: the first list is answered with 404
        let provider = Provider::new(MockService::new().into_client(), "demo");
        assert!(destroy(&provider).await.is_err());
    }
}
