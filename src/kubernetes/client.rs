// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Target cluster client creation and kubeconfig utilities

use crate::config::Config;
use crate::error::{Result, StackError};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config as KConfig};
use std::path::Path;
use tracing::{debug, info, instrument};

/// An authenticated connection to the target cluster
pub struct ClusterAccess {
    pub client: Client,
    /// The kubeconfig the client was built from, rendered as YAML
    pub kubeconfig: String,
}

/// Connect to the cluster described by the configured kubeconfig
#[instrument(skip(config), fields(context = ?config.kube_context))]
pub async fn connect(config: &Config) -> Result<ClusterAccess> {
    let mut kubeconfig = load_kubeconfig(config.kubeconfig_path.as_deref())?;
    if let Some(context) = &config.kube_context {
        select_context(&mut kubeconfig, context)?;
    }
    let rendered = serde_yaml::to_string(&kubeconfig)?;

    let options = KubeConfigOptions {
        context: config.kube_context.clone(),
        ..Default::default()
    };
    let client = create_client(kubeconfig, &options).await?;
    info!("Connected to Kubernetes cluster");

    Ok(ClusterAccess {
        client,
        kubeconfig: rendered,
    })
}

/// Narrow a kubeconfig down to one context, its cluster and its user, and make it current
fn select_context(kubeconfig: &mut Kubeconfig, context: &str) -> Result<()> {
    let selected = kubeconfig
        .contexts
        .iter()
        .find(|c| c.name == context)
        .and_then(|c| c.context.clone())
        .ok_or_else(|| {
            StackError::KubeconfigError(format!("Context {} not found in kubeconfig", context))
        })?;
    debug!("Selecting kubeconfig context {}", context);

    kubeconfig.contexts.retain(|c| c.name == context);
    kubeconfig.clusters.retain(|c| c.name == selected.cluster);
    kubeconfig
        .auth_infos
        .retain(|a| selected.user.as_deref() == Some(a.name.as_str()));
    kubeconfig.current_context = Some(context.to_string());
    Ok(())
}

/// Read a kubeconfig from an explicit path, or from the standard locations
fn load_kubeconfig(path: Option<&Path>) -> Result<Kubeconfig> {
    match path {
        Some(path) => {
            debug!("Reading kubeconfig from {}", path.display());
            Kubeconfig::read_from(path).map_err(|e| {
                StackError::KubeconfigError(format!(
                    "Failed to read kubeconfig {}: {}",
                    path.display(),
                    e
                ))
            })
        }
        None => Kubeconfig::read()
            .map_err(|e| StackError::KubeconfigError(format!("Failed to read kubeconfig: {}", e))),
    }
}

/// Parse a kubeconfig document
#[cfg(test)]
fn parse_kubeconfig(kubeconfig: &str) -> Result<Kubeconfig> {
    serde_yaml::from_str(kubeconfig)
        .map_err(|e| StackError::KubeconfigError(format!("Failed to parse kubeconfig: {}", e)))
}

async fn create_client(kubeconfig: Kubeconfig, options: &KubeConfigOptions) -> Result<Client> {
    let client_config = KConfig::from_custom_kubeconfig(kubeconfig, options)
        .await
        .map_err(|e| StackError::KubeconfigError(format!("Failed to create config: {}", e)))?;

    Client::try_from(client_config)
        .map_err(|e| StackError::KubeconfigError(format!("Failed to create client: {}", e)))
}
