// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_PROJECT_NAME: &str = "octant-stack";
const DEFAULT_LOAD_BALANCER_TIMEOUT_SECS: u64 = 600;

/// Stack configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Project name, used for the stack, the namespace and the NGINX resources
    pub project_name: String,
    pub kubeconfig_path: Option<PathBuf>,
    pub kube_context: Option<String>,
    /// Upper bound on waiting for a load balancer to be assigned
    pub load_balancer_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let project_name = lookup("PROJECT_NAME")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string());
        let kubeconfig_path = lookup("KUBECONFIG_PATH").map(PathBuf::from);
        let kube_context = lookup("KUBE_CONTEXT");

        let timeout_secs = match lookup("LOAD_BALANCER_TIMEOUT_SECS") {
            Some(v) => v
                .parse()
                .with_context(|| format!("LOAD_BALANCER_TIMEOUT_SECS is not a number: {}", v))?,
            None => DEFAULT_LOAD_BALANCER_TIMEOUT_SECS,
        };

        Ok(Config {
            project_name,
            kubeconfig_path,
            kube_context,
            load_balancer_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
