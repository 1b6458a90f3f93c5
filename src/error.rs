// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StackError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to load kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("Dependency failed: {0}")]
    Dependency(#[source] Arc<StackError>),

    #[error("Failed to apply {id}: {source}")]
    Resource {
        id: String,
        #[source]
        source: Arc<StackError>,
    },

    #[error("Failed to resolve output {key}: {source}")]
    Export {
        key: String,
        #[source]
        source: Arc<StackError>,
    },

    #[error("Invalid object: {0}")]
    InvalidObject(String),

    #[error("Service {service} selects labels that do not match the pods of deployment {deployment}")]
    SelectorMismatch { service: String, deployment: String },

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Missing status: {0}")]
    MissingStatus(String),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_yaml::Error),
}

impl StackError {
    /// Share this error between every consumer of a failed output.
    ///
    /// An error that already wraps a shared failure hands out that failure
    /// instead of wrapping it again.
    pub fn into_shared(self) -> Arc<StackError> {
        match self {
            StackError::Dependency(source) => source,
            other => Arc::new(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, StackError>;
