// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for client creation and applying stack objects.

pub mod client;
pub mod provider;

pub use client::{connect, ClusterAccess};
pub use provider::{ManagedObject, Provider};
