// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// The field manager used for server-side apply
pub const FIELD_MANAGER: &str = "octant-stack";

/// Labels stamped on every object the stack applies
pub mod labels {
    /// Marks objects applied by this tool
    pub const MANAGED_BY: &str = "app.kubernetes.io/managed-by";
    /// Name of the stack that owns the object
    pub const STACK: &str = "octant-stack.io/stack";
}

/// Octant dashboard deployment contract
pub mod octant {
    pub const IMAGE: &str = "quay.io/metral/octant:0.6.0-86d8a32";
    pub const CONTAINER_PORT: i32 = 7777;
    pub const LISTENER_ADDR: &str = "0.0.0.0:7777";
    pub const DISABLE_OPEN_BROWSER: &str = "1";
    pub const CLUSTER_ROLE: &str = "cluster-admin";

    pub const SHELL: [&str; 2] = ["/bin/sh", "-c"];
    pub const LAUNCH: &str = "/usr/local/bin/launch.sh; /app/octant -v --kubeconfig=$HOME/.kube/config --context=default-context";

    pub const ENV_LISTENER_ADDR: &str = "OCTANT_LISTENER_ADDR";
    pub const ENV_ACCEPTED_HOSTS: &str = "OCTANT_ACCEPTED_HOSTS";
    pub const ENV_DISABLE_OPEN_BROWSER: &str = "OCTANT_DISABLE_OPEN_BROWSER";
}

/// Service exposure shared by every load-balanced workload
pub mod service {
    pub const PORT: i32 = 80;
    pub const TARGET_PORT_NAME: &str = "http";
    pub const TYPE: &str = "LoadBalancer";
    pub const PROTOCOL: &str = "TCP";
}

pub mod rbac {
    pub const API_GROUP: &str = "rbac.authorization.k8s.io";
    pub const ROLE_KIND: &str = "ClusterRole";
    pub const SUBJECT_KIND: &str = "ServiceAccount";
}
