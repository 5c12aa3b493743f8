// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Errors raised while bootstrapping the cluster and provisioning the manager.

use thiserror::Error;

use super::control_plane::ApiError;
use super::manifest::ManifestError;
use super::validation::ValidationError;
use crate::config::StoreError;

#[derive(Error, Debug)]
pub enum ClusterError {
    /// A control-plane read or create failed for a reason other than
    /// "not found" or "already exists".
    #[error("Cluster state error: failed to {action} {kind} '{name}': {source}")]
    ClusterState {
        action: &'static str,
        kind: &'static str,
        name: String,
        #[source]
        source: ApiError,
    },

    /// A divergent role binding was deleted but its replacement could not be
    /// created. The binding is absent until bootstrap runs again.
    #[error(
        "RoleBinding '{name}' in namespace '{namespace}' was deleted for replacement \
         but could not be re-created and is now absent; re-run bootstrap: {source}"
    )]
    BindingRemoved {
        namespace: String,
        name: String,
        #[source]
        source: ApiError,
    },

    /// The manager service has no external address yet; retry later.
    #[error("Service '{service}' in namespace '{namespace}' has no external address yet")]
    EndpointUnresolved { namespace: String, service: String },

    #[error("Invalid manifest: {0}")]
    Manifest(#[from] ManifestError),

    #[error("Invalid cluster identity: {0}")]
    Identity(#[from] ValidationError),

    #[error("Failed to persist manager endpoint: {0}")]
    Persist(#[from] StoreError),

    #[error("Failed to connect to the cluster: {0}")]
    Connect(String),
}

impl ClusterError {
    pub(crate) fn state(
        action: &'static str,
        kind: &'static str,
        name: &str,
        source: ApiError,
    ) -> Self {
        Self::ClusterState { action, kind, name: name.to_string(), source }
    }

    /// Whether retrying resolution later may succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::EndpointUnresolved { .. })
    }
}
