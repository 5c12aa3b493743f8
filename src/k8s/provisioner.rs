// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Deploys the pod manager and learns where it can be reached.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::control_plane::{ApiError, ControlPlane};
use super::error::ClusterError;
use super::manifest::{Manifest, ManifestReport};
use super::types::{ClusterIdentity, IngressAddress, ManagerEndpoint, MANAGER_PORT, MANAGER_SERVICE};
use crate::config::EndpointHandle;

/// How often the manager service is polled for an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvePolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for ResolvePolicy {
    fn default() -> Self {
        Self { attempts: 1, interval: Duration::from_secs(5) }
    }
}

/// Pick the address to reach the service by.
///
/// An IP on any ingress entry wins over a hostname; otherwise the first
/// hostname is used.
pub fn select_address(ingress: &[IngressAddress]) -> Option<&str> {
    fn non_empty(value: &Option<String>) -> Option<&str> {
        value.as_deref().filter(|v| !v.is_empty())
    }
    ingress
        .iter()
        .find_map(|entry| non_empty(&entry.ip))
        .or_else(|| ingress.iter().find_map(|entry| non_empty(&entry.hostname)))
}

pub struct DeploymentProvisioner {
    control_plane: Arc<dyn ControlPlane>,
    manifest: Manifest,
    endpoint: Arc<EndpointHandle>,
    resolve: ResolvePolicy,
}

impl DeploymentProvisioner {
    pub fn new(
        control_plane: Arc<dyn ControlPlane>,
        manifest: Manifest,
        endpoint: Arc<EndpointHandle>,
    ) -> Self {
        Self { control_plane, manifest, endpoint, resolve: ResolvePolicy::default() }
    }

    pub fn with_resolve_policy(mut self, resolve: ResolvePolicy) -> Self {
        self.resolve = resolve;
        self
    }

    /// Apply the manifest, resolve the manager address and persist it.
    ///
    /// # Errors
    /// `EndpointUnresolved` when the service has no external address after
    /// the configured number of polls; `ClusterState` when applying fails.
    pub async fn deploy_manager(
        &self,
        identity: &ClusterIdentity,
    ) -> Result<ManagerEndpoint, ClusterError> {
        self.apply_manifest(identity).await?;
        let endpoint = self
            .resolve_endpoint_with_retry(identity, self.resolve)
            .await?;
        self.persist_endpoint(&endpoint)?;
        Ok(endpoint)
    }

    /// Create every manifest object in the identity's namespace.
    ///
    /// Objects that already exist are logged and skipped; any other failure
    /// aborts the apply.
    pub async fn apply_manifest(
        &self,
        identity: &ClusterIdentity,
    ) -> Result<ManifestReport, ClusterError> {
        let namespace = &identity.namespace;
        let mut report = ManifestReport::default();

        for object in self.manifest.objects() {
            let label = format!("{}/{}", object.kind(), object.name());
            match self
                .control_plane
                .create_manifest_object(namespace, object)
                .await
            {
                Ok(()) => {
                    info!(%namespace, object = %label, "Manifest object created");
                    report.created.push(label);
                }
                Err(ApiError::Conflict(reason)) => {
                    info!(%namespace, object = %label, %reason, "Resource already exists");
                    report.existing.push(label);
                }
                Err(e) => {
                    return Err(ClusterError::state("create", object.kind(), object.name(), e));
                }
            }
        }
        Ok(report)
    }

    /// Read the manager service once and derive its endpoint.
    pub async fn resolve_endpoint(
        &self,
        identity: &ClusterIdentity,
    ) -> Result<ManagerEndpoint, ClusterError> {
        let namespace = &identity.namespace;
        let unresolved = || ClusterError::EndpointUnresolved {
            namespace: namespace.clone(),
            service: MANAGER_SERVICE.to_string(),
        };

        let ingress = match self
            .control_plane
            .read_service_ingress(namespace, MANAGER_SERVICE)
            .await
        {
            Ok(ingress) => ingress,
            Err(ApiError::NotFound) => return Err(unresolved()),
            Err(e) => return Err(ClusterError::state("read", "Service", MANAGER_SERVICE, e)),
        };

        let host = select_address(&ingress).ok_or_else(unresolved)?;
        info!(%namespace, %host, "Pod manager address resolved");
        Ok(ManagerEndpoint::new(host, MANAGER_PORT))
    }

    /// Poll `policy.attempts` times, sleeping `policy.interval` in between.
    pub async fn resolve_endpoint_with_retry(
        &self,
        identity: &ClusterIdentity,
        policy: ResolvePolicy,
    ) -> Result<ManagerEndpoint, ClusterError> {
        let attempts = policy.attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.resolve_endpoint(identity).await {
                Err(e) if e.is_recoverable() && attempt < attempts => {
                    warn!(attempt, attempts, "Pod manager address not assigned yet, retrying");
                    tokio::time::sleep(policy.interval).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    /// Persist the endpoint for later process starts.
    pub fn persist_endpoint(&self, endpoint: &ManagerEndpoint) -> Result<(), ClusterError> {
        self.endpoint.save(endpoint)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "provisioner_tests.rs"]
mod tests;
