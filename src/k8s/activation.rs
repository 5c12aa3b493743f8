// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! One-shot cluster activation: bootstrap, deploy, resolve, persist.

use tracing::{info, warn};

use super::bootstrap::ClusterBootstrapper;
use super::error::ClusterError;
use super::manifest::ManifestReport;
use super::provisioner::{DeploymentProvisioner, ResolvePolicy};
use super::types::{ClusterIdentity, ManagerEndpoint};

/// What activation achieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub identity: ClusterIdentity,
    pub manifest: ManifestReport,
    /// `None` while the manager service has no external address yet.
    pub endpoint: Option<ManagerEndpoint>,
}

impl Activation {
    pub fn is_ready(&self) -> bool {
        self.endpoint.is_some()
    }
}

/// Make the cluster ready and learn the manager endpoint.
///
/// Bootstrap and manifest failures abort activation. An unresolved endpoint
/// does not: it is logged and reported as `endpoint: None`, and remote
/// imports keep failing with a configuration error until a later activation
/// resolves it.
pub async fn activate(
    bootstrapper: &ClusterBootstrapper,
    provisioner: &DeploymentProvisioner,
    resolve: ResolvePolicy,
) -> Result<Activation, ClusterError> {
    let identity = bootstrapper.ensure_ready().await?;
    let manifest = provisioner.apply_manifest(&identity).await?;

    let endpoint = match provisioner
        .resolve_endpoint_with_retry(&identity, resolve)
        .await
    {
        Ok(endpoint) => {
            provisioner.persist_endpoint(&endpoint)?;
            Some(endpoint)
        }
        Err(e) if e.is_recoverable() => {
            warn!(error = %e, "Pod manager endpoint unresolved; remote imports unavailable until re-activation");
            None
        }
        Err(e) => return Err(e),
    };

    info!(
        namespace = %identity.namespace,
        created = manifest.created.len(),
        existing = manifest.existing.len(),
        ready = endpoint.is_some(),
        "Activation finished"
    );
    Ok(Activation { identity, manifest, endpoint })
}
