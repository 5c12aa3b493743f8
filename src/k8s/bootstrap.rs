// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Idempotent setup of the namespace, service account and RBAC objects.
//!
//! Every step reads first and creates only when the object is absent, so
//! `ensure_ready` is safe to call on every process start. The role and the
//! role binding are additionally reconciled: a present but divergent object
//! is replaced with the desired one.

use std::sync::Arc;

use tracing::{debug, info};

use super::control_plane::{ApiError, ControlPlane};
use super::error::ClusterError;
use super::types::{AccessPolicy, ClusterIdentity, RoleBindingSpec};

/// Observed state of a provisioned object relative to its desired state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconcile {
    Absent,
    PresentMatching,
    PresentDivergent,
}

impl Reconcile {
    fn observe<T>(
        observed: Result<T, ApiError>,
        matches: impl FnOnce(&T) -> bool,
    ) -> Result<Self, ApiError> {
        match observed {
            Ok(current) if matches(&current) => Ok(Self::PresentMatching),
            Ok(_) => Ok(Self::PresentDivergent),
            Err(ApiError::NotFound) => Ok(Self::Absent),
            Err(e) => Err(e),
        }
    }
}

/// What a bootstrap step did to its object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    Created,
    Existing,
    Replaced,
}

/// Treat a lost create race as success.
fn created_or_exists(result: Result<(), ApiError>) -> Result<Provisioned, ApiError> {
    match result {
        Ok(()) => Ok(Provisioned::Created),
        Err(ApiError::Conflict(_)) => Ok(Provisioned::Existing),
        Err(e) => Err(e),
    }
}

/// Treat an object someone else already removed as deleted.
fn deleted_or_absent(result: Result<(), ApiError>) -> Result<(), ApiError> {
    match result {
        Ok(()) | Err(ApiError::NotFound) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Brings a cluster to the state the pod manager needs.
pub struct ClusterBootstrapper {
    control_plane: Arc<dyn ControlPlane>,
    identity: ClusterIdentity,
    policy: AccessPolicy,
}

impl ClusterBootstrapper {
    pub fn new(control_plane: Arc<dyn ControlPlane>) -> Self {
        Self {
            control_plane,
            identity: ClusterIdentity::default(),
            policy: AccessPolicy::pod_manager(),
        }
    }

    pub fn identity(&self) -> &ClusterIdentity {
        &self.identity
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Ensure namespace, service account, role and role binding exist.
    ///
    /// # Errors
    /// Returns `ClusterError::ClusterState` with the underlying cause when any
    /// step fails for a reason other than "not found" or "already exists".
    /// Steps that already ran are not rolled back. A divergent role binding
    /// whose replacement fails yields `ClusterError::BindingRemoved`.
    pub async fn ensure_ready(&self) -> Result<ClusterIdentity, ClusterError> {
        self.identity.validate()?;

        self.ensure_namespace().await?;
        self.ensure_service_account().await?;
        self.ensure_role().await?;
        self.ensure_role_binding().await?;

        info!(namespace = %self.identity.namespace, "Cluster bootstrap complete");
        Ok(self.identity.clone())
    }

    async fn ensure_namespace(&self) -> Result<Provisioned, ClusterError> {
        let name = &self.identity.namespace;
        let namespaces = self
            .control_plane
            .list_namespaces()
            .await
            .map_err(|e| ClusterError::state("list", "Namespace", name, e))?;

        if namespaces.iter().any(|ns| ns == name) {
            info!(namespace = %name, "Namespace already exists");
            return Ok(Provisioned::Existing);
        }

        let outcome = created_or_exists(self.control_plane.create_namespace(name).await)
            .map_err(|e| ClusterError::state("create", "Namespace", name, e))?;
        match outcome {
            Provisioned::Created => info!(namespace = %name, "Namespace created"),
            _ => info!(namespace = %name, "Namespace created concurrently"),
        }
        Ok(outcome)
    }

    async fn ensure_service_account(&self) -> Result<Provisioned, ClusterError> {
        let namespace = &self.identity.namespace;
        let name = &self.identity.service_account;

        match self.control_plane.read_service_account(namespace, name).await {
            Ok(()) => {
                info!(%namespace, %name, "ServiceAccount already exists");
                Ok(Provisioned::Existing)
            }
            Err(ApiError::NotFound) => {
                let outcome = created_or_exists(
                    self.control_plane
                        .create_service_account(namespace, name)
                        .await,
                )
                .map_err(|e| ClusterError::state("create", "ServiceAccount", name, e))?;
                match outcome {
                    Provisioned::Created => info!(%namespace, %name, "ServiceAccount created"),
                    _ => info!(%namespace, %name, "ServiceAccount created concurrently"),
                }
                Ok(outcome)
            }
            Err(e) => Err(ClusterError::state("read", "ServiceAccount", name, e)),
        }
    }

    async fn ensure_role(&self) -> Result<Provisioned, ClusterError> {
        let namespace = &self.identity.namespace;
        let name = &self.identity.role;

        let observed = self.control_plane.read_role(namespace, name).await;
        let state = Reconcile::observe(observed, |current| current.matches(&self.policy))
            .map_err(|e| ClusterError::state("read", "Role", name, e))?;
        debug!(%namespace, %name, ?state, "Observed Role");

        match state {
            Reconcile::PresentMatching => {
                info!(%namespace, %name, "Role already exists");
                Ok(Provisioned::Existing)
            }
            Reconcile::Absent => {
                let outcome = created_or_exists(
                    self.control_plane
                        .create_role(namespace, name, &self.policy)
                        .await,
                )
                .map_err(|e| ClusterError::state("create", "Role", name, e))?;
                match outcome {
                    Provisioned::Created => info!(%namespace, %name, "Role created"),
                    _ => info!(%namespace, %name, "Role created concurrently"),
                }
                Ok(outcome)
            }
            Reconcile::PresentDivergent => {
                self.control_plane
                    .replace_role(namespace, name, &self.policy)
                    .await
                    .map_err(|e| ClusterError::state("replace", "Role", name, e))?;
                info!(%namespace, %name, "Role rules diverged, replaced");
                Ok(Provisioned::Replaced)
            }
        }
    }

    async fn ensure_role_binding(&self) -> Result<Provisioned, ClusterError> {
        let namespace = &self.identity.namespace;
        let name = &self.identity.role_binding;
        let desired = RoleBindingSpec::for_identity(&self.identity);

        let observed = self.control_plane.read_role_binding(namespace, name).await;
        let state = Reconcile::observe(observed, |current| *current == desired)
            .map_err(|e| ClusterError::state("read", "RoleBinding", name, e))?;
        debug!(%namespace, %name, ?state, "Observed RoleBinding");

        match state {
            Reconcile::PresentMatching => {
                info!(%namespace, %name, "RoleBinding already exists");
                Ok(Provisioned::Existing)
            }
            Reconcile::Absent => {
                let outcome = created_or_exists(
                    self.control_plane
                        .create_role_binding(namespace, name, &desired)
                        .await,
                )
                .map_err(|e| ClusterError::state("create", "RoleBinding", name, e))?;
                match outcome {
                    Provisioned::Created => info!(%namespace, %name, "RoleBinding created"),
                    _ => info!(%namespace, %name, "RoleBinding created concurrently"),
                }
                Ok(outcome)
            }
            Reconcile::PresentDivergent => {
                // roleRef is immutable on a live binding: delete, then create.
                deleted_or_absent(self.control_plane.delete_role_binding(namespace, name).await)
                    .map_err(|e| ClusterError::state("delete", "RoleBinding", name, e))?;
                created_or_exists(
                    self.control_plane
                        .create_role_binding(namespace, name, &desired)
                        .await,
                )
                .map_err(|source| ClusterError::BindingRemoved {
                    namespace: namespace.clone(),
                    name: name.clone(),
                    source,
                })?;
                info!(%namespace, %name, "RoleBinding diverged, replaced");
                Ok(Provisioned::Replaced)
            }
        }
    }
}

#[cfg(test)]
#[path = "bootstrap_tests.rs"]
mod tests;
