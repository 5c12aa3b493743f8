// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! The cluster control plane as seen by the bootstrapper and provisioner.
//!
//! Only the handful of CRUD calls splice-orc needs are exposed. Every call
//! classifies its failure into [`ApiError`] so callers can implement the
//! read-then-create pattern without knowing the client library.

use async_trait::async_trait;
use thiserror::Error;

use super::manifest::ManifestObject;
use super::types::{AccessPolicy, IngressAddress, RoleBindingSpec};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("not found")]
    NotFound,

    #[error("already exists: {0}")]
    Conflict(String),

    #[error("control plane request failed (status {status:?}): {message}")]
    Other { status: Option<u16>, message: String },
}

impl ApiError {
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other { status: None, message: message.into() }
    }
}

#[async_trait]
pub trait ControlPlane: Send + Sync {
    async fn list_namespaces(&self) -> Result<Vec<String>, ApiError>;

    async fn create_namespace(&self, name: &str) -> Result<(), ApiError>;

    async fn read_service_account(&self, namespace: &str, name: &str) -> Result<(), ApiError>;

    async fn create_service_account(&self, namespace: &str, name: &str) -> Result<(), ApiError>;

    async fn read_role(&self, namespace: &str, name: &str) -> Result<AccessPolicy, ApiError>;

    async fn create_role(
        &self,
        namespace: &str,
        name: &str,
        policy: &AccessPolicy,
    ) -> Result<(), ApiError>;

    async fn replace_role(
        &self,
        namespace: &str,
        name: &str,
        policy: &AccessPolicy,
    ) -> Result<(), ApiError>;

    async fn read_role_binding(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<RoleBindingSpec, ApiError>;

    async fn create_role_binding(
        &self,
        namespace: &str,
        name: &str,
        binding: &RoleBindingSpec,
    ) -> Result<(), ApiError>;

    async fn delete_role_binding(&self, namespace: &str, name: &str) -> Result<(), ApiError>;

    /// Create one object of the bundled manifest. An existing object of the
    /// same kind and name yields [`ApiError::Conflict`].
    async fn create_manifest_object(
        &self,
        namespace: &str,
        object: &ManifestObject,
    ) -> Result<(), ApiError>;

    /// Ingress entries reported in the service's load balancer status.
    async fn read_service_ingress(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Vec<IngressAddress>, ApiError>;
}
