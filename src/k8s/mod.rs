// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes integration.
//!
//! Bootstraps the namespace, identity and access policy, deploys the pod
//! manager from the bundled manifest and resolves its external endpoint.

pub mod activation;
pub mod bootstrap;
pub mod control_plane;
pub mod error;
pub mod in_memory;
pub mod kube_client;
pub mod manifest;
pub mod provisioner;
pub mod types;
pub mod validation;

pub use activation::{activate, Activation};
pub use bootstrap::{ClusterBootstrapper, Provisioned, Reconcile};
pub use control_plane::{ApiError, ControlPlane};
pub use error::ClusterError;
pub use in_memory::{FailPoint, InMemoryControlPlane};
pub use kube_client::KubeControlPlane;
pub use manifest::{Manifest, ManifestError, ManifestObject, ManifestReport};
pub use provisioner::{select_address, DeploymentProvisioner, ResolvePolicy};
pub use types::{
    AccessPolicy, BindingSubject, ClusterIdentity, EndpointParseError, IngressAddress,
    ManagerEndpoint, PolicyRule, RoleBindingSpec, MANAGER_PORT, MANAGER_SERVICE, NAMESPACE,
};
pub use validation::{validate_image, validate_module_id, validate_resource_name, ValidationError};
