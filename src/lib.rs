// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Splice-Orc: import modules locally or from remote pods in a cluster.
//!
//! On activation the cluster is bootstrapped (namespace, service account,
//! RBAC), the pod manager is deployed and its external endpoint persisted.
//! Every import is then routed either to the host's local importer or, for
//! modules configured as remote, to a proxy that forwards attribute reads and
//! calls to the pod manager.

pub mod config;
pub mod error;
pub mod import;
pub mod k8s;
pub mod plugin;
pub mod remote;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{EndpointHandle, EnvStore, LoadMode, ModuleConfig, ModuleConfigs, SpliceSettings};
pub use error::{ImportError, Unreachable};
pub use import::{CallArgs, ImportRequest, ImportRouter, Imported, ModuleObject, Value};
pub use k8s::{Activation, ClusterError, ClusterIdentity, ManagerEndpoint};
pub use plugin::SpliceOrc;
pub use remote::{ModuleProxy, ProxyFactory};
