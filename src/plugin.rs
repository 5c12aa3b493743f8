// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! The plugin object the host runtime holds.
//!
//! Activations are serialized; concurrent callers wait for the running one.
//! Once an activation has resolved the manager endpoint it is kept and later
//! calls return it without touching the cluster. Imports may run
//! concurrently with each other and with activation.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::config::{EndpointHandle, EnvStore, ModuleConfigs, SpliceSettings};
use crate::error::ImportError;
use crate::import::{ImportRequest, ImportRouter, Imported, LocalImporters, SourceLanguage};
use crate::k8s::{
    activate, Activation, ClusterBootstrapper, ClusterError, ControlPlane, DeploymentProvisioner,
    Manifest, ResolvePolicy,
};
use crate::remote::{ManagerTransport, ProxyFactory};

pub struct SpliceOrc {
    bootstrapper: ClusterBootstrapper,
    provisioner: DeploymentProvisioner,
    resolve: ResolvePolicy,
    router: ImportRouter,
    endpoint: Arc<EndpointHandle>,
    activation: RwLock<Option<Activation>>,
    activating: Mutex<()>,
}

impl SpliceOrc {
    pub fn new(
        settings: &SpliceSettings,
        modules: ModuleConfigs,
        control_plane: Arc<dyn ControlPlane>,
        transport: Arc<dyn ManagerTransport>,
        importers: LocalImporters,
    ) -> Result<Self, ClusterError> {
        let endpoint = Arc::new(EndpointHandle::new(EnvStore::new(&settings.env_file)));
        let resolve = ResolvePolicy {
            attempts: settings.resolve_attempts,
            interval: settings.resolve_interval,
        };
        let provisioner = DeploymentProvisioner::new(
            Arc::clone(&control_plane),
            Manifest::bundled()?,
            Arc::clone(&endpoint),
        )
        .with_resolve_policy(resolve);
        let router = ImportRouter::new(
            Arc::new(modules),
            Arc::clone(&endpoint),
            Arc::new(ProxyFactory::new(transport)),
            importers,
        );

        Ok(Self {
            bootstrapper: ClusterBootstrapper::new(control_plane),
            provisioner,
            resolve,
            router,
            endpoint,
            activation: RwLock::new(None),
            activating: Mutex::new(()),
        })
    }

    /// Bootstrap the cluster and deploy the manager.
    ///
    /// A ready activation is returned as is. A failed one, or one that left
    /// the endpoint unresolved, is retried by the next call.
    pub async fn activate(&self) -> Result<Activation, ClusterError> {
        let _running = self.activating.lock().await;
        if let Some(done) = self.activation().filter(Activation::is_ready) {
            return Ok(done);
        }

        let outcome = activate(&self.bootstrapper, &self.provisioner, self.resolve).await?;
        *self.activation.write() = Some(outcome.clone());
        Ok(outcome)
    }

    /// Outcome of the last successful activation.
    pub fn activation(&self) -> Option<Activation> {
        self.activation.read().clone()
    }

    pub fn router(&self) -> &ImportRouter {
        &self.router
    }

    pub fn endpoint(&self) -> &EndpointHandle {
        &self.endpoint
    }

    /// Import hook called by the host runtime for every import.
    ///
    /// Returns the whole module when `absorb` is set or no items are
    /// requested, otherwise the requested items in order. Remote modules
    /// always come back whole.
    #[allow(clippy::too_many_arguments)]
    pub async fn jac_import(
        &self,
        target: &str,
        base_path: impl Into<PathBuf>,
        absorb: bool,
        cachable: bool,
        module_alias: Option<&str>,
        override_name: Option<&str>,
        lng: Option<&str>,
        items: &[(&str, Option<&str>)],
        reload_module: bool,
    ) -> Result<Vec<Imported>, ImportError> {
        let request = ImportRequest::builder(target, base_path)
            .absorb(absorb)
            .cachable(cachable)
            .module_alias(module_alias.map(str::to_string))
            .override_name(override_name.map(str::to_string))
            .language(SourceLanguage::from_hint(lng))
            .items(
                items
                    .iter()
                    .map(|(name, alias)| ((*name).to_string(), alias.map(str::to_string))),
            )
            .reload(reload_module)
            .build();
        self.router.route(&request).await
    }
}
