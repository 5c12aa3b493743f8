// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-import choice between the local importer and a remote proxy.
//!
//! Routing never touches cluster state: the remote branch only reads the
//! persisted manager endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::module::{Imported, ModuleObject};
use super::request::{ImportRequest, SourceLanguage};
use crate::config::{EndpointHandle, ModuleConfig, ModuleConfigs};
use crate::error::ImportError;
use crate::k8s::validate_module_id;
use crate::remote::ProxyFactory;

/// What a local importer produced for one request.
#[derive(Debug, Clone)]
pub struct LocalImport {
    pub module: Arc<dyn ModuleObject>,
    /// Requested items, in request order.
    pub items: Vec<Imported>,
}

/// The host runtime's own importer for one source language.
#[async_trait]
pub trait LocalImporter: Send + Sync {
    async fn run_import(&self, request: &ImportRequest) -> Result<LocalImport, ImportError>;
}

/// Local importers by source language.
#[derive(Clone)]
pub struct LocalImporters {
    pub jac: Arc<dyn LocalImporter>,
    pub python: Arc<dyn LocalImporter>,
}

impl LocalImporters {
    fn for_language(&self, language: SourceLanguage) -> &Arc<dyn LocalImporter> {
        match language {
            SourceLanguage::Jac => &self.jac,
            SourceLanguage::Python => &self.python,
        }
    }
}

pub struct ImportRouter {
    modules: Arc<ModuleConfigs>,
    endpoint: Arc<EndpointHandle>,
    proxies: Arc<ProxyFactory>,
    importers: LocalImporters,
}

impl ImportRouter {
    pub fn new(
        modules: Arc<ModuleConfigs>,
        endpoint: Arc<EndpointHandle>,
        proxies: Arc<ProxyFactory>,
        importers: LocalImporters,
    ) -> Self {
        Self { modules, endpoint, proxies, importers }
    }

    pub fn proxies(&self) -> &ProxyFactory {
        &self.proxies
    }

    /// Route one import.
    ///
    /// Remote modules are always returned whole as a single proxy; requested
    /// items and `absorb` only shape local results.
    pub async fn route(&self, request: &ImportRequest) -> Result<Vec<Imported>, ImportError> {
        match self.modules.get(request.target()) {
            Some(config) if config.is_remote() => self.route_remote(request, config).await,
            _ => self.route_local(request).await,
        }
    }

    async fn route_local(&self, request: &ImportRequest) -> Result<Vec<Imported>, ImportError> {
        debug!(module = request.target(), language = ?request.language(), "Local import");
        let import = self
            .importers
            .for_language(request.language())
            .run_import(request)
            .await?;

        if request.wants_whole_module() {
            Ok(vec![Imported::Module(import.module)])
        } else {
            Ok(import.items)
        }
    }

    async fn route_remote(
        &self,
        request: &ImportRequest,
        config: &ModuleConfig,
    ) -> Result<Vec<Imported>, ImportError> {
        let module = request.target();
        validate_module_id(module).map_err(|e| ImportError::InvalidRequest(e.to_string()))?;

        let endpoint = self
            .endpoint
            .load()
            .map_err(|e| ImportError::Configuration(e.to_string()))?
            .ok_or_else(|| {
                ImportError::Configuration(format!(
                    "module '{}' is configured for remote execution but no pod manager \
                     endpoint is persisted; run `splice-orc-cli activate` first",
                    module
                ))
            })?;

        if request.reload() && self.proxies.evict(module) {
            debug!(%module, "Reload requested, cached proxy dropped");
        }
        if !request.wants_whole_module() {
            debug!(%module, items = request.items().len(), "Item selection ignored for remote module");
        }

        let proxy = self.proxies.get_proxy(module, config, &endpoint).await?;
        info!(%module, endpoint = %endpoint, "Loading remote module");
        Ok(vec![Imported::Module(proxy)])
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
