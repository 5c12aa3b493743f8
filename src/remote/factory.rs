// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Builds and caches module proxies.
//!
//! Proxies are shared per module identifier. Concurrent first imports of a
//! module wait on a single build, so the manager sees one pod request. Only
//! successfully built proxies are kept; a failed build leaves the slot empty
//! and the next import tries again.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::proxy::ModuleProxy;
use super::transport::ManagerTransport;
use crate::config::ModuleConfig;
use crate::error::ImportError;
use crate::k8s::ManagerEndpoint;

/// Cache entry for one module at one endpoint.
struct Slot {
    endpoint: ManagerEndpoint,
    proxy: OnceCell<Arc<ModuleProxy>>,
}

impl Slot {
    fn new(endpoint: &ManagerEndpoint) -> Arc<Self> {
        Arc::new(Self { endpoint: endpoint.clone(), proxy: OnceCell::new() })
    }
}

pub struct ProxyFactory {
    transport: Arc<dyn ManagerTransport>,
    cache: DashMap<String, Arc<Slot>>,
}

impl ProxyFactory {
    pub fn new(transport: Arc<dyn ManagerTransport>) -> Self {
        Self { transport, cache: DashMap::new() }
    }

    /// Return the cached proxy for `module`, or ask the manager for a worker
    /// pod and build one.
    ///
    /// A cached proxy pointing at a different endpoint is replaced.
    pub async fn get_proxy(
        &self,
        module: &str,
        config: &ModuleConfig,
        endpoint: &ManagerEndpoint,
    ) -> Result<Arc<ModuleProxy>, ImportError> {
        let slot = self.slot(module, endpoint);
        if let Some(proxy) = slot.proxy.get() {
            debug!(%module, "Proxy cache hit");
            return Ok(Arc::clone(proxy));
        }

        let proxy = slot
            .proxy
            .get_or_try_init(|| async {
                self.transport
                    .ensure_pod(endpoint, module, config)
                    .await
                    .map_err(|e| ImportError::RemoteUnreachable {
                        endpoint: endpoint.url(),
                        cause: e.into(),
                    })?;
                info!(%module, endpoint = %endpoint, "Remote module proxy ready");
                Ok::<_, ImportError>(Arc::new(ModuleProxy::new(
                    module,
                    endpoint.clone(),
                    Arc::clone(&self.transport),
                )))
            })
            .await?;
        Ok(Arc::clone(proxy))
    }

    /// The slot for `module` at `endpoint`. The map guard is released before
    /// the caller awaits.
    fn slot(&self, module: &str, endpoint: &ManagerEndpoint) -> Arc<Slot> {
        let mut entry = self
            .cache
            .entry(module.to_string())
            .or_insert_with(|| Slot::new(endpoint));
        if entry.endpoint != *endpoint {
            debug!(%module, old = %entry.endpoint, new = %endpoint, "Manager endpoint moved");
            *entry = Slot::new(endpoint);
        }
        Arc::clone(entry.value())
    }

    /// Drop the cached proxy for `module`. Returns whether one was cached.
    pub fn evict(&self, module: &str) -> bool {
        self.cache
            .remove(module)
            .is_some_and(|(_, slot)| slot.proxy.initialized())
    }

    pub fn contains(&self, module: &str) -> bool {
        self.cache
            .get(module)
            .is_some_and(|slot| slot.proxy.initialized())
    }

    /// Number of built proxies.
    pub fn len(&self) -> usize {
        self.cache
            .iter()
            .filter(|slot| slot.proxy.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;
