// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! In-process stand-in for a module running in a remote pod.
//!
//! Attribute reads and calls are forwarded to the pod manager tagged with the
//! module identifier and symbol. The symbol table is fetched on first access
//! and kept for the proxy's lifetime; a failed fetch is not cached.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use super::transport::{ManagerTransport, TransportError};
use super::wire::{ManagerRequest, RemoteException, SymbolInfo, SymbolKind, SymbolTable, ATTRIBUTE_ERROR};
use crate::error::ImportError;
use crate::import::{CallArgs, ModuleObject, Value};
use crate::k8s::ManagerEndpoint;

pub struct ModuleProxy {
    module: String,
    endpoint: ManagerEndpoint,
    transport: Arc<dyn ManagerTransport>,
    symbols: OnceCell<SymbolTable>,
}

impl fmt::Debug for ModuleProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleProxy")
            .field("module", &self.module)
            .field("endpoint", &self.endpoint.url())
            .field("symbols_loaded", &self.symbols.initialized())
            .finish()
    }
}

impl ModuleProxy {
    pub fn new(
        module: impl Into<String>,
        endpoint: ManagerEndpoint,
        transport: Arc<dyn ManagerTransport>,
    ) -> Self {
        Self {
            module: module.into(),
            endpoint,
            transport,
            symbols: OnceCell::new(),
        }
    }

    pub fn endpoint(&self) -> &ManagerEndpoint {
        &self.endpoint
    }

    /// The remote symbol table, fetched on first use.
    pub async fn symbols(&self) -> Result<&SymbolTable, ImportError> {
        self.symbols
            .get_or_try_init(|| async {
                let value = self.round_trip(ManagerRequest::describe(&self.module), "").await?;
                let table: SymbolTable = serde_json::from_value(value).map_err(|e| {
                    self.unreachable(TransportError::Protocol(format!(
                        "invalid symbol table: {}",
                        e
                    )))
                })?;
                debug!(module = %self.module, symbols = table.symbols.len(), "Symbol table loaded");
                Ok(table)
            })
            .await
    }

    async fn resolve(&self, symbol: &str) -> Result<&SymbolInfo, ImportError> {
        self.symbols()
            .await?
            .get(symbol)
            .ok_or_else(|| self.missing(symbol))
    }

    async fn round_trip(&self, request: ManagerRequest, symbol: &str) -> Result<Value, ImportError> {
        debug!(
            module = %self.module,
            symbol,
            operation = ?request.operation,
            request_id = %request.request_id,
            "Forwarding to pod manager"
        );
        let response = self
            .transport
            .send(&self.endpoint, &request)
            .await
            .map_err(|e| self.unreachable(e))?;
        response
            .into_result()
            .map_err(|exception| self.raised(symbol, exception))
    }

    fn missing(&self, symbol: &str) -> ImportError {
        ImportError::SymbolNotFound { module: self.module.clone(), symbol: symbol.to_string() }
    }

    fn raised(&self, symbol: &str, exception: RemoteException) -> ImportError {
        if exception.kind == ATTRIBUTE_ERROR {
            return self.missing(symbol);
        }
        ImportError::RemoteApplication {
            module: self.module.clone(),
            symbol: symbol.to_string(),
            kind: exception.kind,
            message: exception.message,
        }
    }

    fn unreachable(&self, err: TransportError) -> ImportError {
        ImportError::RemoteUnreachable { endpoint: self.endpoint.url(), cause: err.into() }
    }
}

#[async_trait]
impl ModuleObject for ModuleProxy {
    fn name(&self) -> &str {
        &self.module
    }

    async fn get(&self, symbol: &str) -> Result<Value, ImportError> {
        self.resolve(symbol).await?;
        self.round_trip(ManagerRequest::get_attribute(&self.module, symbol), symbol)
            .await
    }

    async fn invoke(&self, symbol: &str, args: CallArgs) -> Result<Value, ImportError> {
        if self.resolve(symbol).await?.kind != SymbolKind::Callable {
            return Err(ImportError::NotCallable {
                module: self.module.clone(),
                symbol: symbol.to_string(),
            });
        }
        self.round_trip(ManagerRequest::call(&self.module, symbol, args), symbol)
            .await
    }
}

#[cfg(test)]
#[path = "proxy_tests.rs"]
mod tests;
