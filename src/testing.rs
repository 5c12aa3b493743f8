// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Test doubles shared by unit tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::config::ModuleConfig;
use crate::error::ImportError;
use crate::import::{
    CallArgs, ImportRequest, Imported, LocalImport, LocalImporter, ModuleObject, SourceLanguage,
    Value,
};
use crate::k8s::ManagerEndpoint;
use crate::remote::wire::{
    ManagerRequest, ManagerResponse, Operation, SymbolInfo, SymbolKind, SymbolTable,
};
use crate::remote::{ManagerTransport, TransportError};

type Function = Box<dyn Fn(&ManagerRequest) -> ManagerResponse + Send + Sync>;

/// Pod manager double hosting one module's attributes and functions.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    attributes: BTreeMap<String, Value>,
    functions: HashMap<String, Function>,
    next_send_failure: Mutex<Option<TransportError>>,
    next_pod_failure: Mutex<Option<TransportError>>,
    requests: Mutex<Vec<ManagerRequest>>,
    pods: Mutex<Vec<(String, ManagerEndpoint)>>,
    pod_delay: Option<Duration>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn attribute(mut self, name: &str, value: Value) -> Self {
        self.attributes.insert(name.to_string(), value);
        self
    }

    pub(crate) fn function(
        mut self,
        name: &str,
        f: impl Fn(&ManagerRequest) -> ManagerResponse + Send + Sync + 'static,
    ) -> Self {
        self.functions.insert(name.to_string(), Box::new(f));
        self
    }

    /// Hold every `ensure_pod` for `delay` before it completes.
    pub(crate) fn pod_delay(mut self, delay: Duration) -> Self {
        self.pod_delay = Some(delay);
        self
    }

    pub(crate) fn fail_next_send(&self, err: TransportError) {
        *self.next_send_failure.lock() = Some(err);
    }

    pub(crate) fn fail_next_pod(&self, err: TransportError) {
        *self.next_pod_failure.lock() = Some(err);
    }

    pub(crate) fn requests(&self) -> Vec<ManagerRequest> {
        self.requests.lock().clone()
    }

    pub(crate) fn count(&self, operation: Operation) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.operation == operation)
            .count()
    }

    pub(crate) fn pod_requests(&self) -> Vec<(String, ManagerEndpoint)> {
        self.pods.lock().clone()
    }

    fn symbol_table(&self) -> SymbolTable {
        let mut symbols = BTreeMap::new();
        for name in self.attributes.keys() {
            symbols.insert(name.clone(), SymbolInfo { kind: SymbolKind::Attribute, signature: None });
        }
        for name in self.functions.keys() {
            symbols.insert(
                name.clone(),
                SymbolInfo { kind: SymbolKind::Callable, signature: Some("(*args, **kwargs)".into()) },
            );
        }
        SymbolTable { symbols }
    }
}

#[async_trait]
impl ManagerTransport for ScriptedTransport {
    async fn ensure_pod(
        &self,
        endpoint: &ManagerEndpoint,
        module: &str,
        _config: &ModuleConfig,
    ) -> Result<(), TransportError> {
        if let Some(delay) = self.pod_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.next_pod_failure.lock().take() {
            return Err(err);
        }
        self.pods.lock().push((module.to_string(), endpoint.clone()));
        Ok(())
    }

    async fn send(
        &self,
        _endpoint: &ManagerEndpoint,
        request: &ManagerRequest,
    ) -> Result<ManagerResponse, TransportError> {
        self.requests.lock().push(request.clone());
        if let Some(err) = self.next_send_failure.lock().take() {
            return Err(err);
        }

        let symbol = request.symbol.as_deref().unwrap_or_default();
        let not_found = || {
            ManagerResponse::failure(
                "AttributeError",
                &format!("module '{}' has no attribute '{}'", request.module, symbol),
            )
        };
        let response = match request.operation {
            Operation::Describe => {
                let table = serde_json::to_value(self.symbol_table()).unwrap_or_default();
                ManagerResponse::success(table)
            }
            Operation::GetAttribute => match self.attributes.get(symbol) {
                Some(value) => ManagerResponse::success(value.clone()),
                None if self.functions.contains_key(symbol) => {
                    ManagerResponse::success(Value::String(format!("<function {}>", symbol)))
                }
                None => not_found(),
            },
            Operation::Call => match self.functions.get(symbol) {
                Some(f) => f(request),
                None => not_found(),
            },
        };
        Ok(response)
    }
}

/// A module as the host's local importer would produce it.
#[derive(Debug, Default)]
pub(crate) struct LocalModule {
    pub(crate) name: String,
    pub(crate) attributes: BTreeMap<String, Value>,
}

#[async_trait]
impl ModuleObject for LocalModule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, symbol: &str) -> Result<Value, ImportError> {
        self.attributes
            .get(symbol)
            .cloned()
            .ok_or_else(|| ImportError::SymbolNotFound {
                module: self.name.clone(),
                symbol: symbol.to_string(),
            })
    }

    async fn invoke(&self, symbol: &str, _args: CallArgs) -> Result<Value, ImportError> {
        if self.attributes.contains_key(symbol) {
            return Err(ImportError::NotCallable {
                module: self.name.clone(),
                symbol: symbol.to_string(),
            });
        }
        Err(ImportError::SymbolNotFound { module: self.name.clone(), symbol: symbol.to_string() })
    }
}

/// Local importer that records calls and serves `LocalModule`s.
#[derive(Default)]
pub(crate) struct RecordingImporter {
    attributes: BTreeMap<String, Value>,
    calls: AtomicUsize,
    languages: Mutex<Vec<SourceLanguage>>,
}

impl RecordingImporter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn attribute(mut self, name: &str, value: Value) -> Self {
        self.attributes.insert(name.to_string(), value);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn languages(&self) -> Vec<SourceLanguage> {
        self.languages.lock().clone()
    }
}

#[async_trait]
impl LocalImporter for RecordingImporter {
    async fn run_import(&self, request: &ImportRequest) -> Result<LocalImport, ImportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.languages.lock().push(request.language());

        let module = Arc::new(LocalModule {
            name: request.target().to_string(),
            attributes: self.attributes.clone(),
        });
        let items = request
            .items()
            .iter()
            .map(|(name, alias)| Imported::Binding {
                name: alias.clone().unwrap_or_else(|| name.clone()),
                value: self.attributes.get(name).cloned().unwrap_or(Value::Null),
            })
            .collect();
        Ok(LocalImport { module, items })
    }
}
