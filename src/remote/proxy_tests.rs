// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Tests for module proxies.

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::json;

use super::*;
use crate::error::Unreachable;
use crate::remote::wire::{ManagerResponse, Operation};
use crate::testing::{LocalModule, ScriptedTransport};

fn endpoint() -> ManagerEndpoint {
    ManagerEndpoint::new("10.0.0.7", 8000)
}

fn numpy() -> ScriptedTransport {
    ScriptedTransport::new()
        .attribute("__version__", json!("1.26.4"))
        .function("sum", |req| {
            let total: f64 = req.args[0]
                .as_array()
                .map(|xs| xs.iter().filter_map(Value::as_f64).sum())
                .unwrap_or_default();
            ManagerResponse::success(json!(total))
        })
        .function("reshape", |_| ManagerResponse::failure("ValueError", "cannot reshape array"))
}

fn proxy(transport: &Arc<ScriptedTransport>) -> ModuleProxy {
    ModuleProxy::new("numpy", endpoint(), Arc::clone(transport) as Arc<dyn ManagerTransport>)
}

#[tokio::test]
async fn test_get_forwards_attribute_read() {
    let transport = Arc::new(numpy());
    let proxy = proxy(&transport);

    assert_eq!(proxy.get("__version__").await.unwrap(), json!("1.26.4"));

    let reads: Vec<_> = transport
        .requests()
        .into_iter()
        .filter(|r| r.operation == Operation::GetAttribute)
        .collect();
    assert_eq!(reads.len(), 1);
    assert_eq!(reads[0].module, "numpy");
    assert_eq!(reads[0].symbol.as_deref(), Some("__version__"));
}

#[tokio::test]
async fn test_invoke_forwards_args() {
    let transport = Arc::new(numpy());
    let proxy = proxy(&transport);

    let result = proxy
        .invoke("sum", CallArgs::new().arg(json!([1, 2, 3])).kwarg("axis", Value::Null))
        .await
        .unwrap();

    assert_eq!(result, json!(6.0));
    let call = transport
        .requests()
        .into_iter()
        .find(|r| r.operation == Operation::Call)
        .unwrap();
    assert_eq!(call.symbol.as_deref(), Some("sum"));
    assert_eq!(call.kwargs.get("axis"), Some(&Value::Null));
}

#[tokio::test]
async fn test_symbol_table_fetched_once() {
    let transport = Arc::new(numpy());
    let proxy = proxy(&transport);

    proxy.get("__version__").await.unwrap();
    proxy.get("__version__").await.unwrap();
    proxy.invoke("sum", CallArgs::positional([json!([1])])).await.unwrap();

    assert_eq!(transport.count(Operation::Describe), 1);
    assert_eq!(proxy.symbols().await.unwrap().symbols.len(), 3);
}

#[tokio::test]
async fn test_failed_describe_is_retried() {
    let transport = Arc::new(numpy());
    let proxy = proxy(&transport);
    transport.fail_next_send(TransportError::Connect("connection refused".into()));

    assert!(proxy.get("__version__").await.unwrap_err().is_network());
    assert_eq!(proxy.get("__version__").await.unwrap(), json!("1.26.4"));
    assert_eq!(transport.count(Operation::Describe), 2);
}

#[tokio::test]
async fn test_missing_symbol_matches_local_error() {
    let transport = Arc::new(numpy());
    let remote = proxy(&transport);
    let local = LocalModule { name: "numpy".to_string(), attributes: BTreeMap::new() };

    let remote_err = remote.get("no_such_fn").await.unwrap_err();
    let local_err = local.get("no_such_fn").await.unwrap_err();

    assert_eq!(remote_err, local_err);
    assert_eq!(remote_err.exception_kind(), Some("AttributeError"));
    assert_eq!(transport.count(Operation::GetAttribute), 0);
}

#[tokio::test]
async fn test_remote_attribute_error_maps_to_symbol_not_found() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .function("lazy", |_| ManagerResponse::failure(ATTRIBUTE_ERROR, "gone")),
    );
    let proxy = proxy(&transport);

    let err = proxy.invoke("lazy", CallArgs::new()).await.unwrap_err();

    assert_eq!(
        err,
        ImportError::SymbolNotFound { module: "numpy".into(), symbol: "lazy".into() }
    );
}

#[tokio::test]
async fn test_remote_exception_is_application_error() {
    let transport = Arc::new(numpy());
    let proxy = proxy(&transport);

    let err = proxy.invoke("reshape", CallArgs::new()).await.unwrap_err();

    assert!(!err.is_network());
    assert_eq!(err.exception_kind(), Some("ValueError"));
    assert!(matches!(
        err,
        ImportError::RemoteApplication { ref symbol, ref message, .. }
            if symbol == "reshape" && message == "cannot reshape array"
    ));
}

#[tokio::test]
async fn test_invoke_attribute_is_not_callable() {
    let transport = Arc::new(numpy());
    let proxy = proxy(&transport);

    let err = proxy.invoke("__version__", CallArgs::new()).await.unwrap_err();

    assert!(matches!(err, ImportError::NotCallable { .. }));
    assert_eq!(transport.count(Operation::Call), 0);
}

#[tokio::test]
async fn test_timeout_is_distinct() {
    let transport = Arc::new(numpy());
    let proxy = proxy(&transport);
    proxy.symbols().await.unwrap();
    transport.fail_next_send(TransportError::Timeout(Duration::from_secs(30)));

    let err = proxy.invoke("sum", CallArgs::positional([json!([1])])).await.unwrap_err();

    assert!(err.is_timeout());
    assert_eq!(
        err,
        ImportError::RemoteUnreachable {
            endpoint: "http://10.0.0.7:8000".into(),
            cause: Unreachable::Timeout(Duration::from_secs(30)),
        }
    );
}

#[tokio::test]
async fn test_undecodable_symbol_table() {
    let broken = ModuleProxy::new(
        "numpy",
        endpoint(),
        Arc::new(BrokenDescribe) as Arc<dyn ManagerTransport>,
    );

    let err = broken.get("__version__").await.unwrap_err();

    assert!(matches!(
        err,
        ImportError::RemoteUnreachable { cause: Unreachable::Protocol(_), .. }
    ));
}

/// Manager answering every request with a bare string.
struct BrokenDescribe;

#[async_trait]
impl ManagerTransport for BrokenDescribe {
    async fn ensure_pod(
        &self,
        _endpoint: &ManagerEndpoint,
        _module: &str,
        _config: &crate::config::ModuleConfig,
    ) -> Result<(), TransportError> {
        Ok(())
    }

    async fn send(
        &self,
        _endpoint: &ManagerEndpoint,
        _request: &ManagerRequest,
    ) -> Result<ManagerResponse, TransportError> {
        Ok(ManagerResponse::success(json!("not a table")))
    }
}

#[test]
fn test_debug_hides_transport() {
    let proxy = ModuleProxy::new(
        "numpy",
        endpoint(),
        Arc::new(ScriptedTransport::new()) as Arc<dyn ManagerTransport>,
    );
    let debug = format!("{:?}", proxy);
    assert!(debug.contains("numpy"));
    assert!(debug.contains("http://10.0.0.7:8000"));
    assert!(debug.contains("symbols_loaded: false"));
}
