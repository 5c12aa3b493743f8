// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Tests for import routing.

use serde_json::json;

use super::*;
use crate::config::{EnvStore, ModuleConfig};
use crate::k8s::ManagerEndpoint;
use crate::remote::wire::Operation;
use crate::remote::ManagerTransport;
use crate::testing::{RecordingImporter, ScriptedTransport};

struct Fixture {
    router: ImportRouter,
    endpoint: Arc<EndpointHandle>,
    transport: Arc<ScriptedTransport>,
    jac: Arc<RecordingImporter>,
    python: Arc<RecordingImporter>,
    _dir: tempfile::TempDir,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let endpoint = Arc::new(EndpointHandle::new(EnvStore::new(dir.path().join(".env"))));

    let mut modules = ModuleConfigs::default();
    modules.insert("numpy", ModuleConfig::remote());
    modules.insert("helpers", ModuleConfig::default());
    modules.insert("bad-name", ModuleConfig::remote());

    let transport = Arc::new(ScriptedTransport::new().attribute("__version__", json!("1.26.4")));
    let jac = Arc::new(
        RecordingImporter::new()
            .attribute("a", json!(1))
            .attribute("b", json!(2)),
    );
    let python = Arc::new(RecordingImporter::new().attribute("__version__", json!("1.26.4")));

    let router = ImportRouter::new(
        Arc::new(modules),
        Arc::clone(&endpoint),
        Arc::new(ProxyFactory::new(Arc::clone(&transport) as Arc<dyn ManagerTransport>)),
        LocalImporters {
            jac: Arc::clone(&jac) as Arc<dyn LocalImporter>,
            python: Arc::clone(&python) as Arc<dyn LocalImporter>,
        },
    );
    Fixture { router, endpoint, transport, jac, python, _dir: dir }
}

fn persist_endpoint(f: &Fixture) {
    f.endpoint.save(&ManagerEndpoint::new("10.0.0.7", 8000)).unwrap();
}

fn request(target: &str) -> crate::import::ImportRequestBuilder {
    ImportRequest::builder(target, "/srv/app")
}

#[tokio::test]
async fn test_local_whole_module() {
    let f = fixture();

    let result = f.router.route(&request("mymod").build()).await.unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].name(), "mymod");
    assert!(result[0].as_module().is_some());
    assert_eq!(f.jac.calls(), 1);
    assert_eq!(f.python.calls(), 0);
}

#[tokio::test]
async fn test_local_items_in_request_order() {
    let f = fixture();
    let req = request("mymod").item("a", None).item("b", Some("c")).build();

    let result = f.router.route(&req).await.unwrap();

    let names: Vec<&str> = result.iter().map(Imported::name).collect();
    assert_eq!(names, vec!["a", "c"]);
    assert!(matches!(&result[1], Imported::Binding { value, .. } if *value == json!(2)));
}

#[tokio::test]
async fn test_absorb_returns_whole_module() {
    let f = fixture();
    let req = request("mymod").absorb(true).item("a", None).build();

    let result = f.router.route(&req).await.unwrap();

    assert_eq!(result.len(), 1);
    assert!(result[0].as_module().is_some());
}

#[tokio::test]
async fn test_python_language_uses_python_importer() {
    let f = fixture();
    let req = request("requests").language(SourceLanguage::Python).build();

    f.router.route(&req).await.unwrap();

    assert_eq!(f.python.calls(), 1);
    assert_eq!(f.python.languages(), vec![SourceLanguage::Python]);
    assert_eq!(f.jac.calls(), 0);
}

#[tokio::test]
async fn test_local_configured_module_stays_local() {
    let f = fixture();
    persist_endpoint(&f);

    f.router.route(&request("helpers").build()).await.unwrap();

    assert_eq!(f.jac.calls(), 1);
    assert!(f.transport.pod_requests().is_empty());
}

#[tokio::test]
async fn test_remote_returns_single_proxy() {
    let f = fixture();
    persist_endpoint(&f);
    let req = request("numpy")
        .language(SourceLanguage::Python)
        .item("a", None)
        .item("b", Some("c"))
        .build();

    let result = f.router.route(&req).await.unwrap();

    assert_eq!(result.len(), 1);
    let proxy = result[0].as_module().unwrap();
    assert_eq!(proxy.name(), "numpy");
    assert_eq!(f.jac.calls() + f.python.calls(), 0);
    assert_eq!(f.transport.pod_requests().len(), 1);
}

#[tokio::test]
async fn test_remote_proxy_behaves_like_local_module() {
    let f = fixture();
    persist_endpoint(&f);

    let remote = f.router.route(&request("numpy").build()).await.unwrap();
    let local = f
        .router
        .route(&request("numpy_local").language(SourceLanguage::Python).build())
        .await
        .unwrap();

    let remote = remote[0].as_module().unwrap();
    let local = local[0].as_module().unwrap();
    assert_eq!(
        remote.get("__version__").await.unwrap(),
        local.get("__version__").await.unwrap()
    );
    assert!(matches!(
        remote.get("missing").await.unwrap_err(),
        ImportError::SymbolNotFound { .. }
    ));
    assert!(matches!(
        local.get("missing").await.unwrap_err(),
        ImportError::SymbolNotFound { .. }
    ));
}

#[tokio::test]
async fn test_remote_without_endpoint_is_configuration_error() {
    let f = fixture();

    let err = f.router.route(&request("numpy").build()).await.unwrap_err();

    assert!(matches!(err, ImportError::Configuration(_)));
    assert!(!err.is_network());
    assert!(f.transport.pod_requests().is_empty());
    assert_eq!(f.jac.calls(), 0);
}

#[tokio::test]
async fn test_remote_invalid_module_id() {
    let f = fixture();
    persist_endpoint(&f);

    let err = f.router.route(&request("bad-name").build()).await.unwrap_err();

    assert!(matches!(err, ImportError::InvalidRequest(_)));
    assert!(f.transport.pod_requests().is_empty());
}

#[tokio::test]
async fn test_repeated_remote_import_hits_cache() {
    let f = fixture();
    persist_endpoint(&f);

    let a = f.router.route(&request("numpy").build()).await.unwrap();
    let b = f.router.route(&request("numpy").build()).await.unwrap();

    assert!(Arc::ptr_eq(a[0].as_module().unwrap(), b[0].as_module().unwrap()));
    assert_eq!(f.transport.pod_requests().len(), 1);
}

#[tokio::test]
async fn test_reload_rebuilds_proxy() {
    let f = fixture();
    persist_endpoint(&f);

    let first = f.router.route(&request("numpy").build()).await.unwrap();
    first[0].as_module().unwrap().get("__version__").await.unwrap();
    let reloaded = f
        .router
        .route(&request("numpy").reload(true).build())
        .await
        .unwrap();
    reloaded[0].as_module().unwrap().get("__version__").await.unwrap();

    assert!(!Arc::ptr_eq(first[0].as_module().unwrap(), reloaded[0].as_module().unwrap()));
    assert_eq!(f.transport.count(Operation::Describe), 2);
    assert!(f.router.proxies().contains("numpy"));
}

#[test]
fn test_language_hint() {
    assert_eq!(SourceLanguage::from_hint(Some("py")), SourceLanguage::Python);
    assert_eq!(SourceLanguage::from_hint(Some("jac")), SourceLanguage::Jac);
    assert_eq!(SourceLanguage::from_hint(None), SourceLanguage::Jac);
}
