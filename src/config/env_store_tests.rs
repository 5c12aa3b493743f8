// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Tests for the env store and endpoint handle.

use super::*;

fn store_in(dir: &tempfile::TempDir) -> EnvStore {
    EnvStore::new(dir.path().join(".env"))
}

#[test]
fn test_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    assert!(store.load().unwrap().is_empty());
    assert_eq!(store.get(POD_MANAGER_URL_KEY).unwrap(), None);
}

#[test]
fn test_set_preserves_other_keys_and_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    fs::write(
        store.path(),
        "# local settings\nDATABASE_URL=\"postgres://db\"\n\nPOD_MANAGER_URL=\"http://old:8000\"\nDEBUG=1\n",
    )
    .unwrap();

    store.set(POD_MANAGER_URL_KEY, "http://10.0.0.7:8000").unwrap();

    let entries = store.load().unwrap();
    let keys: Vec<&str> = entries.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["DATABASE_URL", "POD_MANAGER_URL", "DEBUG"]);
    assert_eq!(entries.get("DATABASE_URL"), Some("postgres://db"));
    assert_eq!(entries.get("DEBUG"), Some("1"));
    assert_eq!(entries.get(POD_MANAGER_URL_KEY), Some("http://10.0.0.7:8000"));
}

#[test]
fn test_set_appends_new_key() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    store.set("A", "1").unwrap();
    store.set("B", "2").unwrap();
    store.set("A", "3").unwrap();

    let text = fs::read_to_string(store.path()).unwrap();
    assert_eq!(text, "A=\"3\"\nB=\"2\"\n");
}

#[test]
fn test_malformed_line() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    fs::write(store.path(), "GOOD=\"1\"\nnot a pair\n").unwrap();

    let err = store.load().unwrap_err();
    assert!(matches!(err, StoreError::Malformed { line_no: 2, .. }));
}

#[test]
fn test_set_does_not_clobber_malformed_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    fs::write(store.path(), "garbage\n").unwrap();

    assert!(store.set(POD_MANAGER_URL_KEY, "http://x:8000").is_err());
    assert_eq!(fs::read_to_string(store.path()).unwrap(), "garbage\n");
}

#[test]
fn test_endpoint_handle_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let handle = EndpointHandle::new(store_in(&dir));
    assert_eq!(handle.load().unwrap(), None);

    let endpoint = ManagerEndpoint::new("lb.example.com", 8000);
    handle.save(&endpoint).unwrap();

    let fresh = EndpointHandle::new(store_in(&dir));
    assert_eq!(fresh.load().unwrap(), Some(endpoint));
}

#[test]
fn test_endpoint_handle_sees_late_persist() {
    let dir = tempfile::tempdir().unwrap();
    let reader = EndpointHandle::new(store_in(&dir));
    assert_eq!(reader.load().unwrap(), None);

    EndpointHandle::new(store_in(&dir))
        .save(&ManagerEndpoint::new("10.0.0.7", 8000))
        .unwrap();

    assert_eq!(reader.load().unwrap(), Some(ManagerEndpoint::new("10.0.0.7", 8000)));
}

#[test]
fn test_endpoint_handle_rejects_garbage_url() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    store.set(POD_MANAGER_URL_KEY, "not-a-url").unwrap();

    let err = EndpointHandle::new(store).load().unwrap_err();
    assert!(matches!(err, StoreError::InvalidEndpoint { .. }));
}

#[test]
fn test_value_with_line_break_cannot_inject_keys() {
    let dir = tempfile::tempdir().unwrap();
    let handle = EndpointHandle::new(store_in(&dir));
    handle.save(&ManagerEndpoint::new("10.0.0.7", 8000)).unwrap();
    let before = fs::read_to_string(handle.store().path()).unwrap();

    let err = handle
        .store()
        .set("NOTE", "hello\nPOD_MANAGER_URL=\"http://evil:1\"")
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidValue { ref key, .. } if key == "NOTE"));
    assert!(handle.store().set("NOTE", "a\rb").is_err());

    assert_eq!(fs::read_to_string(handle.store().path()).unwrap(), before);
    let fresh = EndpointHandle::new(store_in(&dir));
    assert_eq!(fresh.load().unwrap(), Some(ManagerEndpoint::new("10.0.0.7", 8000)));
}

#[test]
fn test_value_with_quotes_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let err = store.set("Q", "\"quoted\"").unwrap_err();

    assert!(matches!(err, StoreError::InvalidValue { .. }));
    assert_eq!(store.get("Q").unwrap(), None);
}

#[test]
fn test_invalid_keys_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    for key in ["", "A=B", "#A", "A B", "A\nB"] {
        assert!(
            matches!(store.set(key, "1"), Err(StoreError::InvalidKey { .. })),
            "key {:?} accepted",
            key
        );
    }
    assert!(store.load().unwrap().is_empty());
}

#[test]
fn test_set_then_get_returns_exact_value() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    for value in ["", "  padded  ", "a=b=c", "#not-a-comment", "x'y"] {
        store.set("V", value).unwrap();
        assert_eq!(store.get("V").unwrap().as_deref(), Some(value));
    }
}

#[test]
fn test_parse_strips_one_quote_pair() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    fs::write(store.path(), "A=\"\"\"\nB=plain\nC=\"half\n").unwrap();

    let entries = store.load().unwrap();
    assert_eq!(entries.get("A"), Some("\""));
    assert_eq!(entries.get("B"), Some("plain"));
    assert_eq!(entries.get("C"), Some("\"half"));
}
