// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Flat `key="value"` store and the persisted pod manager endpoint.
//!
//! The whole file is read into memory, updated by key and rewritten in full
//! through a temporary file in the same directory, so readers never observe a
//! half-written store. Keys the store does not know about are carried over
//! untouched, in their original order.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, info};

use crate::k8s::ManagerEndpoint;

/// Key under which the manager URL is persisted.
pub const POD_MANAGER_URL_KEY: &str = "POD_MANAGER_URL";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed line {line_no} in {path}: expected key=\"value\"")]
    Malformed { path: PathBuf, line_no: usize },

    #[error("Invalid key {key:?}: keys are non-empty and hold no '=', '#', quotes or whitespace")]
    InvalidKey { key: String },

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: &'static str },

    #[error("Stored {key} is not a manager endpoint: {reason}")]
    InvalidEndpoint { key: String, reason: String },
}

/// Strip one pair of surrounding double quotes.
fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Reject entries that would not read back as written.
fn check_entry(key: &str, value: &str) -> Result<(), StoreError> {
    let bad_key = key.is_empty()
        || key.starts_with('#')
        || key.chars().any(|c| c == '=' || c == '"' || c.is_whitespace());
    if bad_key {
        return Err(StoreError::InvalidKey { key: key.to_string() });
    }
    let reason = if value.contains(['\n', '\r']) {
        "line breaks are not allowed"
    } else if value.contains('"') {
        "double quotes are not allowed"
    } else {
        return Ok(());
    };
    Err(StoreError::InvalidValue { key: key.to_string(), reason })
}

/// In-memory contents of the store, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvEntries {
    entries: Vec<(String, String)>,
}

impl EnvEntries {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Update `key` in place, or append it when absent.
    pub fn upsert(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn parse(text: &str, path: &Path) -> Result<Self, StoreError> {
        let mut entries = Self::default();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line.split_once('=').ok_or_else(|| StoreError::Malformed {
                path: path.to_path_buf(),
                line_no: idx + 1,
            })?;
            entries.upsert(key.trim(), unquote(value.trim()));
        }
        Ok(entries)
    }

    fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"\n", k, v))
            .collect()
    }
}

/// Handle on one store file.
#[derive(Debug, Clone)]
pub struct EnvStore {
    path: PathBuf,
}

impl EnvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole store. A missing file is an empty store.
    pub fn load(&self) -> Result<EnvEntries, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => EnvEntries::parse(&text, &self.path),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(EnvEntries::default()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.get(key).map(str::to_string))
    }

    /// Set one key, preserving every other key in the file.
    ///
    /// Values holding line breaks or double quotes are rejected before the
    /// file is touched.
    pub fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        check_entry(key, value)?;
        let mut entries = self.load()?;
        entries.upsert(key, value);
        self.write_atomic(&entries)?;
        debug!(path = %self.path.display(), %key, "Env store updated");
        Ok(())
    }

    fn write_atomic(&self, entries: &EnvEntries) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        tmp.write_all(entries.render().as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io { path: self.path.clone(), source }
    }
}

/// Explicitly passed handle to the persisted manager endpoint.
///
/// Initialised on activation and read on every remote import. A found
/// endpoint is cached; an absent one is looked up again on the next read so
/// an endpoint persisted later by another process start is picked up.
#[derive(Debug)]
pub struct EndpointHandle {
    store: EnvStore,
    cached: RwLock<Option<ManagerEndpoint>>,
}

impl EndpointHandle {
    pub fn new(store: EnvStore) -> Self {
        Self { store, cached: RwLock::new(None) }
    }

    pub fn store(&self) -> &EnvStore {
        &self.store
    }

    /// The persisted endpoint, if any.
    pub fn load(&self) -> Result<Option<ManagerEndpoint>, StoreError> {
        if let Some(endpoint) = self.cached.read().clone() {
            return Ok(Some(endpoint));
        }

        let Some(raw) = self.store.get(POD_MANAGER_URL_KEY)? else {
            return Ok(None);
        };
        let endpoint = raw
            .parse::<ManagerEndpoint>()
            .map_err(|e| StoreError::InvalidEndpoint {
                key: POD_MANAGER_URL_KEY.to_string(),
                reason: e.to_string(),
            })?;
        *self.cached.write() = Some(endpoint.clone());
        Ok(Some(endpoint))
    }

    /// Persist `endpoint` as `http://<host>:<port>` and cache it.
    pub fn save(&self, endpoint: &ManagerEndpoint) -> Result<(), StoreError> {
        self.store.set(POD_MANAGER_URL_KEY, &endpoint.url())?;
        *self.cached.write() = Some(endpoint.clone());
        info!(url = %endpoint, path = %self.store.path().display(), "Pod manager URL persisted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "env_store_tests.rs"]
mod tests;
