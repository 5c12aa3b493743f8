// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Runtime settings and per-module load configuration.

use std::collections::{BTreeMap, HashMap};
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub const ENV_FILE_VAR: &str = "SPLICE_ORC_ENV_FILE";
pub const MODULE_CONFIG_VAR: &str = "SPLICE_ORC_MODULE_CONFIG";
pub const REQUEST_TIMEOUT_VAR: &str = "SPLICE_ORC_REQUEST_TIMEOUT_SECS";
pub const RESOLVE_ATTEMPTS_VAR: &str = "SPLICE_ORC_RESOLVE_ATTEMPTS";
pub const RESOLVE_INTERVAL_VAR: &str = "SPLICE_ORC_RESOLVE_INTERVAL_SECS";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read module config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid module config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Process-level settings, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct SpliceSettings {
    /// Flat key=value store holding the persisted manager URL.
    pub env_file: PathBuf,
    /// TOML file with the `[modules.*]` tables.
    pub module_config: PathBuf,
    /// Timeout applied to every manager round trip.
    pub request_timeout: Duration,
    /// How many times activation polls the manager service for an address.
    pub resolve_attempts: u32,
    pub resolve_interval: Duration,
}

impl Default for SpliceSettings {
    fn default() -> Self {
        Self {
            env_file: PathBuf::from(".env"),
            module_config: PathBuf::from("splice_modules.toml"),
            request_timeout: Duration::from_secs(30),
            resolve_attempts: 1,
            resolve_interval: Duration::from_secs(5),
        }
    }
}

fn env_number<T: std::str::FromStr>(var: &str) -> Option<T> {
    let raw = env::var(var).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(%var, value = %raw, "Ignoring non-numeric setting");
            None
        }
    }
}

/// Load settings from the environment, falling back to defaults.
pub fn load() -> SpliceSettings {
    let defaults = SpliceSettings::default();
    SpliceSettings {
        env_file: env::var_os(ENV_FILE_VAR)
            .map(PathBuf::from)
            .unwrap_or(defaults.env_file),
        module_config: env::var_os(MODULE_CONFIG_VAR)
            .map(PathBuf::from)
            .unwrap_or(defaults.module_config),
        request_timeout: env_number(REQUEST_TIMEOUT_VAR)
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout),
        resolve_attempts: env_number::<u32>(RESOLVE_ATTEMPTS_VAR)
            .map(|n| n.max(1))
            .unwrap_or(defaults.resolve_attempts),
        resolve_interval: env_number(RESOLVE_INTERVAL_VAR)
            .map(Duration::from_secs)
            .unwrap_or(defaults.resolve_interval),
    }
}

/// Where a module executes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    #[default]
    Local,
    Remote,
}

/// Kubernetes-style resource requests and limits for a worker pod.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequirements {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub requests: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub limits: BTreeMap<String, String>,
}

/// Load configuration of one module. Read-only to splice-orc.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleConfig {
    #[serde(default)]
    pub load_type: LoadMode,
    /// Language of the module as seen by the worker, e.g. `py`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<String>,
    #[serde(default)]
    pub resources: ResourceRequirements,
    /// Remaining remote parameters, forwarded to the manager as-is.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ModuleConfig {
    pub fn remote() -> Self {
        Self { load_type: LoadMode::Remote, ..Default::default() }
    }

    pub fn is_remote(&self) -> bool {
        self.load_type == LoadMode::Remote
    }
}

#[derive(Deserialize)]
struct ModuleConfigFile {
    #[serde(default)]
    modules: HashMap<String, ModuleConfig>,
}

/// Module configurations keyed by module identifier.
#[derive(Debug, Clone, Default)]
pub struct ModuleConfigs {
    modules: HashMap<String, ModuleConfig>,
}

impl ModuleConfigs {
    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        let file: ModuleConfigFile = toml::from_str(text)?;
        Ok(Self { modules: file.modules })
    }

    /// Load the module config file. A missing file configures nothing.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(SettingsError::Io { path: path.to_path_buf(), source }),
        }
    }

    pub fn get(&self, module: &str) -> Option<&ModuleConfig> {
        self.modules.get(module)
    }

    pub fn insert(&mut self, module: impl Into<String>, config: ModuleConfig) {
        self.modules.insert(module.into(), config);
    }

    /// Modules sorted by identifier.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModuleConfig)> {
        let mut sorted: Vec<_> = self.modules.iter().map(|(k, v)| (k.as_str(), v)).collect();
        sorted.sort_by_key(|(k, _)| *k);
        sorted.into_iter()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
