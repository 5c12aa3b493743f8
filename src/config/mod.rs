// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Settings, per-module load configuration and the local env store.

pub mod env_store;
pub mod settings;

pub use env_store::{EndpointHandle, EnvEntries, EnvStore, StoreError, POD_MANAGER_URL_KEY};
pub use settings::{
    load, LoadMode, ModuleConfig, ModuleConfigs, ResourceRequirements, SettingsError,
    SpliceSettings,
};
