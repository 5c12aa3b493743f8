// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! The module-like surface handed back to the host runtime.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ImportError;

/// Values crossing the module boundary.
pub type Value = serde_json::Value;

/// Arguments of a call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallArgs {
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub kwargs: BTreeMap<String, Value>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn positional(args: impl IntoIterator<Item = Value>) -> Self {
        Self { args: args.into_iter().collect(), kwargs: BTreeMap::new() }
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(name.into(), value.into());
        self
    }
}

/// Capability interface of an imported module.
///
/// Local modules and remote proxies both implement it, so calling code
/// treats them alike.
#[async_trait]
pub trait ModuleObject: Send + Sync + fmt::Debug {
    /// Module identifier, e.g. `numpy`.
    fn name(&self) -> &str;

    /// Read attribute `symbol`.
    async fn get(&self, symbol: &str) -> Result<Value, ImportError>;

    /// Call `symbol` with `args`.
    async fn invoke(&self, symbol: &str, args: CallArgs) -> Result<Value, ImportError>;
}

/// One element of an import result.
#[derive(Debug, Clone)]
pub enum Imported {
    Module(Arc<dyn ModuleObject>),
    Binding { name: String, value: Value },
}

impl Imported {
    pub fn name(&self) -> &str {
        match self {
            Self::Module(module) => module.name(),
            Self::Binding { name, .. } => name,
        }
    }

    pub fn as_module(&self) -> Option<&Arc<dyn ModuleObject>> {
        match self {
            Self::Module(module) => Some(module),
            Self::Binding { .. } => None,
        }
    }
}
