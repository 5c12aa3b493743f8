// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Wire contract with the pod manager.
//!
//! Requests carry the module identifier, the symbol and the operation;
//! responses carry a success flag plus either a result or a descriptor of
//! the exception the module raised.
//!
//! # Security
//! Enforces a maximum body size in both directions.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::ModuleConfig;
use crate::import::{CallArgs, Value};

pub(crate) const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024; // 16 MB

/// Exception kind the manager reports for a missing symbol.
pub const ATTRIBUTE_ERROR: &str = "AttributeError";

#[derive(Error, Debug)]
pub enum WireError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    GetAttribute,
    Call,
    /// Fetch the module's symbol table.
    Describe,
}

/// Request to `POST /run_module`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerRequest {
    pub request_id: Uuid,
    pub module: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    pub operation: Operation,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub kwargs: BTreeMap<String, Value>,
}

impl ManagerRequest {
    fn new(module: &str, symbol: Option<&str>, operation: Operation) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            module: module.to_string(),
            symbol: symbol.map(str::to_string),
            operation,
            args: Vec::new(),
            kwargs: BTreeMap::new(),
        }
    }

    pub fn describe(module: &str) -> Self {
        Self::new(module, None, Operation::Describe)
    }

    pub fn get_attribute(module: &str, symbol: &str) -> Self {
        Self::new(module, Some(symbol), Operation::GetAttribute)
    }

    pub fn call(module: &str, symbol: &str, args: CallArgs) -> Self {
        Self {
            args: args.args,
            kwargs: args.kwargs,
            ..Self::new(module, Some(symbol), Operation::Call)
        }
    }
}

/// Exception raised by the remote module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteException {
    pub kind: String,
    pub message: String,
}

/// Response of `POST /run_module`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RemoteException>,
}

impl ManagerResponse {
    pub fn success(result: Value) -> Self {
        Self { success: true, result: Some(result), error: None }
    }

    pub fn failure(kind: &str, message: &str) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(RemoteException { kind: kind.to_string(), message: message.to_string() }),
        }
    }

    /// Split into the returned value or the raised exception.
    pub fn into_result(self) -> Result<Value, RemoteException> {
        if self.success {
            return Ok(self.result.unwrap_or(Value::Null));
        }
        Err(self.error.unwrap_or_else(|| RemoteException {
            kind: "RemoteError".to_string(),
            message: "manager reported failure without an exception descriptor".to_string(),
        }))
    }
}

/// Body of `POST /create_pod/{module}`.
#[derive(Debug, Clone, Serialize)]
pub struct CreatePodRequest<'a> {
    pub module_name: &'a str,
    pub module_config: &'a ModuleConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Attribute,
    Callable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub kind: SymbolKind,
    /// Human-readable call signature, e.g. `(a, b=1)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// What a remote module exports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolTable {
    #[serde(default)]
    pub symbols: BTreeMap<String, SymbolInfo>,
}

impl SymbolTable {
    pub fn get(&self, symbol: &str) -> Option<&SymbolInfo> {
        self.symbols.get(symbol)
    }
}

/// Encode a message to JSON bytes with size limit enforcement.
pub fn encode_message<T: Serialize>(message: &T) -> Result<Vec<u8>, WireError> {
    let bytes = serde_json::to_vec(message)?;
    if bytes.len() > MAX_MESSAGE_SIZE {
        return Err(WireError::MessageTooLarge { size: bytes.len(), max: MAX_MESSAGE_SIZE });
    }
    Ok(bytes)
}

/// Decode a message from JSON bytes with size limit enforcement.
pub fn decode_message<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, WireError> {
    if bytes.len() > MAX_MESSAGE_SIZE {
        return Err(WireError::MessageTooLarge { size: bytes.len(), max: MAX_MESSAGE_SIZE });
    }
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
