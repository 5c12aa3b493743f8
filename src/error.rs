// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Errors surfaced to the host runtime by an import or by a module object.
//!
//! Local and remote modules report missing symbols and raised exceptions with
//! the same variants, so callers cannot tell them apart by error shape.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Why the pod manager could not be talked to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unreachable {
    /// Connection refused, DNS failure, reset.
    Connect(String),
    /// The transport timeout fired.
    Timeout(Duration),
    /// The manager answered with something that is not a wire response.
    Protocol(String),
}

impl fmt::Display for Unreachable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect(reason) => write!(f, "connection failed: {}", reason),
            Self::Timeout(after) => write!(f, "timed out after {:?}", after),
            Self::Protocol(reason) => write!(f, "protocol error: {}", reason),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImportError {
    /// A prerequisite of the import is missing, e.g. no persisted endpoint.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid import request: {0}")]
    InvalidRequest(String),

    /// Attribute lookup failed; mirrors a local missing-attribute error.
    #[error("module '{module}' has no attribute '{symbol}'")]
    SymbolNotFound { module: String, symbol: String },

    #[error("'{symbol}' of module '{module}' is not callable")]
    NotCallable { module: String, symbol: String },

    /// The module itself raised while the symbol was accessed or called.
    #[error("{kind}: {message}")]
    RemoteApplication {
        module: String,
        symbol: String,
        kind: String,
        message: String,
    },

    /// Network-level failure talking to the pod manager.
    #[error("Pod manager at {endpoint} unreachable: {cause}")]
    RemoteUnreachable { endpoint: String, cause: Unreachable },

    /// Failure reported by the host's local importer.
    #[error("Import of '{module}' failed: {message}")]
    Local { module: String, message: String },
}

impl ImportError {
    /// Whether the error came from the network rather than the module.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::RemoteUnreachable { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::RemoteUnreachable { cause: Unreachable::Timeout(_), .. }
        )
    }

    /// Exception kind raised by the module, local or remote.
    pub fn exception_kind(&self) -> Option<&str> {
        match self {
            Self::RemoteApplication { kind, .. } => Some(kind),
            Self::SymbolNotFound { .. } => Some("AttributeError"),
            Self::NotCallable { .. } => Some("TypeError"),
            _ => None,
        }
    }
}
