// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Remote modules: wire contract, manager transport, proxies.

pub mod factory;
pub mod proxy;
pub mod transport;
pub mod wire;

pub use factory::ProxyFactory;
pub use proxy::ModuleProxy;
pub use transport::{HttpManagerTransport, ManagerTransport, TransportError};
pub use wire::{
    ManagerRequest, ManagerResponse, Operation, RemoteException, SymbolInfo, SymbolKind,
    SymbolTable,
};
