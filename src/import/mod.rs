// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Import routing between local importers and remote proxies.

pub mod module;
pub mod request;
pub mod router;

pub use module::{CallArgs, Imported, ModuleObject, Value};
pub use request::{ImportRequest, ImportRequestBuilder, SourceLanguage};
pub use router::{ImportRouter, LocalImport, LocalImporter, LocalImporters};
