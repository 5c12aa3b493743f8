// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Import requests as passed by the host runtime's import hook.

use std::path::{Path, PathBuf};

/// Language the target module is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceLanguage {
    Jac,
    Python,
}

impl SourceLanguage {
    /// Map the hook's `lng` argument; anything but `py` is Jac.
    pub fn from_hint(lng: Option<&str>) -> Self {
        match lng {
            Some("py") => Self::Python,
            _ => Self::Jac,
        }
    }
}

/// One import call. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    target: String,
    base_path: PathBuf,
    absorb: bool,
    cachable: bool,
    module_alias: Option<String>,
    override_name: Option<String>,
    language: SourceLanguage,
    items: Vec<(String, Option<String>)>,
    reload: bool,
}

impl ImportRequest {
    pub fn builder(target: impl Into<String>, base_path: impl Into<PathBuf>) -> ImportRequestBuilder {
        ImportRequestBuilder {
            request: ImportRequest {
                target: target.into(),
                base_path: base_path.into(),
                absorb: false,
                cachable: true,
                module_alias: None,
                override_name: None,
                language: SourceLanguage::Jac,
                items: Vec::new(),
                reload: false,
            },
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn absorb(&self) -> bool {
        self.absorb
    }

    pub fn cachable(&self) -> bool {
        self.cachable
    }

    pub fn module_alias(&self) -> Option<&str> {
        self.module_alias.as_deref()
    }

    pub fn override_name(&self) -> Option<&str> {
        self.override_name.as_deref()
    }

    pub fn language(&self) -> SourceLanguage {
        self.language
    }

    /// Requested `(name, alias)` pairs, in request order.
    pub fn items(&self) -> &[(String, Option<String>)] {
        &self.items
    }

    pub fn reload(&self) -> bool {
        self.reload
    }

    /// Whether the whole module, rather than named items, is returned.
    pub fn wants_whole_module(&self) -> bool {
        self.absorb || self.items.is_empty()
    }
}

pub struct ImportRequestBuilder {
    request: ImportRequest,
}

impl ImportRequestBuilder {
    pub fn absorb(mut self, absorb: bool) -> Self {
        self.request.absorb = absorb;
        self
    }

    pub fn cachable(mut self, cachable: bool) -> Self {
        self.request.cachable = cachable;
        self
    }

    pub fn module_alias(mut self, alias: Option<String>) -> Self {
        self.request.module_alias = alias;
        self
    }

    pub fn override_name(mut self, name: Option<String>) -> Self {
        self.request.override_name = name;
        self
    }

    pub fn language(mut self, language: SourceLanguage) -> Self {
        self.request.language = language;
        self
    }

    pub fn item(mut self, name: impl Into<String>, alias: Option<&str>) -> Self {
        self.request.items.push((name.into(), alias.map(str::to_string)));
        self
    }

    pub fn items(mut self, items: impl IntoIterator<Item = (String, Option<String>)>) -> Self {
        self.request.items.extend(items);
        self
    }

    pub fn reload(mut self, reload: bool) -> Self {
        self.request.reload = reload;
        self
    }

    pub fn build(self) -> ImportRequest {
        self.request
    }
}
