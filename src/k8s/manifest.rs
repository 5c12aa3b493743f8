// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! The declarative manifest of the pod manager workload.
//!
//! The manifest is a versioned `v1/List` of typed objects. Parsing rejects
//! unknown kinds up front so nothing is applied from a half-understood file.

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use serde::Deserialize;
use thiserror::Error;

use super::validation::{validate_image, validate_resource_name, ValidationError};

/// Manifest shipped with the crate.
pub const BUNDLED_MANIFEST: &str = include_str!("../../manifests/pod_manager.json");

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Malformed manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected a v1 List, found {api_version}/{kind}")]
    NotAList { api_version: String, kind: String },

    #[error("Unsupported manifest object {api_version}/{kind}")]
    UnsupportedKind { api_version: String, kind: String },

    #[error("{0} object has no metadata.name")]
    MissingName(&'static str),

    #[error("Invalid manifest field: {0}")]
    Invalid(#[from] ValidationError),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestList {
    api_version: String,
    kind: String,
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypeMeta {
    #[serde(default)]
    api_version: String,
    #[serde(default)]
    kind: String,
}

/// One object of the manifest.
#[derive(Debug, Clone)]
pub enum ManifestObject {
    Deployment(Box<Deployment>),
    Service(Box<Service>),
}

impl ManifestObject {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Deployment(_) => "Deployment",
            Self::Service(_) => "Service",
        }
    }

    pub fn name(&self) -> &str {
        let name = match self {
            Self::Deployment(d) => d.metadata.name.as_deref(),
            Self::Service(s) => s.metadata.name.as_deref(),
        };
        name.unwrap_or_default()
    }

    fn from_value(value: serde_json::Value) -> Result<Self, ManifestError> {
        let meta: TypeMeta = serde_json::from_value(value.clone())?;
        let object = match (meta.api_version.as_str(), meta.kind.as_str()) {
            ("apps/v1", "Deployment") => Self::Deployment(Box::new(serde_json::from_value(value)?)),
            ("v1", "Service") => Self::Service(Box::new(serde_json::from_value(value)?)),
            _ => {
                return Err(ManifestError::UnsupportedKind {
                    api_version: meta.api_version,
                    kind: meta.kind,
                })
            }
        };
        object.validate()?;
        Ok(object)
    }

    fn validate(&self) -> Result<(), ManifestError> {
        if self.name().is_empty() {
            return Err(ManifestError::MissingName(self.kind()));
        }
        validate_resource_name(self.name(), "metadata.name")?;

        if let Self::Deployment(deployment) = self {
            let containers = deployment
                .spec
                .as_ref()
                .and_then(|spec| spec.template.spec.as_ref())
                .map(|pod| pod.containers.as_slice())
                .unwrap_or_default();
            for container in containers {
                validate_image(container.image.as_deref().unwrap_or_default())?;
            }
        }
        Ok(())
    }
}

/// Parsed manifest, applied as a batch into the bootstrapped namespace.
#[derive(Debug, Clone)]
pub struct Manifest {
    objects: Vec<ManifestObject>,
}

impl Manifest {
    /// The manifest bundled with this crate.
    pub fn bundled() -> Result<Self, ManifestError> {
        Self::parse(BUNDLED_MANIFEST)
    }

    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let list: ManifestList = serde_json::from_str(text)?;
        if list.api_version != "v1" || list.kind != "List" {
            return Err(ManifestError::NotAList {
                api_version: list.api_version,
                kind: list.kind,
            });
        }

        let objects = list
            .items
            .into_iter()
            .map(ManifestObject::from_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { objects })
    }

    pub fn objects(&self) -> &[ManifestObject] {
        &self.objects
    }
}

/// Outcome of applying a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestReport {
    /// `Kind/name` of objects created by this apply.
    pub created: Vec<String>,
    /// `Kind/name` of objects that already existed.
    pub existing: Vec<String>,
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
