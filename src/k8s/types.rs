// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Cluster-side data model: identity names, access policy, ingress and the
//! resolved pod manager endpoint.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use super::validation::{
    validate_image, validate_module_id, validate_resource_name, ValidationError,
    MAX_FIELD_LENGTH,
};

/// Namespace every splice-orc object lives in.
pub const NAMESPACE: &str = "jac-splice-orc";
/// Service account the pod manager runs as.
pub const SERVICE_ACCOUNT: &str = "smartimportsa";
pub const ROLE: &str = "smartimport-role";
pub const ROLE_BINDING: &str = "smartimport-rolebinding";
/// Network-facing service of the pod manager.
pub const MANAGER_SERVICE: &str = "pod-manager-service";
pub const MANAGER_DEPLOYMENT: &str = "pod-manager-deployment";
/// Port the pod manager listens on behind its service.
pub const MANAGER_PORT: u16 = 8000;

const LIFECYCLE_VERBS: [&str; 6] = ["get", "watch", "list", "create", "update", "delete"];

/// Names of the objects that make up the cluster identity.
///
/// The names are fixed per deployment of splice-orc; callers never pick them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterIdentity {
    pub namespace: String,
    pub service_account: String,
    pub role: String,
    pub role_binding: String,
}

impl Default for ClusterIdentity {
    fn default() -> Self {
        Self {
            namespace: NAMESPACE.to_string(),
            service_account: SERVICE_ACCOUNT.to_string(),
            role: ROLE.to_string(),
            role_binding: ROLE_BINDING.to_string(),
        }
    }
}

impl ClusterIdentity {
    /// Validate every name as a Kubernetes resource name.
    ///
    /// # Errors
    /// Returns a `ValidationError` naming the first invalid field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_resource_name(&self.namespace, "namespace")?;
        validate_resource_name(&self.service_account, "service_account")?;
        validate_resource_name(&self.role, "role")?;
        validate_resource_name(&self.role_binding, "role_binding")?;
        Ok(())
    }
}

/// One RBAC rule: verbs granted on resources of some API groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRule {
    pub api_groups: Vec<String>,
    pub resources: Vec<String>,
    pub verbs: Vec<String>,
}

impl PolicyRule {
    fn lifecycle(api_group: &str, resources: &[&str]) -> Self {
        Self {
            api_groups: vec![api_group.to_string()],
            resources: resources.iter().map(|r| (*r).to_string()).collect(),
            verbs: LIFECYCLE_VERBS.iter().map(|v| (*v).to_string()).collect(),
        }
    }

    fn sorted(&self) -> Self {
        let mut rule = self.clone();
        rule.api_groups.sort();
        rule.resources.sort();
        rule.verbs.sort();
        rule
    }
}

/// Permissions granted to the service account through the role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    pub rules: Vec<PolicyRule>,
}

impl AccessPolicy {
    /// Policy the pod manager needs to own worker pods on our behalf.
    pub fn pod_manager() -> Self {
        Self {
            rules: vec![
                PolicyRule::lifecycle("", &["pods", "services", "configmaps"]),
                PolicyRule::lifecycle("apps", &["deployments"]),
            ],
        }
    }

    /// Whether `verb` on `resource` in `api_group` is granted by some rule.
    pub fn grants(&self, api_group: &str, resource: &str, verb: &str) -> bool {
        self.rules.iter().any(|rule| {
            rule.api_groups.iter().any(|g| g == api_group || g == "*")
                && rule.resources.iter().any(|r| r == resource || r == "*")
                && rule.verbs.iter().any(|v| v == verb || v == "*")
        })
    }

    /// Compare two policies ignoring the order of rules and list entries.
    pub fn matches(&self, other: &AccessPolicy) -> bool {
        let mut ours: Vec<PolicyRule> = self.rules.iter().map(PolicyRule::sorted).collect();
        let mut theirs: Vec<PolicyRule> = other.rules.iter().map(PolicyRule::sorted).collect();
        let key = |r: &PolicyRule| (r.api_groups.clone(), r.resources.clone(), r.verbs.clone());
        ours.sort_by_key(key);
        theirs.sort_by_key(key);
        ours == theirs
    }
}

/// Subject of a role binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingSubject {
    pub kind: String,
    pub name: String,
    pub namespace: Option<String>,
}

/// Desired or observed shape of the role binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleBindingSpec {
    pub role_name: String,
    pub subjects: Vec<BindingSubject>,
}

impl RoleBindingSpec {
    /// Binding of the identity's role to its service account.
    pub fn for_identity(identity: &ClusterIdentity) -> Self {
        Self {
            role_name: identity.role.clone(),
            subjects: vec![BindingSubject {
                kind: "ServiceAccount".to_string(),
                name: identity.service_account.clone(),
                namespace: Some(identity.namespace.clone()),
            }],
        }
    }
}

/// One entry of a load balancer's `status.loadBalancer.ingress`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressAddress {
    pub ip: Option<String>,
    pub hostname: Option<String>,
}

impl IngressAddress {
    pub fn ip(ip: &str) -> Self {
        Self { ip: Some(ip.to_string()), hostname: None }
    }

    pub fn hostname(hostname: &str) -> Self {
        Self { ip: None, hostname: Some(hostname.to_string()) }
    }
}

/// Externally reachable address of the pod manager.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManagerEndpoint {
    pub host: String,
    pub port: u16,
}

impl ManagerEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }

    /// Base URL used for manager requests, e.g. `http://10.0.0.7:8000`.
    pub fn url(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ManagerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "http://[{}]:{}", self.host, self.port)
        } else {
            write!(f, "http://{}:{}", self.host, self.port)
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid manager endpoint '{input}': {reason}")]
pub struct EndpointParseError {
    pub input: String,
    pub reason: &'static str,
}

impl FromStr for ManagerEndpoint {
    type Err = EndpointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = |reason| EndpointParseError { input: s.to_string(), reason };
        let rest = s.trim();
        let rest = rest.strip_prefix("http://").unwrap_or(rest);
        let rest = rest.trim_end_matches('/');
        if rest.contains('/') {
            return Err(fail("path components are not supported"));
        }

        let (host, port) = rest.rsplit_once(':').ok_or_else(|| fail("missing port"))?;
        let host = host.trim_start_matches('[').trim_end_matches(']');
        if host.is_empty() {
            return Err(fail("missing host"));
        }
        let port = port.parse::<u16>().map_err(|_| fail("port is not a number"))?;
        Ok(Self::new(host, port))
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
