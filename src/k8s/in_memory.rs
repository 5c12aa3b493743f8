// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! In-process [`ControlPlane`] for tests and dry runs.
//!
//! Behaves like the API server for the calls splice-orc makes: reads of
//! absent objects return `NotFound`, creates of present objects return
//! `Conflict`. Failures can be injected per call site, and every mutation is
//! counted so callers can assert that an operation left the cluster alone.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::control_plane::{ApiError, ControlPlane};
use super::manifest::ManifestObject;
use super::types::{AccessPolicy, IngressAddress, RoleBindingSpec};

/// Call sites that accept an injected failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    ListNamespaces,
    CreateNamespace,
    ReadServiceAccount,
    CreateServiceAccount,
    ReadRole,
    CreateRole,
    ReadRoleBinding,
    CreateRoleBinding,
    DeleteRoleBinding,
    CreateObject,
    ReadService,
}

type Key = (String, String);

#[derive(Default)]
struct State {
    namespaces: BTreeSet<String>,
    service_accounts: BTreeSet<Key>,
    roles: HashMap<Key, AccessPolicy>,
    bindings: HashMap<Key, RoleBindingSpec>,
    objects: BTreeMap<(String, &'static str, String), ManifestObject>,
    ingress: HashMap<Key, Vec<IngressAddress>>,
    failures: HashMap<FailPoint, ApiError>,
    mutations: u64,
}

impl State {
    fn fail(&mut self, point: FailPoint) -> Result<(), ApiError> {
        match self.failures.remove(&point) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn key(namespace: &str, name: &str) -> Key {
    (namespace.to_string(), name.to_string())
}

fn conflict(kind: &str, name: &str) -> ApiError {
    ApiError::Conflict(format!("{} \"{}\" already exists", kind, name))
}

#[derive(Default)]
pub struct InMemoryControlPlane {
    state: Mutex<State>,
}

impl InMemoryControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next call at `point` with `err`.
    pub fn fail_next(&self, point: FailPoint, err: ApiError) {
        self.state.lock().failures.insert(point, err);
    }

    /// Simulate the load balancer assigning addresses to a service.
    pub fn set_ingress(&self, namespace: &str, service: &str, ingress: Vec<IngressAddress>) {
        self.state.lock().ingress.insert(key(namespace, service), ingress);
    }

    /// Seed a role, e.g. one left behind by an older release.
    pub fn insert_role(&self, namespace: &str, name: &str, policy: AccessPolicy) {
        self.state.lock().roles.insert(key(namespace, name), policy);
    }

    pub fn insert_role_binding(&self, namespace: &str, name: &str, binding: RoleBindingSpec) {
        self.state.lock().bindings.insert(key(namespace, name), binding);
    }

    pub fn has_namespace(&self, name: &str) -> bool {
        self.state.lock().namespaces.contains(name)
    }

    pub fn has_service_account(&self, namespace: &str, name: &str) -> bool {
        self.state.lock().service_accounts.contains(&key(namespace, name))
    }

    pub fn role(&self, namespace: &str, name: &str) -> Option<AccessPolicy> {
        self.state.lock().roles.get(&key(namespace, name)).cloned()
    }

    pub fn role_binding(&self, namespace: &str, name: &str) -> Option<RoleBindingSpec> {
        self.state.lock().bindings.get(&key(namespace, name)).cloned()
    }

    /// `Kind/name` of every manifest object in `namespace`.
    pub fn objects(&self, namespace: &str) -> Vec<String> {
        self.state
            .lock()
            .objects
            .keys()
            .filter(|(ns, _, _)| ns == namespace)
            .map(|(_, kind, name)| format!("{}/{}", kind, name))
            .collect()
    }

    /// Number of successful create/replace/delete calls so far.
    pub fn mutation_count(&self) -> u64 {
        self.state.lock().mutations
    }
}

#[async_trait]
impl ControlPlane for InMemoryControlPlane {
    async fn list_namespaces(&self) -> Result<Vec<String>, ApiError> {
        let mut state = self.state.lock();
        state.fail(FailPoint::ListNamespaces)?;
        Ok(state.namespaces.iter().cloned().collect())
    }

    async fn create_namespace(&self, name: &str) -> Result<(), ApiError> {
        let mut state = self.state.lock();
        state.fail(FailPoint::CreateNamespace)?;
        if !state.namespaces.insert(name.to_string()) {
            return Err(conflict("namespaces", name));
        }
        state.mutations += 1;
        Ok(())
    }

    async fn read_service_account(&self, namespace: &str, name: &str) -> Result<(), ApiError> {
        let mut state = self.state.lock();
        state.fail(FailPoint::ReadServiceAccount)?;
        if state.service_accounts.contains(&key(namespace, name)) {
            Ok(())
        } else {
            Err(ApiError::NotFound)
        }
    }

    async fn create_service_account(&self, namespace: &str, name: &str) -> Result<(), ApiError> {
        let mut state = self.state.lock();
        state.fail(FailPoint::CreateServiceAccount)?;
        if !state.namespaces.contains(namespace) {
            return Err(ApiError::NotFound);
        }
        if !state.service_accounts.insert(key(namespace, name)) {
            return Err(conflict("serviceaccounts", name));
        }
        state.mutations += 1;
        Ok(())
    }

    async fn read_role(&self, namespace: &str, name: &str) -> Result<AccessPolicy, ApiError> {
        let mut state = self.state.lock();
        state.fail(FailPoint::ReadRole)?;
        state.roles.get(&key(namespace, name)).cloned().ok_or(ApiError::NotFound)
    }

    async fn create_role(
        &self,
        namespace: &str,
        name: &str,
        policy: &AccessPolicy,
    ) -> Result<(), ApiError> {
        let mut state = self.state.lock();
        state.fail(FailPoint::CreateRole)?;
        let k = key(namespace, name);
        if state.roles.contains_key(&k) {
            return Err(conflict("roles", name));
        }
        state.roles.insert(k, policy.clone());
        state.mutations += 1;
        Ok(())
    }

    async fn replace_role(
        &self,
        namespace: &str,
        name: &str,
        policy: &AccessPolicy,
    ) -> Result<(), ApiError> {
        let mut state = self.state.lock();
        let slot = state.roles.get_mut(&key(namespace, name)).ok_or(ApiError::NotFound)?;
        *slot = policy.clone();
        state.mutations += 1;
        Ok(())
    }

    async fn read_role_binding(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<RoleBindingSpec, ApiError> {
        let mut state = self.state.lock();
        state.fail(FailPoint::ReadRoleBinding)?;
        state.bindings.get(&key(namespace, name)).cloned().ok_or(ApiError::NotFound)
    }

    async fn create_role_binding(
        &self,
        namespace: &str,
        name: &str,
        binding: &RoleBindingSpec,
    ) -> Result<(), ApiError> {
        let mut state = self.state.lock();
        state.fail(FailPoint::CreateRoleBinding)?;
        let k = key(namespace, name);
        if state.bindings.contains_key(&k) {
            return Err(conflict("rolebindings", name));
        }
        state.bindings.insert(k, binding.clone());
        state.mutations += 1;
        Ok(())
    }

    async fn delete_role_binding(&self, namespace: &str, name: &str) -> Result<(), ApiError> {
        let mut state = self.state.lock();
        state.fail(FailPoint::DeleteRoleBinding)?;
        state.bindings.remove(&key(namespace, name)).ok_or(ApiError::NotFound)?;
        state.mutations += 1;
        Ok(())
    }

    async fn create_manifest_object(
        &self,
        namespace: &str,
        object: &ManifestObject,
    ) -> Result<(), ApiError> {
        let mut state = self.state.lock();
        state.fail(FailPoint::CreateObject)?;
        let k = (namespace.to_string(), object.kind(), object.name().to_string());
        if state.objects.contains_key(&k) {
            return Err(conflict(object.kind(), object.name()));
        }
        state.objects.insert(k, object.clone());
        state.mutations += 1;
        Ok(())
    }

    async fn read_service_ingress(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Vec<IngressAddress>, ApiError> {
        let mut state = self.state.lock();
        state.fail(FailPoint::ReadService)?;
        let exists = state
            .objects
            .contains_key(&(namespace.to_string(), "Service", name.to_string()));
        if !exists {
            return Err(ApiError::NotFound);
        }
        Ok(state
            .ingress
            .get(&key(namespace, name))
            .cloned()
            .unwrap_or_default())
    }
}
