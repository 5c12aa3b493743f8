// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! [`ControlPlane`] backed by a live cluster through `kube`.

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Namespace, Service, ServiceAccount};
use k8s_openapi::api::rbac::v1::{PolicyRule as KubePolicyRule, Role, RoleBinding, RoleRef, Subject};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, DeleteParams, ListParams, PostParams};
use kube::Client;
use tracing::debug;

use super::control_plane::{ApiError, ControlPlane};
use super::error::ClusterError;
use super::manifest::ManifestObject;
use super::types::{AccessPolicy, BindingSubject, IngressAddress, PolicyRule, RoleBindingSpec};

const RBAC_API_GROUP: &str = "rbac.authorization.k8s.io";

fn classify(err: kube::Error) -> ApiError {
    match err {
        kube::Error::Api(resp) if resp.code == 404 => ApiError::NotFound,
        kube::Error::Api(resp) if resp.code == 409 => ApiError::Conflict(resp.message),
        kube::Error::Api(resp) => ApiError::Other { status: Some(resp.code), message: resp.message },
        other => ApiError::other(other.to_string()),
    }
}

fn meta(namespace: Option<&str>, name: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: namespace.map(str::to_string),
        ..Default::default()
    }
}

fn to_kube_rules(policy: &AccessPolicy) -> Vec<KubePolicyRule> {
    policy
        .rules
        .iter()
        .map(|rule| KubePolicyRule {
            api_groups: Some(rule.api_groups.clone()),
            resources: Some(rule.resources.clone()),
            verbs: rule.verbs.clone(),
            ..Default::default()
        })
        .collect()
}

fn from_kube_rules(rules: Option<Vec<KubePolicyRule>>) -> AccessPolicy {
    AccessPolicy {
        rules: rules
            .unwrap_or_default()
            .into_iter()
            .map(|rule| PolicyRule {
                api_groups: rule.api_groups.unwrap_or_default(),
                resources: rule.resources.unwrap_or_default(),
                verbs: rule.verbs,
            })
            .collect(),
    }
}

fn to_kube_binding(binding: &RoleBindingSpec) -> (RoleRef, Vec<Subject>) {
    let role_ref = RoleRef {
        api_group: RBAC_API_GROUP.to_string(),
        kind: "Role".to_string(),
        name: binding.role_name.clone(),
    };
    let subjects = binding
        .subjects
        .iter()
        .map(|s| Subject {
            kind: s.kind.clone(),
            name: s.name.clone(),
            namespace: s.namespace.clone(),
            ..Default::default()
        })
        .collect();
    (role_ref, subjects)
}

fn from_kube_binding(binding: RoleBinding) -> RoleBindingSpec {
    RoleBindingSpec {
        role_name: binding.role_ref.name,
        subjects: binding
            .subjects
            .unwrap_or_default()
            .into_iter()
            .map(|s| BindingSubject { kind: s.kind, name: s.name, namespace: s.namespace })
            .collect(),
    }
}

/// Control plane client over the Kubernetes API.
#[derive(Clone)]
pub struct KubeControlPlane {
    client: Client,
}

impl KubeControlPlane {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect using the local kubeconfig, falling back to the in-cluster
    /// service account.
    pub async fn connect() -> Result<Self, ClusterError> {
        let client = Client::try_default()
            .await
            .map_err(|e| ClusterError::Connect(e.to_string()))?;
        Ok(Self::new(client))
    }

    fn namespaced<K>(&self, namespace: &str) -> Api<K>
    where
        K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>,
        <K as kube::Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl ControlPlane for KubeControlPlane {
    async fn list_namespaces(&self) -> Result<Vec<String>, ApiError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).await.map_err(classify)?;
        Ok(list.items.into_iter().filter_map(|ns| ns.metadata.name).collect())
    }

    async fn create_namespace(&self, name: &str) -> Result<(), ApiError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let ns = Namespace { metadata: meta(None, name), ..Default::default() };
        api.create(&PostParams::default(), &ns).await.map_err(classify)?;
        Ok(())
    }

    async fn read_service_account(&self, namespace: &str, name: &str) -> Result<(), ApiError> {
        let api: Api<ServiceAccount> = self.namespaced(namespace);
        api.get(name).await.map_err(classify)?;
        Ok(())
    }

    async fn create_service_account(&self, namespace: &str, name: &str) -> Result<(), ApiError> {
        let api: Api<ServiceAccount> = self.namespaced(namespace);
        let sa = ServiceAccount { metadata: meta(Some(namespace), name), ..Default::default() };
        api.create(&PostParams::default(), &sa).await.map_err(classify)?;
        Ok(())
    }

    async fn read_role(&self, namespace: &str, name: &str) -> Result<AccessPolicy, ApiError> {
        let api: Api<Role> = self.namespaced(namespace);
        let role = api.get(name).await.map_err(classify)?;
        Ok(from_kube_rules(role.rules))
    }

    async fn create_role(
        &self,
        namespace: &str,
        name: &str,
        policy: &AccessPolicy,
    ) -> Result<(), ApiError> {
        let api: Api<Role> = self.namespaced(namespace);
        let role = Role { metadata: meta(Some(namespace), name), rules: Some(to_kube_rules(policy)) };
        api.create(&PostParams::default(), &role).await.map_err(classify)?;
        Ok(())
    }

    async fn replace_role(
        &self,
        namespace: &str,
        name: &str,
        policy: &AccessPolicy,
    ) -> Result<(), ApiError> {
        let api: Api<Role> = self.namespaced(namespace);
        let mut role = api.get(name).await.map_err(classify)?;
        role.rules = Some(to_kube_rules(policy));
        api.replace(name, &PostParams::default(), &role).await.map_err(classify)?;
        Ok(())
    }

    async fn read_role_binding(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<RoleBindingSpec, ApiError> {
        let api: Api<RoleBinding> = self.namespaced(namespace);
        let binding = api.get(name).await.map_err(classify)?;
        Ok(from_kube_binding(binding))
    }

    async fn create_role_binding(
        &self,
        namespace: &str,
        name: &str,
        binding: &RoleBindingSpec,
    ) -> Result<(), ApiError> {
        let api: Api<RoleBinding> = self.namespaced(namespace);
        let (role_ref, subjects) = to_kube_binding(binding);
        let object = RoleBinding {
            metadata: meta(Some(namespace), name),
            role_ref,
            subjects: Some(subjects),
        };
        api.create(&PostParams::default(), &object).await.map_err(classify)?;
        Ok(())
    }

    async fn delete_role_binding(&self, namespace: &str, name: &str) -> Result<(), ApiError> {
        let api: Api<RoleBinding> = self.namespaced(namespace);
        api.delete(name, &DeleteParams::default()).await.map_err(classify)?;
        Ok(())
    }

    async fn create_manifest_object(
        &self,
        namespace: &str,
        object: &ManifestObject,
    ) -> Result<(), ApiError> {
        let pp = PostParams::default();
        debug!(%namespace, kind = object.kind(), name = object.name(), "Creating manifest object");
        match object {
            ManifestObject::Deployment(deployment) => {
                let api: Api<Deployment> = self.namespaced(namespace);
                let mut deployment = deployment.as_ref().clone();
                deployment.metadata.namespace = Some(namespace.to_string());
                api.create(&pp, &deployment).await.map_err(classify)?;
            }
            ManifestObject::Service(service) => {
                let api: Api<Service> = self.namespaced(namespace);
                let mut service = service.as_ref().clone();
                service.metadata.namespace = Some(namespace.to_string());
                api.create(&pp, &service).await.map_err(classify)?;
            }
        }
        Ok(())
    }

    async fn read_service_ingress(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Vec<IngressAddress>, ApiError> {
        let api: Api<Service> = self.namespaced(namespace);
        let service = api.get(name).await.map_err(classify)?;
        let ingress = service
            .status
            .and_then(|status| status.load_balancer)
            .and_then(|lb| lb.ingress)
            .unwrap_or_default()
            .into_iter()
            .map(|entry| IngressAddress { ip: entry.ip, hostname: entry.hostname })
            .collect();
        Ok(ingress)
    }
}
