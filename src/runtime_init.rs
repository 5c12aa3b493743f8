// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Logging setup and the cluster-facing CLI commands.

use std::sync::Arc;

use splice_orc::config::{self as splice_config, EndpointHandle, EnvStore, ModuleConfigs};
use splice_orc::k8s::{
    activate, ClusterBootstrapper, ClusterError, ControlPlane, DeploymentProvisioner,
    KubeControlPlane, Manifest, ResolvePolicy,
};
use splice_orc::SpliceSettings;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_UNRESOLVED: i32 = 3;

const LOG_FORMAT_VAR: &str = "SPLICE_ORC_LOG_FORMAT";

/// Install the global subscriber. `RUST_LOG` filters, default `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var(LOG_FORMAT_VAR).is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Load runtime settings from the environment.
pub fn load_settings() -> SpliceSettings {
    splice_config::load()
}

fn exit_code(err: &ClusterError) -> i32 {
    match err {
        ClusterError::EndpointUnresolved { .. } => EXIT_UNRESOLVED,
        ClusterError::Manifest(_) | ClusterError::Identity(_) => EXIT_CONFIG,
        _ => EXIT_FAILURE,
    }
}

struct Cluster {
    bootstrapper: ClusterBootstrapper,
    provisioner: DeploymentProvisioner,
    resolve: ResolvePolicy,
}

async fn connect(settings: &SpliceSettings) -> Result<Cluster, ClusterError> {
    let control_plane: Arc<dyn ControlPlane> = Arc::new(KubeControlPlane::connect().await?);
    let endpoint = Arc::new(EndpointHandle::new(EnvStore::new(&settings.env_file)));
    let resolve = ResolvePolicy {
        attempts: settings.resolve_attempts,
        interval: settings.resolve_interval,
    };
    let provisioner =
        DeploymentProvisioner::new(Arc::clone(&control_plane), Manifest::bundled()?, endpoint)
            .with_resolve_policy(resolve);
    Ok(Cluster {
        bootstrapper: ClusterBootstrapper::new(control_plane),
        provisioner,
        resolve,
    })
}

fn report(err: &ClusterError) -> i32 {
    eprintln!("Error: {}", err);
    exit_code(err)
}

/// Bootstrap, deploy and persist the manager endpoint.
pub async fn run_activate(settings: &SpliceSettings) -> i32 {
    let cluster = match connect(settings).await {
        Ok(cluster) => cluster,
        Err(e) => return report(&e),
    };

    match activate(&cluster.bootstrapper, &cluster.provisioner, cluster.resolve).await {
        Ok(activation) => {
            println!("Namespace:  {}", activation.identity.namespace);
            println!("Created:    {}", activation.manifest.created.join(", "));
            println!("Existing:   {}", activation.manifest.existing.join(", "));
            match activation.endpoint {
                Some(endpoint) => {
                    println!("Endpoint:   {}", endpoint);
                    EXIT_OK
                }
                None => {
                    println!("Endpoint:   <pending>");
                    eprintln!("Pod manager has no external address yet; run 'activate' again later.");
                    EXIT_UNRESOLVED
                }
            }
        }
        Err(e) => report(&e),
    }
}

/// Ensure namespace, service account and RBAC only.
pub async fn run_bootstrap(settings: &SpliceSettings) -> i32 {
    let cluster = match connect(settings).await {
        Ok(cluster) => cluster,
        Err(e) => return report(&e),
    };

    match cluster.bootstrapper.ensure_ready().await {
        Ok(identity) => {
            println!("Namespace:       {}", identity.namespace);
            println!("ServiceAccount:  {}", identity.service_account);
            println!("Role:            {}", identity.role);
            println!("RoleBinding:     {}", identity.role_binding);
            EXIT_OK
        }
        Err(e) => report(&e),
    }
}

/// Apply the manifest into an already bootstrapped namespace and resolve.
pub async fn run_deploy(settings: &SpliceSettings) -> i32 {
    let cluster = match connect(settings).await {
        Ok(cluster) => cluster,
        Err(e) => return report(&e),
    };

    let identity = cluster.bootstrapper.identity().clone();
    match cluster.provisioner.deploy_manager(&identity).await {
        Ok(endpoint) => {
            println!("{}", endpoint);
            EXIT_OK
        }
        Err(e) => report(&e),
    }
}

/// Print the persisted manager URL.
pub fn run_endpoint(settings: &SpliceSettings) -> i32 {
    let handle = EndpointHandle::new(EnvStore::new(&settings.env_file));
    match handle.load() {
        Ok(Some(endpoint)) => {
            println!("{}", endpoint);
            EXIT_OK
        }
        Ok(None) => {
            eprintln!(
                "No pod manager endpoint persisted in {}",
                settings.env_file.display()
            );
            EXIT_UNRESOLVED
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_CONFIG
        }
    }
}

/// List configured modules with their load mode.
pub fn run_modules(settings: &SpliceSettings, json: bool) -> i32 {
    let modules = match ModuleConfigs::load(&settings.module_config) {
        Ok(modules) => modules,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_CONFIG;
        }
    };

    if json {
        let listing: serde_json::Map<String, serde_json::Value> = modules
            .iter()
            .filter_map(|(name, config)| {
                serde_json::to_value(config).ok().map(|v| (name.to_string(), v))
            })
            .collect();
        match serde_json::to_string_pretty(&listing) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                return EXIT_FAILURE;
            }
        }
        return EXIT_OK;
    }

    if modules.is_empty() {
        println!(
            "No modules configured in {} (all imports run locally)",
            settings.module_config.display()
        );
        return EXIT_OK;
    }
    println!("{:<32} LOAD TYPE", "MODULE");
    for (name, config) in modules.iter() {
        let mode = if config.is_remote() { "remote" } else { "local" };
        println!("{:<32} {}", name, mode);
    }
    EXIT_OK
}
