// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI help text for splice-orc-cli.

/// Print general usage information.
pub fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "splice-orc-cli - cluster setup for remote module imports v{}

USAGE:
    splice-orc-cli [COMMAND] [OPTIONS]

COMMANDS:
    activate     Bootstrap the cluster, deploy the pod manager, persist its URL
    bootstrap    Ensure namespace, service account, role and role binding
    deploy       Apply the pod manager manifest and resolve its address
    endpoint     Print the persisted pod manager URL
    modules      List configured modules and where they load
    version      Show version information
    help         Show this help message

OPTIONS:
    -h, --help     Show help for command
    -V, --version  Show version information

EXAMPLES:
    splice-orc-cli activate           # One-shot setup
    splice-orc-cli endpoint           # Where remote imports go
    splice-orc-cli modules --json     # Module table as JSON

ENVIRONMENT:
    SPLICE_ORC_ENV_FILE               Env store holding POD_MANAGER_URL (default .env)
    SPLICE_ORC_MODULE_CONFIG          Module config file (default splice_modules.toml)
    SPLICE_ORC_REQUEST_TIMEOUT_SECS   Pod manager request timeout (default 30)
    SPLICE_ORC_RESOLVE_ATTEMPTS       Address polls during activation (default 1)
    SPLICE_ORC_RESOLVE_INTERVAL_SECS  Seconds between address polls (default 5)
    SPLICE_ORC_LOG_FORMAT             Set to 'json' for JSON logs
    RUST_LOG                          Log level (debug, info, warn, error)
    KUBECONFIG                        Cluster credentials (in-cluster config otherwise)

EXIT CODES:
    0  Success
    1  Failure
    2  Configuration error
    3  Pod manager endpoint not resolved yet
",
        version
    );
}

/// Print detailed help for a specific command.
pub fn print_command_help(command: &str) {
    match command {
        "activate" => print_activate_help(),
        "bootstrap" => print_bootstrap_help(),
        "deploy" => print_deploy_help(),
        "endpoint" => print_endpoint_help(),
        "modules" => print_modules_help(),
        _ => {
            eprintln!(
                "No detailed help available for '{}'. Use 'splice-orc-cli help' for general usage.",
                command
            );
        }
    }
}

fn print_activate_help() {
    eprintln!(
        "splice-orc-cli activate - One-shot cluster setup

USAGE:
    splice-orc-cli activate

DESCRIPTION:
    Creates the 'jac-splice-orc' namespace, the 'smartimportsa' service
    account and its role and role binding when absent, replaces RBAC objects
    whose rules drifted, applies the pod manager manifest and persists the
    manager URL once the load balancer has an address. Safe to re-run.

EXIT CODES:
    0  Cluster ready, endpoint persisted
    1  A cluster call failed
    2  Bundled manifest or identity invalid
    3  Manager deployed but its address is still pending
"
    );
}

fn print_bootstrap_help() {
    eprintln!(
        "splice-orc-cli bootstrap - Ensure namespace and RBAC

USAGE:
    splice-orc-cli bootstrap

DESCRIPTION:
    Runs only the identity and access steps of 'activate'.
"
    );
}

fn print_deploy_help() {
    eprintln!(
        "splice-orc-cli deploy - Deploy the pod manager

USAGE:
    splice-orc-cli deploy

DESCRIPTION:
    Applies the bundled manifest into the namespace, resolves the service
    address (IP preferred over hostname) and persists it. Requires a
    bootstrapped namespace.

EXIT CODES:
    0  Endpoint persisted
    1  A cluster call failed
    3  Address still pending
"
    );
}

fn print_endpoint_help() {
    eprintln!(
        "splice-orc-cli endpoint - Print the persisted pod manager URL

USAGE:
    splice-orc-cli endpoint

EXIT CODES:
    0  URL printed
    2  Env store unreadable or URL malformed
    3  Nothing persisted yet
"
    );
}

fn print_modules_help() {
    eprintln!(
        "splice-orc-cli modules - List configured modules

USAGE:
    splice-orc-cli modules [--json]

OPTIONS:
    --json  Output the full module configuration as JSON
"
    );
}
