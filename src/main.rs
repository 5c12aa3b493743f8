// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! splice-orc-cli entry point.
//!
//! Prepares a cluster for remote module imports and inspects the local
//! configuration the import hook reads.

mod cli_parser;
mod runtime_init;

use std::process::ExitCode;

fn exit(code: i32) -> ExitCode {
    ExitCode::from(code as u8)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match command {
        "help" | "--help" | "-h" => {
            if let Some(sub) = args.get(2) {
                cli_parser::print_command_help(sub);
            } else {
                cli_parser::print_usage();
            }
            return ExitCode::SUCCESS;
        }
        "version" | "--version" | "-V" => {
            println!("splice-orc-cli {}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        }
        _ => {}
    }

    runtime_init::init_tracing();
    let settings = runtime_init::load_settings();

    match command {
        "activate" => exit(runtime_init::run_activate(&settings).await),
        "bootstrap" => exit(runtime_init::run_bootstrap(&settings).await),
        "deploy" => exit(runtime_init::run_deploy(&settings).await),
        "endpoint" => exit(runtime_init::run_endpoint(&settings)),
        "modules" => {
            let json = args.get(2).map(|s| s.as_str()) == Some("--json");
            exit(runtime_init::run_modules(&settings, json))
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            cli_parser::print_usage();
            exit(runtime_init::EXIT_FAILURE)
        }
    }
}
