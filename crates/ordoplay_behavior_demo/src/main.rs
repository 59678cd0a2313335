// SPDX-License-Identifier: MIT OR Apache-2.0
//! OrdoPlay hive demo.
//!
//! Runs a small bee colony on the behavior sequencer and prints the totals.
//!
//! Usage: `ordoplay_hive [config.ron]`
//!
//! Log output is controlled with `RUST_LOG`, e.g.
//! `RUST_LOG=ordoplay_behavior=debug ordoplay_hive hive.ron`.

mod config;
mod hive;

use config::DemoConfig;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() {
    let mut env_filter = EnvFilter::from_default_env();
    for directive in ["ordoplay_hive=info", "ordoplay_behavior=warn"] {
        match directive.parse() {
            Ok(directive) => env_filter = env_filter.add_directive(directive),
            Err(e) => eprintln!("Ignoring log directive {directive}: {e}"),
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting OrdoPlay hive v{}", env!("CARGO_PKG_VERSION"));

    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => match DemoConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Failed to load {:?}: {e}", path);
                std::process::exit(1);
            }
        },
        None => {
            tracing::info!("No config given, using defaults");
            DemoConfig::default()
        }
    };

    match hive::run(&config) {
        Ok(report) => {
            tracing::info!(
                ticks = report.ticks,
                deposits = report.ledger.deposits,
                nectar = report.ledger.nectar,
                honey = report.ledger.honey,
                capped = report.capped,
                wingbeats = report.wingbeats,
                "hive closed"
            );
        }
        Err(e) => {
            tracing::error!("Hive crashed: {e}");
            std::process::exit(1);
        }
    }
}
