// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! statroute - answer economic-data questions across LLM tiers.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod ask;
mod catalog;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use statroute_config::StatrouteConfig;
use statroute_core::Tier;

/// statroute - answer economic-data questions across LLM tiers.
#[derive(Parser, Debug)]
#[command(name = "statroute", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the default hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer one question, running any tools the model asks for.
    Ask {
        query: String,
        /// Skip classification and use this tier (premium, standard, or fast).
        #[arg(long)]
        tier: Option<Tier>,
        /// Do not offer the data tools to the model.
        #[arg(long)]
        no_tools: bool,
        /// Print the full response as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Answer one question per line from a file (`-` for stdin).
    Batch {
        input: PathBuf,
        #[arg(long)]
        tier: Option<Tier>,
        #[arg(long)]
        json: bool,
    },
    /// Show which tier a question would be routed to.
    Classify { query: String },
    /// Print the tool catalog as a provider would receive it.
    Tools {
        #[arg(long, value_enum, default_value_t = catalog::Format::Catalog)]
        format: catalog::Format,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => statroute_config::load_and_validate_path(path),
        None => statroute_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            statroute_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.agent.log_level);

    let code = match cli.command {
        Commands::Ask {
            query,
            tier,
            no_tools,
            json,
        } => ask::run_ask(&config, query, tier, !no_tools, json).await,
        Commands::Batch { input, tier, json } => ask::run_batch(&config, &input, tier, json).await,
        Commands::Classify { query } => {
            catalog::run_classify(&config, &query);
            0
        }
        Commands::Tools { format } => catalog::run_tools(&config, format),
    };
    std::process::exit(code);
}

/// Install the tracing subscriber. Logs go to stderr; stdout carries answers.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("statroute={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Shared startup failure path for subcommands.
fn startup_error(config: &StatrouteConfig, err: &dyn std::fmt::Display) -> i32 {
    tracing::error!(agent = %config.agent.name, error = %err, "startup failed");
    eprintln!("statroute: {err}");
    1
}
