//! Trust aggregation engine CLI
//!
//! Resolves identity cohorts, fans out to signal providers, fuses the
//! results with Subjective Logic, and reports a risk-adjusted trust score
//! for an agent, skill, or interaction.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;

use trust_aggregator::cli::commands;
use trust_aggregator::config::Config;

#[derive(Parser)]
#[command(name = "trust-cli")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a subject and print its trust result
    Evaluate {
        /// Subject type: agent, skill, or interaction
        subject_type: String,

        /// Ecosystem namespace, e.g. github, erc8004, clawhub
        namespace: String,

        /// In-namespace id, e.g. "octocat/hello-world" or "42"
        id: String,

        /// Intended action, escalates the risk bucket when transact/delegate
        #[arg(long)]
        action: Option<String>,
    },

    /// Check provider health
    Health,

    /// Invalidate a cached result for a subject key
    Invalidate {
        /// Ecosystem namespace
        namespace: String,
        /// In-namespace id
        id: String,
    },

    /// Register a manually-verified identity link
    Link {
        namespace_a: String,
        id_a: String,
        namespace_b: String,
        id_b: String,
        /// wallet-signed, manual, text-challenge, or registry-declared
        #[arg(long, default_value = "manual")]
        method: String,
    },

    /// Construct the pipeline and report readiness, without serving traffic
    ServeStub,

    /// Show current configuration (secrets masked)
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("trust_aggregator=info".parse().unwrap()),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Evaluate {
            subject_type,
            namespace,
            id,
            action,
        } => {
            commands::evaluate(&config, &subject_type, &namespace, &id, action.as_deref()).await
        }
        Commands::Health => commands::health(&config).await,
        Commands::Invalidate { namespace, id } => commands::invalidate(&config, &namespace, &id).await,
        Commands::Link {
            namespace_a,
            id_a,
            namespace_b,
            id_b,
            method,
        } => commands::link(&config, &namespace_a, &id_a, &namespace_b, &id_b, &method).await,
        Commands::ServeStub => commands::serve_stub(&config).await,
        Commands::Config => commands::show_config(&config),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
