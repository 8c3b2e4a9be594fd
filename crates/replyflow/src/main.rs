// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Replyflow - automated review reply pipeline.
//!
//! Binary entry point: loads configuration, wires adapters, and dispatches
//! the run / retry / status subcommands.

mod publisher;
mod run;
mod status;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Replyflow - automated review reply pipeline.
#[derive(Parser, Debug)]
#[command(name = "replyflow", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute one automation run for a business.
    Run {
        /// Business identifier to process.
        #[arg(long)]
        business_id: String,
        /// Acting user recorded on published replies.
        #[arg(long)]
        user_id: String,
        /// Scheduled time-slot identifier, when invoked by the scheduler.
        #[arg(long)]
        slot: Option<String>,
    },
    /// Re-attempt failed generations and stalled publications.
    Retry {
        /// Business identifier to process.
        #[arg(long)]
        business_id: String,
        /// Acting user recorded on published replies.
        #[arg(long)]
        user_id: String,
    },
    /// Show adapter health and recent automation activity.
    Status {
        /// Limit output to one business.
        #[arg(long)]
        business_id: Option<String>,
    },
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("replyflow={log_level}")));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match replyflow_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            for error in &errors {
                eprintln!("replyflow: config error: {error}");
            }
            std::process::exit(1);
        }
    };
    init_tracing(&config.service.log_level);

    let outcome = match cli.command {
        Commands::Run {
            business_id,
            user_id,
            slot,
        } => run::run_command(&config, business_id, user_id, slot).await,
        Commands::Retry {
            business_id,
            user_id,
        } => run::retry_command(&config, business_id, user_id).await,
        Commands::Status { business_id } => status::status_command(&config, business_id).await,
    };

    if let Err(e) = outcome {
        eprintln!("replyflow: {e}");
        std::process::exit(1);
    }
}
