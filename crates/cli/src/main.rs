//! Folio CLI: the main entry point.
//!
//! Commands:
//! - `init`    Write a default config file
//! - `serve`   Start the HTTP gateway and health monitor
//! - `ask`     Answer a single question through the full pipeline
//! - `health`  Probe the model backend once
//! - `seed`    Create and fill the SQLite profile database
//! - `status`  Show configuration and profile store contents

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "folio",
    about = "Folio: retrieval-augmented chat backend for a personal portfolio",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file to use instead of ~/.folio/config.toml
    #[arg(short, long, global = true, env = "FOLIO_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Start the HTTP gateway
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,

        /// Override the bind address
        #[arg(long)]
        host: Option<String>,
    },

    /// Ask one question and print the answer
    Ask {
        /// The question (remaining arguments are joined with spaces)
        #[arg(required = true, trailing_var_arg = true)]
        question: Vec<String>,

        /// Print the assembled prompt and its budget report to stderr
        #[arg(long)]
        show_prompt: bool,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Probe the model backend once
    Health,

    /// Create the SQLite profile database and load profile records into it
    Seed {
        /// JSON file with profile records (defaults to the built-in demo profile)
        #[arg(long)]
        from: Option<PathBuf>,
    },

    /// Show configuration and store status
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Init { force } => commands::init::run(config_path, force).await?,
        Commands::Serve { port, host } => commands::serve::run(config_path, port, host).await?,
        Commands::Ask {
            question,
            show_prompt,
            json,
        } => commands::ask::run(config_path, &question.join(" "), show_prompt, json).await?,
        Commands::Health => commands::health::run(config_path).await?,
        Commands::Seed { from } => commands::seed::run(config_path, from.as_deref()).await?,
        Commands::Status => commands::status::run(config_path).await?,
    }

    Ok(())
}
