//! Newsdesk Control - status dashboard for the content automation backend

use anyhow::Result;
use clap::{Parser, Subcommand};
use newsdesk_common::DashboardConfig;
use newsdeskctl::errors::{EXIT_CONFIG_ERROR, EXIT_GENERAL_ERROR, EXIT_SUCCESS};
use newsdeskctl::{dashboard, logging, status_command};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "newsdeskctl")]
#[command(about = "Newsdesk - status dashboard for the content automation backend", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (default: $NEWSDESK_CONFIG or $XDG_CONFIG_HOME/newsdesk/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overrides [api] base_url
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request timeout in milliseconds, overrides [http] timeout_ms
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh every endpoint once and print the result
    Status {
        /// Print the page model as JSON
        #[arg(long)]
        json: bool,
    },

    /// Live full-screen dashboard
    Watch,

    /// Show the effective configuration
    Config,
}

fn load_config(cli: &Cli) -> Result<DashboardConfig, newsdesk_common::ConfigError> {
    let mut config = DashboardConfig::load(cli.config.as_deref())?;
    if let Some(base_url) = &cli.base_url {
        config.api.base_url = base_url.clone();
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.http.timeout_ms = timeout_ms;
    }
    Ok(config)
}

async fn run(cli: Cli, config: DashboardConfig) -> Result<i32> {
    match cli.command {
        Commands::Status { json } => {
            logging::init_stderr(&config.log.level);
            status_command::execute_status_command(&config, json).await
        }
        Commands::Watch => {
            if let Some(path) = logging::init_file(&config.log.level)? {
                info!("newsdeskctl v{} watching {}", env!("CARGO_PKG_VERSION"), config.api.api_root());
                eprintln!("Logging to {}", path.display());
            }
            dashboard::run(&config).await?;
            Ok(EXIT_SUCCESS)
        }
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(EXIT_SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(EXIT_CONFIG_ERROR);
        }
    };

    let code = match run(cli, config).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            EXIT_GENERAL_ERROR
        }
    };
    std::process::exit(code);
}
