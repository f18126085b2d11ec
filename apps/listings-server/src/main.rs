mod signals;

use anyhow::Result;
use clap::{Parser, Subcommand};
use listings_service::{Config, ListingsServiceModule};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Listings Server - states, cities, places, amenities, users and reviews over REST
#[derive(Parser)]
#[command(name = "listings-server")]
#[command(about = "Listings Server - states, cities, places, amenities, users and reviews over REST")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration, open storage and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(ref path) = cli.config {
        if !Path::new(path).is_file() {
            anyhow::bail!("config file does not exist: {}", path.to_string_lossy());
        }
    }

    // Layered config: defaults -> YAML (if provided) -> env (HBNB_*) -> CLI overrides
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.api_port = port;
    }

    init_logging(cli.verbose);

    if cli.print_config {
        println!("Effective configuration:\n{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    tracing::info!("Listings Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config).await,
    }
}

/// `RUST_LOG` wins; otherwise verbosity picks the level.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 | 1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

async fn run_server(config: Config) -> Result<()> {
    let module = ListingsServiceModule::init(config).await?;
    module
        .serve(async {
            if let Err(e) = signals::wait_for_shutdown().await {
                tracing::error!(error = %e, "Signal handling failed, shutting down");
            }
        })
        .await
}

async fn check_config(config: Config) -> Result<()> {
    tracing::info!("Checking configuration...");
    ListingsServiceModule::init(config.clone()).await?;
    println!("Configuration is valid");
    println!("{}", serde_yaml::to_string(&config)?);
    Ok(())
}
