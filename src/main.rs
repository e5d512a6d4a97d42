//! Main entry point for the table matcher service
//!
//! Loads configuration, initializes logging, opens the roster and serves the
//! HTTP API until a shutdown signal arrives.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use table_matcher::api::ApiServer;
use table_matcher::config::AppConfig;
use table_matcher::service::{HealthCheck, HealthStatus, TableMatcherService};
use tokio::signal;
use tracing::{error, info, warn};

/// Table Matcher - round-robin table scheduling with Elo ratings
#[derive(Parser)]
#[command(
    name = "table-matcher",
    version,
    about = "Pairs waiting players onto a fixed number of tables and keeps Elo ratings",
    long_about = "Table Matcher runs a single play session: active players from a CSV roster \
                 wait in a rating-ordered queue, the front two are seated whenever a table is \
                 free, and every reported result updates both players' Elo ratings."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Perform health check and exit
    #[arg(long, help = "Check that the roster is readable and exit with status code")]
    health_check: bool,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// HTTP port override
    #[arg(short, long, value_name = "PORT", help = "Override HTTP server port")]
    port: Option<u16>,

    /// Roster path override
    #[arg(short, long, value_name = "FILE", help = "Override roster CSV path")]
    roster: Option<PathBuf>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(
        long,
        help = "Validate configuration and exit without starting service"
    )]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Perform health check and return appropriate exit code
async fn perform_health_check(config: &AppConfig) -> Result<()> {
    info!("Performing health check...");

    let service = TableMatcherService::from_config(config)?;
    let health = HealthCheck::check(&service).await;

    println!("Health Check: {}", health.status);
    println!("  Roster size: {}", health.stats.roster_size);
    if let Some(message) = &health.message {
        println!("  Error: {}", message);
    }

    if health.status == HealthStatus::Healthy {
        std::process::exit(0);
    } else {
        std::process::exit(1);
    }
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C) signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

/// Display startup banner with service information
fn display_startup_banner(config: &AppConfig) {
    info!("Table Matcher v{}", table_matcher::VERSION);
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!("   HTTP: {}", config.http_addr());
    info!("   Roster: {}", config.roster.csv_path.display());
    info!(
        "   Rating: start {}, K {}, shutout x{}",
        config.rating.starting_rating, config.rating.k_factor, config.rating.shutout_multiplier
    );
    info!(
        "   Default tables: {}",
        config.session.default_table_count
    );
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(port) = args.port {
        config.service.http_port = port;
    }

    if let Some(roster) = &args.roster {
        config.roster.csv_path = roster.clone();
    }

    table_matcher::config::validate_config(&config)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if args.health_check {
        return perform_health_check(&config).await;
    }

    if args.dry_run {
        info!("Configuration validation successful");
        display_startup_banner(&config);
        info!("Dry run completed - exiting without starting service");
        return Ok(());
    }

    display_startup_banner(&config);

    let service = match TableMatcherService::from_config(&config) {
        Ok(service) => Arc::new(service),
        Err(e) => {
            error!("Failed to initialize service: {}", e);
            std::process::exit(1);
        }
    };

    let server = Arc::new(ApiServer::new(config.http_addr(), service));
    let mut server_task = {
        let server = server.clone();
        tokio::spawn(async move { server.start().await })
    };

    info!("Table Matcher is running");
    info!("Press Ctrl+C to shutdown gracefully...");

    tokio::select! {
        _ = wait_for_shutdown_signal() => {
            info!("Shutdown signal received, beginning graceful shutdown...");
        }
        result = &mut server_task => {
            match result {
                Ok(Ok(())) => warn!("HTTP API exited unexpectedly"),
                Ok(Err(e)) => error!("HTTP API failed: {}", e),
                Err(e) => error!("HTTP API task panicked: {}", e),
            }
            std::process::exit(1);
        }
    }

    server.stop();
    match tokio::time::timeout(config.shutdown_timeout(), server_task).await {
        Ok(_) => info!("Graceful shutdown completed successfully"),
        Err(_) => warn!("Shutdown timeout exceeded, forcing exit"),
    }

    info!("Table Matcher stopped");
    Ok(())
}
