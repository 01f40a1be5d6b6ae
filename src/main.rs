use clap::Parser;
use tracing::{error, info, Level};

use ipinfo::config::Config;
use ipinfo::logging;
use ipinfo::metrics;
use ipinfo::server::ApiServer;

#[derive(Parser)]
#[command(name = "ipinfo")]
#[command(about = "Reports class, subnet, gateway and privacy of IP addresses over HTTP")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Address to listen on, overrides server.bind
    #[arg(short, long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: Level,

    /// Enable JSON logging
    #[arg(long)]
    json_logs: bool,

    /// Validate configuration and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(cli.log_level, cli.json_logs)?;

    info!("Starting ipinfo");
    info!("Log level: {}", cli.log_level);

    let mut config = match &cli.config {
        Some(path) => {
            info!("Configuration file: {}", path);
            match Config::from_file(path).await {
                Ok(config) => {
                    info!("Configuration loaded successfully");
                    config
                }
                Err(e) => {
                    error!("Failed to load configuration: {}", e);
                    return Err(e);
                }
            }
        }
        None => Config::default(),
    };

    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        return Err(e);
    }

    if cli.check {
        info!("Configuration check passed");
        return Ok(());
    }

    let metrics_addr = metrics::init(&config.metrics).await?;

    let server = match ApiServer::bind(&config.server) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to bind {}: {}", config.server.bind, e);
            return Err(e);
        }
    };

    logging::log_startup_info(env!("CARGO_PKG_VERSION"), server.local_addr(), metrics_addr);

    if let Err(e) = server.run(shutdown_signal()).await {
        error!("API server failed: {}", e);
        return Err(e);
    }

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => logging::log_shutdown_signal("SIGINT"),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
