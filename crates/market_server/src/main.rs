//! Market data server
//!
//! Serves cached price history, rate curves and implied-volatility
//! surfaces, and forwards pricing requests to an external engine.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use market_server::config::{build_config, CliArgs as ConfigCliArgs, LogFormat};
use market_server::server::Server;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Market data server - cached curves, surfaces and price history
#[derive(Parser, Debug)]
#[command(name = "market_server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (TOML format)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Host address to bind to
    #[arg(long, env = "MARKET_SERVER_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "MARKET_SERVER_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "MARKET_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (json, pretty)
    #[arg(long, env = "MARKET_LOG_FORMAT")]
    log_format: Option<String>,

    /// CSV file of daily closes (Date,Ticker,Close)
    #[arg(long, value_name = "FILE", env = "MARKET_HISTORY_CSV")]
    history_csv: Option<PathBuf>,
}

impl From<Args> for ConfigCliArgs {
    fn from(args: Args) -> Self {
        ConfigCliArgs {
            config_file: args.config,
            host: args.host,
            port: args.port,
            log_level: args.log_level,
            log_format: args.log_format,
            history_csv: args.history_csv,
        }
    }
}

fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!("Prometheus metrics exporter started on {}", addr),
        Err(e) => tracing::warn!(
            "Failed to start Prometheus metrics exporter on {}: {} (continuing without metrics)",
            addr,
            e
        ),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let cli_args: ConfigCliArgs = args.into();
    let config = build_config(&cli_args).context("invalid configuration")?;

    init_tracing(config.log_level.as_filter_str(), config.log_format);

    tracing::info!("Market data server v{}", market_server::VERSION);
    tracing::info!(
        host = %config.host,
        port = %config.port,
        log_level = %config.log_level,
        log_format = %config.log_format,
        environment = %config.environment,
        api_key_required = %config.api_key_required,
        fred_configured = config.fred_api_key.is_some(),
        history_csv = ?config.history_csv,
        pricing_engine = ?config.pricing_engine_url,
        "Server configuration loaded"
    );

    if let Some(port) = config.metrics_port {
        init_metrics(SocketAddr::from(([0, 0, 0, 0], port)));
    }

    let server = Server::new(config);
    tracing::info!(address = %server.socket_addr(), "Starting server");

    server.run().await.context("server terminated with an error")?;

    Ok(())
}
