// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SignalTrap, a honeypot connection-log dashboard
//
//  serve:  /api/stats + /health + static page, re-reads the log per request
//  watch:  polls /api/stats and renders the dashboard page
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use clap::{Parser, Subcommand};
use signaltrap_api::{ApiState, start_api};
use signaltrap_core::config::SignalTrapConfig;
use signaltrap_core::geo::{GeoCache, GeoLookup, NoGeo};
use signaltrap_dashboard::{HtmlPageSink, Poller};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "signaltrap", version, about = "SignalTrap, a honeypot connection-log dashboard")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "signaltrap.yaml")]
    config: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the stats API and the static dashboard directory
    Serve {
        /// Override `server.addr`
        #[arg(long)]
        addr: Option<String>,
        /// Override `log.path`
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Poll the stats API and keep the dashboard page rendered
    Watch {
        /// Override `poll.url`
        #[arg(long)]
        url: Option<String>,
        /// Override `poll.output`
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Tracing ──
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }

    info!(version = env!("CARGO_PKG_VERSION"), "SignalTrap starting");

    // ── Config ──
    // A missing file is not an error: defaults plus SIGNALTRAP_* env apply.
    if cli.config.exists() {
        info!(path = %cli.config.display(), "Loading config file");
    } else {
        info!(path = %cli.config.display(), "No config file found, using defaults");
    }
    let mut config = SignalTrapConfig::load(&cli.config)?;

    match cli.command {
        Command::Serve { addr, log } => {
            if let Some(addr) = addr {
                config.server.addr = addr;
            }
            if let Some(log) = log {
                config.log.path = log;
            }
            serve(config).await
        }
        Command::Watch { url, output } => {
            if let Some(url) = url {
                config.poll.url = url;
            }
            if let Some(output) = output {
                config.poll.output = output;
            }
            watch(config).await
        }
    }
}

async fn serve(config: SignalTrapConfig) -> anyhow::Result<()> {
    let geo: Arc<dyn GeoLookup> = match &config.geo.cache_file {
        Some(path) => {
            let cache = GeoCache::load_or_empty(path);
            info!(entries = cache.len(), path = %path.display(), "Geo cache loaded");
            Arc::new(cache)
        }
        None => Arc::new(NoGeo),
    };

    let state = Arc::new(ApiState::from_config(&config, geo));
    start_api(&config.server.addr, state, shutdown_signal()).await
}

async fn watch(config: SignalTrapConfig) -> anyhow::Result<()> {
    let sink = HtmlPageSink::new(&config.poll.output, config.poll.interval());
    info!(output = %sink.path().display(), "Rendering dashboard page");

    let poller = Poller::new(&config.poll, sink)?;
    poller.run(shutdown_signal()).await;
    Ok(())
}

/// Resolves on Ctrl-C (and SIGTERM on unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping...");
}
