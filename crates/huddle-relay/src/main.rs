//! huddle-relay: WebSocket coordinator for multi-party call rooms.
//!
//! Accepts WebSocket connections, tracks room membership, relays signaling
//! payloads between peers and fans out room chat. The relay never inspects
//! signaling payloads; media flows peer-to-peer.

use std::path::PathBuf;

use clap::Parser;
use huddle_common::HuddleError;
use huddle_relay::Server;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "huddle-relay", version, about = "Room coordination and signaling relay")]
struct Args {
    /// Port to listen on (overrides the config file).
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind (overrides the config file).
    #[arg(long)]
    bind: Option<String>,

    /// Config file path. Defaults to the platform config directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter override, e.g. "debug" or "huddle_relay=trace".
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), HuddleError> {
    let args = Args::parse();

    let mut config = match huddle_config::load_config(args.config.as_deref()) {
        Ok(config) => config,
        // An explicit path that cannot be loaded is fatal; a broken default
        // location is not.
        Err(e) if args.config.is_some() => return Err(e.into()),
        Err(e) => {
            eprintln!("huddle-relay: config load failed, using defaults: {e}");
            huddle_config::HuddleConfig::default()
        }
    };

    let filter = match args.log_level.as_deref() {
        Some(directive) => EnvFilter::try_new(directive)
            .map_err(|e| HuddleError::Other(format!("invalid --log-level: {e}")))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!("huddle_relay={}", config.logging.level.as_str()).into()
        }),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Err(e) = huddle_config::validation::validate(&config) {
        tracing::warn!("{e}");
    }

    tracing::info!("huddle-relay v{} starting", env!("CARGO_PKG_VERSION"));

    let server = Server::bind(&config).await?;
    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await
}
