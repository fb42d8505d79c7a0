#![forbid(unsafe_code)]

//! `overlay-relay` — overlay event relay and AI prompt feed server binary.
//!
//! Bootstraps configuration, the in-process keyed store with its sweep
//! task, the event bus, the generation pipeline, and the HTTP/SSE
//! transport.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use overlay_relay::bus::EventBus;
use overlay_relay::config::GlobalConfig;
use overlay_relay::generator::provider::HttpProvider;
use overlay_relay::generator::TaskGenerator;
use overlay_relay::http::{self, AppState};
use overlay_relay::ratelimit::RateLimiter;
use overlay_relay::recency::RecencyWindow;
use overlay_relay::store::{spawn_sweep_task, MemoryStore, Store};
use overlay_relay::token::TokenCodec;
use overlay_relay::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "overlay-relay", about = "Overlay event relay server", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: PathBuf,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("overlay-relay server bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = GlobalConfig::load_from_path(&args.config)?;
    config.load_credentials().await?;
    let config = Arc::new(config);
    info!("configuration loaded");

    // ── Shared store and sweep task ─────────────────────
    let memory = Arc::new(MemoryStore::new());
    let store: Arc<dyn Store> = Arc::clone(&memory) as Arc<dyn Store>;

    let ct = CancellationToken::new();
    let sweep_handle = spawn_sweep_task(Arc::clone(&memory), config.sweep_interval(), ct.clone());
    info!("store sweep task started");

    // ── Core components ─────────────────────────────────
    let codec = Arc::new(TokenCodec::new(&config.signing_secret)?);
    let bus = Arc::new(EventBus::new(
        Arc::clone(&store),
        config.bus.log_keep,
        config.log_ttl(),
        config.bus.replay,
    ));
    let provider = Arc::new(HttpProvider::new(
        &config.provider,
        config.provider_api_key.clone(),
    )?);
    let recency = RecencyWindow::new(Arc::clone(&store), config.recency.keep, config.recency_ttl());
    let limiter = RateLimiter::new(Arc::clone(&store), config.rate.per_minute);
    let generator = Arc::new(TaskGenerator::new(
        Arc::clone(&codec),
        provider,
        recency,
        limiter,
        Arc::clone(&bus),
        config.provider.attempts,
    ));

    let state = Arc::new(AppState {
        config: Arc::clone(&config),
        codec,
        store,
        bus,
        generator,
    });

    // ── Serve until shutdown ────────────────────────────
    let http_ct = ct.clone();
    let http_state = Arc::clone(&state);
    let http_handle = tokio::spawn(async move {
        if let Err(err) = http::serve(http_state, http_ct).await {
            error!(%err, "http transport failed");
        }
    });

    info!("overlay-relay ready");

    shutdown_signal().await;
    info!("shutdown signal received");
    ct.cancel();

    let _ = tokio::join!(http_handle, sweep_handle);
    info!("overlay-relay shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
