//! demand-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), layers
//! `DEMAND_*` environment variables on top, and serves the demand API under
//! `/api`.

mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use axum::Router;
use clap::Parser;
use demand_api::{ApiState, LoadRegistry, api_router};
use demand_ingest::{CachedSource, Loader, SourceFetcher};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::{ENV_PREFIX, ServerConfig};

#[derive(Parser)]
#[command(author, version, about = "Biometric demand pipeline server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let server_cfg = ServerConfig::load(&cli.config, ENV_PREFIX)
    .with_context(|| format!("failed to read config from {:?}", cli.config))?;

  // Build the pipeline.
  let fetcher =
    SourceFetcher::new(&server_cfg.ingest).context("failed to build fetcher")?;
  let source = CachedSource::new(fetcher, server_cfg.ingest.cache_ttl());
  let loader = Loader::new(source, server_cfg.pipeline.clone())
    .context("invalid [pipeline] configuration")?;
  let registry = LoadRegistry::with_capacity(server_cfg.max_loads);
  let state = ApiState::with_registry(loader, registry);

  // A broken default source is logged, not fatal: callers can still POST
  // their own load.
  if let Some(request) = &server_cfg.default_sources {
    match state.loader.load(request).await {
      Ok(dataset) => {
        let (id, _) = state.registry.insert(dataset).await;
        tracing::info!(%id, "default sources registered");
      }
      Err(e) => tracing::error!(error = %e, "failed to load default sources"),
    }
  }

  let app = Router::new()
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http());
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  Ok(())
}

async fn shutdown_signal() {
  if tokio::signal::ctrl_c().await.is_ok() {
    tracing::info!("shutting down");
  }
}
