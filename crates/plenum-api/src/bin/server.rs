//! plenum API server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), seeds an
//! in-memory record store with the standard value tables, rebuilds the
//! workflow cache, and serves the JSON API over HTTP.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use plenum_api::ServerConfig;
use plenum_store_mem::{MemStore, seed};
use plenum_workflow::{SystemClock, Workflow};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(author, version, about = "plenum workflow server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("PLENUM"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Seed the in-memory store with the value tables the engine needs.
  let store = MemStore::new();
  store
    .add_decision_values(seed::decision_values())
    .context("seeding decision values")?;
  let contrib_type = Uuid::new_v4();
  let (criteria, scores) = seed::criteria_set(contrib_type, 4);
  store.add_criteria(criteria).context("seeding criteria")?;
  store.add_score_values(scores).context("seeding score values")?;

  let engine = Arc::new(
    Workflow::new(
      Arc::new(store),
      server_cfg.engine_config(),
      Arc::new(SystemClock),
    )
    .await
    .context("loading reference data")?,
  );

  let rebuilt = engine.init_all().await.context("rebuilding workflow cache")?;
  tracing::info!(count = rebuilt, "workflow cache ready");

  let app = plenum_api::api_router(engine)
    .layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
