/*
blogsum - single-binary main.rs
Loads configuration, opens both stores, builds the summarize pipeline and serves it over HTTP.
*/

use anyhow::Result;
use clap::Parser;
use common::{init_db_pool, Config};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use blogsum::persistence::PersistenceCoordinator;
use blogsum::pipeline::{Analyzer, Pipeline};
use blogsum::server::{launch_rocket, AppState};
use blogsum::storage::{
    ensure_archive_schema, ensure_summary_schema, SqliteDocumentStore, SqliteSummaryStore,
    DEFAULT_COLLECTION,
};

#[derive(Parser, Debug)]
#[command(name = "blogsum", about = "Blog summarizer and dictionary translator")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let default_path = PathBuf::from("config.default.toml");
    let override_path = if let Some(p) = args.config {
        if !p.exists() {
            error!(path = ?p, "specified config file not found");
            return Err(anyhow::anyhow!("Config file not found: {}", p.display()));
        }
        Some(p)
    } else {
        let p = PathBuf::from("config.toml");
        if p.exists() { Some(p) } else { None }
    };

    let config = match Config::load_with_defaults(
        if default_path.exists() { Some(&default_path) } else { None },
        override_path.as_deref(),
    )
    .await
    {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(%e, "failed to load configuration");
            return Err(e);
        }
    };
    info!(default_file = ?default_path, override_file = ?override_path, "configuration loaded");

    // Structured store (system of record)
    let summary_pool = match init_db_pool(&config.database.path).await {
        Ok(p) => p,
        Err(e) => {
            error!(%e, db_path = %config.database.path, "failed to initialize summary database pool");
            return Err(e);
        }
    };
    ensure_summary_schema(&summary_pool).await?;

    // Document store (full-text archive), pooled and shared like the summary store
    let archive_path = config.archive_path().to_string();
    let archive_pool = match init_db_pool(&archive_path).await {
        Ok(p) => p,
        Err(e) => {
            error!(%e, db_path = %archive_path, "failed to initialize archive database pool");
            return Err(e);
        }
    };
    ensure_archive_schema(&archive_pool).await?;
    let collection = config
        .archive
        .as_ref()
        .and_then(|a| a.collection.clone())
        .unwrap_or_else(|| DEFAULT_COLLECTION.to_string());
    let documents = SqliteDocumentStore::with_collection(archive_pool, collection);
    info!(
        summaries = %config.database.path,
        archive = %archive_path,
        collection = documents.collection(),
        "stores ready"
    );

    let persistence = PersistenceCoordinator::new(
        Arc::new(SqliteSummaryStore::new(summary_pool)),
        Arc::new(documents),
    );
    let analyzer = Analyzer::from_config(&config).await?;
    let pipeline = Pipeline::new(analyzer, persistence);

    // In-flight requests are cancelled once shutdown starts.
    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, cancelling in-flight requests");
            signal_token.cancel();
        }
    });

    let state = AppState::new(pipeline, shutdown.clone());
    if let Err(e) = launch_rocket(state, config.server.as_ref()).await {
        error!(%e, "Rocket server failed");
    }

    shutdown.cancel();
    info!("Shutdown complete");
    Ok(())
}
