//! REST server startup and configuration

use anyhow::{Context, Result};
use axum::serve;
use gauge::{CorpusSource, Estimator, SnapshotStore, WarmStart};
use herald::journal::Journal;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::analysis_client::HttpAnalysisProvider;
use crate::config::ServerConfig;
use crate::refresh;
use crate::server::routing::create_router;
use crate::server::state::AppState;

const COMPONENT: &str = "tender-server";

/// Open the journal, warm the snapshot store and wire up the estimator
pub async fn build_state(config: &ServerConfig) -> Result<AppState> {
  let journal = Journal::open(config.journal_path())
    .with_context(|| format!("Failed to open journal at {}", config.journal_path().display()))?;

  let store =
    Arc::new(SnapshotStore::new(Some(config.snapshot_path()), config.engine.max_features));
  let corpus = CorpusSource::raw(config.corpus_path());

  let warm = {
    let store = Arc::clone(&store);
    let corpus = corpus.clone();
    tokio::task::spawn_blocking(move || store.warm_start(&corpus)).await??
  };
  let message = match warm {
    WarmStart::Loaded => format!("Loaded index snapshot ({} records)", store.current().len()),
    WarmStart::Rebuilt => format!("Built index from corpus ({} records)", store.current().len()),
    WarmStart::Cold => "No corpus available; serving default estimates".to_string(),
  };
  journal.info(&message, COMPONENT).await;

  let estimator = Arc::new(Estimator::new(config.engine.clone())?);
  let mut state = AppState::new(store, estimator, journal.clone(), corpus);

  if let Some(analysis) = &config.analysis {
    let provider = HttpAnalysisProvider::from_config(analysis)?;
    journal.info(&format!("Enriching estimates via {}", provider.url()), COMPONENT).await;
    state = state.with_analysis(Arc::new(provider));
  }

  Ok(state)
}

/// Start the REST server and run until interrupted
pub async fn start_server(config: ServerConfig) -> Result<()> {
  let state = build_state(&config).await?;
  let journal = state.journal.clone();

  let refresher = config.refresh_interval().map(|every| {
    refresh::spawn_periodic(
      Arc::clone(&state.store),
      state.corpus.clone(),
      journal.clone(),
      every,
    )
  });

  let app = create_router(state).layer(
    ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()),
  );

  let listener = TcpListener::bind(config.bind)
    .await
    .with_context(|| format!("Failed to bind {}", config.bind))?;
  journal.info(&format!("Server listening on {}", config.bind), COMPONENT).await;
  tracing::info!(addr = %config.bind, "tender REST server ready");

  let result = serve(listener, app).with_graceful_shutdown(shutdown_signal()).await;

  if let Some(handle) = refresher {
    handle.abort();
  }

  match result {
    Ok(()) => {
      journal.info("Server shutdown gracefully", COMPONENT).await;
      Ok(())
    }
    Err(e) => {
      journal.error(&format!("Server error: {e}"), COMPONENT).await;
      Err(anyhow::anyhow!("Server error: {e}"))
    }
  }
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    herald::error!("failed to listen for shutdown signal: {e}");
    std::future::pending::<()>().await;
  }
}
