use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gauge::ingest;
use gauge::Snapshot;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use tender::config::ServerConfig;
use tender::server::startup::start_server;

#[derive(Parser)]
#[command(name = "tender")]
#[command(about = "Tender - similarity-weighted project estimates over REST")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), ", courtesy of Kernelle Software"))]
struct Cli {
  /// Path to a YAML config file (defaults to ./tender.yaml when present)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Enable verbose logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Start the REST server
  Serve {
    /// Server bind address
    #[arg(long)]
    bind: Option<SocketAddr>,
    /// Raw corpus (JSON Lines) used for index rebuilds
    #[arg(long)]
    corpus: Option<PathBuf>,
    /// Snapshot artifact to load and persist
    #[arg(long)]
    snapshot: Option<PathBuf>,
    /// Disable the periodic background rebuild
    #[arg(long)]
    no_refresh: bool,
  },
  /// Build a snapshot artifact from a raw corpus file
  Index {
    /// Raw corpus (JSON Lines)
    corpus: PathBuf,
    /// Where to write the snapshot (defaults to the configured path)
    #[arg(long)]
    snapshot: Option<PathBuf>,
  },
}

fn init_tracing(verbose: bool) {
  let filter = if verbose {
    EnvFilter::new("tender=debug,tower_http=debug,info")
  } else {
    EnvFilter::new("tender=info,tower_http=info,warn")
  };
  tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

  if !verbose {
    herald::set_threshold(herald::Level::Info);
  }
}

fn build_index(config: &ServerConfig, corpus: &Path, snapshot: &Path) -> Result<()> {
  if !corpus.exists() {
    bail!("Corpus file not found: {}", corpus.display());
  }

  let batch = ingest::read_raw_records(corpus)?;
  let report = ingest::process(batch.records)?;
  herald::info!(
    "Ingested {} records from {} companies ({} malformed lines, {} unusable prices, {} duplicates)",
    report.records.len(),
    report.companies,
    batch.skipped,
    report.skipped_prices,
    report.duplicates_removed
  );

  let built = Snapshot::build(report.records, config.engine.max_features)
    .with_context(|| format!("Failed to index {}", corpus.display()))?;
  built
    .save(snapshot)
    .with_context(|| format!("Failed to write snapshot to {}", snapshot.display()))?;

  herald::success!(
    "Wrote snapshot with {} records ({} terms) to {}",
    built.len(),
    built.index.vocabulary_size(),
    snapshot.display()
  );
  Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let mut config = ServerConfig::load(cli.config.as_deref())?;

  match cli.command {
    Command::Serve { bind, corpus, snapshot, no_refresh } => {
      if let Some(bind) = bind {
        config.bind = bind;
      }
      if corpus.is_some() {
        config.corpus_path = corpus;
      }
      if snapshot.is_some() {
        config.snapshot_path = snapshot;
      }
      if no_refresh {
        config.refresh_interval_hours = 0;
      }

      herald::announce(&format!("Tender v{}", env!("CARGO_PKG_VERSION")));
      herald::info!("Binding to address: {}", config.bind);
      start_server(config).await
    }
    Command::Index { corpus, snapshot } => {
      let snapshot = snapshot.unwrap_or_else(|| config.snapshot_path());
      build_index(&config, &corpus, &snapshot)
    }
  }
}
