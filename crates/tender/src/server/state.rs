//! Shared state handed to every handler

use gauge::{AnalysisProvider, CorpusSource, Estimator, SnapshotStore};
use herald::journal::Journal;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  /// Published index snapshot
  pub store: Arc<SnapshotStore>,
  pub estimator: Arc<Estimator>,
  /// Enriches estimates when configured
  pub analysis: Option<Arc<dyn AnalysisProvider>>,
  pub journal: Journal,
  /// Where rebuilds read their records from
  pub corpus: CorpusSource,
}

impl AppState {
  pub fn new(
    store: Arc<SnapshotStore>,
    estimator: Arc<Estimator>,
    journal: Journal,
    corpus: CorpusSource,
  ) -> Self {
    Self { store, estimator, analysis: None, journal, corpus }
  }

  pub fn with_analysis(mut self, provider: Arc<dyn AnalysisProvider>) -> Self {
    self.analysis = Some(provider);
    self
  }
}
