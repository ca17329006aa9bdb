//! Published snapshot handle
//!
//! Readers grab the current snapshot without locking; maintenance (rebuild,
//! load, save) is serialized behind a mutex and publishes the result with a
//! single pointer swap.

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::corpus::CorpusSource;
use crate::record::ProjectRecord;
use crate::snapshot::Snapshot;
use crate::{GaugeError, Result};

/// How a warm start obtained its snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarmStart {
  /// Loaded the persisted artifact
  Loaded,
  /// Rebuilt from the corpus source
  Rebuilt,
  /// Nothing to index; the cold snapshot stays published
  Cold,
}

/// Summary of the published snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct StoreStatus {
  pub records: usize,
  pub index_ready: bool,
  pub vocabulary_size: usize,
  pub built_at: Option<DateTime<Utc>>,
  pub snapshot_path: Option<String>,
}

pub struct SnapshotStore {
  current: ArcSwap<Snapshot>,
  maintenance: Mutex<()>,
  path: Option<PathBuf>,
  max_features: usize,
}

impl SnapshotStore {
  /// A store publishing the cold snapshot; `path` enables persistence
  pub fn new(path: Option<PathBuf>, max_features: usize) -> Self {
    Self {
      current: ArcSwap::from_pointee(Snapshot::cold()),
      maintenance: Mutex::new(()),
      path,
      max_features,
    }
  }

  /// The snapshot queries should read; stays valid across later swaps
  pub fn current(&self) -> Arc<Snapshot> {
    self.current.load_full()
  }

  fn lock(&self) -> Result<MutexGuard<'_, ()>> {
    self.maintenance.lock().map_err(|_| GaugeError::internal("snapshot maintenance lock poisoned"))
  }

  fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
    let snapshot = Arc::new(snapshot);
    self.current.store(Arc::clone(&snapshot));
    snapshot
  }

  fn rebuild_locked(&self, records: Vec<ProjectRecord>) -> Result<Arc<Snapshot>> {
    let snapshot = Snapshot::build(records, self.max_features)?;

    // A failed save still publishes; the next start simply rebuilds again
    if let Some(path) = &self.path {
      if let Err(e) = snapshot.save(path) {
        herald::warn!("could not persist snapshot: {e}");
      }
    }

    herald::success!(
      "published snapshot with {} records ({} terms)",
      snapshot.len(),
      snapshot.index.vocabulary_size()
    );
    Ok(self.publish(snapshot))
  }

  /// Fit a new snapshot over `records`, persist it, then swap it in
  pub fn rebuild(&self, records: Vec<ProjectRecord>) -> Result<Arc<Snapshot>> {
    let _guard = self.lock()?;
    self.rebuild_locked(records)
  }

  /// Rebuild from whatever the corpus source currently provides
  pub fn rebuild_from(&self, source: &CorpusSource) -> Result<Arc<Snapshot>> {
    let _guard = self.lock()?;
    let records = source.load()?;
    self.rebuild_locked(records)
  }

  /// Load the persisted artifact, or rebuild from `source` if there is none
  pub fn warm_start(&self, source: &CorpusSource) -> Result<WarmStart> {
    let _guard = self.lock()?;

    if let Some(path) = &self.path {
      match Snapshot::load(path) {
        Ok(snapshot) => {
          herald::info!("loaded snapshot with {} records from {}", snapshot.len(), path.display());
          self.publish(snapshot);
          return Ok(WarmStart::Loaded);
        }
        Err(e) if e.is_rebuild_signal() => {
          herald::warn!("rebuilding snapshot: {e}");
        }
        Err(e) => return Err(e),
      }
    }

    let records = source.load()?;
    match self.rebuild_locked(records) {
      Ok(_) => Ok(WarmStart::Rebuilt),
      Err(GaugeError::EmptyCorpus) => {
        herald::warn!("corpus is empty, serving default estimates");
        Ok(WarmStart::Cold)
      }
      Err(e) => Err(e),
    }
  }

  pub fn status(&self) -> StoreStatus {
    let snapshot = self.current();
    StoreStatus {
      records: snapshot.len(),
      index_ready: snapshot.is_ready(),
      vocabulary_size: snapshot.index.vocabulary_size(),
      built_at: snapshot.built_at,
      snapshot_path: self.path.as_ref().map(|p| p.display().to_string()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::corpus::sample_corpus;
  use tempfile::TempDir;

  #[test]
  fn test_new_store_serves_cold_snapshot() {
    let store = SnapshotStore::new(None, 1000);
    let status = store.status();
    assert_eq!(status.records, 0);
    assert!(!status.index_ready);
    assert!(status.built_at.is_none());
  }

  #[test]
  fn test_rebuild_swaps_without_disturbing_readers() {
    let store = SnapshotStore::new(None, 1000);
    let before = store.current();

    store.rebuild(sample_corpus()).unwrap();

    // The old handle still sees the old snapshot
    assert!(before.is_empty());
    assert_eq!(store.current().len(), sample_corpus().len());
    assert!(store.current().is_ready());
  }

  #[test]
  fn test_rebuild_with_empty_corpus_keeps_current() {
    let store = SnapshotStore::new(None, 1000);
    store.rebuild(sample_corpus()).unwrap();

    assert!(matches!(store.rebuild(Vec::new()), Err(GaugeError::EmptyCorpus)));
    assert_eq!(store.current().len(), sample_corpus().len());
  }

  #[test]
  fn test_rebuild_persists_when_path_configured() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshot.json");
    let store = SnapshotStore::new(Some(path.clone()), 1000);

    store.rebuild(sample_corpus()).unwrap();

    assert!(path.exists());
    assert_eq!(Snapshot::load(&path).unwrap().len(), sample_corpus().len());
  }

  #[test]
  fn test_warm_start_rebuilds_then_loads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshot.json");
    let source = CorpusSource::sample();

    let first = SnapshotStore::new(Some(path.clone()), 1000);
    assert_eq!(first.warm_start(&source).unwrap(), WarmStart::Rebuilt);

    let second = SnapshotStore::new(Some(path), 1000);
    assert_eq!(second.warm_start(&source).unwrap(), WarmStart::Loaded);
    assert_eq!(second.current().records, first.current().records);
  }

  #[test]
  fn test_warm_start_replaces_corrupt_artifact() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshot.json");
    std::fs::write(&path, "garbage").unwrap();

    let store = SnapshotStore::new(Some(path.clone()), 1000);
    assert_eq!(store.warm_start(&CorpusSource::sample()).unwrap(), WarmStart::Rebuilt);
    assert!(Snapshot::load(&path).is_ok());
  }

  #[test]
  fn test_concurrent_readers_always_see_a_complete_snapshot() {
    let store = Arc::new(SnapshotStore::new(None, 1000));
    let corpus_len = sample_corpus().len();

    let readers: Vec<_> = (0..4)
      .map(|_| {
        let store = Arc::clone(&store);
        std::thread::spawn(move || {
          for _ in 0..200 {
            let snapshot = store.current();
            assert_eq!(snapshot.index.len(), snapshot.len());
            assert!(snapshot.is_empty() || snapshot.len() == corpus_len);
          }
        })
      })
      .collect();

    for _ in 0..5 {
      store.rebuild(sample_corpus()).unwrap();
    }
    for reader in readers {
      reader.join().unwrap();
    }
  }
}
