//! Out-of-band index rebuilds
//!
//! Rebuilds run on the blocking pool so fitting a large corpus never stalls
//! request handling; queries keep reading the previous snapshot until the new
//! one is swapped in.

use gauge::{CorpusSource, SnapshotStore};
use herald::journal::Journal;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

const COMPONENT: &str = "index-refresh";

/// Rebuild the store from `source` once, recording the outcome
///
/// Returns the number of records in the new snapshot, or `None` on failure.
pub async fn rebuild(
  store: Arc<SnapshotStore>,
  source: CorpusSource,
  journal: &Journal,
) -> Option<usize> {
  journal.info("Index rebuild started", COMPONENT).await;

  match tokio::task::spawn_blocking(move || store.rebuild_from(&source)).await {
    Ok(Ok(snapshot)) => {
      let message = format!("Index rebuilt with {} records", snapshot.len());
      journal.success(&message, COMPONENT).await;
      Some(snapshot.len())
    }
    Ok(Err(e)) => {
      journal.error(&format!("Index rebuild failed: {e}"), COMPONENT).await;
      None
    }
    Err(e) => {
      journal.error(&format!("Index rebuild task aborted: {e}"), COMPONENT).await;
      None
    }
  }
}

/// Rebuild every `every`, starting one interval from now
pub fn spawn_periodic(
  store: Arc<SnapshotStore>,
  source: CorpusSource,
  journal: Journal,
  every: Duration,
) -> JoinHandle<()> {
  tokio::spawn(async move {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // The first tick completes immediately; startup already built the index
    ticker.tick().await;

    loop {
      ticker.tick().await;
      rebuild(Arc::clone(&store), source.clone(), &journal).await;
    }
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use herald::Level;
  use tempfile::TempDir;

  fn fixture() -> (TempDir, Arc<SnapshotStore>, Journal) {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(SnapshotStore::new(Some(dir.path().join("snapshot.json")), 1000));
    let journal = Journal::open_quiet(dir.path().join("events.jsonl")).unwrap();
    (dir, store, journal)
  }

  #[tokio::test]
  async fn test_rebuild_publishes_and_records_success() {
    let (dir, store, journal) = fixture();

    let records = rebuild(Arc::clone(&store), CorpusSource::sample(), &journal).await;
    assert_eq!(records, Some(6));
    assert!(store.current().is_ready());
    assert!(dir.path().join("snapshot.json").exists());

    let successes = journal.tail(None, Some(Level::Success)).await.unwrap();
    assert_eq!(successes.len(), 1);
    assert_eq!(successes[0].component, COMPONENT);
  }

  #[tokio::test]
  async fn test_rebuild_failure_is_recorded() {
    let (dir, store, journal) = fixture();
    let corpus = dir.path().join("corpus.jsonl");
    std::fs::create_dir(&corpus).unwrap();

    let records = rebuild(Arc::clone(&store), CorpusSource::raw(&corpus), &journal).await;
    assert_eq!(records, None);
    assert!(!store.current().is_ready());

    let errors = journal.tail(None, Some(Level::Error)).await.unwrap();
    assert_eq!(errors.len(), 1);
  }

  #[tokio::test]
  async fn test_periodic_rebuild_runs_after_first_interval() {
    let (_dir, store, journal) = fixture();
    let handle = spawn_periodic(
      Arc::clone(&store),
      CorpusSource::sample(),
      journal,
      Duration::from_millis(20),
    );

    let mut ready = false;
    for _ in 0..100 {
      if store.current().is_ready() {
        ready = true;
        break;
      }
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
    handle.abort();
    assert!(ready, "periodic rebuild never published a snapshot");
  }
}
