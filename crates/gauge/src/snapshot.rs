//! Immutable corpus + index pairs
//!
//! A snapshot is built in one step from the full record list and never
//! changed afterwards. On disk it is a single JSON artifact, written to a
//! temporary file first and renamed into place so readers never see a torn
//! file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::index::VectorIndex;
use crate::record::ProjectRecord;
use crate::{GaugeError, Result};

const FORMAT_VERSION: u32 = 1;

/// Records and the index vectors aligned with them (vector i ↔ record i)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
  format_version: u32,
  pub records: Vec<ProjectRecord>,
  pub index: VectorIndex,
  pub built_at: Option<DateTime<Utc>>,
}

impl Snapshot {
  /// Empty snapshot with an unfitted index
  pub fn cold() -> Self {
    Self {
      format_version: FORMAT_VERSION,
      records: Vec::new(),
      index: VectorIndex::unfitted(),
      built_at: None,
    }
  }

  /// Fit a fresh index over `records`
  pub fn build(records: Vec<ProjectRecord>, max_features: usize) -> Result<Self> {
    let texts: Vec<String> = records.iter().map(ProjectRecord::search_text).collect();
    let index = VectorIndex::fit(&texts, max_features)?;
    Ok(Self { format_version: FORMAT_VERSION, records, index, built_at: Some(Utc::now()) })
  }

  pub fn is_ready(&self) -> bool {
    self.index.is_ready()
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  /// Persist atomically via a sibling temp file
  pub fn save(&self, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).map_err(|e| GaugeError::snapshot_io(parent, e.to_string()))?;
    }

    let content =
      serde_json::to_vec(self).map_err(|e| GaugeError::snapshot_format(e.to_string()))?;

    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, content)
      .map_err(|e| GaugeError::snapshot_io(&temp_path, e.to_string()))?;
    fs::rename(&temp_path, path).map_err(|e| GaugeError::snapshot_io(path, e.to_string()))?;
    Ok(())
  }

  /// Load a persisted snapshot, checking that it is internally consistent
  pub fn load(path: &Path) -> Result<Self> {
    let content = fs::read(path).map_err(|e| GaugeError::snapshot_io(path, e.to_string()))?;
    let snapshot: Snapshot =
      serde_json::from_slice(&content).map_err(|e| GaugeError::snapshot_format(e.to_string()))?;

    if snapshot.format_version != FORMAT_VERSION {
      return Err(GaugeError::snapshot_format(format!(
        "unsupported format version {}",
        snapshot.format_version
      )));
    }
    if snapshot.index.len() != snapshot.records.len() {
      return Err(GaugeError::snapshot_format(format!(
        "{} vectors for {} records",
        snapshot.index.len(),
        snapshot.records.len()
      )));
    }
    snapshot.index.validate()?;
    Ok(snapshot)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::corpus::sample_corpus;
  use tempfile::TempDir;

  #[test]
  fn test_cold_snapshot_is_empty_and_unready() {
    let snapshot = Snapshot::cold();
    assert!(snapshot.is_empty());
    assert!(!snapshot.is_ready());
    assert!(snapshot.built_at.is_none());
  }

  #[test]
  fn test_build_aligns_vectors_with_records() {
    let snapshot = Snapshot::build(sample_corpus(), 1000).unwrap();
    assert_eq!(snapshot.index.len(), snapshot.len());
    assert!(snapshot.is_ready());
    assert!(snapshot.built_at.is_some());
  }

  #[test]
  fn test_build_empty_corpus_fails() {
    assert!(matches!(Snapshot::build(Vec::new(), 1000), Err(GaugeError::EmptyCorpus)));
  }

  #[test]
  fn test_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("snapshot.json");
    let snapshot = Snapshot::build(sample_corpus(), 1000).unwrap();

    snapshot.save(&path).unwrap();
    let loaded = Snapshot::load(&path).unwrap();

    assert_eq!(loaded, snapshot);
    assert!(!path.with_extension("json.tmp").exists());
  }

  #[test]
  fn test_missing_file_is_a_rebuild_signal() {
    let dir = TempDir::new().unwrap();
    let err = Snapshot::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(err.is_rebuild_signal());
  }

  #[test]
  fn test_corrupt_file_is_a_rebuild_signal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshot.json");
    fs::write(&path, "{\"records\": [").unwrap();

    let err = Snapshot::load(&path).unwrap_err();
    assert!(matches!(err, GaugeError::SnapshotFormat { .. }));
  }

  #[test]
  fn test_misaligned_artifact_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshot.json");
    let mut snapshot = Snapshot::build(sample_corpus(), 1000).unwrap();
    snapshot.records.pop();
    snapshot.save(&path).unwrap();

    assert!(matches!(Snapshot::load(&path), Err(GaugeError::SnapshotFormat { .. })));
  }

  #[test]
  fn test_artifact_with_truncated_idf_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshot.json");
    let snapshot = Snapshot::build(sample_corpus(), 1000).unwrap();
    let mut value = serde_json::to_value(&snapshot).unwrap();
    value["index"]["model"]["idf"] = serde_json::json!([]);
    fs::write(&path, serde_json::to_vec(&value).unwrap()).unwrap();

    let err = Snapshot::load(&path).unwrap_err();
    assert!(matches!(err, GaugeError::SnapshotFormat { .. }));
    assert!(err.is_rebuild_signal());
  }
}
