use gauge::{CorpusSource, EngineConfig, EstimateRequest, Estimator, SnapshotStore, WarmStart};
use std::fs;
use tempfile::TempDir;

const RAW: &str = r#"{"company_name":"Alpha Dev","company_url":"https://example.com/alpha","services":"ECサイト構築 | 予約システム開発","technologies":"PHP | Laravel | MySQL","min_price":300,"max_price":800,"price_unit":"万円","price_context":"ECサイト構築 300万円～800万円"}
{"company_name":"Alpha Dev","min_price":"120","price_context":"予約システム開発 120万円～"}
this line is not json
{"company_name":"Beta Apps","services":"スマホアプリ開発","technologies":"Swift | Kotlin","min_price":"応相談","price_context":"アプリ開発 要相談"}
"#;

fn request() -> EstimateRequest {
  EstimateRequest {
    description: "ECサイト構築 with product catalog and payments".to_string(),
    duration: "3months".to_string(),
    users: "medium".to_string(),
    category: None,
  }
}

#[test]
fn test_ingested_corpus_survives_a_restart() {
  let dir = TempDir::new().unwrap();
  let raw_path = dir.path().join("raw.jsonl");
  let snapshot_path = dir.path().join("index").join("snapshot.json");
  fs::write(&raw_path, RAW).unwrap();

  let source = CorpusSource::raw(&raw_path);
  let config = EngineConfig::default();
  let estimator = Estimator::new(config.clone()).unwrap();

  let first = SnapshotStore::new(Some(snapshot_path.clone()), config.max_features);
  assert_eq!(first.warm_start(&source).unwrap(), WarmStart::Rebuilt);
  let snapshot = first.current();
  assert!(snapshot.records.iter().any(|r| r.company_name == "Alpha Dev"));
  assert!(snapshot.records.iter().any(|r| r.company_name == "Beta Apps"));
  let before = estimator.estimate(&snapshot, &request(), None);

  // Remove the raw data: the restart must come from the artifact alone
  fs::remove_file(&raw_path).unwrap();

  let second = SnapshotStore::new(Some(snapshot_path), config.max_features);
  assert_eq!(second.warm_start(&source).unwrap(), WarmStart::Loaded);
  let after = estimator.estimate(&second.current(), &request(), None);

  assert_eq!(before, after);
}

#[test]
fn test_rebuild_from_picks_up_new_raw_data() {
  let dir = TempDir::new().unwrap();
  let raw_path = dir.path().join("raw.jsonl");
  let store = SnapshotStore::new(None, 1000);
  let source = CorpusSource::raw(&raw_path);

  // No raw file yet: the sample corpus is indexed
  store.rebuild_from(&source).unwrap();
  assert!(store.current().records.iter().all(|r| r.company_name != "Alpha Dev"));

  fs::write(&raw_path, RAW).unwrap();
  store.rebuild_from(&source).unwrap();
  assert!(store.current().records.iter().any(|r| r.company_name == "Alpha Dev"));
  assert!(store.status().index_ready);
}
