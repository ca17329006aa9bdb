use async_trait::async_trait;
use axum::{
  body::{to_bytes, Body},
  http::{header::CONTENT_TYPE, Request, StatusCode},
  Router,
};
use gauge::{
  AnalysisProvider, CorpusSource, EngineConfig, EstimateRequest, Estimator, GaugeError,
  ProjectAnalysis, SnapshotStore,
};
use herald::journal::Journal;
use mockall::mock;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tender::server::{routing::create_router, state::AppState};
use tower::ServiceExt;

mock! {
  pub Analysis {}

  #[async_trait]
  impl AnalysisProvider for Analysis {
    async fn analyze(&self, request: &EstimateRequest) -> gauge::Result<ProjectAnalysis>;
  }
}

struct Fixture {
  _dir: TempDir,
  state: AppState,
}

impl Fixture {
  fn new() -> Self {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(SnapshotStore::new(Some(dir.path().join("snapshot.json")), 1000));
    store.rebuild_from(&CorpusSource::sample()).unwrap();

    let journal = Journal::open_quiet(dir.path().join("events.jsonl")).unwrap();
    let estimator = Arc::new(Estimator::new(EngineConfig::default()).unwrap());
    let corpus = CorpusSource::raw(dir.path().join("corpus.jsonl"));
    let state = AppState::new(store, estimator, journal, corpus);

    Self { _dir: dir, state }
  }

  fn with_analysis(mut self, provider: MockAnalysis) -> Self {
    self.state = self.state.with_analysis(Arc::new(provider));
    self
  }

  fn router(&self) -> Router {
    create_router(self.state.clone())
  }
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
  let response = router.oneshot(request).await.unwrap();
  let status = response.status();
  let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
  let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
  (status, body)
}

fn get(uri: &str) -> Request<Body> {
  Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
  Request::builder()
    .method("POST")
    .uri(uri)
    .header(CONTENT_TYPE, "application/json")
    .body(Body::from(body.to_string()))
    .unwrap()
}

fn booking_request() -> Value {
  json!({
    "description": "Reservation system with scheduling and customer management for a salon",
    "duration": "3months",
    "users": "small"
  })
}

#[tokio::test]
async fn test_status_reports_ready_index() {
  let fixture = Fixture::new();
  let (status, body) = send(fixture.router(), get("/status")).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "healthy");
  assert_eq!(body["index_ready"], true);
  assert_eq!(body["records"], 6);
  assert_eq!(body["analysis_enabled"], false);
  assert!(body["transaction_id"].is_string());
}

#[tokio::test]
async fn test_version_and_api_info() {
  let fixture = Fixture::new();

  let (status, body) = send(fixture.router(), get("/version")).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

  let (status, body) = send(fixture.router(), get("/api")).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["versions"]["active"][0], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_data_status_describes_snapshot_and_corpus() {
  let fixture = Fixture::new();
  let (status, body) = send(fixture.router(), get("/data-status")).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["snapshot"]["records"], 6);
  assert_eq!(body["snapshot"]["index_ready"], true);
  assert!(body["snapshot"]["built_at"].is_string());
  assert_eq!(body["corpus_present"], false);
}

#[tokio::test]
async fn test_estimate_success_envelope() {
  let fixture = Fixture::new();
  let (status, body) = send(fixture.router(), post_json("/estimate", booking_request())).await;

  assert_eq!(status, StatusCode::OK, "{body}");
  assert!(body.get("errors").is_none());
  assert_eq!(body["versioning"]["resolved"], env!("CARGO_PKG_VERSION"));

  let estimate = &body["estimate"];
  assert!(estimate["total_hours"].as_u64().unwrap() > 0);
  assert!(estimate["total_cost"].as_u64().unwrap() > 0);
  assert_eq!(estimate["source"], "corpus");
  assert_eq!(estimate["phases"].as_object().unwrap().len(), 4);
  assert!(!estimate["similar_projects"].as_array().unwrap().is_empty());
  assert!(estimate["provenance"].as_str().unwrap().contains("duration: 3months"));
}

#[tokio::test]
async fn test_missing_duration_is_rejected() {
  let fixture = Fixture::new();
  let request = json!({ "description": "Online shop", "users": "small" });
  let (status, _) = send(fixture.router(), post_json("/estimate", request)).await;

  assert!(status.is_client_error(), "got {status}");
}

#[tokio::test]
async fn test_blank_users_is_bad_request() {
  let fixture = Fixture::new();
  let request = json!({ "description": "Online shop", "duration": "3months", "users": "  " });
  let (status, body) = send(fixture.router(), post_json("/estimate", request)).await;

  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["errors"][0]["key"], "invalid_request");
  assert!(body["errors"][0]["message"].as_str().unwrap().contains("users"));
}

#[tokio::test]
async fn test_unknown_keys_fall_back_to_defaults() {
  let fixture = Fixture::new();
  let request = json!({ "description": "Online shop", "duration": "someday", "users": "lots" });
  let (status, body) = send(fixture.router(), post_json("/estimate", request)).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["estimate"]["adjustments"]["duration_multiplier"], 1.0);
  assert_eq!(body["estimate"]["adjustments"]["scale_multiplier"], 1.0);
}

#[tokio::test]
async fn test_upstream_analysis_failure_is_bad_gateway() {
  let mut provider = MockAnalysis::new();
  provider
    .expect_analyze()
    .times(1)
    .returning(|_| Err(GaugeError::upstream_analysis("connection refused")));
  let fixture = Fixture::new().with_analysis(provider);

  let (status, body) = send(fixture.router(), post_json("/estimate", booking_request())).await;

  assert_eq!(status, StatusCode::BAD_GATEWAY);
  assert_eq!(body["errors"][0]["key"], "estimate_unavailable");
  assert!(!body["errors"][0]["message"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn test_analysis_enriches_the_estimate() {
  let mut provider = MockAnalysis::new();
  provider.expect_analyze().times(1).returning(|_| {
    Ok(ProjectAnalysis {
      summary: "Salon booking".to_string(),
      category: Some("reservation".to_string()),
      complexity: Some("high".to_string()),
      functional_requirements: vec!["online reservation".to_string()],
    })
  });
  let fixture = Fixture::new().with_analysis(provider);

  let (status, body) = send(fixture.router(), post_json("/estimate", booking_request())).await;

  assert_eq!(status, StatusCode::OK, "{body}");
  let estimate = &body["estimate"];
  assert_eq!(estimate["category"], "reservation");
  assert_eq!(estimate["adjustments"]["complexity"], "high");
  assert!(estimate["provenance"].as_str().unwrap().contains("complexity: high"));
}

#[tokio::test]
async fn test_requests_are_journaled_with_trace() {
  let fixture = Fixture::new();
  send(fixture.router(), get("/version")).await;

  let (status, body) = send(fixture.router(), get("/logs?limit=10")).await;
  assert_eq!(status, StatusCode::OK);

  let logs = body["logs"].as_array().unwrap();
  let completed = logs
    .iter()
    .find(|entry| entry["trace"]["path"] == "/version" && entry["trace"]["status_code"] == 200)
    .expect("completion entry for /version");
  assert_eq!(completed["component"], "http-request");
  assert!(completed["trace"]["duration_ms"].is_number());
}

#[tokio::test]
async fn test_logs_filter_by_level() {
  let fixture = Fixture::new();
  fixture.state.journal.warn("disk nearly full", "test").await;
  fixture.state.journal.info("routine", "test").await;

  let (status, body) = send(fixture.router(), get("/logs?level=warn")).await;
  assert_eq!(status, StatusCode::OK);

  let logs = body["logs"].as_array().unwrap();
  assert_eq!(logs.len(), 1);
  assert_eq!(logs[0]["message"], "disk nearly full");
}

#[tokio::test]
async fn test_logs_reject_unknown_level() {
  let fixture = Fixture::new();
  let (status, body) = send(fixture.router(), get("/logs?level=loud")).await;

  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["errors"][0]["key"], "invalid_level");
}

#[tokio::test]
async fn test_index_rebuild_is_accepted_and_runs() {
  let fixture = Fixture::new();
  let (status, body) = send(fixture.router(), post_json("/index/rebuild", json!({}))).await;

  assert_eq!(status, StatusCode::ACCEPTED);
  assert_eq!(body["accepted"], true);

  let mut finished = false;
  for _ in 0..100 {
    let entries = fixture.state.journal.tail(None, Some(herald::Level::Success)).await.unwrap();
    if entries.iter().any(|e| e.component == "index-refresh") {
      finished = true;
      break;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;
  }
  assert!(finished, "background rebuild never reported completion");
  assert_eq!(fixture.state.store.current().len(), 6);
}
