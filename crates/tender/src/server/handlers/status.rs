//! Status and version endpoint handlers

use axum::{extract::State, response::Json};
use uuid::Uuid;

use crate::server::state::AppState;
use crate::server::types::{
  ApiInfoResponse, ApiVersions, BaseResponse, DataStatusResponse, StatusResponse,
  VersionResponse,
};

/// GET /status - Health check endpoint
pub async fn status(State(state): State<AppState>) -> Json<BaseResponse<StatusResponse>> {
  let snapshot = state.store.current();
  let response = StatusResponse {
    status: "healthy".to_string(),
    version: env!("CARGO_PKG_VERSION").to_string(),
    index_ready: snapshot.is_ready(),
    records: snapshot.len(),
    analysis_enabled: state.analysis.is_some(),
  };

  Json(BaseResponse::success(response, Uuid::new_v4()))
}

/// GET /version - Returns current API version
pub async fn version() -> Json<BaseResponse<VersionResponse>> {
  let response = VersionResponse { version: env!("CARGO_PKG_VERSION").to_string() };
  Json(BaseResponse::success(response, Uuid::new_v4()))
}

/// GET /api - Returns API information and supported versions
pub async fn api_info() -> Json<BaseResponse<ApiInfoResponse>> {
  let version = env!("CARGO_PKG_VERSION");
  let response = ApiInfoResponse {
    latest: version.to_string(),
    versions: ApiVersions { latest: version.to_string(), active: vec![version.to_string()] },
  };

  Json(BaseResponse::success(response, Uuid::new_v4()))
}

/// GET /data-status - Corpus and snapshot details
pub async fn data_status(State(state): State<AppState>) -> Json<BaseResponse<DataStatusResponse>> {
  let corpus = state.corpus.raw_path.as_ref();
  let response = DataStatusResponse {
    snapshot: state.store.status(),
    corpus_path: corpus.map(|p| p.display().to_string()),
    corpus_present: corpus.is_some_and(|p| p.exists()),
  };

  Json(BaseResponse::success(response, Uuid::new_v4()))
}
