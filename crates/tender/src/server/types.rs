//! REST API types with schemars annotations for OpenAPI generation

use axum::{http::StatusCode, Json};
use gauge::{EstimateResult, StoreStatus};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Base Response Structure
// ======================

/// Base response object for all API endpoints
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BaseResponse<T> {
  /// API versioning information
  pub versioning: VersionInfo,

  /// Transaction ID for logging correlation
  pub transaction_id: Uuid,

  /// Optional error information
  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  pub errors: Vec<ApiError>,

  /// Response data (generic for different endpoint types)
  #[serde(flatten)]
  pub data: T,
}

/// API versioning information
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct VersionInfo {
  /// The latest version of the API
  pub latest: String,

  /// The version of the API requested by the client
  pub requested: String,

  /// The version of the API that was used in producing the response
  pub resolved: String,
}

/// API error information
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ApiError {
  /// Error key, unique to the error source
  pub key: String,

  /// Human readable error message
  pub message: String,

  /// Additional error context
  #[serde(default)]
  pub context: serde_json::Value,
}

/// Error half of every handler result
pub type ApiFailure = (StatusCode, Json<BaseResponse<()>>);

// Status/Version Endpoints
// =======================

/// Response for /status endpoint
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct StatusResponse {
  /// Always "healthy" while the server answers
  pub status: String,

  /// Server version
  pub version: String,

  /// Whether the vector index is fitted
  pub index_ready: bool,

  /// Number of projects in the published snapshot
  pub records: usize,

  /// Whether estimates are enriched by an analysis service
  pub analysis_enabled: bool,
}

/// Response for /version endpoint
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct VersionResponse {
  /// Current API version
  pub version: String,
}

/// Response for /api endpoint
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ApiInfoResponse {
  /// Latest API version
  pub latest: String,

  /// Version information
  pub versions: ApiVersions,
}

/// API version details
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ApiVersions {
  /// Latest version
  pub latest: String,

  /// Currently active versions
  pub active: Vec<String>,
}

/// Response for /data-status endpoint
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DataStatusResponse {
  /// Published snapshot summary
  pub snapshot: StoreStatus,

  /// Raw corpus location
  pub corpus_path: Option<String>,

  /// Whether the raw corpus file exists
  pub corpus_present: bool,
}

// Estimate Endpoint
// =================

/// Response for /estimate endpoint
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct EstimateResponse {
  pub estimate: EstimateResult,
}

// Index Endpoint
// ==============

/// Response for /index/rebuild endpoint
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RebuildResponse {
  /// The rebuild was scheduled; completion is reported in the logs
  pub accepted: bool,

  pub message: String,
}

// Logs Endpoint
// =============

/// Query parameters for /logs
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct LogsQuery {
  /// Maximum number of entries (newest kept)
  pub limit: Option<usize>,

  /// Only entries of this level
  pub level: Option<String>,
}

/// Response for /logs endpoint
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct LogsResponse {
  /// JSON log entries
  pub logs: Vec<LogEntry>,
}

/// Individual log entry (re-exported from herald)
pub type LogEntry = herald::journal::JournalEntry;

// Helper Functions
// ================

fn version_info() -> VersionInfo {
  let version = env!("CARGO_PKG_VERSION");
  VersionInfo {
    latest: version.to_string(),
    requested: version.to_string(),
    resolved: version.to_string(),
  }
}

impl<T> BaseResponse<T> {
  /// Create a successful response
  pub fn success(data: T, transaction_id: Uuid) -> Self {
    Self { versioning: version_info(), transaction_id, errors: Vec::new(), data }
  }

  /// Create an error response
  pub fn error(errors: Vec<ApiError>, transaction_id: Uuid) -> BaseResponse<()> {
    BaseResponse { versioning: version_info(), transaction_id, errors, data: () }
  }
}

impl ApiError {
  /// Create a new API error
  pub fn new(key: &str, message: &str) -> Self {
    Self { key: key.to_string(), message: message.to_string(), context: serde_json::Value::Null }
  }
}

/// Build a single-error failure response
pub fn failure(status: StatusCode, key: &str, message: &str, transaction_id: Uuid) -> ApiFailure {
  let error = ApiError::new(key, message);
  (status, Json(BaseResponse::<()>::error(vec![error], transaction_id)))
}
