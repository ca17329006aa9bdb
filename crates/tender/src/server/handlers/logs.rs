//! Logs endpoint handler

use axum::{
  extract::{Extension, Query, State},
  http::StatusCode,
  response::Json,
};
use herald::Level;

use crate::server::{
  middleware::RequestContext,
  state::AppState,
  types::{failure, ApiFailure, BaseResponse, LogsQuery, LogsResponse},
};

const DEFAULT_LIMIT: usize = 100;
const MAX_LIMIT: usize = 1000;

/// GET /logs - Recent journal entries, optionally filtered by level
pub async fn get_logs(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Query(query): Query<LogsQuery>,
) -> Result<Json<BaseResponse<LogsResponse>>, ApiFailure> {
  let transaction_id = context.request_id;

  let level = match query.level.as_deref() {
    None => None,
    Some(name) => match Level::parse(name) {
      Some(level) => Some(level),
      None => {
        let message = format!("Unknown log level: {name}");
        return Err(failure(StatusCode::BAD_REQUEST, "invalid_level", &message, transaction_id));
      }
    },
  };
  let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);

  match state.journal.tail(Some(limit), level).await {
    Ok(logs) => Ok(Json(BaseResponse::success(LogsResponse { logs }, transaction_id))),
    Err(e) => {
      context.log_error(&format!("Failed to read logs: {e}"), "logs-api").await;
      let message = format!("Failed to read logs: {e}");
      Err(failure(StatusCode::INTERNAL_SERVER_ERROR, "logs_read_failed", &message, transaction_id))
    }
  }
}
