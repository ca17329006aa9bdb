//! Index maintenance endpoint handler

use axum::{
  extract::{Extension, State},
  http::StatusCode,
  response::Json,
};
use std::sync::Arc;

use crate::refresh;
use crate::server::{
  middleware::RequestContext,
  state::AppState,
  types::{BaseResponse, RebuildResponse},
};

/// POST /index/rebuild - Schedule a rebuild and return immediately
pub async fn rebuild(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
) -> (StatusCode, Json<BaseResponse<RebuildResponse>>) {
  context.log_info("Index rebuild requested", "index-api").await;

  let store = Arc::clone(&state.store);
  let corpus = state.corpus.clone();
  let journal = state.journal.clone();
  tokio::spawn(async move {
    refresh::rebuild(store, corpus, &journal).await;
  });

  let response = RebuildResponse {
    accepted: true,
    message: "Index rebuild scheduled; progress is reported in /logs".to_string(),
  };
  (StatusCode::ACCEPTED, Json(BaseResponse::success(response, context.request_id)))
}
