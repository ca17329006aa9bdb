//! Estimate endpoint handler

use axum::{
  extract::{Extension, Json, State},
  http::StatusCode,
  response::Json as ResponseJson,
};
use gauge::{analysis::analyze_upstream, EstimateRequest, GaugeError, ProjectAnalysis};
use std::sync::Arc;

use crate::server::{
  middleware::RequestContext,
  state::AppState,
  types::{failure, ApiFailure, BaseResponse, EstimateResponse},
};

const COMPONENT: &str = "estimate-api";

fn blank_field(request: &EstimateRequest) -> Option<&'static str> {
  if request.duration.trim().is_empty() {
    Some("duration")
  } else if request.users.trim().is_empty() {
    Some("users")
  } else {
    None
  }
}

async fn analyze(
  state: &AppState,
  request: &EstimateRequest,
) -> Result<Option<ProjectAnalysis>, GaugeError> {
  match &state.analysis {
    Some(provider) => analyze_upstream(provider.as_ref(), request).await.map(Some),
    None => Ok(None),
  }
}

/// POST /estimate - Estimate hours and cost for a project description
pub async fn estimate(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Json(request): Json<EstimateRequest>,
) -> Result<ResponseJson<BaseResponse<EstimateResponse>>, ApiFailure> {
  let transaction_id = context.request_id;

  if let Some(field) = blank_field(&request) {
    let message = format!("'{field}' must not be blank");
    context.log_warn(&message, COMPONENT).await;
    return Err(failure(StatusCode::BAD_REQUEST, "invalid_request", &message, transaction_id));
  }

  let analysis = match analyze(&state, &request).await {
    Ok(analysis) => analysis,
    Err(e) => {
      context.log_error(&e.to_string(), COMPONENT).await;
      return Err(failure(
        StatusCode::BAD_GATEWAY,
        "estimate_unavailable",
        "Estimate unavailable: project analysis failed",
        transaction_id,
      ));
    }
  };

  let snapshot = state.store.current();
  let estimator = Arc::clone(&state.estimator);
  let outcome = tokio::task::spawn_blocking(move || {
    estimator.estimate(&snapshot, &request, analysis.as_ref())
  })
  .await;

  match outcome {
    Ok(estimate) => {
      let message = format!(
        "Estimated {} hours ({} similar projects, confidence {:.2})",
        estimate.total_hours,
        estimate.similar_projects.len(),
        estimate.confidence
      );
      context.log_success(&message, COMPONENT).await;
      Ok(ResponseJson(BaseResponse::success(EstimateResponse { estimate }, transaction_id)))
    }
    Err(e) => {
      context.log_error(&format!("Estimation task failed: {e}"), COMPONENT).await;
      Err(failure(
        StatusCode::INTERNAL_SERVER_ERROR,
        "estimation_failed",
        "Estimation failed",
        transaction_id,
      ))
    }
  }
}
