//! Axum router configuration for all endpoints

use axum::{
  middleware,
  routing::{get, post},
  Router,
};

use crate::server::handlers::{estimate, index, logs, status};
use crate::server::middleware::request_context_middleware;
use crate::server::state::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
  Router::new()
    // Status and version endpoints
    .route("/status", get(status::status))
    .route("/version", get(status::version))
    .route("/api", get(status::api_info))
    .route("/data-status", get(status::data_status))
    // Logs endpoint
    .route("/logs", get(logs::get_logs))
    // Estimation and index maintenance
    .route("/estimate", post(estimate::estimate))
    .route("/index/rebuild", post(index::rebuild))
    .layer(middleware::from_fn_with_state(state.clone(), request_context_middleware))
    .with_state(state)
}
