//! Request context and middleware for the tender REST API
//!
//! Every request gets an id and a handle on the journal; the middleware
//! records its start and completion, and handlers log through the same
//! context so entries can be correlated.

use axum::{
  extract::{Request, State},
  http::{HeaderMap, Method, Uri},
  middleware::Next,
  response::Response,
};
use herald::journal::{Journal, RequestTrace};
use herald::Level;
use std::time::Instant;
use uuid::Uuid;

use crate::server::state::AppState;

/// Request context containing the journal and request metadata
#[derive(Clone)]
pub struct RequestContext {
  /// Unique ID for this request, also used as the transaction id
  pub request_id: Uuid,
  /// HTTP method
  pub method: Method,
  /// Request URI
  pub uri: Uri,
  /// Request headers
  pub headers: HeaderMap,
  /// Shared journal
  pub journal: Journal,
}

impl RequestContext {
  pub fn new(method: Method, uri: Uri, headers: HeaderMap, journal: Journal) -> Self {
    Self { request_id: Uuid::new_v4(), method, uri, headers, journal }
  }

  pub async fn log_info(&self, message: &str, component: &str) {
    self.log_with_context(Level::Info, message, component, None, None).await;
  }

  pub async fn log_success(&self, message: &str, component: &str) {
    self.log_with_context(Level::Success, message, component, None, None).await;
  }

  pub async fn log_warn(&self, message: &str, component: &str) {
    self.log_with_context(Level::Warn, message, component, None, None).await;
  }

  pub async fn log_error(&self, message: &str, component: &str) {
    self.log_with_context(Level::Error, message, component, None, None).await;
  }

  fn user_agent(&self) -> &str {
    self.headers.get("user-agent").and_then(|v| v.to_str().ok()).unwrap_or("none")
  }

  /// Log with the request trace attached
  pub async fn log_with_context(
    &self,
    level: Level,
    message: &str,
    component: &str,
    status_code: Option<u16>,
    duration_ms: Option<f64>,
  ) {
    let trace = RequestTrace {
      request_id: Some(self.request_id.to_string()),
      method: Some(self.method.to_string()),
      path: Some(self.uri.path().to_string()),
      status_code,
      duration_ms,
    };

    let message = format!("{} {} - {}", self.method, self.uri.path(), message);
    if let Err(e) = self.journal.record(level, &message, component, Some(trace)).await {
      herald::warn!("could not write journal entry: {e}");
    }
  }

  pub async fn log_request_start(&self) {
    let message = format!("Request started (User-Agent: {})", self.user_agent());
    self.log_with_context(Level::Info, &message, "http-request", None, None).await;
  }

  pub async fn log_request_complete(&self, status_code: u16, duration_ms: f64) {
    let level = if status_code >= 500 { Level::Error } else { Level::Info };
    let (status, duration) = (Some(status_code), Some(duration_ms));
    self.log_with_context(level, "Request completed", "http-request", status, duration).await;
  }
}

/// Middleware to inject RequestContext into all requests
pub async fn request_context_middleware(
  State(state): State<AppState>,
  mut request: Request,
  next: Next,
) -> Response {
  let context = RequestContext::new(
    request.method().clone(),
    request.uri().clone(),
    request.headers().clone(),
    state.journal.clone(),
  );

  let start_time = Instant::now();
  context.log_request_start().await;

  request.extensions_mut().insert(context.clone());
  let response = next.run(request).await;

  let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;
  context.log_request_complete(response.status().as_u16(), duration_ms).await;

  response
}
