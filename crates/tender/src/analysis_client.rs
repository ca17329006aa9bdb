//! HTTP client for the project analysis service
//!
//! Posts `{description, duration, users}` and expects a
//! [`ProjectAnalysis`] body back. Every failure (connection, status, body)
//! surfaces as `GaugeError::UpstreamAnalysis`.

use async_trait::async_trait;
use gauge::{AnalysisProvider, EstimateRequest, GaugeError, ProjectAnalysis};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::config::AnalysisConfig;

#[derive(Debug, Serialize)]
struct AnalysisQuery<'a> {
  description: &'a str,
  duration: &'a str,
  users: &'a str,
}

/// [`AnalysisProvider`] backed by a remote HTTP endpoint
pub struct HttpAnalysisProvider {
  client: Client,
  url: String,
}

impl HttpAnalysisProvider {
  pub fn new(url: impl Into<String>, timeout: Duration) -> gauge::Result<Self> {
    let client = Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| GaugeError::internal(format!("failed to create HTTP client: {e}")))?;

    Ok(Self { client, url: url.into() })
  }

  pub fn from_config(config: &AnalysisConfig) -> gauge::Result<Self> {
    Self::new(config.url.clone(), config.timeout())
  }

  pub fn url(&self) -> &str {
    &self.url
  }
}

#[async_trait]
impl AnalysisProvider for HttpAnalysisProvider {
  async fn analyze(&self, request: &EstimateRequest) -> gauge::Result<ProjectAnalysis> {
    let query = AnalysisQuery {
      description: &request.description,
      duration: &request.duration,
      users: &request.users,
    };

    let response = self
      .client
      .post(&self.url)
      .json(&query)
      .send()
      .await
      .map_err(|e| GaugeError::upstream_analysis(format!("request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(GaugeError::upstream_analysis(format!("service returned {status}: {body}")));
    }

    response
      .json::<ProjectAnalysis>()
      .await
      .map_err(|e| GaugeError::upstream_analysis(format!("unreadable analysis: {e}")))
  }
}
