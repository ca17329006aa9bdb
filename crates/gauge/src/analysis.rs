//! External project analysis
//!
//! An analysis service can summarize a description, guess its category and
//! complexity, and list functional requirements. The estimator folds those
//! into the retrieval query and the adjustment pipeline when available.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::estimate::EstimateRequest;
use crate::{GaugeError, Result};

/// What the analysis service reports about a project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct ProjectAnalysis {
  #[serde(default)]
  pub summary: String,
  #[serde(default)]
  pub category: Option<String>,
  #[serde(default)]
  pub complexity: Option<String>,
  #[serde(default)]
  pub functional_requirements: Vec<String>,
}

impl ProjectAnalysis {
  /// Text appended to the description for retrieval
  pub fn query_terms(&self) -> String {
    let mut parts = Vec::with_capacity(1 + self.functional_requirements.len());
    if !self.summary.trim().is_empty() {
      parts.push(self.summary.trim());
    }
    parts.extend(self.functional_requirements.iter().map(|r| r.trim()).filter(|r| !r.is_empty()));
    parts.join(" ")
  }
}

/// Source of project analyses
///
/// Failures should be reported as `GaugeError::UpstreamAnalysis`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
  async fn analyze(&self, request: &EstimateRequest) -> Result<ProjectAnalysis>;
}

/// Call `provider`, reporting any failure as `GaugeError::UpstreamAnalysis`
pub async fn analyze_upstream(
  provider: &dyn AnalysisProvider,
  request: &EstimateRequest,
) -> Result<ProjectAnalysis> {
  provider.analyze(request).await.map_err(|e| match e {
    GaugeError::UpstreamAnalysis { .. } => e,
    other => GaugeError::upstream_analysis(other.to_string()),
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn request() -> EstimateRequest {
    EstimateRequest {
      description: "Salon booking".to_string(),
      duration: "3months".to_string(),
      users: "small".to_string(),
      category: None,
    }
  }

  #[tokio::test]
  async fn test_analyze_upstream_wraps_other_failures() {
    let mut provider = MockAnalysisProvider::new();
    provider.expect_analyze().times(1).returning(|_| Err(GaugeError::internal("bad payload")));

    let err = analyze_upstream(&provider, &request()).await.unwrap_err();
    assert!(matches!(err, GaugeError::UpstreamAnalysis { .. }));
    assert!(err.to_string().contains("bad payload"));
  }

  #[tokio::test]
  async fn test_analyze_upstream_keeps_upstream_failures() {
    let mut provider = MockAnalysisProvider::new();
    provider
      .expect_analyze()
      .times(1)
      .returning(|_| Err(GaugeError::upstream_analysis("timed out")));

    let err = analyze_upstream(&provider, &request()).await.unwrap_err();
    assert!(matches!(err, GaugeError::UpstreamAnalysis { .. }));
  }

  #[tokio::test]
  async fn test_analyze_upstream_passes_results_through() {
    let mut provider = MockAnalysisProvider::new();
    provider.expect_analyze().times(1).returning(|_| {
      Ok(ProjectAnalysis { summary: "Booking".to_string(), ..Default::default() })
    });

    let analysis = analyze_upstream(&provider, &request()).await.unwrap();
    assert_eq!(analysis.summary, "Booking");
  }

  #[test]
  fn test_query_terms_join_summary_and_requirements() {
    let analysis = ProjectAnalysis {
      summary: "Salon booking ".to_string(),
      category: None,
      complexity: None,
      functional_requirements: ["calendar", " ", "reminders"].map(String::from).to_vec(),
    };
    assert_eq!(analysis.query_terms(), "Salon booking calendar reminders");
  }

  #[test]
  fn test_missing_fields_default() {
    let analysis: ProjectAnalysis = serde_json::from_str(r#"{"summary":"x"}"#).unwrap();
    assert!(analysis.functional_requirements.is_empty());
    assert!(analysis.complexity.is_none());
  }
}
