//! Engine tuning knobs
//!
//! Every field has a serde default so a partial YAML section (or none at all)
//! yields a working engine.

use serde::{Deserialize, Serialize};

use crate::{GaugeError, Result};

/// Upper bound on citations returned with an estimate
pub const MAX_CITATIONS: usize = 5;

/// Configuration for the whole estimation pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct EngineConfig {
  /// Vocabulary size of the vector index
  #[serde(default = "default_max_features")]
  pub max_features: usize,
  /// Number of nearest neighbors fed into aggregation
  #[serde(default = "default_top_k")]
  pub top_k: usize,
  /// Similar projects cited in the result (clamped to 5)
  #[serde(default = "default_citation_limit")]
  pub citation_limit: usize,
  /// Extra capability tags contributed by the user-scale table
  #[serde(default = "default_scale_feature_limit")]
  pub scale_feature_limit: usize,
  /// Maximum length of the inferred feature list
  #[serde(default = "default_feature_cap")]
  pub feature_cap: usize,
  #[serde(default)]
  pub aggregate: AggregateConfig,
}

/// Weighting and fallback values for the aggregator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct AggregateConfig {
  /// Applied to the similarity-weighted confidence
  #[serde(default = "default_confidence_scale")]
  pub confidence_scale: f64,
  #[serde(default = "default_fallback_hours")]
  pub fallback_hours: f64,
  #[serde(default = "default_fallback_cost")]
  pub fallback_cost: f64,
  #[serde(default = "default_fallback_confidence")]
  pub fallback_confidence: f64,
}

// Default value functions
fn default_max_features() -> usize {
  1000
}
fn default_top_k() -> usize {
  5
}
fn default_citation_limit() -> usize {
  3
}
fn default_scale_feature_limit() -> usize {
  3
}
fn default_feature_cap() -> usize {
  15
}
fn default_confidence_scale() -> f64 {
  0.9
}
fn default_fallback_hours() -> f64 {
  400.0
}
fn default_fallback_cost() -> f64 {
  2_000_000.0
}
fn default_fallback_confidence() -> f64 {
  0.3
}

impl Default for AggregateConfig {
  fn default() -> Self {
    Self {
      confidence_scale: default_confidence_scale(),
      fallback_hours: default_fallback_hours(),
      fallback_cost: default_fallback_cost(),
      fallback_confidence: default_fallback_confidence(),
    }
  }
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      max_features: default_max_features(),
      top_k: default_top_k(),
      citation_limit: default_citation_limit(),
      scale_feature_limit: default_scale_feature_limit(),
      feature_cap: default_feature_cap(),
      aggregate: AggregateConfig::default(),
    }
  }
}

impl EngineConfig {
  /// Parse a YAML document, filling in defaults for missing keys
  pub fn from_yaml(content: &str) -> Result<Self> {
    let config: EngineConfig = serde_yaml::from_str(content)
      .map_err(|e| GaugeError::internal(format!("invalid engine config: {e}")))?;
    config.validate()?;
    Ok(config)
  }

  /// Reject settings that would make every estimate meaningless
  pub fn validate(&self) -> Result<()> {
    if self.max_features == 0 {
      return Err(GaugeError::internal("max_features must be greater than zero"));
    }
    if self.top_k == 0 {
      return Err(GaugeError::internal("top_k must be greater than zero"));
    }
    let scale = self.aggregate.confidence_scale;
    if !(0.0..=1.0).contains(&scale) {
      return Err(GaugeError::internal(format!("confidence_scale {scale} is outside [0, 1]")));
    }
    Ok(())
  }

  /// Citation count after clamping to the supported maximum
  pub fn citations(&self) -> usize {
    self.citation_limit.min(MAX_CITATIONS)
  }
}
