//! Similarity-weighted base estimate

use serde::{Deserialize, Serialize};

use crate::config::AggregateConfig;
use crate::search::Match;

/// Where a base estimate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum EstimateSource {
  /// Weighted from retrieved corpus records
  Corpus,
  /// Fallback constants; nothing similar was found
  Default,
}

impl EstimateSource {
  pub fn label(&self) -> &'static str {
    match self {
      EstimateSource::Corpus => "corpus",
      EstimateSource::Default => "default estimate",
    }
  }
}

/// Unadjusted hours, cost and confidence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseEstimate {
  pub hours: f64,
  pub cost: f64,
  pub confidence: f64,
  pub source: EstimateSource,
}

/// Blend matched records by similarity, or fall back to the configured defaults
///
/// Never fails: an empty or all-zero match list yields the fallback.
pub fn aggregate(matches: &[Match<'_>], config: &AggregateConfig) -> BaseEstimate {
  let weighted: Vec<&Match<'_>> = matches.iter().filter(|m| m.similarity > 0.0).collect();
  let total_weight: f64 = weighted.iter().map(|m| m.similarity).sum();

  if weighted.is_empty() || total_weight <= 0.0 {
    return BaseEstimate {
      hours: config.fallback_hours,
      cost: config.fallback_cost,
      confidence: config.fallback_confidence * config.confidence_scale,
      source: EstimateSource::Default,
    };
  }

  let mean = |value: fn(&Match<'_>) -> f64| -> f64 {
    weighted.iter().copied().map(|m| value(m) * m.similarity).sum::<f64>() / total_weight
  };

  BaseEstimate {
    hours: mean(|m| f64::from(m.record.estimated_hours)),
    cost: mean(|m| m.record.avg_price),
    confidence: mean(|m| m.record.confidence) * config.confidence_scale,
    source: EstimateSource::Corpus,
  }
}
