//! Adjustment pipeline
//!
//! Factors are applied in a fixed order (duration, user scale, complexity) and
//! each one multiplies both hours and cost.

use serde::{Deserialize, Serialize};

use crate::aggregate::BaseEstimate;
use crate::tables::{Complexity, DurationKey, Risk, UserScale};

/// Absorbs float representation error in the table constants before truncation
const TRUNCATION_TOLERANCE: f64 = 1e-6;

/// Record of every factor applied to an estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct Adjustments {
  pub duration: DurationKey,
  pub duration_multiplier: f64,
  pub risk: Risk,
  pub scale: UserScale,
  pub scale_multiplier: f64,
  pub infrastructure_tier: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub complexity: Option<Complexity>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub complexity_multiplier: Option<f64>,
}

/// Final totals after adjustment
#[derive(Debug, Clone, PartialEq)]
pub struct Adjusted {
  pub hours: u64,
  pub cost: u64,
  pub adjustments: Adjustments,
  /// Capability tags contributed by the user-scale table
  pub scale_features: Vec<String>,
}

fn truncate(value: f64) -> u64 {
  (value + TRUNCATION_TOLERANCE).max(0.0).floor() as u64
}

/// Apply duration, then user scale, then complexity
pub fn adjust(
  base: &BaseEstimate,
  duration: DurationKey,
  scale: UserScale,
  complexity: Option<Complexity>,
  scale_feature_limit: usize,
) -> Adjusted {
  let mut hours = base.hours;
  let mut cost = base.cost;

  let duration_multiplier = duration.multiplier();
  hours *= duration_multiplier;
  cost *= duration_multiplier;

  let scale_multiplier = scale.multiplier();
  hours *= scale_multiplier;
  cost *= scale_multiplier;

  let complexity_multiplier = complexity.map(|c| c.multiplier());
  if let Some(factor) = complexity_multiplier {
    hours *= factor;
    cost *= factor;
  }

  let scale_features = scale
    .additional_features()
    .iter()
    .take(scale_feature_limit)
    .map(|tag| tag.to_string())
    .collect();

  Adjusted {
    hours: truncate(hours),
    cost: truncate(cost),
    adjustments: Adjustments {
      duration,
      duration_multiplier,
      risk: duration.risk(),
      scale,
      scale_multiplier,
      infrastructure_tier: scale.tier().to_string(),
      complexity,
      complexity_multiplier,
    },
    scale_features,
  }
}
