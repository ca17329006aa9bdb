//! Phase decomposition
//!
//! Splits a total hour count into work phases. The split starts from the
//! category's ratio table, is perturbed by the delivery window and then by the
//! user scale, and is re-normalized before pricing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::tables::{Category, DurationKey, UserScale};

/// A named stage of project work
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  RequirementsDesign,
  Development,
  Testing,
  VisualDesign,
}

impl Phase {
  pub const ALL: [Phase; 4] =
    [Phase::RequirementsDesign, Phase::Development, Phase::Testing, Phase::VisualDesign];

  /// Hourly rate in currency units
  pub fn hourly_rate(&self) -> u64 {
    match self {
      Phase::RequirementsDesign => 7000,
      Phase::VisualDesign => 6000,
      Phase::Development | Phase::Testing => 5000,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Phase::RequirementsDesign => "requirements_design",
      Phase::Development => "development",
      Phase::Testing => "testing",
      Phase::VisualDesign => "visual_design",
    }
  }
}

/// Share of the total attributed to each phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseRatios {
  pub requirements_design: f64,
  pub development: f64,
  pub testing: f64,
  pub visual_design: f64,
}

impl PhaseRatios {
  pub const fn new(
    requirements_design: f64,
    development: f64,
    testing: f64,
    visual_design: f64,
  ) -> Self {
    Self { requirements_design, development, testing, visual_design }
  }

  pub fn get(&self, phase: Phase) -> f64 {
    match phase {
      Phase::RequirementsDesign => self.requirements_design,
      Phase::Development => self.development,
      Phase::Testing => self.testing,
      Phase::VisualDesign => self.visual_design,
    }
  }

  fn slot_mut(&mut self, phase: Phase) -> &mut f64 {
    match phase {
      Phase::RequirementsDesign => &mut self.requirements_design,
      Phase::Development => &mut self.development,
      Phase::Testing => &mut self.testing,
      Phase::VisualDesign => &mut self.visual_design,
    }
  }

  fn scale(&mut self, phase: Phase, factor: f64) {
    *self.slot_mut(phase) *= factor;
  }

  pub fn sum(&self) -> f64 {
    Phase::ALL.iter().map(|phase| self.get(*phase)).sum()
  }

  /// Rescale so the shares sum to 1.0
  pub fn normalized(mut self) -> Self {
    let total = self.sum();
    if total > 0.0 {
      for phase in Phase::ALL {
        *self.slot_mut(phase) /= total;
      }
    }
    self
  }

  /// Apply the duration factors, then the scale factors
  ///
  /// The order matters only for intermediate values; the result is always
  /// re-normalized.
  pub fn perturbed(mut self, duration: DurationKey, scale: UserScale) -> Self {
    match duration {
      DurationKey::OneMonth => {
        self.scale(Phase::RequirementsDesign, 0.7);
        self.scale(Phase::Development, 1.1);
        self.scale(Phase::Testing, 1.2);
      }
      DurationKey::SixToTwelveMonths | DurationKey::OverOneYear => {
        self.scale(Phase::RequirementsDesign, 1.3);
        self.scale(Phase::Testing, 1.4);
        self.scale(Phase::Development, 0.9);
      }
      _ => {}
    }

    match scale {
      UserScale::Large | UserScale::Enterprise | UserScale::Public => {
        self.scale(Phase::RequirementsDesign, 1.4);
        self.scale(Phase::Testing, 1.6);
        self.scale(Phase::Development, 0.9);
      }
      UserScale::Small => {
        self.scale(Phase::RequirementsDesign, 0.8);
        self.scale(Phase::Development, 1.2);
      }
      UserScale::Medium => {}
    }

    self
  }
}

/// Hours and cost of one phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct PhaseEstimate {
  pub hours: u64,
  pub cost: u64,
}

/// Per-phase hours and cost, keyed by phase
pub type PhaseBreakdown = BTreeMap<Phase, PhaseEstimate>;

/// Split `total_hours` into priced phases
pub fn decompose(
  total_hours: u64,
  category: Category,
  duration: DurationKey,
  scale: UserScale,
) -> PhaseBreakdown {
  let ratios = category.base_ratios().perturbed(duration, scale).normalized();

  Phase::ALL
    .into_iter()
    .map(|phase| {
      let hours = (total_hours as f64 * ratios.get(phase)).floor() as u64;
      (phase, PhaseEstimate { hours, cost: hours * phase.hourly_rate() })
    })
    .collect()
}
