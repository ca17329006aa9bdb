//! Estimation pipeline
//!
//! retrieval → similarity-weighted base → duration/scale/complexity
//! adjustment → phase split, plus feature inference and citations.

use serde::{Deserialize, Serialize};

use crate::adjust::{adjust, Adjustments};
use crate::aggregate::{aggregate, EstimateSource};
use crate::analysis::{analyze_upstream, AnalysisProvider, ProjectAnalysis};
use crate::config::EngineConfig;
use crate::features::{dedup_capped, FeatureInference, PatternFeatureTable};
use crate::phases::{decompose, PhaseBreakdown};
use crate::search::{search, Match};
use crate::snapshot::Snapshot;
use crate::tables::{Category, Complexity, DurationKey, Lookup, UserScale};
use crate::Result;

/// What a client asks to have estimated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct EstimateRequest {
  pub description: String,
  /// Delivery window key, e.g. `3months`
  pub duration: String,
  /// Audience scale key, e.g. `enterprise`
  pub users: String,
  #[serde(default)]
  pub category: Option<String>,
}

/// A corpus project cited as evidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct Citation {
  pub title: String,
  pub description: String,
  pub hours: u32,
  /// Formatted like `¥5,500,000`
  pub cost: String,
  /// Formatted like `87.3%`
  pub similarity: String,
  pub company: String,
}

impl Citation {
  fn from_match(m: &Match<'_>) -> Self {
    Self {
      title: m.record.title.clone(),
      description: m.record.description.clone(),
      hours: m.record.estimated_hours,
      cost: format_yen(m.record.avg_price),
      similarity: format!("{:.1}%", m.similarity * 100.0),
      company: m.record.company_name.clone(),
    }
  }
}

/// Final estimate returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct EstimateResult {
  pub project_description: String,
  pub total_hours: u64,
  pub total_cost: u64,
  pub phases: PhaseBreakdown,
  pub confidence: f64,
  pub provenance: String,
  pub similar_projects: Vec<Citation>,
  pub features: Vec<String>,
  pub adjustments: Adjustments,
  pub category: Category,
  pub source: EstimateSource,
}

/// Format a currency amount with thousands separators, e.g. `¥5,500,000`
pub fn format_yen(amount: f64) -> String {
  let whole = amount.max(0.0).round() as u64;
  let digits = whole.to_string();
  let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
  for (i, ch) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      grouped.push(',');
    }
    grouped.push(ch);
  }
  format!("¥{grouped}")
}

/// Runs the estimation pipeline against a snapshot
pub struct Estimator {
  config: EngineConfig,
  features: Box<dyn FeatureInference>,
}

impl Estimator {
  /// Estimator using the built-in feature table
  pub fn new(config: EngineConfig) -> Result<Self> {
    let features = PatternFeatureTable::with_default_rules(config.feature_cap)?;
    Ok(Self::with_feature_inference(config, Box::new(features)))
  }

  pub fn with_feature_inference(
    config: EngineConfig,
    features: Box<dyn FeatureInference>,
  ) -> Self {
    Self { config, features }
  }

  fn resolve_category(request: &EstimateRequest, analysis: Option<&ProjectAnalysis>) -> Category {
    let requested = request.category.as_deref().map(str::trim).filter(|c| !c.is_empty());
    let analyzed =
      analysis.and_then(|a| a.category.as_deref()).map(str::trim).filter(|c| !c.is_empty());

    for label in [requested, analyzed].into_iter().flatten() {
      match Category::lookup(label) {
        Lookup::Hit(category) => return category,
        Lookup::Miss(_) => herald::warn!("unknown category '{label}', trying next source"),
      }
    }
    Category::Other
  }

  /// Estimate synchronously, optionally using an analysis already obtained
  pub fn estimate(
    &self,
    snapshot: &Snapshot,
    request: &EstimateRequest,
    analysis: Option<&ProjectAnalysis>,
  ) -> EstimateResult {
    let duration = DurationKey::lookup(&request.duration).or_warn("duration", &request.duration);
    let scale = UserScale::lookup(&request.users).or_warn("user scale", &request.users);
    let complexity = analysis
      .and_then(|a| a.complexity.as_deref())
      .map(|label| Complexity::lookup(label).or_warn("complexity", label));
    let category = Self::resolve_category(request, analysis);

    let mut query = request.description.clone();
    if let Some(extra) = analysis.map(ProjectAnalysis::query_terms).filter(|t| !t.is_empty()) {
      query.push(' ');
      query.push_str(&extra);
    }

    let matches = search(snapshot, &query, self.config.top_k);
    let base = aggregate(&matches, &self.config.aggregate);
    let adjusted = adjust(&base, duration, scale, complexity, self.config.scale_feature_limit);
    let phases = decompose(adjusted.hours, category, duration, scale);

    let mut features = self.features.infer(&request.description, duration, scale);
    features.extend(adjusted.scale_features.iter().cloned());
    let features = dedup_capped(features, self.config.feature_cap);

    let mut provenance = format!(
      "{} (duration: {}, scale: {}",
      base.source.label(),
      duration,
      adjusted.adjustments.infrastructure_tier
    );
    if let Some(complexity) = complexity {
      provenance.push_str(&format!(", complexity: {}", complexity.as_str()));
    }
    provenance.push(')');

    let similar_projects =
      matches.iter().take(self.config.citations()).map(Citation::from_match).collect();

    herald::info!(
      "estimate: {} h, {} (duration x{:.1}, scale {}, {} matches)",
      adjusted.hours,
      format_yen(adjusted.cost as f64),
      adjusted.adjustments.duration_multiplier,
      scale,
      matches.len()
    );

    EstimateResult {
      project_description: request.description.clone(),
      total_hours: adjusted.hours,
      total_cost: adjusted.cost,
      phases,
      confidence: base.confidence,
      provenance,
      similar_projects,
      features,
      adjustments: adjusted.adjustments,
      category,
      source: base.source,
    }
  }

  /// Ask the analysis provider first, then estimate with its findings
  pub async fn estimate_enriched(
    &self,
    snapshot: &Snapshot,
    request: &EstimateRequest,
    provider: &dyn AnalysisProvider,
  ) -> Result<EstimateResult> {
    let analysis = analyze_upstream(provider, request).await?;
    Ok(self.estimate(snapshot, request, Some(&analysis)))
  }
}
