//! Feature inference
//!
//! Guesses the capability list of a project from its description. The default
//! implementation is a declarative table of case-insensitive patterns, each
//! contributing a fixed set of tags, shaped afterwards by the delivery window
//! and the user scale.

use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

use crate::tables::{DurationKey, UserScale};
use crate::{GaugeError, Result};

/// Marker appended when a one-month window forces an MVP cut
pub const MVP_MARKER: &str = "MVP scope only";

/// Turns a description into a list of capability tags
pub trait FeatureInference: Send + Sync {
  fn infer(&self, description: &str, duration: DurationKey, scale: UserScale) -> Vec<String>;
}

const DEFAULT_RULES: &[(&str, &[&str])] = &[
  (
    r"\bec(?:\b|サイト)|e-?commerce|通販|ショッピング|商品|\bshop|online store|\bproducts?\b",
    &[
      "product management",
      "inventory management",
      "payment processing",
      "customer management",
      "order management",
    ],
  ),
  (
    r"予約|カレンダー|スケジュール|booking|reservation|calendar|schedul",
    &["reservation management", "calendar", "notifications", "customer management"],
  ),
  (
    r"管理|システム|業務|\bcrm\b|\berp\b|management|system|business",
    &["data management", "reporting", "user management", "role-based access control"],
  ),
  (
    r"サイト|ホームページ|\bweb|website|\bsite\b",
    &["responsive design", "contact form", "CMS", "SEO"],
  ),
  (
    r"アプリ|mobile|\bios\b|android|\bapp\b",
    &["mobile support", "push notifications", "offline mode", "geolocation"],
  ),
  (
    r"在庫|inventory|\bstock",
    &["stock receiving and shipping", "inventory counts", "alerts", "stocktaking"],
  ),
  (
    r"顧客|会員|customer|member|\bcrm\b",
    &["customer management", "member registration", "user dashboard", "history tracking"],
  ),
  (r"決済|支払い|payment|billing", &["payment processing", "billing", "sales management", "refunds"]),
  (
    r"分析|レポート|統計|analytics|report|statistic",
    &["data analysis", "reporting", "dashboard", "KPI tracking"],
  ),
];

/// Features that survive a one-month window
const MVP_PRIORITIES: &[&str] = &["authentication", "CRUD", "admin panel"];
const MVP_LIMIT: usize = 8;

const LONG_TERM_FEATURES: &[&str] =
  &["advanced reporting", "workflow management", "external system integration"];

const SCALABILITY_FEATURES: &[&str] = &[
  "load distribution",
  "performance monitoring",
  "security hardening",
  "scaling support",
  "redundant systems",
];

/// Words marking a feature as too heavy for a small audience
const HEAVY_TERMS: &[&str] = &["advanced", "complex", "enterprise"];

const BASELINE_FEATURES: &[&str] =
  &["authentication", "admin panel", "API integration", "security measures", "backup"];

struct FeatureRule {
  pattern: Regex,
  tags: Vec<String>,
}

/// Regex table implementation of [`FeatureInference`]
pub struct PatternFeatureTable {
  rules: Vec<FeatureRule>,
  cap: usize,
}

impl PatternFeatureTable {
  /// Compile a rule table; every pattern is matched case-insensitively
  pub fn new(rules: &[(&str, &[&str])], cap: usize) -> Result<Self> {
    let rules = rules
      .iter()
      .map(|(pattern, tags)| {
        let pattern = RegexBuilder::new(pattern)
          .case_insensitive(true)
          .build()
          .map_err(|e| GaugeError::internal(format!("invalid feature pattern: {e}")))?;
        Ok(FeatureRule { pattern, tags: tags.iter().map(|t| t.to_string()).collect() })
      })
      .collect::<Result<Vec<_>>>()?;
    Ok(Self { rules, cap })
  }

  /// The built-in rule table
  pub fn with_default_rules(cap: usize) -> Result<Self> {
    Self::new(DEFAULT_RULES, cap)
  }

  fn matched_tags(&self, description: &str) -> Vec<String> {
    self
      .rules
      .iter()
      .filter(|rule| rule.pattern.is_match(description))
      .flat_map(|rule| rule.tags.iter().cloned())
      .collect()
  }
}

impl FeatureInference for PatternFeatureTable {
  fn infer(&self, description: &str, duration: DurationKey, scale: UserScale) -> Vec<String> {
    let mut features = self.matched_tags(description);

    match duration {
      DurationKey::OneMonth => {
        features.retain(|f| MVP_PRIORITIES.iter().any(|p| f.contains(p)));
        features.truncate(MVP_LIMIT);
        features.push(MVP_MARKER.to_string());
      }
      DurationKey::FourToSixMonths | DurationKey::SixToTwelveMonths | DurationKey::OverOneYear => {
        features.extend(LONG_TERM_FEATURES.iter().map(|f| f.to_string()));
      }
      _ => {}
    }

    if scale.is_large() {
      features.extend(SCALABILITY_FEATURES.iter().map(|f| f.to_string()));
    } else if scale == UserScale::Small {
      features.retain(|f| {
        let lowered = f.to_lowercase();
        !HEAVY_TERMS.iter().any(|term| lowered.contains(term))
      });
    }

    features.extend(BASELINE_FEATURES.iter().map(|f| f.to_string()));
    dedup_capped(features, self.cap)
  }
}

/// Remove repeats keeping first occurrences, then cap the length
pub fn dedup_capped(features: Vec<String>, cap: usize) -> Vec<String> {
  let mut seen = HashSet::new();
  features.into_iter().filter(|f| seen.insert(f.clone())).take(cap).collect()
}
