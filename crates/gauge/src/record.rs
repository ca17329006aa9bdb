use serde::{Deserialize, Serialize};

use crate::tables::Category;

/// A historical project used as retrieval evidence
///
/// Records are created during ingestion and never mutated afterwards; a
/// changed corpus means a new snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct ProjectRecord {
  pub title: String,
  pub description: String,
  pub category: Category,
  pub min_price: f64,
  pub max_price: f64,
  pub avg_price: f64,
  pub estimated_hours: u32,
  #[serde(default)]
  pub technologies: Vec<String>,
  #[serde(default)]
  pub services: Vec<String>,
  pub company_name: String,
  #[serde(default)]
  pub source_url: String,
  /// How much the record's figures can be trusted, in [0, 1]
  pub confidence: f64,
}

impl ProjectRecord {
  /// Text fed to the vector index
  pub fn search_text(&self) -> String {
    let mut parts = vec![self.title.as_str(), self.description.as_str()];
    parts.extend(self.services.iter().map(String::as_str));
    parts.extend(self.technologies.iter().map(String::as_str));
    parts.join(" ")
  }
}
