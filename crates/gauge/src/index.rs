//! TF-IDF vector index
//!
//! Terms are lowercase unigrams (maximal alphanumeric runs of at least two
//! characters) plus adjacent-pair bigrams. Weights are raw counts times the
//! smoothed IDF `ln((1 + n) / (1 + df)) + 1`, L2-normalized per document.
//!
//! An index is fitted once over the whole corpus and never refitted in place;
//! a changed corpus produces a new index.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::{GaugeError, Result};

/// Sparse vector with entries sorted by term index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SparseVector {
  entries: Vec<(u32, f32)>,
}

impl SparseVector {
  /// Build from unsorted entries; duplicate indices are summed
  pub fn new(mut entries: Vec<(u32, f32)>) -> Self {
    entries.sort_by_key(|(index, _)| *index);
    let mut merged: Vec<(u32, f32)> = Vec::with_capacity(entries.len());
    for (index, value) in entries {
      match merged.last_mut() {
        Some((last, total)) if *last == index => *total += value,
        _ => merged.push((index, value)),
      }
    }
    Self { entries: merged }
  }

  pub fn entries(&self) -> &[(u32, f32)] {
    &self.entries
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn magnitude(&self) -> f32 {
    self.entries.iter().map(|(_, v)| v * v).sum::<f32>().sqrt()
  }

  /// Dot product via a merge over the sorted entries
  pub fn dot(&self, other: &SparseVector) -> f32 {
    let (mut i, mut j) = (0, 0);
    let mut total = 0.0;
    while i < self.entries.len() && j < other.entries.len() {
      let (a_index, a_value) = self.entries[i];
      let (b_index, b_value) = other.entries[j];
      match a_index.cmp(&b_index) {
        std::cmp::Ordering::Less => i += 1,
        std::cmp::Ordering::Greater => j += 1,
        std::cmp::Ordering::Equal => {
          total += a_value * b_value;
          i += 1;
          j += 1;
        }
      }
    }
    total
  }

  fn normalize(&mut self) {
    let magnitude = self.magnitude();
    if magnitude > 0.0 {
      for (_, value) in &mut self.entries {
        *value /= magnitude;
      }
    }
  }
}

/// Split text into lowercase unigram tokens
pub fn tokenize(text: &str) -> Vec<String> {
  text
    .to_lowercase()
    .split(|c: char| !c.is_alphanumeric())
    .filter(|token| token.chars().count() >= 2)
    .map(str::to_string)
    .collect()
}

/// Unigrams followed by bigrams of adjacent tokens
pub fn terms(text: &str) -> Vec<String> {
  let tokens = tokenize(text);
  let bigrams: Vec<String> =
    tokens.windows(2).map(|pair| format!("{} {}", pair[0], pair[1])).collect();
  tokens.into_iter().chain(bigrams).collect()
}

fn term_counts(text: &str) -> HashMap<String, u32> {
  let mut counts = HashMap::new();
  for term in terms(text) {
    *counts.entry(term).or_insert(0) += 1;
  }
  counts
}

/// Vocabulary and IDF weights learned from a corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfModel {
  vocabulary: BTreeMap<String, u32>,
  idf: Vec<f32>,
}

impl TfidfModel {
  fn learn(documents: &[HashMap<String, u32>], max_features: usize) -> Self {
    let mut frequency: HashMap<&str, u64> = HashMap::new();
    let mut document_frequency: HashMap<&str, u32> = HashMap::new();
    for counts in documents {
      for (term, count) in counts {
        *frequency.entry(term.as_str()).or_insert(0) += u64::from(*count);
        *document_frequency.entry(term.as_str()).or_insert(0) += 1;
      }
    }

    // Most frequent terms win; ties go to the lexically smaller term
    let mut ranked: Vec<(&str, u64)> = frequency.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(max_features);

    let mut selected: Vec<&str> = ranked.into_iter().map(|(term, _)| term).collect();
    selected.sort_unstable();

    let n = documents.len() as f64;
    let mut vocabulary = BTreeMap::new();
    let mut idf = Vec::with_capacity(selected.len());
    for (index, term) in selected.into_iter().enumerate() {
      let df = f64::from(document_frequency.get(term).copied().unwrap_or(0));
      idf.push((((1.0 + n) / (1.0 + df)).ln() + 1.0) as f32);
      vocabulary.insert(term.to_string(), index as u32);
    }

    Self { vocabulary, idf }
  }

  fn vectorize(&self, counts: &HashMap<String, u32>) -> SparseVector {
    let entries = counts
      .iter()
      .filter_map(|(term, count)| {
        let index = *self.vocabulary.get(term)?;
        let idf = self.idf.get(index as usize)?;
        Some((index, *count as f32 * idf))
      })
      .collect();
    let mut vector = SparseVector::new(entries);
    vector.normalize();
    vector
  }

  pub fn vocabulary_size(&self) -> usize {
    self.vocabulary.len()
  }

  fn check(&self) -> Result<()> {
    if self.idf.len() != self.vocabulary.len() {
      return Err(GaugeError::snapshot_format(format!(
        "{} idf weights for {} vocabulary terms",
        self.idf.len(),
        self.vocabulary.len()
      )));
    }
    if let Some((term, index)) =
      self.vocabulary.iter().find(|(_, index)| **index as usize >= self.idf.len())
    {
      return Err(GaugeError::snapshot_format(format!(
        "term '{term}' points past the idf table ({index})"
      )));
    }
    Ok(())
  }
}

/// Fitted model plus one vector per corpus document, in corpus order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorIndex {
  model: Option<TfidfModel>,
  vectors: Vec<SparseVector>,
}

impl VectorIndex {
  /// An index with no model; every transform fails with `IndexNotReady`
  pub fn unfitted() -> Self {
    Self::default()
  }

  /// Learn a model from `texts` and vectorize each of them
  pub fn fit<S: AsRef<str>>(texts: &[S], max_features: usize) -> Result<Self> {
    if texts.is_empty() {
      return Err(GaugeError::EmptyCorpus);
    }

    let documents: Vec<HashMap<String, u32>> =
      texts.iter().map(|text| term_counts(text.as_ref())).collect();
    let model = TfidfModel::learn(&documents, max_features);
    if model.vocabulary.is_empty() {
      return Err(GaugeError::EmptyCorpus);
    }

    let vectors = documents.iter().map(|counts| model.vectorize(counts)).collect();
    Ok(Self { model: Some(model), vectors })
  }

  /// Vectorize arbitrary text with the fitted model
  pub fn transform(&self, text: &str) -> Result<SparseVector> {
    let model = self.model.as_ref().ok_or(GaugeError::IndexNotReady)?;
    Ok(model.vectorize(&term_counts(text)))
  }

  pub fn is_ready(&self) -> bool {
    self.model.is_some()
  }

  pub fn vectors(&self) -> &[SparseVector] {
    &self.vectors
  }

  pub fn len(&self) -> usize {
    self.vectors.len()
  }

  pub fn is_empty(&self) -> bool {
    self.vectors.is_empty()
  }

  pub fn vocabulary_size(&self) -> usize {
    self.model.as_ref().map_or(0, TfidfModel::vocabulary_size)
  }

  /// Reject a deserialized index whose parts disagree with each other
  pub fn validate(&self) -> Result<()> {
    let Some(model) = &self.model else {
      if self.vectors.is_empty() {
        return Ok(());
      }
      return Err(GaugeError::snapshot_format("vectors present without a fitted model"));
    };
    model.check()?;

    let size = model.idf.len();
    if let Some(position) =
      self.vectors.iter().position(|v| v.entries.iter().any(|(i, _)| *i as usize >= size))
    {
      return Err(GaugeError::snapshot_format(format!(
        "vector {position} references a term outside the vocabulary"
      )));
    }
    Ok(())
  }
}
