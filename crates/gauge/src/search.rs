//! Nearest-neighbor retrieval over a snapshot

use crate::index::SparseVector;
use crate::record::ProjectRecord;
use crate::snapshot::Snapshot;

/// Scores at or below this are not considered similar at all
pub const MIN_SIMILARITY: f64 = 0.1;

/// A corpus record paired with its similarity to the query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match<'a> {
  pub record: &'a ProjectRecord,
  pub similarity: f64,
}

/// Calculate cosine similarity between two sparse vectors
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f32 {
  let magnitude_a = a.magnitude();
  let magnitude_b = b.magnitude();

  if magnitude_a == 0.0 || magnitude_b == 0.0 {
    0.0
  } else {
    a.dot(b) / (magnitude_a * magnitude_b)
  }
}

/// The `k` most similar records, best first
///
/// Ties keep corpus order. An unready index yields no matches rather than an
/// error so callers fall through to the default estimate.
pub fn search<'a>(snapshot: &'a Snapshot, query: &str, k: usize) -> Vec<Match<'a>> {
  let query_vector = match snapshot.index.transform(query) {
    Ok(vector) => vector,
    Err(e) => {
      herald::debug!("similarity search skipped: {e}");
      return Vec::new();
    }
  };

  let mut matches: Vec<Match<'a>> = snapshot
    .index
    .vectors()
    .iter()
    .zip(&snapshot.records)
    .map(|(vector, record)| Match {
      record,
      similarity: f64::from(cosine_similarity(&query_vector, vector)),
    })
    .filter(|m| m.similarity > MIN_SIMILARITY)
    .collect();

  // sort_by is stable, so equal scores stay in corpus order
  matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
  matches.truncate(k);
  matches
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::corpus::sample_corpus;

  #[test]
  fn test_cosine_of_vector_with_itself_is_one() {
    let v = SparseVector::new(vec![(0, 0.3), (4, 1.2), (9, 2.0)]);
    assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
  }

  #[test]
  fn test_cosine_of_zero_vectors_is_zero() {
    let zero = SparseVector::default();
    let v = SparseVector::new(vec![(1, 1.0)]);
    assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    assert_eq!(cosine_similarity(&zero, &v), 0.0);
    assert!(!cosine_similarity(&zero, &zero).is_nan());
  }

  #[test]
  fn test_search_respects_k_and_ordering() {
    let snapshot = Snapshot::build(sample_corpus(), 1000).unwrap();

    for k in 0..4 {
      let matches = search(&snapshot, "management system with customer management reports", k);
      assert!(matches.len() <= k);
      for pair in matches.windows(2) {
        assert!(pair[0].similarity >= pair[1].similarity);
      }
      assert!(matches.iter().all(|m| m.similarity > MIN_SIMILARITY));
    }
  }

  #[test]
  fn test_search_finds_the_obvious_neighbor() {
    let snapshot = Snapshot::build(sample_corpus(), 1000).unwrap();
    let query = "native mobile app for iOS and Android with push notifications";
    let matches = search(&snapshot, query, 3);
    assert_eq!(matches[0].record.title, "Native mobile app for iOS and Android");
  }

  #[test]
  fn test_search_on_cold_snapshot_is_empty() {
    let snapshot = Snapshot::cold();
    assert!(search(&snapshot, "anything at all", 5).is_empty());
  }

  #[test]
  fn test_unrelated_query_has_no_matches() {
    let snapshot = Snapshot::build(sample_corpus(), 1000).unwrap();
    assert!(search(&snapshot, "zzzz qqqq", 5).is_empty());
  }

  #[test]
  fn test_ties_keep_corpus_order() {
    let mut records = sample_corpus();
    records.truncate(1);
    let mut twin = records[0].clone();
    twin.company_name = "Second".to_string();
    records.push(twin);

    let snapshot = Snapshot::build(records, 1000).unwrap();
    let matches = search(&snapshot, "apparel online store", 5);

    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].similarity, matches[1].similarity);
    assert_eq!(matches[0].record.company_name, "EC Solution Inc.");
  }
}
