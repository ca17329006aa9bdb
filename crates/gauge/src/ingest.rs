//! Corpus ingestion
//!
//! Turns the scraper's per-company rows into project records. Each company
//! yields one record per advertised service and one per price row that carries
//! enough context to name a project. Rows that cannot be parsed are skipped
//! and counted, never fatal.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::record::ProjectRecord;
use crate::tables::Category;
use crate::{GaugeError, Result};

const MAX_SERVICES: usize = 10;
const MAX_TECHNOLOGIES: usize = 15;
const MIN_CONTEXT_CHARS: usize = 5;
const SERVICE_CONFIDENCE: f64 = 0.8;
const PRICE_CONFIDENCE: f64 = 0.7;
/// One person-day (8 hours) is priced at this many currency units
const PERSON_DAY_COST: f64 = 50_000.0;
const MAN_YEN: f64 = 10_000.0;

/// A price as scraped: either already numeric or free text like "1,200"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceValue {
  Number(f64),
  Text(String),
}

impl PriceValue {
  pub fn parse(&self) -> Option<f64> {
    match self {
      PriceValue::Number(n) if n.is_finite() => Some(*n),
      PriceValue::Number(_) => None,
      PriceValue::Text(text) => {
        let cleaned: String = text
          .trim()
          .trim_end_matches("万円")
          .trim_end_matches('円')
          .chars()
          .filter(|c| !matches!(c, ',' | '，') && !c.is_whitespace())
          .collect();
        if cleaned.is_empty() {
          return None;
        }
        cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
      }
    }
  }
}

/// One scraped row; rows of the same company repeat the company fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
  pub company_name: String,
  #[serde(default)]
  pub company_url: Option<String>,
  /// Services separated by ` | `
  #[serde(default)]
  pub services: Option<String>,
  /// Technologies separated by ` | `
  #[serde(default)]
  pub technologies: Option<String>,
  #[serde(default)]
  pub min_price: Option<PriceValue>,
  #[serde(default)]
  pub max_price: Option<PriceValue>,
  /// `万円` (the default) or `円`
  #[serde(default)]
  pub price_unit: Option<String>,
  #[serde(default)]
  pub price_context: Option<String>,
  #[serde(default)]
  pub company_description: Option<String>,
}

/// Rows read from a JSONL file
#[derive(Debug, Default)]
pub struct RawBatch {
  pub records: Vec<RawRecord>,
  /// Lines that were not valid records
  pub skipped: usize,
}

/// Outcome of processing a batch of rows
#[derive(Debug, Default)]
pub struct IngestReport {
  pub records: Vec<ProjectRecord>,
  pub companies: usize,
  /// Price rows with unparseable or non-positive numbers
  pub skipped_prices: usize,
  pub duplicates_removed: usize,
}

/// Read scraper output, one JSON object per line
pub fn read_raw_records(path: &Path) -> Result<RawBatch> {
  let file = File::open(path).map_err(|e| GaugeError::corpus_io(path, e.to_string()))?;
  let mut batch = RawBatch::default();

  // Split on raw bytes so one badly encoded line is skipped like any other
  for (number, bytes) in BufReader::new(file).split(b'\n').enumerate() {
    let bytes = bytes.map_err(|e| GaugeError::corpus_io(path, e.to_string()))?;
    let parsed = String::from_utf8(bytes)
      .map_err(|e| GaugeError::malformed_record(number + 1, e.to_string()))
      .and_then(|line| {
        if line.trim().is_empty() {
          Ok(None)
        } else {
          parse_line(number + 1, &line).map(Some)
        }
      });
    match parsed {
      Ok(None) => {}
      Ok(Some(record)) => batch.records.push(record),
      Err(e) => {
        herald::warn!("{e}");
        batch.skipped += 1;
      }
    }
  }

  Ok(batch)
}

fn parse_line(number: usize, line: &str) -> Result<RawRecord> {
  let record: RawRecord =
    serde_json::from_str(line).map_err(|e| GaugeError::malformed_record(number, e.to_string()))?;
  if record.company_name.trim().is_empty() {
    return Err(GaugeError::malformed_record(number, "empty company_name"));
  }
  Ok(record)
}

fn split_list(value: Option<&str>, min_chars: usize, limit: usize) -> Vec<String> {
  value
    .unwrap_or_default()
    .split(" | ")
    .map(str::trim)
    .filter(|item| item.chars().count() > min_chars)
    .take(limit)
    .map(str::to_string)
    .collect()
}

#[derive(Debug, Clone, PartialEq)]
struct PriceRange {
  min: f64,
  max: f64,
  unit_factor: f64,
  context: String,
}

fn unit_factor(unit: Option<&str>) -> f64 {
  match unit.map(str::trim) {
    None | Some("") | Some("万円") => MAN_YEN,
    _ => 1.0,
  }
}

/// Fallback price band (in 万円) for a service with no scraped price
fn default_price_for(service: &str) -> PriceRange {
  const BANDS: &[(&str, f64, f64)] = &[
    ("ecサイト", 300.0, 800.0),
    ("webアプリ", 200.0, 600.0),
    ("業務システム", 250.0, 700.0),
    ("cms", 100.0, 400.0),
    ("スマホアプリ", 150.0, 500.0),
    ("コーポレートサイト", 50.0, 200.0),
  ];

  let lowered = service.to_lowercase();
  let (min, max) = BANDS
    .iter()
    .find(|(key, _, _)| lowered.contains(key))
    .map_or((200.0, 500.0), |(_, min, max)| (*min, *max));
  PriceRange { min, max, unit_factor: MAN_YEN, context: String::new() }
}

fn hours_for(avg_price: f64) -> u32 {
  (avg_price / PERSON_DAY_COST * 8.0) as u32
}

struct Cleaner {
  price: Regex,
  range: Regex,
}

impl Cleaner {
  fn new() -> Result<Self> {
    let compile =
      |p: &str| Regex::new(p).map_err(|e| GaugeError::internal(format!("invalid pattern: {e}")));
    Ok(Self { price: compile(r"[\d,，]+(?:万円?|円)")?, range: compile(r"[～〜-]")? })
  }

  fn strip(&self, context: &str) -> String {
    let without_prices = self.price.replace_all(context, "");
    self.range.replace_all(&without_prices, "").trim().to_string()
  }

  fn title(&self, context: &str) -> String {
    self
      .strip(context)
      .split_whitespace()
      .next()
      .map(|word| word.chars().take(20).collect())
      .unwrap_or_else(|| "System development".to_string())
  }

  fn description(&self, context: &str, technologies: &[String]) -> String {
    let mut parts = Vec::new();
    let clean = self.strip(context);
    if clean.chars().count() > MIN_CONTEXT_CHARS {
      parts.push(clean.chars().take(100).collect::<String>());
    }
    if !technologies.is_empty() {
      let shown = &technologies[..technologies.len().min(3)];
      parts.push(format!("Technologies: {}", shown.join(", ")));
    }
    if parts.is_empty() {
      "System development project".to_string()
    } else {
      parts.join(". ")
    }
  }
}

struct Company<'a> {
  info: &'a RawRecord,
  services: Vec<String>,
  technologies: Vec<String>,
  prices: Vec<PriceRange>,
}

impl Company<'_> {
  fn record(
    &self,
    title: String,
    description: String,
    range: &PriceRange,
    max_factor: f64,
  ) -> ProjectRecord {
    let max = if range.max > 0.0 { range.max } else { range.min * max_factor };
    let min = range.min * range.unit_factor;
    let max = max * range.unit_factor;
    let avg_price = (min + max) / 2.0;

    ProjectRecord {
      title,
      description,
      category: Category::Other,
      min_price: min,
      max_price: max,
      avg_price,
      estimated_hours: hours_for(avg_price),
      technologies: self.technologies.clone(),
      services: Vec::new(),
      company_name: self.info.company_name.clone(),
      source_url: self.info.company_url.clone().unwrap_or_default(),
      confidence: 0.0,
    }
  }

  /// Price row whose context mentions the service, else the first row
  fn price_for_service(&self, service: &str) -> Option<&PriceRange> {
    let service = service.to_lowercase();
    self
      .prices
      .iter()
      .find(|range| {
        let context = range.context.to_lowercase();
        context.contains(&service) || service.split_whitespace().any(|word| context.contains(word))
      })
      .or_else(|| self.prices.first())
  }

  fn service_description(&self, service: &str) -> String {
    let mut parts = vec![format!("{service} development and build")];
    if !self.technologies.is_empty() {
      let shown = &self.technologies[..self.technologies.len().min(5)];
      parts.push(format!("Technologies: {}", shown.join(", ")));
    }
    if let Some(about) = self.info.company_description.as_deref() {
      if about.chars().count() > 10 {
        parts.push(about.chars().take(100).collect());
      }
    }
    parts.join(". ")
  }

  fn service_records(&self) -> Vec<ProjectRecord> {
    self
      .services
      .iter()
      .map(|service| {
        let fallback = default_price_for(service);
        let range = self.price_for_service(service).unwrap_or(&fallback);
        let mut record = self.record(
          format!("{service} development"),
          self.service_description(service),
          range,
          2.0,
        );
        record.category = Category::infer(service);
        record.services = vec![service.clone()];
        record.confidence = SERVICE_CONFIDENCE;
        record
      })
      .collect()
  }

  fn price_records(&self, cleaner: &Cleaner) -> Vec<ProjectRecord> {
    self
      .prices
      .iter()
      .filter(|range| range.context.chars().count() >= MIN_CONTEXT_CHARS)
      .map(|range| {
        let mut record = self.record(
          cleaner.title(&range.context),
          cleaner.description(&range.context, &self.technologies),
          range,
          1.5,
        );
        record.category = Category::infer(&range.context);
        record.services = self.services.clone();
        record.confidence = PRICE_CONFIDENCE;
        record
      })
      .collect()
  }
}

/// Parse the price fields of every row of a company
fn price_ranges(rows: &[&RawRecord], skipped: &mut usize) -> Vec<PriceRange> {
  let mut ranges = Vec::new();
  for row in rows {
    if row.min_price.is_none() && row.max_price.is_none() {
      continue;
    }
    let min = row.min_price.as_ref().map(PriceValue::parse);
    let max = row.max_price.as_ref().map(PriceValue::parse);
    // A field that is present but unparseable spoils the whole row
    if matches!(min, Some(None)) || matches!(max, Some(None)) {
      *skipped += 1;
      continue;
    }
    let min = min.flatten().unwrap_or(0.0);
    let max = max.flatten().unwrap_or(0.0);
    if min <= 0.0 && max <= 0.0 {
      *skipped += 1;
      continue;
    }
    ranges.push(PriceRange {
      min,
      max,
      unit_factor: unit_factor(row.price_unit.as_deref()),
      context: row.price_context.clone().unwrap_or_default(),
    });
  }
  ranges
}

/// Build project records from raw rows
pub fn process(rows: Vec<RawRecord>) -> Result<IngestReport> {
  let cleaner = Cleaner::new()?;
  let mut report = IngestReport::default();

  // Group by company, keeping first-seen order
  let mut order: Vec<&str> = Vec::new();
  let mut groups: HashMap<&str, Vec<&RawRecord>> = HashMap::new();
  for row in &rows {
    let name = row.company_name.as_str();
    if !groups.contains_key(name) {
      order.push(name);
    }
    groups.entry(name).or_default().push(row);
  }
  report.companies = order.len();

  let mut records = Vec::new();
  for name in order {
    let Some(group) = groups.get(name) else { continue };
    let info = group[0];
    let company = Company {
      info,
      services: split_list(info.services.as_deref(), 2, MAX_SERVICES),
      technologies: split_list(info.technologies.as_deref(), 1, MAX_TECHNOLOGIES),
      prices: price_ranges(group, &mut report.skipped_prices),
    };
    records.extend(company.service_records());
    records.extend(company.price_records(&cleaner));
  }

  let mut seen = HashSet::new();
  let before = records.len();
  records.retain(|r| seen.insert((r.title.clone(), r.company_name.clone())));
  report.duplicates_removed = before - records.len();
  report.records = records;

  Ok(report)
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  fn row(company: &str) -> RawRecord {
    RawRecord {
      company_name: company.to_string(),
      company_url: Some(format!("https://example.com/{company}")),
      ..RawRecord::default()
    }
  }

  #[test]
  fn test_price_value_parsing() {
    assert_eq!(PriceValue::Number(300.0).parse(), Some(300.0));
    assert_eq!(PriceValue::Text("1,200".to_string()).parse(), Some(1200.0));
    assert_eq!(PriceValue::Text("50万円".to_string()).parse(), Some(50.0));
    assert_eq!(PriceValue::Text("要相談".to_string()).parse(), None);
    assert_eq!(PriceValue::Text("".to_string()).parse(), None);
  }

  #[test]
  fn test_split_list_filters_and_caps() {
    let services = split_list(Some("EC | ECサイト構築 | 業務システム | "), 2, 10);
    assert_eq!(services, vec!["ECサイト構築", "業務システム"]);

    let many = (0..20).map(|i| format!("tech{i}")).collect::<Vec<_>>().join(" | ");
    assert_eq!(split_list(Some(&many), 1, MAX_TECHNOLOGIES).len(), 15);
    assert!(split_list(None, 1, 15).is_empty());
  }

  #[test]
  fn test_service_with_matching_price_range() {
    let mut first = row("Acme");
    first.services = Some("ECサイト構築 | コーポレートサイト".to_string());
    first.technologies = Some("PHP | Laravel".to_string());
    first.min_price = Some(PriceValue::Number(100.0));
    first.max_price = Some(PriceValue::Number(200.0));
    first.price_context = Some("コーポレートサイト 100万円～".to_string());

    let report = process(vec![first]).unwrap();
    let corporate =
      report.records.iter().find(|r| r.title == "コーポレートサイト development").unwrap();

    assert_eq!(corporate.min_price, 1_000_000.0);
    assert_eq!(corporate.max_price, 2_000_000.0);
    assert_eq!(corporate.avg_price, 1_500_000.0);
    assert_eq!(corporate.estimated_hours, 240);
    assert_eq!(corporate.category, Category::Corporate);
    assert_eq!(corporate.confidence, SERVICE_CONFIDENCE);
    assert_eq!(corporate.technologies, vec!["PHP", "Laravel"]);
  }

  #[test]
  fn test_service_without_prices_uses_default_band() {
    let mut only = row("Acme");
    only.services = Some("スマホアプリ開発".to_string());

    let report = process(vec![only]).unwrap();

    assert_eq!(report.records.len(), 1);
    let record = &report.records[0];
    assert_eq!(record.min_price, 1_500_000.0);
    assert_eq!(record.max_price, 5_000_000.0);
    assert_eq!(record.category, Category::MobileApp);
  }

  #[test]
  fn test_price_rows_become_records() {
    let mut first = row("Acme");
    first.min_price = Some(PriceValue::Text("80".to_string()));
    first.price_context = Some("予約システム構築 80万円～".to_string());
    let mut second = row("Acme");
    second.min_price = Some(PriceValue::Number(10.0));
    second.price_context = Some("保守".to_string());

    let report = process(vec![first, second]).unwrap();

    // The second row's context is too short to name a project
    assert_eq!(report.records.len(), 1);
    let record = &report.records[0];
    assert_eq!(record.title, "予約システム構築");
    assert_eq!(record.min_price, 800_000.0);
    assert_eq!(record.max_price, 1_200_000.0);
    assert_eq!(record.category, Category::Reservation);
    assert_eq!(record.confidence, PRICE_CONFIDENCE);
  }

  #[test]
  fn test_yen_unit_is_not_scaled() {
    let mut only = row("Acme");
    only.min_price = Some(PriceValue::Number(500_000.0));
    only.max_price = Some(PriceValue::Number(700_000.0));
    only.price_unit = Some("円".to_string());
    only.price_context = Some("Landing page production".to_string());

    let report = process(vec![only]).unwrap();
    assert_eq!(report.records[0].avg_price, 600_000.0);
    assert_eq!(report.records[0].title, "Landing");
  }

  #[test]
  fn test_bad_price_rows_are_skipped_and_counted() {
    let mut bad = row("Acme");
    bad.min_price = Some(PriceValue::Text("応相談".to_string()));
    bad.price_context = Some("Web system development".to_string());
    let mut zero = row("Acme");
    zero.min_price = Some(PriceValue::Number(0.0));
    zero.price_context = Some("Web system development".to_string());

    let report = process(vec![bad, zero]).unwrap();
    assert_eq!(report.skipped_prices, 2);
    assert!(report.records.is_empty());
  }

  #[test]
  fn test_duplicates_are_removed_per_company() {
    let mut first = row("Acme");
    first.services = Some("業務システム | 業務システム".to_string());
    let mut other = row("Other");
    other.services = Some("業務システム".to_string());

    let report = process(vec![first, other]).unwrap();
    assert_eq!(report.companies, 2);
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.duplicates_removed, 1);
    assert_eq!(report.records[0].company_name, "Acme");
  }

  #[test]
  fn test_read_raw_records_skips_malformed_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("raw.jsonl");
    std::fs::write(
      &path,
      [
        r#"{"company_name":"Acme","services":"業務システム"}"#,
        "not json",
        "",
        r#"{"company_name":"  "}"#,
        r#"{"company_name":"Beta","min_price":120}"#,
      ]
      .join("\n"),
    )
    .unwrap();

    let batch = read_raw_records(&path).unwrap();
    assert_eq!(batch.records.len(), 2);
    assert_eq!(batch.skipped, 2);
  }

  #[test]
  fn test_read_raw_records_skips_badly_encoded_line() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("raw.jsonl");
    let mut bytes = br#"{"company_name":"Acme","services":"EC"}"#.to_vec();
    bytes.extend_from_slice(b"\n{\"company_name\":\"Bad\xff\xfe\"}\n");
    bytes.extend_from_slice(br#"{"company_name":"Beta","min_price":120}"#);
    bytes.extend_from_slice(b"\r\n");
    std::fs::write(&path, bytes).unwrap();

    let batch = read_raw_records(&path).unwrap();
    let names: Vec<_> = batch.records.iter().map(|r| r.company_name.as_str()).collect();
    assert_eq!(names, ["Acme", "Beta"]);
    assert_eq!(batch.skipped, 1);
  }

  #[test]
  fn test_missing_file_is_a_corpus_error() {
    let dir = TempDir::new().unwrap();
    let err = read_raw_records(&dir.path().join("absent.jsonl")).unwrap_err();
    assert!(matches!(err, GaugeError::CorpusIo { .. }));
  }
}
