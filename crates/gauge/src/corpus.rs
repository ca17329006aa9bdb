//! Corpus sources
//!
//! The corpus is either ingested from the scraper's JSONL output or, on a cold
//! start with no data on disk, the built-in sample set below.

use std::path::{Path, PathBuf};

use crate::ingest;
use crate::record::ProjectRecord;
use crate::tables::Category;
use crate::Result;

/// Where a rebuild gets its records from
#[derive(Debug, Clone, Default)]
pub struct CorpusSource {
  /// Raw scraper output (JSON Lines); the sample corpus is used when absent
  pub raw_path: Option<PathBuf>,
}

impl CorpusSource {
  pub fn sample() -> Self {
    Self { raw_path: None }
  }

  pub fn raw<P: AsRef<Path>>(path: P) -> Self {
    Self { raw_path: Some(path.as_ref().to_path_buf()) }
  }

  /// Load the records, falling back to the sample corpus when no raw data exists
  pub fn load(&self) -> Result<Vec<ProjectRecord>> {
    let Some(path) = self.raw_path.as_ref().filter(|p| p.exists()) else {
      herald::info!("no raw corpus on disk, using {} sample records", sample_corpus().len());
      return Ok(sample_corpus());
    };

    let rows = ingest::read_raw_records(path)?;
    let report = ingest::process(rows.records)?;
    herald::info!(
      "ingested {} records from {} ({} malformed lines, {} unusable price rows)",
      report.records.len(),
      path.display(),
      rows.skipped,
      report.skipped_prices
    );

    if report.records.is_empty() {
      herald::warn!("raw corpus produced no records, using sample corpus");
      return Ok(sample_corpus());
    }
    Ok(report.records)
  }
}

#[allow(clippy::too_many_arguments)]
fn sample(
  title: &str,
  description: &str,
  category: Category,
  prices: (f64, f64, f64),
  estimated_hours: u32,
  technologies: &[&str],
  services: &[&str],
  company: (&str, &str),
  confidence: f64,
) -> ProjectRecord {
  ProjectRecord {
    title: title.to_string(),
    description: description.to_string(),
    category,
    min_price: prices.0,
    max_price: prices.1,
    avg_price: prices.2,
    estimated_hours,
    technologies: technologies.iter().map(|t| t.to_string()).collect(),
    services: services.iter().map(|s| s.to_string()).collect(),
    company_name: company.0.to_string(),
    source_url: company.1.to_string(),
    confidence,
  }
}

/// Built-in records used for cold starts
pub fn sample_corpus() -> Vec<ProjectRecord> {
  vec![
    sample(
      "E-commerce site for an apparel brand",
      "Apparel online store with product management, inventory management, payment \
       processing and customer management. Responsive layout with an admin panel.",
      Category::Ecommerce,
      (3_000_000.0, 8_000_000.0, 5_500_000.0),
      880,
      &["PHP", "Laravel", "MySQL", "AWS", "Stripe"],
      &["e-commerce development", "payment system", "admin panel"],
      ("EC Solution Inc.", "https://hnavi.co.jp/company/ec-solution"),
      0.9,
    ),
    sample(
      "Business management system for sales and customers",
      "Business system covering sales management, customer management and invoicing, \
       with data analysis reports.",
      Category::BusinessSystem,
      (2_500_000.0, 7_000_000.0, 4_750_000.0),
      760,
      &["Java", "Spring Boot", "PostgreSQL", "React"],
      &["business system", "sales management", "data analysis"],
      ("Business Systems LLC", "https://hnavi.co.jp/company/business-systems"),
      0.85,
    ),
    sample(
      "Reservation system for salons and clinics",
      "Online reservation and booking with scheduling, calendar management, customer \
       management and notifications. Works with a smartphone app.",
      Category::Reservation,
      (1_500_000.0, 4_000_000.0, 2_750_000.0),
      440,
      &["Python", "Django", "Vue.js", "Firebase"],
      &["reservation system", "calendar management", "notifications"],
      ("Reserve Tech Inc.", "https://hnavi.co.jp/company/reserve-tech"),
      0.8,
    ),
    sample(
      "Multilingual corporate website",
      "Corporate site with company profile, news management, contact form and recruiting \
       pages. SEO ready and multilingual.",
      Category::Corporate,
      (500_000.0, 2_000_000.0, 1_250_000.0),
      200,
      &["WordPress", "PHP", "MySQL", "JavaScript"],
      &["corporate website", "CMS", "SEO"],
      ("Web Create Inc.", "https://hnavi.co.jp/company/web-create"),
      0.75,
    ),
    sample(
      "Inventory management system for manufacturers",
      "Stock receiving and shipping, inventory counts and reorder alerts for a \
       manufacturing business, with reporting.",
      Category::BusinessSystem,
      (2_000_000.0, 4_400_000.0, 3_200_000.0),
      520,
      &[".NET", "SQL Server"],
      &["inventory management", "alerts", "reporting"],
      ("Inventory Systems Inc.", "https://hnavi.co.jp/company/inventory-systems"),
      0.8,
    ),
    sample(
      "Native mobile app for iOS and Android",
      "Native app development with API integration, push notifications and location \
       features.",
      Category::MobileApp,
      (2_000_000.0, 6_000_000.0, 4_000_000.0),
      640,
      &["Swift", "Kotlin", "React Native", "Firebase"],
      &["mobile app", "API development", "push notifications"],
      ("Mobile Develop Inc.", "https://hnavi.co.jp/company/mobile-develop"),
      0.8,
    ),
  ]
}
