//! Adjustment tables
//!
//! Each table is a closed enum with a documented default variant. Lookups by
//! wire key return [`Lookup`] so callers can tell a real hit from a fallback and
//! log the miss.

use serde::{Deserialize, Serialize};

use crate::phases::PhaseRatios;

/// Result of resolving a wire key against a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<T> {
  Hit(T),
  /// The key was unknown; the table's default variant was substituted
  Miss(T),
}

impl<T: Copy> Lookup<T> {
  pub fn value(&self) -> T {
    match self {
      Lookup::Hit(value) | Lookup::Miss(value) => *value,
    }
  }

  pub fn is_miss(&self) -> bool {
    matches!(self, Lookup::Miss(_))
  }

  /// Resolve the value, warning about the substitution on a miss
  pub fn or_warn(self, table: &str, key: &str) -> T {
    if self.is_miss() {
      herald::warn!("unknown {table} '{key}', using default");
    }
    self.value()
  }
}

/// Schedule risk attached to a duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum Risk {
  Low,
  Medium,
  High,
}

// Duration
// ========

/// Requested delivery window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub enum DurationKey {
  #[serde(rename = "1month")]
  OneMonth,
  #[serde(rename = "2months")]
  TwoMonths,
  #[serde(rename = "3months")]
  ThreeMonths,
  #[serde(rename = "4-6months")]
  FourToSixMonths,
  #[serde(rename = "6-12months")]
  SixToTwelveMonths,
  #[serde(rename = "1year+")]
  OverOneYear,
  /// Default for unknown keys: neutral multiplier, medium risk, no phase perturbation
  #[serde(rename = "unspecified")]
  Unspecified,
}

impl DurationKey {
  pub const ALL: [DurationKey; 7] = [
    DurationKey::OneMonth,
    DurationKey::TwoMonths,
    DurationKey::ThreeMonths,
    DurationKey::FourToSixMonths,
    DurationKey::SixToTwelveMonths,
    DurationKey::OverOneYear,
    DurationKey::Unspecified,
  ];

  pub fn lookup(key: &str) -> Lookup<DurationKey> {
    let key = key.trim();
    Self::ALL
      .into_iter()
      .find(|d| *d != DurationKey::Unspecified && d.as_str() == key)
      .map_or(Lookup::Miss(DurationKey::Unspecified), Lookup::Hit)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      DurationKey::OneMonth => "1month",
      DurationKey::TwoMonths => "2months",
      DurationKey::ThreeMonths => "3months",
      DurationKey::FourToSixMonths => "4-6months",
      DurationKey::SixToTwelveMonths => "6-12months",
      DurationKey::OverOneYear => "1year+",
      DurationKey::Unspecified => "unspecified",
    }
  }

  /// Hour multiplier; compressed and very long schedules both cost more
  pub fn multiplier(&self) -> f64 {
    match self {
      DurationKey::OneMonth => 1.8,
      DurationKey::TwoMonths => 1.4,
      DurationKey::ThreeMonths => 1.1,
      DurationKey::FourToSixMonths => 1.0,
      DurationKey::SixToTwelveMonths => 1.2,
      DurationKey::OverOneYear => 1.5,
      DurationKey::Unspecified => 1.0,
    }
  }

  pub fn risk(&self) -> Risk {
    match self {
      DurationKey::OneMonth | DurationKey::OverOneYear => Risk::High,
      DurationKey::TwoMonths | DurationKey::SixToTwelveMonths | DurationKey::Unspecified => {
        Risk::Medium
      }
      DurationKey::ThreeMonths | DurationKey::FourToSixMonths => Risk::Low,
    }
  }
}

impl std::fmt::Display for DurationKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// User scale
// ==========

/// Expected audience size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum UserScale {
  Small,
  /// Default for unknown keys
  Medium,
  Large,
  Enterprise,
  Public,
}

impl UserScale {
  pub const ALL: [UserScale; 5] = [
    UserScale::Small,
    UserScale::Medium,
    UserScale::Large,
    UserScale::Enterprise,
    UserScale::Public,
  ];

  pub fn lookup(key: &str) -> Lookup<UserScale> {
    let key = key.trim();
    Self::ALL
      .into_iter()
      .find(|s| s.as_str() == key)
      .map_or(Lookup::Miss(UserScale::Medium), Lookup::Hit)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      UserScale::Small => "small",
      UserScale::Medium => "medium",
      UserScale::Large => "large",
      UserScale::Enterprise => "enterprise",
      UserScale::Public => "public",
    }
  }

  pub fn multiplier(&self) -> f64 {
    match self {
      UserScale::Small => 1.0,
      UserScale::Medium => 1.3,
      UserScale::Large => 1.8,
      UserScale::Enterprise => 2.5,
      UserScale::Public => 2.2,
    }
  }

  /// Infrastructure tier label shown in provenance
  pub fn tier(&self) -> &'static str {
    match self {
      UserScale::Small => "basic",
      UserScale::Medium => "scalable",
      UserScale::Large => "high-availability",
      UserScale::Enterprise => "enterprise",
      UserScale::Public => "public-facing",
    }
  }

  pub fn additional_features(&self) -> &'static [&'static str] {
    match self {
      UserScale::Small => &["basic authentication", "simple admin panel"],
      UserScale::Medium => &["load balancer", "database optimization", "caching layer"],
      UserScale::Large => &["CDN", "redundancy", "monitoring", "autoscaling"],
      UserScale::Enterprise => {
        &["microservices", "API gateway", "security hardening", "backup system"]
      }
      UserScale::Public => {
        &["DDoS protection", "global CDN", "internationalization", "access analytics"]
      }
    }
  }

  pub fn is_large(&self) -> bool {
    matches!(self, UserScale::Large | UserScale::Enterprise | UserScale::Public)
  }
}

impl std::fmt::Display for UserScale {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// Complexity
// ==========

/// Complexity label reported by the analysis service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
  Low,
  /// Default for unknown labels
  Medium,
  High,
}

impl Complexity {
  pub fn lookup(label: &str) -> Lookup<Complexity> {
    match label.trim().to_ascii_lowercase().as_str() {
      "low" => Lookup::Hit(Complexity::Low),
      "medium" => Lookup::Hit(Complexity::Medium),
      "high" => Lookup::Hit(Complexity::High),
      _ => Lookup::Miss(Complexity::Medium),
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Complexity::Low => "low",
      Complexity::Medium => "medium",
      Complexity::High => "high",
    }
  }

  pub fn multiplier(&self) -> f64 {
    match self {
      Complexity::Low => 0.8,
      Complexity::Medium => 1.1,
      Complexity::High => 1.5,
    }
  }
}

// Category
// ========

/// Project category driving the phase split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum Category {
  Ecommerce,
  BusinessSystem,
  Reservation,
  Corporate,
  MobileApp,
  CmsMedia,
  WebApp,
  /// Default for unknown labels; uses the default ratio table
  Other,
}

impl Category {
  pub const ALL: [Category; 8] = [
    Category::Ecommerce,
    Category::BusinessSystem,
    Category::Reservation,
    Category::Corporate,
    Category::MobileApp,
    Category::CmsMedia,
    Category::WebApp,
    Category::Other,
  ];

  /// Resolve a wire key or one of the source-language labels
  pub fn lookup(label: &str) -> Lookup<Category> {
    let category = match label.trim() {
      "ecommerce" | "EC・通販" => Category::Ecommerce,
      "business_system" | "業務システム" => Category::BusinessSystem,
      "reservation" | "予約・管理" => Category::Reservation,
      "corporate" | "コーポレート" => Category::Corporate,
      "mobile_app" | "モバイルアプリ" => Category::MobileApp,
      "cms_media" | "CMS・メディア" => Category::CmsMedia,
      "web_app" | "Webアプリ" => Category::WebApp,
      "other" | "その他" => Category::Other,
      _ => return Lookup::Miss(Category::Other),
    };
    Lookup::Hit(category)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Category::Ecommerce => "ecommerce",
      Category::BusinessSystem => "business_system",
      Category::Reservation => "reservation",
      Category::Corporate => "corporate",
      Category::MobileApp => "mobile_app",
      Category::CmsMedia => "cms_media",
      Category::WebApp => "web_app",
      Category::Other => "other",
    }
  }

  /// Phase split before any duration or scale perturbation
  pub fn base_ratios(&self) -> PhaseRatios {
    match self {
      Category::Ecommerce => PhaseRatios::new(0.25, 0.45, 0.20, 0.10),
      Category::BusinessSystem => PhaseRatios::new(0.30, 0.50, 0.15, 0.05),
      Category::Reservation => PhaseRatios::new(0.20, 0.50, 0.20, 0.10),
      Category::Corporate => PhaseRatios::new(0.15, 0.40, 0.15, 0.30),
      Category::MobileApp | Category::CmsMedia | Category::WebApp | Category::Other => {
        PhaseRatios::new(0.20, 0.50, 0.20, 0.10)
      }
    }
  }

  /// Guess a category from free text such as a service name
  ///
  /// Keywords are checked in a fixed order; the first one found wins.
  pub fn infer(text: &str) -> Category {
    const KEYWORDS: &[(&str, Category)] = &[
      ("ec", Category::Ecommerce),
      ("shop", Category::Ecommerce),
      ("ショッピング", Category::Ecommerce),
      ("通販", Category::Ecommerce),
      ("予約", Category::Reservation),
      ("booking", Category::Reservation),
      ("reservation", Category::Reservation),
      ("業務", Category::BusinessSystem),
      ("システム", Category::BusinessSystem),
      ("管理", Category::BusinessSystem),
      ("system", Category::BusinessSystem),
      ("cms", Category::CmsMedia),
      ("コーポレート", Category::Corporate),
      ("企業", Category::Corporate),
      ("corporate", Category::Corporate),
      ("スマホ", Category::MobileApp),
      ("アプリ", Category::MobileApp),
      ("mobile", Category::MobileApp),
      ("web", Category::WebApp),
    ];

    let lowered = text.to_lowercase();
    KEYWORDS
      .iter()
      .find(|(keyword, _)| lowered.contains(keyword))
      .map_or(Category::Other, |(_, category)| *category)
  }
}

impl std::fmt::Display for Category {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}
