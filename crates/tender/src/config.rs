//! Service configuration
//!
//! Loaded from YAML (`--config`, then `./tender.yaml`, then built-in
//! defaults). File locations default to a data directory that can be moved
//! with the `TENDER_DATA_DIR` environment variable.

use gauge::EngineConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "TENDER_DATA_DIR";

/// Config file picked up from the working directory
pub const LOCAL_CONFIG_FILE: &str = "tender.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Failed to read config {path}: {source}")]
  Read {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("Invalid config {path}: {message}")]
  Parse { path: String, message: String },

  #[error("Invalid engine settings: {0}")]
  Engine(#[from] gauge::GaugeError),
}

/// Top-level service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
  /// Address the REST server binds to
  #[serde(default = "default_bind")]
  pub bind: SocketAddr,

  /// Directory holding the corpus, snapshot and journal
  #[serde(default)]
  pub data_dir: Option<PathBuf>,

  /// Raw scraper output (JSON Lines)
  #[serde(default)]
  pub corpus_path: Option<PathBuf>,

  /// Persisted index snapshot
  #[serde(default)]
  pub snapshot_path: Option<PathBuf>,

  /// Event journal served by `/logs`
  #[serde(default)]
  pub journal_path: Option<PathBuf>,

  /// Hours between background index rebuilds; 0 disables them
  #[serde(default = "default_refresh_interval_hours")]
  pub refresh_interval_hours: u64,

  /// External project analysis service, if any
  #[serde(default)]
  pub analysis: Option<AnalysisConfig>,

  #[serde(default)]
  pub engine: EngineConfig,
}

/// Where to reach the project analysis service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
  pub url: String,

  #[serde(default = "default_analysis_timeout_secs")]
  pub timeout_secs: u64,
}

// Default value functions
fn default_bind() -> SocketAddr {
  SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn default_refresh_interval_hours() -> u64 {
  24
}

fn default_analysis_timeout_secs() -> u64 {
  30
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      bind: default_bind(),
      data_dir: None,
      corpus_path: None,
      snapshot_path: None,
      journal_path: None,
      refresh_interval_hours: default_refresh_interval_hours(),
      analysis: None,
      engine: EngineConfig::default(),
    }
  }
}

impl AnalysisConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }
}

impl ServerConfig {
  /// Parse a YAML document; missing keys take their defaults
  pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
    Self::parse(content, "<inline>")
  }

  fn parse(content: &str, origin: &str) -> Result<Self, ConfigError> {
    let config: ServerConfig = if content.trim().is_empty() {
      ServerConfig::default()
    } else {
      serde_yaml::from_str(content)
        .map_err(|e| ConfigError::Parse { path: origin.to_string(), message: e.to_string() })?
    };
    config.engine.validate()?;
    Ok(config)
  }

  /// Read an explicit config file
  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    let origin = path.display().to_string();
    let content = std::fs::read_to_string(path)
      .map_err(|source| ConfigError::Read { path: origin.clone(), source })?;
    Self::parse(&content, &origin)
  }

  /// Use `explicit` if given, else `./tender.yaml` if present, else defaults
  pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
    if let Some(path) = explicit {
      return Self::from_file(path);
    }

    let local = Path::new(LOCAL_CONFIG_FILE);
    if local.exists() {
      return Self::from_file(local);
    }

    Ok(Self::default())
  }

  /// Resolve the data directory: environment, then config, then `~/.tender`
  pub fn data_dir(&self) -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
      if !dir.trim().is_empty() {
        return PathBuf::from(dir);
      }
    }

    if let Some(dir) = &self.data_dir {
      return dir.clone();
    }

    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".tender")
  }

  pub fn corpus_path(&self) -> PathBuf {
    self.corpus_path.clone().unwrap_or_else(|| self.data_dir().join("corpus.jsonl"))
  }

  pub fn snapshot_path(&self) -> PathBuf {
    self.snapshot_path.clone().unwrap_or_else(|| self.data_dir().join("snapshot.json"))
  }

  pub fn journal_path(&self) -> PathBuf {
    self.journal_path.clone().unwrap_or_else(|| self.data_dir().join("tender.logs.jsonl"))
  }

  /// Interval of the background rebuild, `None` when disabled
  pub fn refresh_interval(&self) -> Option<Duration> {
    (self.refresh_interval_hours > 0)
      .then(|| Duration::from_secs(self.refresh_interval_hours * 60 * 60))
  }
}
