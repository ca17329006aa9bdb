//! Persistent event journal
//!
//! Long-running services write structured entries to a JSONL file so that
//! the `/logs` endpoint can serve them back. Writes are serialized through an
//! internal async mutex; every entry is also echoed to the terminal unless the
//! journal was opened quiet.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

#[cfg(feature = "schemars")]
use schemars::JsonSchema;

use crate::Level;

/// HTTP request details attached to an entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
pub struct RequestTrace {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub request_id: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub method: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub path: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub status_code: Option<u16>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub duration_ms: Option<f64>,
}

/// One line of the journal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
pub struct JournalEntry {
  pub timestamp: DateTime<Utc>,
  pub level: Level,
  pub message: String,
  pub component: String,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub trace: Option<RequestTrace>,
}

struct JournalFile {
  path: PathBuf,
  quiet: bool,
}

impl JournalFile {
  fn open(path: &Path, quiet: bool) -> io::Result<Self> {
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)?;
    }
    if !path.exists() {
      File::create(path)?;
    }
    Ok(Self { path: path.to_path_buf(), quiet })
  }

  fn append(&self, entry: &JournalEntry) -> io::Result<()> {
    let line = serde_json::to_string(entry)
      .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
    writeln!(file, "{line}")?;
    file.flush()
  }

  /// Most recent `limit` entries, oldest first
  fn tail(&self, limit: Option<usize>, level: Option<Level>) -> io::Result<Vec<JournalEntry>> {
    if !self.path.exists() {
      return Ok(Vec::new());
    }

    let reader = BufReader::new(File::open(&self.path)?);
    let mut entries = Vec::new();

    for line in reader.lines() {
      let line = line?;
      if line.trim().is_empty() {
        continue;
      }
      // Torn or hand-edited lines are skipped
      let Ok(entry) = serde_json::from_str::<JournalEntry>(&line) else {
        continue;
      };
      if level.is_none_or(|wanted| entry.level == wanted) {
        entries.push(entry);
      }
    }

    if let Some(limit) = limit {
      let skip = entries.len().saturating_sub(limit);
      entries.drain(..skip);
    }

    Ok(entries)
  }
}

/// Thread-safe JSONL journal; clones share the same file
#[derive(Clone)]
pub struct Journal {
  inner: Arc<Mutex<JournalFile>>,
}

impl Journal {
  /// Open (or create) a journal that also echoes to the terminal
  pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
    Self::open_with_echo(path, true)
  }

  /// Open a journal that only writes to disk
  pub fn open_quiet<P: AsRef<Path>>(path: P) -> io::Result<Self> {
    Self::open_with_echo(path, false)
  }

  fn open_with_echo<P: AsRef<Path>>(path: P, echo: bool) -> io::Result<Self> {
    let file = JournalFile::open(path.as_ref(), !echo)?;
    Ok(Self { inner: Arc::new(Mutex::new(file)) })
  }

  /// Append an entry, reporting I/O failures
  pub async fn record(
    &self,
    level: Level,
    message: &str,
    component: &str,
    trace: Option<RequestTrace>,
  ) -> io::Result<()> {
    let entry = JournalEntry {
      timestamp: Utc::now(),
      level,
      message: message.to_string(),
      component: component.to_string(),
      trace,
    };

    let guard = self.inner.lock().await;
    guard.append(&entry)?;
    if !guard.quiet {
      crate::emit(level, message);
    }
    Ok(())
  }

  /// Append an entry; failures to write are dropped
  pub async fn log(&self, level: Level, message: &str, component: &str) {
    let _ = self.record(level, message, component, None).await;
  }

  pub async fn info(&self, message: &str, component: &str) {
    self.log(Level::Info, message, component).await;
  }

  pub async fn success(&self, message: &str, component: &str) {
    self.log(Level::Success, message, component).await;
  }

  pub async fn warn(&self, message: &str, component: &str) {
    self.log(Level::Warn, message, component).await;
  }

  pub async fn error(&self, message: &str, component: &str) {
    self.log(Level::Error, message, component).await;
  }

  /// Read back the newest entries, optionally restricted to one level
  pub async fn tail(
    &self,
    limit: Option<usize>,
    level: Option<Level>,
  ) -> io::Result<Vec<JournalEntry>> {
    let guard = self.inner.lock().await;
    guard.tail(limit, level)
  }
}
