//! Herald - terminal logging for the tender workspace
//!
//! ## Features
//!
//! - Leveled logging (debug, verbose, info, success, warn, error) to stderr
//! - Multi-line messages keep the level prefix on every line
//! - A process-wide threshold so binaries can silence chatty levels
//! - Timestamped `event` lines for long-running jobs (index rebuilds)
//! - Banner announcements for startup and shutdown
//! - With the `journal` feature, a persistent JSONL [`journal::Journal`]
//!
//! ## Usage
//!
//! The macros take `format!` arguments: `herald::info!("loaded {} records", n)`.

use chrono::Local;
use colored::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU8, Ordering};

#[cfg(feature = "journal")]
pub mod journal;

const PREFIX_WIDTH: usize = 7;

static THRESHOLD: AtomicU8 = AtomicU8::new(Level::Verbose as u8);

/// Severity of a log line, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum Level {
  Debug = 0,
  Verbose = 1,
  Info = 2,
  Success = 3,
  Warn = 4,
  Error = 5,
}

impl Level {
  /// Name used in journals and query filters
  pub fn as_str(&self) -> &'static str {
    match self {
      Level::Debug => "debug",
      Level::Verbose => "verbose",
      Level::Info => "info",
      Level::Success => "success",
      Level::Warn => "warn",
      Level::Error => "error",
    }
  }

  /// Short tag printed inside the terminal prefix
  fn tag(&self) -> &'static str {
    match self {
      Level::Debug => "debug",
      Level::Verbose => "verb",
      Level::Info => "info",
      Level::Success => "sccs",
      Level::Warn => "warn",
      Level::Error => "error",
    }
  }

  fn color(&self) -> Color {
    match self {
      Level::Debug => Color::Magenta,
      Level::Verbose => Color::Cyan,
      Level::Info => Color::Blue,
      Level::Success => Color::Green,
      Level::Warn => Color::Yellow,
      Level::Error => Color::Red,
    }
  }

  /// Parse a level name, accepting the short terminal tags as well
  pub fn parse(name: &str) -> Option<Level> {
    match name.trim().to_ascii_lowercase().as_str() {
      "debug" => Some(Level::Debug),
      "verbose" | "verb" => Some(Level::Verbose),
      "info" => Some(Level::Info),
      "success" | "sccs" => Some(Level::Success),
      "warn" | "warning" => Some(Level::Warn),
      "error" => Some(Level::Error),
      _ => None,
    }
  }

  fn from_u8(value: u8) -> Level {
    match value {
      0 => Level::Debug,
      1 => Level::Verbose,
      2 => Level::Info,
      3 => Level::Success,
      4 => Level::Warn,
      _ => Level::Error,
    }
  }
}

impl std::fmt::Display for Level {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Set the lowest level that reaches the terminal
pub fn set_threshold(level: Level) {
  THRESHOLD.store(level as u8, Ordering::Relaxed);
}

/// The lowest level that currently reaches the terminal
pub fn threshold() -> Level {
  Level::from_u8(THRESHOLD.load(Ordering::Relaxed))
}

/// Whether a message at `level` would be printed
pub fn enabled(level: Level) -> bool {
  level >= threshold()
}

/// Colored, padded prefix for a level, e.g. `[warn]  `
pub fn prefix(level: Level) -> String {
  let tag = level.tag();
  let pad = PREFIX_WIDTH.saturating_sub(tag.len() + 2);
  format!("[{}]{:<pad$}", tag.color(level.color()).bold(), "")
}

/// Lines that `emit` would print for a message
pub fn render(level: Level, message: &str) -> Vec<String> {
  let prefix = prefix(level);
  message.lines().map(|line| format!("{prefix} {line}")).collect()
}

/// Print a message at the given level to stderr
pub fn emit(level: Level, message: &str) {
  if !enabled(level) {
    return;
  }
  for line in render(level, message) {
    eprintln!("{line}");
  }
}

pub fn debug(message: &str) {
  emit(Level::Debug, message);
}

pub fn verbose(message: &str) {
  emit(Level::Verbose, message);
}

/// General information
pub fn info(message: &str) {
  emit(Level::Info, message);
}

/// Something completed successfully
pub fn success(message: &str) {
  emit(Level::Success, message);
}

/// Something needs attention but work continues
pub fn warn(message: &str) {
  emit(Level::Warn, message);
}

/// Something went wrong
pub fn error(message: &str) {
  emit(Level::Error, message);
}

/// Timestamped line for background jobs
pub fn event(level: Level, message: &str) {
  if !enabled(level) {
    return;
  }
  let timestamp = Local::now().format("%H:%M:%S").to_string();
  let head = format!("[{}] [{}]", "event".color(level.color()).bold(), timestamp.cyan());
  for line in message.lines() {
    eprintln!("{head} {line}");
  }
}

/// Surround a message with border lines
pub fn banner(message: &str, width: usize, border: char) -> String {
  let rule = border.to_string().repeat(width);
  format!("{rule}\n{message}\n{rule}")
}

/// Bannered announcement, always printed
pub fn announce(message: &str) {
  for line in banner(message, 50, '-').lines() {
    eprintln!("{}", line.blue().bold());
  }
}

#[macro_export]
macro_rules! debug {
  ($($arg:tt)*) => {
    $crate::debug(&format!($($arg)*)) // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! verbose {
  ($($arg:tt)*) => {
    $crate::verbose(&format!($($arg)*)) // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => {
    $crate::info(&format!($($arg)*)) // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => {
    $crate::success(&format!($($arg)*)) // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! warn {
  ($($arg:tt)*) => {
    $crate::warn(&format!($($arg)*)) // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => {
    $crate::error(&format!($($arg)*)) // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! event {
  ($level:expr, $($arg:tt)*) => {
    $crate::event($level, &format!($($arg)*)) // LCOV_EXCL_LINE
  };
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_levels_are_ordered_by_severity() {
    assert!(Level::Debug < Level::Info);
    assert!(Level::Warn < Level::Error);
    assert!(Level::Success > Level::Info);
  }

  #[test]
  fn test_parse_accepts_names_and_tags() {
    assert_eq!(Level::parse("info"), Some(Level::Info));
    assert_eq!(Level::parse("WARN"), Some(Level::Warn));
    assert_eq!(Level::parse("warning"), Some(Level::Warn));
    assert_eq!(Level::parse("sccs"), Some(Level::Success));
    assert_eq!(Level::parse("verb"), Some(Level::Verbose));
    assert_eq!(Level::parse("loud"), None);
  }

  #[test]
  fn test_render_prefixes_every_line() {
    colored::control::set_override(false);
    let lines = render(Level::Warn, "first\nsecond");
    assert_eq!(lines, vec!["[warn]  first".to_string(), "[warn]  second".to_string()]);
  }

  #[test]
  fn test_prefix_width_is_stable_for_long_tags() {
    colored::control::set_override(false);
    assert_eq!(prefix(Level::Error), "[error]");
    assert_eq!(prefix(Level::Info), "[info] ");
  }

  #[test]
  fn test_banner_wraps_message() {
    let text = banner("hello", 5, '=');
    assert_eq!(text, "=====\nhello\n=====");
  }

  #[test]
  fn test_level_serializes_lowercase() {
    let json = serde_json::to_string(&Level::Success).unwrap();
    assert_eq!(json, "\"success\"");
    let parsed: Level = serde_json::from_str("\"error\"").unwrap();
    assert_eq!(parsed, Level::Error);
  }
}
