use thiserror::Error;

/// Everything the estimation engine can fail with
///
/// Only `UpstreamAnalysis` is meant to reach a user as-is. The corpus and index
/// variants degrade to default estimates, and the persistence variants tell the
/// store to rebuild from scratch.
#[derive(Error, Debug)]
pub enum GaugeError {
  #[error("Corpus is empty; nothing to index")]
  EmptyCorpus,

  #[error("Vector index has not been fitted")]
  IndexNotReady,

  #[error("Malformed record on line {line}: {reason}")]
  MalformedRecord { line: usize, reason: String },

  #[error("Analysis service failed: {message}")]
  UpstreamAnalysis { message: String },

  #[error("Snapshot I/O failed for {path}: {message}")]
  SnapshotIo { path: String, message: String },

  #[error("Snapshot artifact is not readable: {message}")]
  SnapshotFormat { message: String },

  #[error("Corpus I/O failed for {path}: {message}")]
  CorpusIo { path: String, message: String },

  #[error("Estimation failed: {message}")]
  Internal { message: String },
}

impl GaugeError {
  pub fn malformed_record(line: usize, reason: impl Into<String>) -> Self {
    Self::MalformedRecord { line, reason: reason.into() }
  }

  pub fn upstream_analysis(message: impl Into<String>) -> Self {
    Self::UpstreamAnalysis { message: message.into() }
  }

  pub fn snapshot_io(path: impl AsRef<std::path::Path>, message: impl Into<String>) -> Self {
    Self::SnapshotIo { path: path.as_ref().display().to_string(), message: message.into() }
  }

  pub fn snapshot_format(message: impl Into<String>) -> Self {
    Self::SnapshotFormat { message: message.into() }
  }

  pub fn corpus_io(path: impl AsRef<std::path::Path>, message: impl Into<String>) -> Self {
    Self::CorpusIo { path: path.as_ref().display().to_string(), message: message.into() }
  }

  pub fn internal(message: impl Into<String>) -> Self {
    Self::Internal { message: message.into() }
  }

  /// Whether a persisted artifact should be discarded and rebuilt
  pub fn is_rebuild_signal(&self) -> bool {
    matches!(self, Self::SnapshotIo { .. } | Self::SnapshotFormat { .. } | Self::CorpusIo { .. })
  }
}

pub type Result<T> = std::result::Result<T, GaugeError>;
