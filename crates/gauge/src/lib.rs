//! Gauge - similarity-weighted project estimation
//!
//! Historical projects are indexed with TF-IDF; a query retrieves its nearest
//! neighbors, blends their hours and cost by similarity, and adjusts the blend
//! for delivery window, audience scale and complexity before splitting it into
//! priced phases.
//!
//! ```no_run
//! use gauge::{CorpusSource, EngineConfig, EstimateRequest, Estimator, SnapshotStore};
//!
//! # fn main() -> gauge::Result<()> {
//! let config = EngineConfig::default();
//! let store = SnapshotStore::new(None, config.max_features);
//! store.warm_start(&CorpusSource::sample())?;
//!
//! let estimator = Estimator::new(config)?;
//! let request = EstimateRequest {
//!   description: "Online booking for a hair salon".to_string(),
//!   duration: "3months".to_string(),
//!   users: "small".to_string(),
//!   category: None,
//! };
//! let result = estimator.estimate(&store.current(), &request, None);
//! println!("{} hours, {} yen", result.total_hours, result.total_cost);
//! # Ok(())
//! # }
//! ```

pub mod adjust;
pub mod aggregate;
pub mod analysis;
pub mod config;
pub mod corpus;
pub mod error;
pub mod estimate;
pub mod features;
pub mod index;
pub mod ingest;
pub mod phases;
pub mod record;
pub mod search;
pub mod snapshot;
pub mod store;
pub mod tables;

pub use analysis::{AnalysisProvider, ProjectAnalysis};
pub use config::EngineConfig;
pub use corpus::CorpusSource;
pub use error::{GaugeError, Result};
pub use estimate::{EstimateRequest, EstimateResult, Estimator};
pub use record::ProjectRecord;
pub use snapshot::Snapshot;
pub use store::{SnapshotStore, StoreStatus, WarmStart};
