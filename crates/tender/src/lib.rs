//! Tender - REST front end for gauge project estimates
//!
//! Serves estimates over HTTP, keeps the index snapshot fresh in the
//! background and optionally enriches queries through an external analysis
//! service.

pub mod analysis_client;
pub mod config;
pub mod refresh;
pub mod server;
