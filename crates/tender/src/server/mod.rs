//! REST API module for the tender service
//!
//! Provides HTTP endpoints for project estimates and index maintenance.
//! Uses axum for routing and schemars for OpenAPI documentation generation.

pub mod handlers;
pub mod middleware;
pub mod routing;
pub mod startup;
pub mod state;
pub mod types;
