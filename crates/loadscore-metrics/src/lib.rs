//! Loadscore Metrics - per-node utilization telemetry
//!
//! This crate provides:
//! - The `MetricsSource` trait for per-node readings
//! - A Prometheus instant-query client
//! - Response extraction and numeric parsing
//! - An in-memory source for tests

// Allow unused assignments for diagnostic fields - they're used by the thiserror/miette macros
#![allow(unused_assignments)]

pub mod client;
pub mod error;
pub mod mock;
pub mod query;
pub mod response;
pub mod source;
pub mod types;

// Re-export commonly used types
pub use client::{PrometheusClient, TelemetryConfig};
pub use error::{MetricsError, Result};
pub use mock::StaticMetricsSource;
pub use source::{collect, MetricsSource};
pub use types::{MetricFailure, MetricKind, MetricsSnapshot, NodeMetrics};
