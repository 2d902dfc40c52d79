//! Metrics Adapter
//!
//! Prometheus registry for vault gauges and error counters, exposed on
//! `/metrics` via axum 0.7.

pub mod registry;

pub use registry::{ExporterMetrics, StartupError};
