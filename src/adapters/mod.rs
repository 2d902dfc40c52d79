//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Concrete implementations of the ports plus the metrics endpoint.
//!
//! Adapter categories:
//! - `api`: yieldwatch REST client
//! - `metrics`: Prometheus registry and `/metrics` server

pub mod api;
pub mod metrics;
