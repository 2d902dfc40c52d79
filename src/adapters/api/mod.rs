//! yieldwatch API Adapter
//!
//! HTTP implementation of the `PortfolioSource` port.
//!
//! Sub-modules:
//! - `client`: reqwest client with bounded timeout
//! - `types`: response envelope, rate-limit headers, envelope validation

pub mod client;
pub mod types;

pub use client::{YieldwatchClient, YieldwatchClientConfig};
