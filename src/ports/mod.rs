//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces the poll loop needs from the outside world.
//! Adapters implement these traits; tests replace them with mocks.

pub mod portfolio_source;

pub use portfolio_source::{FetchError, PortfolioSource};
