//! Domain layer - portfolio model and metric translation.
//!
//! Pure logic only: nothing here touches the network or the metric
//! registry, so every rule can be tested from plain JSON fixtures.

pub mod portfolio;
pub mod translate;

pub use portfolio::{MalformedVaultError, PortfolioResult, VaultFarm, VaultRecord};
pub use translate::{translate, LabelSchema, MetricSample, Translation, VaultMetric};
