//! Use Cases Layer - Application Workflows
//!
//! - `Poller`: fixed-interval fetch → translate → publish loop
//! - `run_until_shutdown`: poller + metrics server lifecycle, exit status

pub mod poller;
pub mod supervisor;

pub use poller::{CycleReport, Poller};
pub use supervisor::run_until_shutdown;
