//! Poller Use Case - Fixed-Interval Fetch → Translate → Publish
//!
//! Drives one poll cycle every `interval` until the cancellation token
//! fires. Nothing that happens inside a cycle stops the loop: fetch
//! failures bump the error counter, malformed vaults are skipped.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::adapters::metrics::ExporterMetrics;
use crate::domain::translate::translate;
use crate::ports::{FetchError, PortfolioSource};

/// Outcome of a successful poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
  /// Farms in the response, eligible or not.
  pub farms: usize,
  /// Vaults whose samples were published.
  pub vaults: usize,
  /// Vaults skipped as malformed.
  pub skipped: usize,
  /// Gauge samples written.
  pub samples: usize,
}

/// Periodic poller for a single wallet.
pub struct Poller<S: PortfolioSource> {
  source: Arc<S>,
  metrics: Arc<ExporterMetrics>,
  wallet: String,
  interval: Duration,
}

impl<S: PortfolioSource> Poller<S> {
  /// Create a new poller.
  pub fn new(
    source: Arc<S>,
    metrics: Arc<ExporterMetrics>,
    wallet: impl Into<String>,
    interval: Duration,
  ) -> Self {
    Self {
      source,
      metrics,
      wallet: wallet.into(),
      interval,
    }
  }

  /// Wallet being polled.
  pub fn wallet(&self) -> &str {
    &self.wallet
  }

  /// Run a single poll cycle.
  ///
  /// On fetch failure the error counter is incremented exactly once and
  /// nothing is published.
  pub async fn poll_once(&self) -> Result<CycleReport, FetchError> {
    let result = match self.source.fetch(&self.wallet).await {
      Ok(result) => result,
      Err(e) => {
        warn!(
          kind = e.kind(),
          status = ?e.status(),
          body = e.body().unwrap_or_default(),
          "yieldwatch fetch failed"
        );
        self.metrics.errors.inc();
        return Err(e);
      }
    };

    let translation = translate(&result, &self.wallet, self.metrics.schema());

    for farm in &translation.invalid_farms {
      warn!(farm = %farm, "vaults.vaults is not a list, farm skipped");
    }
    for skipped in &translation.skipped {
      warn!(error = %skipped, "Skipping malformed vault");
    }
    self
      .metrics
      .malformed_vaults
      .inc_by(translation.skipped.len() as u64);

    let samples = match self.metrics.publish(&translation.samples) {
      Ok(n) => n,
      Err(e) => {
        warn!(error = %e, "Failed to publish vault samples");
        0
      }
    };

    let report = CycleReport {
      farms: result.farm_count(),
      vaults: translation.vaults,
      skipped: translation.skipped.len(),
      samples,
    };
    debug!(?report, "Poll cycle complete");
    Ok(report)
  }

  /// Poll until `shutdown` is cancelled.
  ///
  /// The token is honoured between cycles, while sleeping, and while a
  /// request is in flight (the request future is dropped).
  #[instrument(skip(self, shutdown), fields(wallet = %self.wallet))]
  pub async fn run(&self, shutdown: CancellationToken) {
    info!(interval_secs = self.interval.as_secs_f64(), "Poller started");

    loop {
      if shutdown.is_cancelled() {
        break;
      }

      tokio::select! {
        biased;
        () = shutdown.cancelled() => break,
        _ = self.poll_once() => {}
      }

      debug!(
        interval_secs = self.interval.as_secs_f64(),
        "Waiting before next poll to respect the yieldwatch rate limit"
      );

      tokio::select! {
        biased;
        () = shutdown.cancelled() => break,
        () = tokio::time::sleep(self.interval) => {}
      }
    }

    info!("Poller stopped");
  }
}
