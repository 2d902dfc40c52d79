//! Exporter Supervisor - Poll Loop + Metrics Server Lifecycle
//!
//! Runs the poller next to the already-spawned `/metrics` server task and
//! decides how the process ends. A stop signal is a clean shutdown; the
//! server task ending on its own is fatal and surfaces as an error so the
//! binary exits non-zero.

use std::future::Future;
use std::time::Duration;

use anyhow::anyhow;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::poller::Poller;
use crate::ports::PortfolioSource;

/// How long the server gets to drain after the poller has stopped.
const SERVER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Drive `poller` until `stop` resolves, `shutdown` is cancelled, or the
/// metrics server exits.
///
/// Returns `Err` when the server task finished before shutdown was
/// requested, whatever its own result was.
pub async fn run_until_shutdown<S, F>(
  poller: &Poller<S>,
  mut server: JoinHandle<anyhow::Result<()>>,
  shutdown: CancellationToken,
  stop: F,
) -> anyhow::Result<()>
where
  S: PortfolioSource,
  F: Future<Output = ()>,
{
  let watcher = async {
    let failure = tokio::select! {
      biased;
      () = stop => {
        info!("SIGINT received, stopping");
        None
      }
      () = shutdown.cancelled() => None,
      joined = &mut server => {
        let err = server_failure(joined);
        error!(error = %err, "Metrics server failed, stopping");
        Some(err)
      }
    };
    shutdown.cancel();
    failure
  };

  let ((), failure) = tokio::join!(poller.run(shutdown.clone()), watcher);

  if let Some(err) = failure {
    return Err(err);
  }

  match tokio::time::timeout(SERVER_DRAIN_TIMEOUT, server).await {
    Ok(Ok(Ok(()))) => {}
    Ok(joined) => warn!(error = %server_failure(joined), "Metrics server did not stop cleanly"),
    Err(_) => warn!(
      timeout_secs = SERVER_DRAIN_TIMEOUT.as_secs(),
      "Metrics server still draining, giving up"
    ),
  }
  Ok(())
}

fn server_failure(joined: Result<anyhow::Result<()>, JoinError>) -> anyhow::Error {
  match joined {
    Ok(Ok(())) => anyhow!("metrics server stopped unexpectedly"),
    Ok(Err(e)) => e.context("metrics server failed"),
    Err(e) => anyhow::Error::new(e).context("metrics server task aborted"),
  }
}
