//! Prometheus Metrics Registry - Vault Position Gauges
//!
//! Owns the process-wide registry: one `GaugeVec` per vault metric plus
//! the error counters. Created once in `main`, shared behind an `Arc`
//! between the poll loop (writes) and the `/metrics` handler (reads).
//! Per-series storage in the prometheus crate is atomic, so no extra
//! locking is needed here.
//!
//! On Linux the standard `process_*` series (CPU, RSS, open fds, start
//! time) are registered alongside the vault gauges.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use prometheus::{Encoder, GaugeVec, IntCounter, Opts, Registry, TextEncoder};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

use crate::domain::translate::{LabelSchema, MetricSample, VaultMetric};

/// Fatal failure while bringing the exporter up.
#[derive(Debug, Error)]
pub enum StartupError {
    /// The metrics listener could not bind its port.
    #[error("failed to bind metrics listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// All metrics exported for the tracked wallet.
pub struct ExporterMetrics {
    /// Prometheus registry.
    registry: Registry,
    /// Label layout the vault gauges were created with.
    schema: LabelSchema,
    /// One gauge family per vault metric, indexed by `metric as usize`.
    gauges: [GaugeVec; VaultMetric::COUNT],
    /// Failed fetches (transport, HTTP, envelope).
    pub errors: IntCounter,
    /// Vault records skipped because a required field was missing.
    pub malformed_vaults: IntCounter,
}

impl ExporterMetrics {
    /// Create and register all metrics using `schema` for the vault gauges.
    pub fn new(schema: LabelSchema) -> prometheus::Result<Self> {
        let registry = Registry::new();

        let mut built = Vec::with_capacity(VaultMetric::COUNT);
        for metric in VaultMetric::ALL {
            let gauge = GaugeVec::new(
                Opts::new(metric.name(), metric.help()),
                schema.label_names(metric),
            )?;
            registry.register(Box::new(gauge.clone()))?;
            built.push(gauge);
        }
        let gauges: [GaugeVec; VaultMetric::COUNT] = built
            .try_into()
            .map_err(|_| prometheus::Error::Msg("vault gauge count mismatch".to_string()))?;

        let errors = IntCounter::new("yieldwatch_errors_total", "YieldWatch API errors")?;
        let malformed_vaults = IntCounter::new(
            "yieldwatch_malformed_vaults_total",
            "Vault records skipped for missing or invalid fields",
        )?;

        registry.register(Box::new(errors.clone()))?;
        registry.register(Box::new(malformed_vaults.clone()))?;

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        Ok(Self {
            registry,
            schema,
            gauges,
            errors,
            malformed_vaults,
        })
    }

    /// Label layout of the vault gauges.
    pub const fn schema(&self) -> LabelSchema {
        self.schema
    }

    /// Gauge family backing `metric`.
    pub const fn gauge(&self, metric: VaultMetric) -> &GaugeVec {
        &self.gauges[metric as usize]
    }

    /// Overwrite the gauges with `samples`. Returns how many were written.
    ///
    /// Series that are not part of `samples` keep their previous value.
    pub fn publish(&self, samples: &[MetricSample]) -> prometheus::Result<usize> {
        for sample in samples {
            self.gauge(sample.metric)
                .get_metric_with_label_values(&sample.label_values())?
                .set(sample.value);
        }
        Ok(samples.len())
    }

    /// Encode the registry in the Prometheus text format.
    pub fn render(&self) -> prometheus::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Bind the metrics listener. Failing here is fatal for the process.
    pub async fn bind(addr: SocketAddr) -> Result<TcpListener, StartupError> {
        TcpListener::bind(addr)
            .await
            .map_err(|source| StartupError::Bind { addr, source })
    }

    /// Serve `/metrics` on `listener` until `shutdown` is cancelled.
    #[instrument(skip_all)]
    pub async fn serve(
        self: Arc<Self>,
        listener: TcpListener,
        shutdown: CancellationToken,
    ) -> anyhow::Result<()> {
        let app = Router::new().route(
            "/metrics",
            get(move || {
                let metrics = Arc::clone(&self);
                async move {
                    match metrics.render() {
                        Ok(body) => (StatusCode::OK, body),
                        Err(e) => {
                            error!(error = %e, "Failed to encode metrics");
                            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
                        }
                    }
                }
            }),
        );

        if let Ok(addr) = listener.local_addr() {
            info!(address = %addr, "Prometheus metrics server started");
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        Ok(())
    }
}
