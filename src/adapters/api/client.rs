//! yieldwatch HTTP Client
//!
//! Wraps reqwest with a bounded timeout and implements the
//! `PortfolioSource` port. One GET per call, no retries: the poll
//! interval is the only pacing the exporter applies.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::types::{parse_envelope, RateLimitInfo, SUPPORTED_PLATFORMS};
use crate::domain::portfolio::PortfolioResult;
use crate::ports::{FetchError, PortfolioSource};

/// Configuration for the yieldwatch HTTP client.
#[derive(Debug, Clone)]
pub struct YieldwatchClientConfig {
  /// Base URL, without trailing path.
  pub base_url: String,
  /// Request timeout.
  pub timeout: Duration,
}

impl Default for YieldwatchClientConfig {
  fn default() -> Self {
    Self {
      base_url: "https://www.yieldwatch.net".to_string(),
      timeout: Duration::from_secs(10),
    }
  }
}

/// HTTP client for the yieldwatch portfolio API.
pub struct YieldwatchClient {
  /// Underlying HTTP client.
  http: Client,
  /// Client configuration.
  config: YieldwatchClientConfig,
  /// Rate limit headers of the last response.
  last_rate_limit: RwLock<Option<RateLimitInfo>>,
}

impl YieldwatchClient {
  /// Create a new yieldwatch client.
  pub fn new(config: YieldwatchClientConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(config.timeout)
      .user_agent(concat!("yieldwatch-exporter/", env!("CARGO_PKG_VERSION")))
      .build()
      .context("Failed to build HTTP client")?;

    Ok(Self {
      http,
      config,
      last_rate_limit: RwLock::new(None),
    })
  }

  /// URL of the portfolio endpoint for `wallet`. The wallet is used verbatim.
  pub fn portfolio_url(&self, wallet: &str) -> String {
    format!(
      "{}/api/all/{}",
      self.config.base_url.trim_end_matches('/'),
      wallet
    )
  }

  /// Rate limit headers seen on the most recent response, if any.
  pub async fn rate_limit_status(&self) -> Option<RateLimitInfo> {
    self.last_rate_limit.read().await.clone()
  }
}

#[async_trait]
impl PortfolioSource for YieldwatchClient {
  #[instrument(skip(self))]
  async fn fetch(&self, wallet: &str) -> Result<PortfolioResult, FetchError> {
    let url = self.portfolio_url(wallet);

    let response = self
      .http
      .get(&url)
      .query(&[("platforms", SUPPORTED_PLATFORMS)])
      .send()
      .await
      .map_err(|e| FetchError::Transport {
        message: e.to_string(),
      })?;

    let rate_limit = rate_limit_from_headers(response.headers());
    debug!(
      remaining = rate_limit.remaining.as_deref().unwrap_or("-"),
      limit = rate_limit.limit.as_deref().unwrap_or("-"),
      reset = rate_limit.reset.as_deref().unwrap_or("-"),
      "Remaining yieldwatch rate limit"
    );
    *self.last_rate_limit.write().await = Some(rate_limit);

    let status = response.status().as_u16();
    let body = response.text().await.map_err(|e| FetchError::Transport {
      message: format!("failed to read body (HTTP {status}): {e}"),
    })?;

    parse_envelope(status, &body)
  }
}

/// Extract rate limit info from response headers.
pub fn rate_limit_from_headers(headers: &HeaderMap) -> RateLimitInfo {
  RateLimitInfo {
    remaining: header_text(headers, "x-ratelimit-remaining"),
    limit: header_text(headers, "x-ratelimit-limit"),
    reset: header_text(headers, "x-ratelimit-reset"),
  }
}

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
  headers
    .get(name)
    .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
}
