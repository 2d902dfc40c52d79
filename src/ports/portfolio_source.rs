//! Portfolio Source Port - Upstream Portfolio Retrieval
//!
//! One call per poll cycle, returning the farm map for a wallet or a
//! `FetchError` describing why the cycle has nothing to publish.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::portfolio::PortfolioResult;

/// Why a fetch produced no usable portfolio.
///
/// Every variant that saw an HTTP response keeps the status code and the
/// raw body so operators can read exactly what upstream sent back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
  /// The request never produced a response (DNS, connect, TLS, timeout).
  #[error("request failed: {message}")]
  Transport { message: String },

  /// Upstream answered with a non-2xx status.
  #[error("HTTP {status}: {body}")]
  Http { status: u16, body: String },

  /// The body was not the JSON envelope we expect.
  #[error("invalid JSON envelope (HTTP {status}): {reason}; body: {body}")]
  Decode {
    status: u16,
    reason: String,
    body: String,
  },

  /// The envelope reports failure: `message != "OK"` or `status != "1"`.
  #[error("upstream reported failure (HTTP {status}, message={message:?}, status={upstream_status:?}): {body}")]
  Upstream {
    status: u16,
    message: Option<String>,
    upstream_status: Option<String>,
    body: String,
  },

  /// Envelope was OK but `result` is absent or not an object.
  #[error("envelope has no result object (HTTP {status}): {body}")]
  MissingResult { status: u16, body: String },
}

impl FetchError {
  /// HTTP status of the response, if one was received.
  pub const fn status(&self) -> Option<u16> {
    match self {
      Self::Transport { .. } => None,
      Self::Http { status, .. }
      | Self::Decode { status, .. }
      | Self::Upstream { status, .. }
      | Self::MissingResult { status, .. } => Some(*status),
    }
  }

  /// Raw response body, if one was received.
  pub fn body(&self) -> Option<&str> {
    match self {
      Self::Transport { .. } => None,
      Self::Http { body, .. }
      | Self::Decode { body, .. }
      | Self::Upstream { body, .. }
      | Self::MissingResult { body, .. } => Some(body),
    }
  }

  /// Short machine-friendly tag, used as a log field.
  pub const fn kind(&self) -> &'static str {
    match self {
      Self::Transport { .. } => "transport",
      Self::Http { .. } => "http",
      Self::Decode { .. } => "decode",
      Self::Upstream { .. } => "upstream",
      Self::MissingResult { .. } => "missing_result",
    }
  }
}

/// Source of wallet portfolios.
///
/// The production implementation is the yieldwatch HTTP client. Errors
/// are never retried here; the poll loop simply tries again next cycle.
#[async_trait]
pub trait PortfolioSource: Send + Sync + 'static {
  /// Fetch the current portfolio of `wallet`.
  async fn fetch(&self, wallet: &str) -> Result<PortfolioResult, FetchError>;
}
