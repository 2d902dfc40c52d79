//! yieldwatch API Response Types
//!
//! The response envelope and the rate-limit headers, plus the pure
//! envelope validation used by the client.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::portfolio::PortfolioResult;
use crate::ports::FetchError;

/// Platforms queried on every request. Staking-only platforms are not
/// listed because only vault positions are exported.
pub const SUPPORTED_PLATFORMS: &str =
  "beefy,pancake,hyperjump,blizzard,bdollar,jetfuel,auto,bunny,acryptos,alpha,venus,cream";

/// Top-level JSON envelope of `/api/all/{wallet}`.
///
/// `message` and `status` are kept as raw JSON: upstream signals success
/// with the *strings* `"OK"` and `"1"`, and a numeric `1` must not pass.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
  #[serde(default)]
  pub message: Value,
  #[serde(default)]
  pub status: Value,
  #[serde(default)]
  pub result: Value,
}

impl Envelope {
  /// Whether upstream flagged the call as successful.
  pub fn is_ok(&self) -> bool {
    self.message.as_str() == Some("OK") && self.status.as_str() == Some("1")
  }
}

/// Rate limit headers as the server sent them.
///
/// Values are kept verbatim; yieldwatch does not document their format,
/// so nothing is parsed until a caller asks for a number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitInfo {
  /// `x-ratelimit-remaining`.
  pub remaining: Option<String>,
  /// `x-ratelimit-limit`.
  pub limit: Option<String>,
  /// `x-ratelimit-reset`.
  pub reset: Option<String>,
}

impl RateLimitInfo {
  /// Remaining requests, when the header holds a plain integer.
  pub fn remaining_requests(&self) -> Option<u32> {
    self.remaining.as_deref().and_then(|v| v.trim().parse().ok())
  }
}

/// Validate a response and extract the portfolio.
///
/// `status` is the HTTP status code, `body` the raw response text.
pub fn parse_envelope(status: u16, body: &str) -> Result<PortfolioResult, FetchError> {
  if !(200..300).contains(&status) {
    return Err(FetchError::Http {
      status,
      body: body.to_string(),
    });
  }

  let envelope: Envelope = serde_json::from_str(body).map_err(|e| FetchError::Decode {
    status,
    reason: e.to_string(),
    body: body.to_string(),
  })?;

  if !envelope.is_ok() {
    return Err(FetchError::Upstream {
      status,
      message: display_value(&envelope.message),
      upstream_status: display_value(&envelope.status),
      body: body.to_string(),
    });
  }

  PortfolioResult::from_value(envelope.result).ok_or_else(|| FetchError::MissingResult {
    status,
    body: body.to_string(),
  })
}

fn display_value(value: &Value) -> Option<String> {
  match value {
    Value::Null => None,
    Value::String(s) => Some(s.clone()),
    other => Some(other.to_string()),
  }
}
