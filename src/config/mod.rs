//! Configuration Module - TOML File + CLI Flags
//!
//! Settings come from an optional `config.toml`, then command-line
//! flags (or their environment variables) override individual values.
//! Every field has a default, so the exporter runs with no file at all.

pub mod cli;
pub mod loader;

use std::time::Duration;

use serde::Deserialize;

use crate::adapters::api::YieldwatchClientConfig;
use crate::domain::translate::LabelSchema;

/// Top-level exporter configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
  /// Wallet, listener and loop settings.
  #[serde(default)]
  pub exporter: ExporterConfig,
  /// Upstream API settings.
  #[serde(default)]
  pub api: ApiConfig,
}

/// Exporter identity and loop configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ExporterConfig {
  /// Wallet address to track. Passed to upstream unvalidated.
  #[serde(default)]
  pub wallet: String,
  /// Port of the `/metrics` listener.
  #[serde(default = "default_port")]
  pub port: u16,
  /// Seconds between poll cycles.
  #[serde(default = "default_poll_interval")]
  pub poll_interval_seconds: u64,
  /// Add the farm name as a label on every vault series.
  #[serde(default)]
  pub include_farm_label: bool,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
}

/// yieldwatch API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the yieldwatch API.
  #[serde(default = "default_base_url")]
  pub base_url: String,
  /// Request timeout in seconds.
  #[serde(default = "default_timeout")]
  pub timeout_seconds: u64,
}

impl Default for ExporterConfig {
  fn default() -> Self {
    Self {
      wallet: String::new(),
      port: default_port(),
      poll_interval_seconds: default_poll_interval(),
      include_farm_label: false,
      log_level: default_log_level(),
    }
  }
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
      timeout_seconds: default_timeout(),
    }
  }
}

impl AppConfig {
  /// Interval between poll cycles.
  pub const fn poll_interval(&self) -> Duration {
    Duration::from_secs(self.exporter.poll_interval_seconds)
  }

  /// Label schema selected for the vault gauges.
  pub const fn label_schema(&self) -> LabelSchema {
    LabelSchema {
      include_farm_label: self.exporter.include_farm_label,
    }
  }

  /// Settings for the yieldwatch HTTP client.
  pub fn client_config(&self) -> YieldwatchClientConfig {
    YieldwatchClientConfig {
      base_url: self.api.base_url.clone(),
      timeout: Duration::from_secs(self.api.timeout_seconds),
    }
  }
}

// Default value functions for serde

fn default_port() -> u16 {
  18765
}

fn default_poll_interval() -> u64 {
  5
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_base_url() -> String {
  "https://www.yieldwatch.net".to_string()
}

fn default_timeout() -> u64 {
  10
}
