//! Configuration Loader - File Loading and Validation
//!
//! Handles loading the optional TOML file, merging CLI flags, and
//! validating the result with clear error messages.

use std::path::Path;

use anyhow::{Context, Result};

use super::cli::Cli;
use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
pub fn load_config(path: &Path) -> Result<AppConfig> {
  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  parse_config(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Parse configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  Ok(toml::from_str(content)?)
}

/// Build the effective configuration: file (if any), then flags, then validation.
pub fn resolve(cli: &Cli) -> Result<AppConfig> {
  let base = match &cli.config {
    Some(path) => load_config(path)?,
    None => AppConfig::default(),
  };

  let config = cli.apply(base);
  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
///
/// The wallet is deliberately not checked: an empty or malformed wallet
/// surfaces as an ordinary upstream error on the first poll.
pub fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    config.exporter.poll_interval_seconds > 0,
    "poll_interval_seconds must be positive"
  );
  anyhow::ensure!(
    config.api.timeout_seconds > 0,
    "API timeout_seconds must be positive"
  );
  anyhow::ensure!(
    !config.api.base_url.is_empty(),
    "API base_url must not be empty"
  );
  anyhow::ensure!(
    config.api.base_url.starts_with("http://") || config.api.base_url.starts_with("https://"),
    "API base_url must be an http(s) URL, got {}",
    config.api.base_url
  );

  Ok(())
}
