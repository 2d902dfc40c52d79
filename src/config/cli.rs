//! Command-line flags.

use std::path::PathBuf;

use clap::Parser;

use super::AppConfig;

#[derive(Parser, Debug, Default)]
#[command(author, version, about = "yieldwatch Prometheus exporter", long_about = None)]
pub struct Cli {
  /// Wallet address to track
  #[arg(long, env = "YIELDWATCH_WALLET")]
  pub wallet: Option<String>,

  /// Port of the metrics listener [default: 18765]
  #[arg(long, env = "YIELDWATCH_PORT")]
  pub port: Option<u16>,

  /// Log at debug level
  #[arg(long)]
  pub debug: bool,

  /// Add the farm name as a label on every vault series
  #[arg(long, env = "YIELDWATCH_FARM_LABEL")]
  pub farm_label: bool,

  /// Seconds between poll cycles [default: 5]
  #[arg(long, env = "YIELDWATCH_INTERVAL")]
  pub interval: Option<u64>,

  /// Optional TOML config file; flags override its values
  #[arg(long, env = "YIELDWATCH_CONFIG")]
  pub config: Option<PathBuf>,
}

impl Cli {
  /// Apply the flags that were given on top of `config`.
  pub fn apply(&self, mut config: AppConfig) -> AppConfig {
    if let Some(wallet) = &self.wallet {
      config.exporter.wallet.clone_from(wallet);
    }
    if let Some(port) = self.port {
      config.exporter.port = port;
    }
    if let Some(interval) = self.interval {
      config.exporter.poll_interval_seconds = interval;
    }
    if self.farm_label {
      config.exporter.include_farm_label = true;
    }
    if self.debug {
      config.exporter.log_level = "debug".to_string();
    }
    config
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_core_flags() {
    let cli = Cli::try_parse_from(["yieldwatch-exporter", "--wallet", "0xABC", "--port", "9000", "--debug"])
      .unwrap();
    let config = cli.apply(AppConfig::default());

    assert_eq!(config.exporter.wallet, "0xABC");
    assert_eq!(config.exporter.port, 9000);
    assert_eq!(config.exporter.log_level, "debug");
    assert!(!config.exporter.include_farm_label);
  }

  #[test]
  fn test_defaults_without_flags() {
    let config = Cli::default().apply(AppConfig::default());
    assert_eq!(config.exporter.port, 18765);
    assert_eq!(config.exporter.poll_interval_seconds, 5);
    assert_eq!(config.exporter.log_level, "info");
    assert!(config.exporter.wallet.is_empty());
  }

  #[test]
  fn test_flags_override_file_values() {
    let mut file = AppConfig::default();
    file.exporter.wallet = "0xFILE".to_string();
    file.exporter.port = 1234;

    let cli = Cli::try_parse_from(["yieldwatch-exporter", "--wallet", "0xCLI", "--farm-label"]).unwrap();
    let config = cli.apply(file);

    assert_eq!(config.exporter.wallet, "0xCLI");
    assert_eq!(config.exporter.port, 1234);
    assert!(config.label_schema().include_farm_label);
  }

  #[test]
  fn test_rejects_invalid_port() {
    assert!(Cli::try_parse_from(["yieldwatch-exporter", "--port", "not-a-port"]).is_err());
  }
}
