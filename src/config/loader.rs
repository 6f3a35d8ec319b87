//! Configuration loading and validation.

use std::path::Path;

use anyhow::{Context, Result, ensure};

use super::AppConfig;

/// Load configuration from a TOML file.
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig> {
  let path = path.as_ref();
  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config: AppConfig = toml::from_str(&content)
    .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

  validate_config(&config)?;

  Ok(config)
}

/// Validate configuration values.
pub fn validate_config(config: &AppConfig) -> Result<()> {
  ensure!(!config.bot.name.is_empty(), "bot.name cannot be empty");
  ensure!(
    !config.market.symbol.is_empty(),
    "market.symbol cannot be empty"
  );

  ensure!(
    config.grid.offset_bps >= 0.0,
    "grid.offset_bps must be non-negative, got {}",
    config.grid.offset_bps
  );
  ensure!(
    config.grid.step_bps > 0.0,
    "grid.step_bps must be positive, got {}",
    config.grid.step_bps
  );
  ensure!(
    config.grid.grid_size >= 1,
    "grid.grid_size must be at least 1"
  );
  ensure!(
    config.grid.base_size > 0.0,
    "grid.base_size must be positive, got {}",
    config.grid.base_size
  );
  ensure!(
    config.grid.size_step >= 0.0,
    "grid.size_step must be non-negative, got {}",
    config.grid.size_step
  );

  ensure!(
    config.engine.refresh_ms >= 100,
    "engine.refresh_ms must be at least 100ms, got {}",
    config.engine.refresh_ms
  );
  ensure!(
    config.api.timeout_ms >= 100,
    "api.timeout_ms must be at least 100ms, got {}",
    config.api.timeout_ms
  );

  if config.metrics.enabled {
    ensure!(
      config.metrics.bind_address.parse::<std::net::SocketAddr>().is_ok(),
      "metrics.bind_address is not a valid socket address: {}",
      config.metrics.bind_address
    );
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::Network;

  fn valid_toml() -> &'static str {
    r#"
      [bot]
      name = "woox-grid-bot"
      log_level = "info"
      dry_run = false

      [market]
      symbol = "PERP_BTC_USDT"

      [grid]
      offset_bps = 3.0
      step_bps = 10.0
      grid_size = 3
      base_size = 0.01
      size_step = 0.02

      [engine]
      refresh_ms = 3000
      order_interval_ms = 300

      [api]
      network = "testnet"
      timeout_ms = 5000

      [metrics]
      enabled = true
      bind_address = "0.0.0.0:9090"
    "#
  }

  #[test]
  fn test_parse_valid_config() {
    let config: AppConfig = toml::from_str(valid_toml()).unwrap();
    assert_eq!(config.market.symbol, "PERP_BTC_USDT");
    assert_eq!(config.grid.grid_size, 3);
    assert_eq!(config.api.network, Network::Testnet);
    assert!(validate_config(&config).is_ok());
  }

  #[test]
  fn test_defaults_applied() {
    let minimal = r#"
      [bot]
      name = "bot"

      [market]
      symbol = "PERP_ETH_USDT"

      [grid]
      offset_bps = 1.0
      step_bps = 5.0
      grid_size = 2
      base_size = 0.1
      size_step = 0.0

      [engine]

      [api]
      network = "mainnet"

      [metrics]
    "#;
    let config: AppConfig = toml::from_str(minimal).unwrap();
    assert_eq!(config.bot.log_level, "info");
    assert!(!config.bot.dry_run);
    assert_eq!(config.engine.refresh_ms, 3_000);
    assert_eq!(config.engine.order_interval_ms, 300);
    assert_eq!(config.api.timeout_ms, 5_000);
    assert!(config.metrics.enabled);
    assert_eq!(config.metrics.bind_address, "0.0.0.0:9090");
  }

  #[test]
  fn test_endpoint_defaults_by_network() {
    let config: AppConfig = toml::from_str(valid_toml()).unwrap();
    assert_eq!(config.api.rest_url(), "https://api.staging.woo.org");
    assert_eq!(
      config.api.ws_public_url("my-app-id"),
      "wss://wss.staging.woo.org/ws/stream/my-app-id"
    );
    assert_eq!(
      config.api.ws_private_url("my-app-id"),
      "wss://wss.staging.woo.org/v2/ws/private/stream/my-app-id"
    );
  }

  #[test]
  fn test_endpoint_overrides_win() {
    let toml_str = valid_toml().replace(
      "network = \"testnet\"",
      "network = \"testnet\"\nrest_url = \"http://localhost:8080\"\nws_public_url = \"ws://localhost:9999/{application_id}\"",
    );
    let config: AppConfig = toml::from_str(&toml_str).unwrap();
    assert_eq!(config.api.rest_url(), "http://localhost:8080");
    assert_eq!(
      config.api.ws_public_url("abc"),
      "ws://localhost:9999/abc"
    );
  }

  #[test]
  fn test_rejects_zero_grid_size() {
    let mut config: AppConfig = toml::from_str(valid_toml()).unwrap();
    config.grid.grid_size = 0;
    assert!(validate_config(&config).is_err());
  }

  #[test]
  fn test_rejects_negative_offset() {
    let mut config: AppConfig = toml::from_str(valid_toml()).unwrap();
    config.grid.offset_bps = -1.0;
    assert!(validate_config(&config).is_err());
  }

  #[test]
  fn test_rejects_non_positive_step() {
    let mut config: AppConfig = toml::from_str(valid_toml()).unwrap();
    config.grid.step_bps = 0.0;
    assert!(validate_config(&config).is_err());
  }

  #[test]
  fn test_rejects_bad_metrics_address() {
    let mut config: AppConfig = toml::from_str(valid_toml()).unwrap();
    config.metrics.bind_address = "not-an-address".to_string();
    assert!(validate_config(&config).is_err());
  }

  #[test]
  fn test_missing_file_is_an_error() {
    assert!(load_config("/nonexistent/config.toml").is_err());
  }
}
