//! Configuration Module - TOML-based Bot Configuration
//!
//! Loads and validates configuration from `config.toml`. All grid
//! parameters, timing knobs and endpoint selection live here -
//! nothing is hardcoded in the domain layer. Credentials are NOT
//! part of the file; they come from environment variables (see
//! `adapters::api::auth`).

pub mod loader;

use serde::Deserialize;

use crate::domain::grid::GridSpec;

/// Top-level bot configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before the bot begins operation.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Bot identity and metadata.
  pub bot: BotConfig,
  /// Traded market.
  pub market: MarketConfig,
  /// Grid shape parameters.
  pub grid: GridConfig,
  /// Quoting loop timing.
  pub engine: EngineConfig,
  /// WOO X endpoints and network selection.
  pub api: ApiConfig,
  /// Metrics and monitoring.
  pub metrics: MetricsConfig,
}

/// Bot identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
  /// Human-readable bot name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Enable dry-run mode (ladders computed and logged, no real orders).
  #[serde(default)]
  pub dry_run: bool,
}

/// Traded market configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
  /// WOO X symbol, e.g. "PERP_BTC_USDT".
  pub symbol: String,
}

/// Grid shape configuration, mirrors `domain::grid::GridSpec`.
#[derive(Debug, Clone, Deserialize)]
pub struct GridConfig {
  /// Offset of the innermost level from the mid, in basis points.
  pub offset_bps: f64,
  /// Distance between consecutive levels, in basis points.
  pub step_bps: f64,
  /// Number of levels per side.
  pub grid_size: u32,
  /// Size of the innermost order.
  pub base_size: f64,
  /// Size increment per level.
  pub size_step: f64,
}

impl GridConfig {
  /// Convert into the domain-level spec consumed by the quote engine.
  pub fn to_spec(&self) -> GridSpec {
    GridSpec {
      offset_bps: self.offset_bps,
      step_bps: self.step_bps,
      grid_size: self.grid_size,
      base_size: self.base_size,
      size_step: self.size_step,
    }
  }
}

/// Quoting loop timing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
  /// How often the ladder is cancelled and re-quoted (milliseconds).
  #[serde(default = "default_refresh_ms")]
  pub refresh_ms: u64,
  /// Delay between consecutive order submissions within one ladder
  /// (milliseconds). Protects against the exchange rate limiter.
  #[serde(default = "default_order_interval_ms")]
  pub order_interval_ms: u64,
}

/// Target network. Endpoint defaults are derived from this unless
/// explicitly overridden in `[api]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
  Testnet,
  Mainnet,
}

/// API endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Which WOO X deployment to talk to.
  pub network: Network,
  /// Request timeout in milliseconds.
  #[serde(default = "default_timeout_ms")]
  pub timeout_ms: u64,
  /// Optional REST base URL override.
  pub rest_url: Option<String>,
  /// Optional public stream URL override ("{application_id}" template).
  pub ws_public_url: Option<String>,
  /// Optional private stream URL override ("{application_id}" template).
  pub ws_private_url: Option<String>,
}

impl ApiConfig {
  /// REST base URL for the selected network.
  pub fn rest_url(&self) -> String {
    self.rest_url.clone().unwrap_or_else(|| {
      match self.network {
        Network::Mainnet => "https://api.woo.org",
        Network::Testnet => "https://api.staging.woo.org",
      }
      .to_string()
    })
  }

  /// Public market-data stream URL, parameterized by application id.
  pub fn ws_public_url(&self, application_id: &str) -> String {
    let template = self.ws_public_url.clone().unwrap_or_else(|| {
      match self.network {
        Network::Mainnet => "wss://wss.woo.org/ws/stream/{application_id}",
        Network::Testnet => "wss://wss.staging.woo.org/ws/stream/{application_id}",
      }
      .to_string()
    });
    template.replace("{application_id}", application_id)
  }

  /// Private execution-report stream URL, parameterized by application id.
  pub fn ws_private_url(&self, application_id: &str) -> String {
    let template = self.ws_private_url.clone().unwrap_or_else(|| {
      match self.network {
        Network::Mainnet => "wss://wss.woo.org/v2/ws/private/stream/{application_id}",
        Network::Testnet => {
          "wss://wss.staging.woo.org/v2/ws/private/stream/{application_id}"
        }
      }
      .to_string()
    });
    template.replace("{application_id}", application_id)
  }
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
  /// Enable the metrics/health HTTP server.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Bind address for /metrics, /live and /ready.
  #[serde(default = "default_metrics_addr")]
  pub bind_address: String,
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_true() -> bool {
  true
}

fn default_refresh_ms() -> u64 {
  3_000
}

fn default_order_interval_ms() -> u64 {
  300
}

fn default_timeout_ms() -> u64 {
  5_000
}

fn default_metrics_addr() -> String {
  "0.0.0.0:9090".to_string()
}
